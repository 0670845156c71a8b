use std::{cmp::Ordering, collections::BinaryHeap};

use fxhash::{FxHashMap, FxHashSet};

use crate::{
    network::{Network, NodeIdx},
    travel_time::LinkTravelTime,
};

#[derive(Copy, Clone, Debug)]
struct HeapItem {
    node: NodeIdx,
    /// Seconds elapsed since departure from the source node.
    elapsed: f64,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &HeapItem) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &HeapItem) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flip weight to make this a min-heap
        other
            .elapsed
            .total_cmp(&self.elapsed)
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Time-dependent shortest travel time search over nodes.
///
/// Link travel times are evaluated at the time the link is entered, so the
/// result depends on the departure time.
pub struct Dijkstra<'a> {
    network: &'a Network,
    travel_time: &'a dyn LinkTravelTime,
    heap: BinaryHeap<HeapItem>,
    // A map instead of a node-sized vector: searches usually settle a small
    // part of the network.
    elapsed: FxHashMap<NodeIdx, f64>,
    settled: FxHashSet<NodeIdx>,
}

impl<'a> Dijkstra<'a> {
    pub fn new(network: &'a Network, travel_time: &'a dyn LinkTravelTime) -> Self {
        Dijkstra {
            network,
            travel_time,
            heap: BinaryHeap::with_capacity(1024),
            elapsed: FxHashMap::default(),
            settled: FxHashSet::default(),
        }
    }

    fn init(&mut self, source: NodeIdx) {
        self.heap.clear();
        self.elapsed.clear();
        self.settled.clear();

        self.heap.push(HeapItem {
            node: source,
            elapsed: 0.0,
        });
        self.elapsed.insert(source, 0.0);
    }

    fn run(&mut self, source: NodeIdx, departure_time: f64, target: Option<NodeIdx>) {
        self.init(source);

        while let Some(HeapItem { node, elapsed }) = self.heap.pop() {
            if !self.settled.insert(node) {
                continue;
            }

            if Some(node) == target {
                break;
            }

            let time = departure_time + elapsed;
            for link in self.network.out_links(node) {
                let next = link.to_node();
                if self.settled.contains(&next) {
                    continue;
                }

                let candidate = elapsed + self.travel_time.link_travel_time(link, time);
                let improves = self
                    .elapsed
                    .get(&next)
                    .is_none_or(|&current| candidate < current);

                if improves {
                    self.elapsed.insert(next, candidate);
                    self.heap.push(HeapItem {
                        node: next,
                        elapsed: candidate,
                    });
                }
            }
        }
    }

    /// Travel time from `source` to every reachable node. Unreachable nodes are
    /// absent from the returned map.
    pub fn one_to_all(&mut self, source: NodeIdx, departure_time: f64) -> FxHashMap<NodeIdx, f64> {
        self.run(source, departure_time, None);
        std::mem::take(&mut self.elapsed)
    }

    /// Travel time from `source` to `target`, or `None` when `target` cannot be
    /// reached.
    pub fn one_to_one(
        &mut self,
        source: NodeIdx,
        target: NodeIdx,
        departure_time: f64,
    ) -> Option<f64> {
        if source == target {
            return Some(0.0);
        }

        self.run(source, departure_time, Some(target));

        if self.settled.contains(&target) {
            self.elapsed.get(&target).copied()
        } else {
            None
        }
    }
}
