use std::sync::Arc;

use fxhash::FxHashMap;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::debug;

use crate::{
    dijkstra::Dijkstra,
    network::{Network, NodeIdx},
    travel_time::LinkTravelTime,
};

/// Shortest travel times between every pair of a subset of nodes, computed
/// for a single departure time.
///
/// The matrix uses a flat layout: the entry for a pair of nodes lives at
/// `from * num_nodes + to`, where both are positions in `nodes`.
#[derive(Debug, Clone)]
pub struct NodeToNodeMatrix {
    nodes: Vec<NodeIdx>,
    positions: FxHashMap<NodeIdx, usize>,
    times: Arc<Vec<f64>>,
}

impl NodeToNodeMatrix {
    /// Runs one search per source node on the rayon thread pool.
    /// Unreachable pairs are stored as `f64::INFINITY`.
    pub fn compute(
        network: &Network,
        travel_time: &dyn LinkTravelTime,
        nodes: impl IntoIterator<Item = NodeIdx>,
        departure_time: f64,
    ) -> Self {
        let mut unique_nodes: Vec<NodeIdx> = nodes.into_iter().collect();
        unique_nodes.sort_unstable();
        unique_nodes.dedup();

        let positions: FxHashMap<NodeIdx, usize> = unique_nodes
            .iter()
            .enumerate()
            .map(|(position, &node)| (node, position))
            .collect();

        let rows: Vec<Vec<f64>> = unique_nodes
            .par_iter()
            .map(|&source| {
                let mut dijkstra = Dijkstra::new(network, travel_time);
                let reached = dijkstra.one_to_all(source, departure_time);
                unique_nodes
                    .iter()
                    .map(|target| reached.get(target).copied().unwrap_or(f64::INFINITY))
                    .collect()
            })
            .collect();

        debug!(
            nodes = unique_nodes.len(),
            departure_time, "Computed node to node matrix"
        );

        NodeToNodeMatrix {
            nodes: unique_nodes,
            positions,
            times: Arc::new(rows.into_iter().flatten().collect()),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// `None` when either node was not part of the matrix.
    pub fn travel_time(&self, from: NodeIdx, to: NodeIdx) -> Option<f64> {
        let from = *self.positions.get(&from)?;
        let to = *self.positions.get(&to)?;
        Some(self.times[from * self.num_nodes() + to])
    }
}
