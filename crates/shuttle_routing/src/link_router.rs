use std::sync::Arc;

use crate::{
    dijkstra::Dijkstra,
    network::{Link, LinkIdx, Network},
    travel_time::LinkTravelTime,
};

/// Time to leave the link a vehicle currently stands on. Paths start at the
/// end of the origin link, so only this constant is charged for it.
pub const FIRST_LINK_TT: f64 = 1.0;

/// Time to traverse the destination link when entering it at `time`.
pub fn last_link_travel_time(travel_time: &dyn LinkTravelTime, link: &Link, time: f64) -> f64 {
    travel_time.link_travel_time(link, time)
}

/// Exact link to link router: one time-dependent search per query.
#[derive(Clone)]
pub struct LinkRouter {
    network: Arc<Network>,
    travel_time: Arc<dyn LinkTravelTime>,
}

impl LinkRouter {
    pub fn new(network: Arc<Network>, travel_time: Arc<dyn LinkTravelTime>) -> Self {
        LinkRouter {
            network,
            travel_time,
        }
    }

    /// Travel time from the end of `from` to the end of `to` when departing at
    /// `departure_time`. Zero for identical links, infinite if `to` cannot be
    /// reached or either link is not part of the network.
    pub fn travel_time(&self, from: LinkIdx, to: LinkIdx, departure_time: f64) -> f64 {
        if from == to {
            return 0.0;
        }

        let (Ok(from_link), Ok(to_link)) = (self.network.try_link(from), self.network.try_link(to))
        else {
            return f64::INFINITY;
        };
        let mut dijkstra = Dijkstra::new(&self.network, self.travel_time.as_ref());

        match dijkstra.one_to_one(
            from_link.to_node(),
            to_link.from_node(),
            departure_time + FIRST_LINK_TT,
        ) {
            Some(path_time) => {
                FIRST_LINK_TT
                    + path_time
                    + last_link_travel_time(
                        self.travel_time.as_ref(),
                        to_link,
                        departure_time + FIRST_LINK_TT + path_time,
                    )
            }
            None => f64::INFINITY,
        }
    }
}
