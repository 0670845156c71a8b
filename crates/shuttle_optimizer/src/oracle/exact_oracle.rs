use std::sync::Arc;

use shuttle_routing::{
    link_router::LinkRouter,
    network::{LinkIdx, Network},
    travel_time::LinkTravelTime,
};

use super::TravelTimeOracle;

/// Routes every query through the network. Too slow for the insertion search,
/// used to finalize a chosen timetable.
#[derive(Clone)]
pub struct ExactTravelTimeOracle {
    router: LinkRouter,
}

impl ExactTravelTimeOracle {
    pub fn new(network: Arc<Network>, travel_time: Arc<dyn LinkTravelTime>) -> Self {
        ExactTravelTimeOracle {
            router: LinkRouter::new(network, travel_time),
        }
    }
}

impl TravelTimeOracle for ExactTravelTimeOracle {
    fn travel_time(&self, from: LinkIdx, to: LinkIdx, departure_time: f64) -> f64 {
        self.router.travel_time(from, to, departure_time)
    }
}
