use std::sync::Arc;

use rand::RngCore;

use crate::problem::{fleet_schedule::FleetSchedule, request::Request};

/// Picks the requests a ruin step takes out of the schedule. Only requests
/// that are not picked up yet may be selected.
pub trait RuinSelector {
    fn select_requests<R>(&self, schedule: &FleetSchedule, rng: &mut R) -> Vec<Arc<Request>>
    where
        R: RngCore;
}
