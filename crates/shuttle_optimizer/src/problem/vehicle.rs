use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shuttle_routing::{define_index_newtype, network::LinkIdx};

define_index_newtype!(VehicleId);

/// Live state of a vehicle, rebuilt by the host for every dispatch call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub capacity: usize,
    pub service_end_time: f64,
    /// The link the vehicle will be on at `divertable_time`.
    pub current_link: LinkIdx,
    /// Earliest time from which the route can still be changed.
    pub divertable_time: f64,
}

impl VehicleSnapshot {
    /// Last time at which a stop may begin, so that it still ends before the
    /// service does.
    pub fn latest_stop_start(&self, stop_duration: f64) -> f64 {
        self.service_end_time - stop_duration
    }
}

/// Live vehicles ordered by id. Solvers visit vehicles in this order.
pub type FleetSnapshot = BTreeMap<VehicleId, VehicleSnapshot>;
