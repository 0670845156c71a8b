use std::sync::Arc;

use crate::{
    error::DispatchError,
    problem::{
        fleet_schedule::FleetSchedule,
        request::Request,
        vehicle::{FleetSnapshot, VehicleId},
    },
};

pub mod basic_insertion_strategy;

/// Places a single request as soon as it arrives, without touching the rest
/// of the schedule.
pub trait OnlineSolver {
    /// Returns the vehicle now serving `request`, or `None` if it was
    /// rejected.
    fn insert(
        &self,
        request: &Arc<Request>,
        schedule: &mut FleetSchedule,
        vehicles: &FleetSnapshot,
        now: f64,
    ) -> Result<Option<VehicleId>, DispatchError>;
}
