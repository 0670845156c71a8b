use crate::problem::{timetable::Timetable, vehicle::VehicleId};

/// Cost reported when a request cannot be inserted into a timetable.
pub const NOT_FEASIBLE_COST: f64 = 1e6;

#[derive(Debug, Clone)]
pub struct InsertionCandidate {
    pub vehicle_id: VehicleId,
    /// Added drive time, or [`NOT_FEASIBLE_COST`].
    pub cost: f64,
    pub timetable: Option<Timetable>,
}

impl InsertionCandidate {
    pub fn infeasible(vehicle_id: VehicleId) -> Self {
        InsertionCandidate {
            vehicle_id,
            cost: NOT_FEASIBLE_COST,
            timetable: None,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.cost < NOT_FEASIBLE_COST && self.timetable.is_some()
    }

    /// The vehicle and its new timetable, if the insertion is feasible.
    pub fn into_assignment(self) -> Option<(VehicleId, Timetable)> {
        if self.cost < NOT_FEASIBLE_COST {
            self.timetable.map(|timetable| (self.vehicle_id, timetable))
        } else {
            None
        }
    }
}
