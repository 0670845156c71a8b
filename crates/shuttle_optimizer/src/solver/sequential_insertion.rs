use std::sync::Arc;

use tracing::debug;

use crate::{
    error::DispatchError,
    oracle::TravelTimeOracle,
    problem::{fleet_schedule::FleetSchedule, request::Request, vehicle::FleetSnapshot},
};

use super::{
    batch_solver::{OfflineSolver, PreparedPass, SolverContext},
    insertion_calculator::InsertionCalculator,
    insertion_candidate::InsertionCandidate,
};

/// Inserts `requests` one at a time, in order, each at its cheapest position
/// over the whole fleet. Requests no vehicle can take are rejected.
pub fn perform_sequential_insertion<O>(
    calculator: &InsertionCalculator<O>,
    schedule: &mut FleetSchedule,
    vehicles: &FleetSnapshot,
    requests: &[Arc<Request>],
) -> Result<(), DispatchError>
where
    O: TravelTimeOracle + ?Sized,
{
    for request in requests {
        let mut best: Option<InsertionCandidate> = None;

        for (&vehicle_id, timetable) in schedule.timetables() {
            let vehicle = vehicles
                .get(&vehicle_id)
                .ok_or(DispatchError::UnknownVehicle(vehicle_id))?;
            let candidate = calculator.compute_insertion(vehicle, request, timetable);

            if best.as_ref().is_none_or(|best| candidate.cost < best.cost) {
                best = Some(candidate);
            }
        }

        match best.and_then(InsertionCandidate::into_assignment) {
            Some((vehicle_id, timetable)) => {
                debug!(request_id = %request.id, %vehicle_id, "Inserted request");
                schedule.commit(request, vehicle_id, timetable);
            }
            None => {
                debug!(request_id = %request.id, "No feasible insertion, rejecting");
                schedule.reject(Arc::clone(request));
            }
        }
    }

    Ok(())
}

pub struct SequentialInsertionSolver {
    context: SolverContext,
}

impl SequentialInsertionSolver {
    pub fn new(context: SolverContext) -> Self {
        SequentialInsertionSolver { context }
    }
}

impl OfflineSolver for SequentialInsertionSolver {
    fn calculate(
        &mut self,
        previous: Option<FleetSchedule>,
        vehicles: &FleetSnapshot,
        new_requests: &[Arc<Request>],
        now: f64,
    ) -> Result<FleetSchedule, DispatchError> {
        let (mut schedule, matrix) =
            match self.context.prepare(previous, vehicles, new_requests, now, false)? {
                PreparedPass::Idle(schedule) => return Ok(schedule),
                PreparedPass::Ready { schedule, matrix } => (schedule, matrix),
            };

        let calculator = InsertionCalculator::new(&matrix, self.context.params().stop_duration);
        perform_sequential_insertion(&calculator, &mut schedule, vehicles, new_requests)?;

        self.context.finish("sequential", schedule, vehicles)
    }
}
