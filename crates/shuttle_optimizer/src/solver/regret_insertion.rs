use std::sync::Arc;

use smallvec::SmallVec;
use tracing::debug;

use crate::{
    error::DispatchError,
    oracle::TravelTimeOracle,
    problem::{
        fleet_schedule::FleetSchedule,
        request::Request,
        vehicle::{FleetSnapshot, VehicleSnapshot},
    },
};

use super::{
    batch_solver::{OfflineSolver, PreparedPass, SolverContext},
    insertion_calculator::InsertionCalculator,
    insertion_candidate::InsertionCandidate,
};

/// Regret-k insertion.
///
/// Every pending request is evaluated on every vehicle. The request committed
/// next is the one with the largest regret, i.e. the one that loses the most if
/// its cheapest vehicle is taken by someone else:
///
/// Regret = sum_{i=2 to k} (cost of the i-th best vehicle - cost of the best vehicle)
///
/// Ties go to the request seen first. Requests without any feasible vehicle
/// are rejected when their turn comes. After a commit only the column of the
/// chosen vehicle is re-evaluated.
#[derive(Debug, Clone, Copy)]
pub struct RegretInsertion {
    k: usize,
}

impl RegretInsertion {
    pub fn new(k: usize) -> Self {
        RegretInsertion { k: k.max(1) }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn insert_requests<O>(
        &self,
        calculator: &InsertionCalculator<O>,
        schedule: &mut FleetSchedule,
        vehicles: &FleetSnapshot,
        requests: &[Arc<Request>],
    ) -> Result<(), DispatchError>
    where
        O: TravelTimeOracle + ?Sized,
    {
        if requests.is_empty() {
            return Ok(());
        }

        // Columns follow the schedule's vehicle order.
        let fleet = schedule
            .timetables()
            .keys()
            .map(|vehicle_id| {
                vehicles
                    .get(vehicle_id)
                    .ok_or(DispatchError::UnknownVehicle(*vehicle_id))
            })
            .collect::<Result<Vec<&VehicleSnapshot>, _>>()?;
        let k = self.k.min(fleet.len()).max(1);

        let mut pending: Vec<(&Arc<Request>, Vec<InsertionCandidate>)> = requests
            .iter()
            .map(|request| {
                let row = fleet
                    .iter()
                    .zip(schedule.timetables().values())
                    .map(|(vehicle, timetable)| {
                        calculator.compute_insertion(vehicle, request, timetable)
                    })
                    .collect();
                (request, row)
            })
            .collect();

        while !pending.is_empty() {
            let mut chosen = 0;
            let mut max_regret = f64::NEG_INFINITY;
            for (index, (_, row)) in pending.iter().enumerate() {
                let regret = regret(row, k);
                if regret > max_regret {
                    max_regret = regret;
                    chosen = index;
                }
            }

            let (request, row) = pending.remove(chosen);
            let best = row
                .into_iter()
                .enumerate()
                .reduce(|best, candidate| {
                    if candidate.1.cost < best.1.cost {
                        candidate
                    } else {
                        best
                    }
                });

            let Some((column, (vehicle_id, timetable))) = best.and_then(|(column, candidate)| {
                candidate
                    .into_assignment()
                    .map(|assignment| (column, assignment))
            }) else {
                debug!(request_id = %request.id, "No feasible insertion, rejecting");
                schedule.reject(Arc::clone(request));
                continue;
            };

            debug!(request_id = %request.id, %vehicle_id, regret = max_regret, "Inserted request");
            schedule.commit(request, vehicle_id, timetable);

            // Only the chosen vehicle changed, the other columns stay valid.
            let vehicle = fleet[column];
            let timetable = schedule
                .timetable(vehicle_id)
                .ok_or(DispatchError::UnknownVehicle(vehicle_id))?;
            for (request, row) in pending.iter_mut() {
                row[column] = calculator.compute_insertion(vehicle, request, timetable);
            }
        }

        Ok(())
    }
}

impl Default for RegretInsertion {
    fn default() -> Self {
        RegretInsertion::new(3)
    }
}

/// Sum of the gaps between the cheapest candidate and the next `k - 1`.
fn regret(row: &[InsertionCandidate], k: usize) -> f64 {
    let mut costs: SmallVec<[f64; 8]> = row.iter().map(|candidate| candidate.cost).collect();
    costs.sort_unstable_by(f64::total_cmp);

    let Some(&cheapest) = costs.first() else {
        return 0.0;
    };

    costs
        .iter()
        .skip(1)
        .take(k - 1)
        .map(|cost| cost - cheapest)
        .sum()
}

pub struct RegretInsertionSolver {
    context: SolverContext,
    regret: RegretInsertion,
}

impl RegretInsertionSolver {
    pub fn new(context: SolverContext) -> Self {
        let regret = RegretInsertion::new(context.params().regret_k);
        RegretInsertionSolver { context, regret }
    }
}

impl OfflineSolver for RegretInsertionSolver {
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
        self.regret
            .insert_requests(&calculator, &mut schedule, vehicles, new_requests)?;

        self.context.finish("regret", schedule, vehicles)
    }
}
