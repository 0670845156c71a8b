use std::sync::Arc;

use shuttle_routing::{network::Network, travel_time::LinkTravelTime};
use tracing::{debug, info};

use crate::{
    error::DispatchError,
    oracle::link_to_link_matrix::LinkToLinkTravelTimeMatrix,
    problem::{fleet_schedule::FleetSchedule, request::Request, vehicle::FleetSnapshot},
};

use super::{
    regret_insertion::RegretInsertionSolver,
    ruin_and_recreate::RuinAndRecreateSolver,
    sequential_insertion::SequentialInsertionSolver,
    solver_params::{SolverParams, SolverStrategy},
};

/// Plans a batch of new requests into the fleet schedule of the previous
/// call.
pub trait OfflineSolver {
    fn calculate(
        &mut self,
        previous: Option<FleetSchedule>,
        vehicles: &FleetSnapshot,
        new_requests: &[Arc<Request>],
        now: f64,
    ) -> Result<FleetSchedule, DispatchError>;
}

/// Result of setting up a pass.
pub enum PreparedPass {
    /// Nothing to insert, the schedule is returned as is.
    Idle(FleetSchedule),
    Ready {
        schedule: FleetSchedule,
        matrix: LinkToLinkTravelTimeMatrix,
    },
}

/// Network and parameters shared by the batch solvers.
#[derive(Clone)]
pub struct SolverContext {
    network: Arc<Network>,
    travel_time: Arc<dyn LinkTravelTime>,
    params: SolverParams,
}

impl SolverContext {
    pub fn new(
        network: Arc<Network>,
        travel_time: Arc<dyn LinkTravelTime>,
        params: SolverParams,
    ) -> Self {
        SolverContext {
            network,
            travel_time,
            params,
        }
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Aligns `previous` with the live fleet, builds the travel time matrix
    /// for this pass and re-times the existing timetables with it.
    ///
    /// With `retry_rejected`, the matrix also covers the rejected requests
    /// that can still be picked up at `now`.
    pub fn prepare(
        &self,
        previous: Option<FleetSchedule>,
        vehicles: &FleetSnapshot,
        new_requests: &[Arc<Request>],
        now: f64,
        retry_rejected: bool,
    ) -> Result<PreparedPass, DispatchError> {
        let mut schedule = previous.unwrap_or_else(|| FleetSchedule::new(vehicles));
        schedule.sync_fleet(vehicles);

        if new_requests.is_empty() {
            debug!(now, "No new requests, keeping the schedule");
            return Ok(PreparedPass::Idle(schedule));
        }

        let retried = schedule
            .retryable_rejected(now)
            .filter(|_| retry_rejected);
        let matrix = LinkToLinkTravelTimeMatrix::for_pass(
            Arc::clone(&self.network),
            Arc::clone(&self.travel_time),
            &schedule,
            vehicles,
            new_requests.iter().chain(retried),
            now,
        )?;
        schedule.resync_times(vehicles, &matrix)?;

        Ok(PreparedPass::Ready { schedule, matrix })
    }

    /// Validates the final schedule before handing it back.
    pub fn finish(
        &self,
        solver: &str,
        schedule: FleetSchedule,
        vehicles: &FleetSnapshot,
    ) -> Result<FleetSchedule, DispatchError> {
        schedule.check_invariants(vehicles)?;

        info!(
            solver,
            assigned = schedule.assignments().len(),
            rejected = schedule.rejected().len(),
            stops = schedule.num_stops(),
            "Dispatch pass done"
        );

        Ok(schedule)
    }
}

/// The batch solver selected by [`SolverParams::solver`].
pub enum BatchSolver {
    Sequential(SequentialInsertionSolver),
    Regret(RegretInsertionSolver),
    RuinAndRecreate(RuinAndRecreateSolver),
}

impl BatchSolver {
    pub fn from_params(
        network: Arc<Network>,
        travel_time: Arc<dyn LinkTravelTime>,
        params: SolverParams,
    ) -> Self {
        let strategy = params.solver;
        let context = SolverContext::new(network, travel_time, params);

        match strategy {
            SolverStrategy::Sequential => {
                BatchSolver::Sequential(SequentialInsertionSolver::new(context))
            }
            SolverStrategy::Regret => BatchSolver::Regret(RegretInsertionSolver::new(context)),
            SolverStrategy::RuinAndRecreate => {
                BatchSolver::RuinAndRecreate(RuinAndRecreateSolver::new(context))
            }
        }
    }
}

impl OfflineSolver for BatchSolver {
    fn calculate(
        &mut self,
        previous: Option<FleetSchedule>,
        vehicles: &FleetSnapshot,
        new_requests: &[Arc<Request>],
        now: f64,
    ) -> Result<FleetSchedule, DispatchError> {
        match self {
            BatchSolver::Sequential(solver) => {
                solver.calculate(previous, vehicles, new_requests, now)
            }
            BatchSolver::Regret(solver) => solver.calculate(previous, vehicles, new_requests, now),
            BatchSolver::RuinAndRecreate(solver) => {
                solver.calculate(previous, vehicles, new_requests, now)
            }
        }
    }
}
