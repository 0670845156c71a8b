use std::sync::Arc;

use rand::{RngCore, SeedableRng, rngs::SmallRng};
use tracing::info;

use crate::{
    error::DispatchError,
    oracle::TravelTimeOracle,
    problem::{fleet_schedule::FleetSchedule, request::Request, vehicle::FleetSnapshot},
    timer_debug,
};

use super::{
    acceptor::{
        accept_solution::{AcceptSolution, AcceptSolutionContext},
        solution_acceptor::SolutionAcceptor,
    },
    batch_solver::{OfflineSolver, PreparedPass, SolverContext},
    insertion_calculator::InsertionCalculator,
    regret_insertion::RegretInsertion,
    ruin::{ruin_random::RandomRuinSelector, ruin_selector::RuinSelector},
    solution_cost::{DefaultSolutionCostCalculator, SolutionCostCalculator},
    solver_params::SolverParams,
};

pub struct RuinAndRecreateOutcome {
    pub best: FleetSchedule,
    pub best_score: f64,
    /// Iterations that produced a new solution.
    pub iterations: usize,
    /// Best score before the first iteration, then after each one.
    pub best_scores: Vec<f64>,
}

/// Improves a schedule by repeatedly taking out some open requests and
/// re-inserting them with regret insertion.
pub struct RuinAndRecreate<S = RandomRuinSelector, C = DefaultSolutionCostCalculator> {
    selector: S,
    cost_calculator: C,
    acceptor: SolutionAcceptor,
    recreate: RegretInsertion,
    max_iterations: usize,
}

impl RuinAndRecreate {
    pub fn from_params(params: &SolverParams) -> Self {
        RuinAndRecreate::new(
            RandomRuinSelector::new(params.ruin_proportion, params.max_ruin_removal),
            DefaultSolutionCostCalculator::new(params.rejection_penalty),
            SolutionAcceptor::from_params(params),
            RegretInsertion::new(params.regret_k),
            params.max_iterations,
        )
    }
}

impl<S, C> RuinAndRecreate<S, C>
where
    S: RuinSelector,
    C: SolutionCostCalculator,
{
    pub fn new(
        selector: S,
        cost_calculator: C,
        acceptor: SolutionAcceptor,
        recreate: RegretInsertion,
        max_iterations: usize,
    ) -> Self {
        RuinAndRecreate {
            selector,
            cost_calculator,
            acceptor,
            recreate,
            max_iterations,
        }
    }

    pub fn recreate(&self) -> &RegretInsertion {
        &self.recreate
    }

    pub fn improve<O, R>(
        &self,
        calculator: &InsertionCalculator<O>,
        initial: FleetSchedule,
        vehicles: &FleetSnapshot,
        now: f64,
        rng: &mut R,
    ) -> Result<RuinAndRecreateOutcome, DispatchError>
    where
        O: TravelTimeOracle + ?Sized,
        R: RngCore,
    {
        let mut current_score = self.cost_calculator.cost(&initial, now);
        let mut current = initial;
        let mut best = current.clone();
        let mut best_score = current_score;
        let mut best_scores = vec![best_score];
        let mut iterations = 0;

        for iteration in 1..=self.max_iterations {
            let mut candidate = current.clone();

            let ruined = self.selector.select_requests(&candidate, rng);
            if ruined.len() <= 1 {
                info!(
                    iteration,
                    open = ruined.len(),
                    "Not enough open requests to ruin, stopping"
                );
                break;
            }

            self.ruin(calculator, &mut candidate, vehicles, &ruined)?;

            let mut requests = candidate.take_rejected(now);
            requests.extend(ruined);
            self.recreate
                .insert_requests(calculator, &mut candidate, vehicles, &requests)?;

            let score = self.cost_calculator.cost(&candidate, now);
            iterations = iteration;

            if score < best_score {
                best = candidate.clone();
                best_score = score;
            }

            let accepted = self.acceptor.accept(
                current_score,
                score,
                AcceptSolutionContext {
                    iteration,
                    max_iterations: self.max_iterations,
                    rng: &mut *rng,
                },
            );
            if accepted {
                current = candidate;
                current_score = score;
            }

            best_scores.push(best_score);

            if iteration.is_power_of_two() {
                info!(
                    iteration,
                    best_score,
                    current_score,
                    rejected = best.rejected().len(),
                    "Ruin and recreate"
                );
            }
        }

        Ok(RuinAndRecreateOutcome {
            best,
            best_score,
            iterations,
            best_scores,
        })
    }

    /// Takes `requests` out of their timetables. They end up neither assigned
    /// nor rejected.
    fn ruin<O>(
        &self,
        calculator: &InsertionCalculator<O>,
        schedule: &mut FleetSchedule,
        vehicles: &FleetSnapshot,
        requests: &[Arc<Request>],
    ) -> Result<(), DispatchError>
    where
        O: TravelTimeOracle + ?Sized,
    {
        for request in requests {
            let vehicle_id = schedule
                .vehicle_of(request.id)
                .ok_or(DispatchError::UnassignedRequest(request.id))?;
            let vehicle = vehicles
                .get(&vehicle_id)
                .ok_or(DispatchError::UnknownVehicle(vehicle_id))?;
            let timetable = schedule
                .timetable(vehicle_id)
                .ok_or(DispatchError::UnknownVehicle(vehicle_id))?;

            let timetable = calculator.remove_request(vehicle, request.id, timetable)?;
            schedule.unassign(request.id, vehicle_id, timetable);
        }

        Ok(())
    }
}

pub struct RuinAndRecreateSolver {
    context: SolverContext,
    search: RuinAndRecreate,
    rng: SmallRng,
}

impl RuinAndRecreateSolver {
    pub fn new(context: SolverContext) -> Self {
        let search = RuinAndRecreate::from_params(context.params());
        let rng = SmallRng::seed_from_u64(context.params().seed);

        RuinAndRecreateSolver {
            context,
            search,
            rng,
        }
    }
}

impl OfflineSolver for RuinAndRecreateSolver {
    fn calculate(
        &mut self,
        previous: Option<FleetSchedule>,
        vehicles: &FleetSnapshot,
        new_requests: &[Arc<Request>],
        now: f64,
    ) -> Result<FleetSchedule, DispatchError> {
        let (mut schedule, matrix) =
            match self.context.prepare(previous, vehicles, new_requests, now, true)? {
                PreparedPass::Idle(schedule) => return Ok(schedule),
                PreparedPass::Ready { schedule, matrix } => (schedule, matrix),
            };

        let calculator = InsertionCalculator::new(&matrix, self.context.params().stop_duration);
        self.search
            .recreate()
            .insert_requests(&calculator, &mut schedule, vehicles, new_requests)?;

        let outcome = timer_debug!(
            "Ruin and recreate",
            self.search
                .improve(&calculator, schedule, vehicles, now, &mut self.rng)?
        );

        self.context.finish("ruin_and_recreate", outcome.best, vehicles)
    }
}
