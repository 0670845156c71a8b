use rand::RngCore;

use crate::solver::solver_params::{SolverAcceptorStrategy, SolverParams};

use super::{
    accept_solution::{AcceptSolution, AcceptSolutionContext},
    greedy_acceptor::GreedyAcceptor,
    schrimpf_acceptor::SchrimpfAcceptor,
    simulated_annealing_acceptor::SimulatedAnnealingAcceptor,
};

#[derive(Debug, Clone, Copy)]
pub enum SolutionAcceptor {
    Greedy(GreedyAcceptor),
    Schrimpf(SchrimpfAcceptor),
    SimulatedAnnealing(SimulatedAnnealingAcceptor),
}

impl SolutionAcceptor {
    pub fn from_params(params: &SolverParams) -> Self {
        match params.acceptor {
            SolverAcceptorStrategy::Greedy => SolutionAcceptor::Greedy(GreedyAcceptor),
            SolverAcceptorStrategy::Schrimpf => SolutionAcceptor::Schrimpf(SchrimpfAcceptor::new(
                params.initial_temperature,
                SchrimpfAcceptor::DEFAULT_ALPHA,
            )),
            SolverAcceptorStrategy::SimulatedAnnealing => SolutionAcceptor::SimulatedAnnealing(
                SimulatedAnnealingAcceptor::new(params.initial_temperature),
            ),
        }
    }
}

impl AcceptSolution for SolutionAcceptor {
    fn accept<R>(&self, current_score: f64, new_score: f64, context: AcceptSolutionContext<R>) -> bool
    where
        R: RngCore,
    {
        match self {
            SolutionAcceptor::Greedy(acceptor) => {
                acceptor.accept(current_score, new_score, context)
            }
            SolutionAcceptor::Schrimpf(acceptor) => {
                acceptor.accept(current_score, new_score, context)
            }
            SolutionAcceptor::SimulatedAnnealing(acceptor) => {
                acceptor.accept(current_score, new_score, context)
            }
        }
    }
}
