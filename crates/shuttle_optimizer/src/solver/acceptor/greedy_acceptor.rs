use rand::RngCore;

use super::accept_solution::{AcceptSolution, AcceptSolutionContext};

/// Only accepts strict improvements.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyAcceptor;

impl AcceptSolution for GreedyAcceptor {
    fn accept<R>(&self, current_score: f64, new_score: f64, _: AcceptSolutionContext<R>) -> bool
    where
        R: RngCore,
    {
        new_score < current_score
    }
}
