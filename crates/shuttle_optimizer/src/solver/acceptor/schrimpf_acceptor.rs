use rand::RngCore;

use super::accept_solution::{AcceptSolution, AcceptSolutionContext};

/// Threshold accepting: a solution is accepted when it is worse than the
/// current one by less than a threshold that decays exponentially over the
/// run.
#[derive(Debug, Clone, Copy)]
pub struct SchrimpfAcceptor {
    initial_threshold: f64,
    alpha: f64,
}

impl SchrimpfAcceptor {
    pub const DEFAULT_ALPHA: f64 = 0.3;

    pub fn new(initial_threshold: f64, alpha: f64) -> Self {
        SchrimpfAcceptor {
            initial_threshold,
            alpha,
        }
    }

    pub fn threshold(&self, iteration: usize, max_iterations: usize) -> f64 {
        if max_iterations == 0 {
            return 0.0;
        }

        let progress = iteration as f64 / max_iterations as f64;
        self.initial_threshold * (-std::f64::consts::LN_2 * progress / self.alpha).exp()
    }
}

impl AcceptSolution for SchrimpfAcceptor {
    fn accept<R>(&self, current_score: f64, new_score: f64, context: AcceptSolutionContext<R>) -> bool
    where
        R: RngCore,
    {
        new_score < current_score + self.threshold(context.iteration, context.max_iterations)
    }
}
