use rand::{Rng, RngCore};

use super::accept_solution::{AcceptSolution, AcceptSolutionContext};

/// Accepts improvements, and worse solutions with probability `exp(-delta / T)`
/// where the temperature `T` decreases linearly to zero over the run.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedAnnealingAcceptor {
    initial_temperature: f64,
}

impl SimulatedAnnealingAcceptor {
    pub fn new(initial_temperature: f64) -> Self {
        SimulatedAnnealingAcceptor {
            initial_temperature,
        }
    }

    pub fn temperature(&self, iteration: usize, max_iterations: usize) -> f64 {
        if max_iterations == 0 {
            return 0.0;
        }

        let progress = iteration as f64 / max_iterations as f64;
        self.initial_temperature * (1.0 - progress)
    }
}

impl AcceptSolution for SimulatedAnnealingAcceptor {
    fn accept<R>(&self, current_score: f64, new_score: f64, context: AcceptSolutionContext<R>) -> bool
    where
        R: RngCore,
    {
        if new_score < current_score {
            return true;
        }

        let temperature = self.temperature(context.iteration, context.max_iterations);
        if temperature <= 0.0 {
            return false;
        }

        let probability = (-(new_score - current_score) / temperature).exp();
        context.rng.random::<f64>() < probability
    }
}
