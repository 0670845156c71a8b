use serde::{Deserialize, Serialize};

/// Tuning of the batch solvers. Every field has a default, so hosts can load
/// partial JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    pub solver: SolverStrategy,

    /// Dwell time at every pickup and drop-off, in seconds.
    pub stop_duration: f64,

    /// Number of alternatives compared by the regret heuristic.
    pub regret_k: usize,

    pub ruin_proportion: f64,
    pub max_ruin_removal: usize,

    pub max_iterations: usize,
    pub seed: u64,

    pub acceptor: SolverAcceptorStrategy,
    pub initial_temperature: f64,

    /// Score added per rejected request.
    pub rejection_penalty: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStrategy {
    Sequential,
    Regret,
    RuinAndRecreate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverAcceptorStrategy {
    Greedy,
    Schrimpf,
    SimulatedAnnealing,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            solver: SolverStrategy::RuinAndRecreate,
            stop_duration: 60.0,
            regret_k: 3,
            ruin_proportion: 0.1,
            max_ruin_removal: 1000,
            max_iterations: 100,
            seed: 1234,
            acceptor: SolverAcceptorStrategy::SimulatedAnnealing,
            initial_temperature: 300.0,
            rejection_penalty: 1e6,
        }
    }
}
