pub mod acceptor;
pub mod batch_solver;
pub mod insertion_calculator;
pub mod insertion_candidate;
pub mod regret_insertion;
pub mod ruin;
pub mod ruin_and_recreate;
pub mod sequential_insertion;
pub mod solution_cost;
pub mod solver_params;
