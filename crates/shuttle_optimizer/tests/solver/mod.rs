mod batch_solver_tests;
mod regret_insertion_tests;
mod scenario_tests;
