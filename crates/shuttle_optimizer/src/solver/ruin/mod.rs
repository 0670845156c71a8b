pub mod ruin_random;
pub mod ruin_selector;
