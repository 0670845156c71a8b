pub mod error;
pub mod online;
pub mod oracle;
pub mod problem;
pub mod solver;
mod utils;
