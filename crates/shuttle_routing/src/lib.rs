pub mod dijkstra;
pub mod error;
pub mod link_router;
pub mod network;
pub mod node_matrix;
pub mod travel_time;
mod utils;

pub use utils::enumerate_idx::EnumerateIdx;
