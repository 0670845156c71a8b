use shuttle_routing::network::LinkIdx;

pub mod exact_oracle;
pub mod link_to_link_matrix;

/// Travel time between two links for a departure time. Identical links cost
/// nothing and unreachable pairs cost `f64::INFINITY`.
pub trait TravelTimeOracle: Sync {
    fn travel_time(&self, from: LinkIdx, to: LinkIdx, departure_time: f64) -> f64;
}
