use serde::{Deserialize, Serialize};
use shuttle_routing::{define_index_newtype, network::LinkIdx};

define_index_newtype!(RequestId);

/// A passenger trip request. Immutable once created and shared between the
/// pickup and drop-off stops serving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub from_link: LinkIdx,
    pub to_link: LinkIdx,
    pub earliest_start_time: f64,
    pub latest_start_time: f64,
    pub latest_arrival_time: f64,
}

impl Request {
    pub fn new(
        id: RequestId,
        from_link: LinkIdx,
        to_link: LinkIdx,
        earliest_start_time: f64,
        latest_start_time: f64,
        latest_arrival_time: f64,
    ) -> Self {
        Request {
            id,
            from_link,
            to_link,
            earliest_start_time,
            latest_start_time,
            latest_arrival_time,
        }
    }

    /// Whether the pickup window has closed at `now`.
    pub fn is_expired(&self, now: f64) -> bool {
        self.latest_start_time < now
    }
}
