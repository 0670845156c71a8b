use std::sync::Arc;

use rand::{RngCore, seq::SliceRandom};

use crate::problem::{fleet_schedule::FleetSchedule, request::Request};

use super::ruin_selector::RuinSelector;

/// Removes a random share of the open requests.
#[derive(Debug, Clone, Copy)]
pub struct RandomRuinSelector {
    proportion: f64,
    max_removal: usize,
}

impl RandomRuinSelector {
    pub fn new(proportion: f64, max_removal: usize) -> Self {
        RandomRuinSelector {
            proportion,
            max_removal,
        }
    }

    /// `floor(open * proportion) + 1`, capped by `max_removal` and `open`.
    pub fn num_requests_to_remove(&self, open: usize) -> usize {
        let count = (open as f64 * self.proportion).floor() as usize + 1;
        count.min(self.max_removal).min(open)
    }
}

impl Default for RandomRuinSelector {
    fn default() -> Self {
        RandomRuinSelector::new(0.1, 1000)
    }
}

impl RuinSelector for RandomRuinSelector {
    fn select_requests<R>(&self, schedule: &FleetSchedule, rng: &mut R) -> Vec<Arc<Request>>
    where
        R: RngCore,
    {
        let mut open = schedule.open_requests();
        let count = self.num_requests_to_remove(open.len());

        open.shuffle(rng);
        open.truncate(count);
        open
    }
}
