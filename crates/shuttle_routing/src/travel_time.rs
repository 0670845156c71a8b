use crate::network::Link;

/// Time needed to traverse a link when entering it at `time`.
pub trait LinkTravelTime: Send + Sync {
    fn link_travel_time(&self, link: &Link, time: f64) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FreeSpeedTravelTime;

impl LinkTravelTime for FreeSpeedTravelTime {
    fn link_travel_time(&self, link: &Link, _time: f64) -> f64 {
        link.freespeed_travel_time()
    }
}

/// Congestion profile: free-speed travel time scaled by a factor that depends
/// on the time bin the link is entered in. Times outside the profile use the
/// last factor.
#[derive(Debug, Clone)]
pub struct TimeBinnedTravelTime {
    bin_size: f64,
    factors: Vec<f64>,
}

impl TimeBinnedTravelTime {
    pub fn new(bin_size: f64, factors: Vec<f64>) -> Self {
        Self { bin_size, factors }
    }

    fn factor(&self, time: f64) -> f64 {
        if self.factors.is_empty() || self.bin_size <= 0.0 || time < 0.0 {
            return self.factors.first().copied().unwrap_or(1.0);
        }

        let bin = (time / self.bin_size) as usize;
        self.factors
            .get(bin)
            .or(self.factors.last())
            .copied()
            .unwrap_or(1.0)
    }
}

impl LinkTravelTime for TimeBinnedTravelTime {
    fn link_travel_time(&self, link: &Link, time: f64) -> f64 {
        link.freespeed_travel_time() * self.factor(time)
    }
}
