use crate::problem::fleet_schedule::FleetSchedule;

/// Scores a schedule for the ruin-and-recreate search. Lower is better.
pub trait SolutionCostCalculator {
    fn cost(&self, schedule: &FleetSchedule, now: f64) -> f64;
}

/// Time until every vehicle finishes its timetable, summed over the fleet,
/// plus a fixed penalty per rejected request.
#[derive(Debug, Clone, Copy)]
pub struct DefaultSolutionCostCalculator {
    rejection_penalty: f64,
}

impl DefaultSolutionCostCalculator {
    pub fn new(rejection_penalty: f64) -> Self {
        DefaultSolutionCostCalculator { rejection_penalty }
    }
}

impl SolutionCostCalculator for DefaultSolutionCostCalculator {
    fn cost(&self, schedule: &FleetSchedule, now: f64) -> f64 {
        let drive: f64 = schedule
            .timetables()
            .values()
            .filter_map(|timetable| timetable.last())
            .map(|last| last.arrival_time() - now)
            .sum();

        drive + self.rejection_penalty * schedule.rejected().len() as f64
    }
}
