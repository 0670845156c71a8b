use std::sync::Arc;

use fxhash::FxHashMap;
use serde::Serialize;
use shuttle_routing::network::LinkIdx;
use smallvec::SmallVec;

use crate::{error::DispatchError, oracle::TravelTimeOracle};

use super::{
    request::{Request, RequestId},
    stop::{Stop, StopKind},
    vehicle::VehicleSnapshot,
};

const TIME_TOLERANCE: f64 = 1e-6;

/// Walks a stop sequence carrying a delay, yielding each stop with the delay
/// reaching it. Stops once the delay has been fully absorbed, since the stops
/// after that point keep their times.
pub struct DelayChain<'a> {
    stops: &'a [Stop],
    position: usize,
    delay: f64,
}

impl Iterator for DelayChain<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.delay == 0.0 {
            return None;
        }

        let stop = self.stops.get(self.position)?;
        let item = (self.position, self.delay);
        self.delay = stop.effective_delay(self.delay);
        self.position += 1;

        Some(item)
    }
}

pub fn delay_chain(stops: &[Stop], delay: f64) -> DelayChain<'_> {
    DelayChain {
        stops,
        position: 0,
        delay,
    }
}

/// Shifts `stops` by `delay`, letting each stop absorb what it can.
pub fn apply_delay(stops: &mut [Stop], delay: f64) {
    let shifts: SmallVec<[(usize, f64); 16]> = delay_chain(stops, delay).collect();
    for (position, delay) in shifts {
        stops[position].delay_by(delay);
    }
}

/// Whether every stop in `stops` can take `delay` (after absorption) without
/// missing its time window or starting after `latest_stop_start`.
pub fn is_delay_absorbable(stops: &[Stop], delay: f64, latest_stop_start: f64) -> bool {
    delay_chain(stops, delay).all(|(position, delay)| {
        let stop = &stops[position];
        !stop.is_time_constraint_violated(delay)
            && stop.arrival_time() + delay <= latest_stop_start
    })
}

/// Ordered stops of one vehicle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Timetable {
    stops: Vec<Stop>,
}

impl Timetable {
    pub fn new(stops: Vec<Stop>) -> Self {
        Timetable { stops }
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn last(&self) -> Option<&Stop> {
        self.stops.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stop> {
        self.stops.iter()
    }

    pub fn position(&self, request_id: RequestId, kind: StopKind) -> Option<usize> {
        self.stops
            .iter()
            .position(|stop| stop.request_id() == request_id && stop.kind() == kind)
    }

    /// Passengers on board when reaching `position`. Past the end this is the
    /// occupancy after the last stop.
    pub fn occupancy_at(&self, position: usize) -> usize {
        match self.stops.get(position) {
            Some(stop) => stop.occupancy_before(),
            None => self.stops.last().map_or(0, Stop::occupancy_after),
        }
    }

    pub fn contains_pickup(&self, request_id: RequestId) -> bool {
        self.position(request_id, StopKind::Pickup).is_some()
    }

    /// Requests that have not been picked up yet.
    pub fn open_requests(&self) -> impl Iterator<Item = &Arc<Request>> {
        self.stops
            .iter()
            .filter(|stop| stop.is_pickup())
            .map(Stop::request)
    }

    pub fn links(&self) -> impl Iterator<Item = LinkIdx> + '_ {
        self.stops.iter().map(Stop::link)
    }

    /// Location and time the vehicle leaves from to reach the stop at
    /// `position`: the previous stop, or the vehicle itself for the first one.
    pub fn departure_point(&self, vehicle: &VehicleSnapshot, position: usize) -> (LinkIdx, f64) {
        match position.checked_sub(1).and_then(|index| self.stops.get(index)) {
            Some(previous) => (previous.link(), previous.departure_time()),
            None => (vehicle.current_link, vehicle.divertable_time),
        }
    }

    /// Copy of this timetable with `stop` inserted at `position`. The stops
    /// after it see one more (pickup) or one less (drop-off) passenger and are
    /// shifted by `delay`.
    pub(crate) fn with_inserted(&self, position: usize, stop: Stop, delay: f64) -> Timetable {
        let kind = stop.kind();
        let mut stops = Vec::with_capacity(self.stops.len() + 1);
        stops.extend_from_slice(&self.stops[..position]);
        stops.push(stop);
        stops.extend_from_slice(&self.stops[position..]);

        let following = &mut stops[position + 1..];
        for stop in following.iter_mut() {
            match kind {
                StopKind::Pickup => stop.add_pickup_before(),
                StopKind::DropOff => stop.add_drop_off_before(),
            }
        }
        apply_delay(following, delay);

        Timetable { stops }
    }

    pub(crate) fn stops_mut(&mut self) -> &mut Vec<Stop> {
        &mut self.stops
    }

    /// Recomputes every arrival by driving the sequence from `start_link` at
    /// `start_time`.
    pub fn recompute_times<O>(&mut self, start_link: LinkIdx, start_time: f64, oracle: &O)
    where
        O: TravelTimeOracle + ?Sized,
    {
        let mut link = start_link;
        let mut time = start_time;
        for stop in self.stops.iter_mut() {
            let arrival_time = time + oracle.travel_time(link, stop.link(), time);
            stop.update_arrival_time(arrival_time);
            link = stop.link();
            time = stop.departure_time();
        }
    }

    /// Whether every stop is reached within its request's window and no later
    /// than `latest_stop_start`.
    pub fn is_on_time(&self, latest_stop_start: f64) -> bool {
        self.stops.iter().all(|stop| {
            stop.slack() >= 0.0 && stop.arrival_time() <= latest_stop_start
        })
    }

    /// Checks request pairing, occupancy bookkeeping and time ordering.
    pub fn check_invariants(&self, vehicle: &VehicleSnapshot) -> Result<(), DispatchError> {
        let violation = |reason: String| DispatchError::InvariantViolation {
            vehicle_id: vehicle.id,
            reason,
        };

        let mut seen: FxHashMap<RequestId, (Option<usize>, Option<usize>)> =
            FxHashMap::default();
        for (position, stop) in self.stops.iter().enumerate() {
            let entry = seen.entry(stop.request_id()).or_default();
            let slot = match stop.kind() {
                StopKind::Pickup => &mut entry.0,
                StopKind::DropOff => &mut entry.1,
            };
            if slot.replace(position).is_some() {
                return Err(violation(format!(
                    "request {} has two {:?} stops",
                    stop.request_id(),
                    stop.kind()
                )));
            }
        }

        for (request_id, positions) in seen {
            match positions {
                (Some(_), None) => {
                    return Err(violation(format!(
                        "request {request_id} is picked up but never dropped off"
                    )));
                }
                (Some(pickup), Some(drop_off)) if pickup > drop_off => {
                    return Err(violation(format!(
                        "request {request_id} is dropped off before its pickup"
                    )));
                }
                _ => {}
            }
        }

        for (position, stop) in self.stops.iter().enumerate() {
            if stop.kind() == StopKind::DropOff && stop.occupancy_before() == 0 {
                return Err(violation(format!(
                    "drop-off at position {position} on an empty vehicle"
                )));
            }

            if stop.occupancy_after() > vehicle.capacity {
                return Err(violation(format!(
                    "occupancy {} after position {position} exceeds capacity {}",
                    stop.occupancy_after(),
                    vehicle.capacity
                )));
            }

            if stop.departure_time() + TIME_TOLERANCE < stop.arrival_time() {
                return Err(violation(format!(
                    "stop at position {position} departs before it arrives"
                )));
            }

            if let Some(next) = self.stops.get(position + 1) {
                if next.occupancy_before() != stop.occupancy_after() {
                    return Err(violation(format!(
                        "occupancy jumps from {} to {} at position {}",
                        stop.occupancy_after(),
                        next.occupancy_before(),
                        position + 1
                    )));
                }

                if next.arrival_time() + TIME_TOLERANCE < stop.departure_time() {
                    return Err(violation(format!(
                        "stop at position {} arrives before the previous one departs",
                        position + 1
                    )));
                }
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a Timetable {
    type Item = &'a Stop;
    type IntoIter = std::slice::Iter<'a, Stop>;

    fn into_iter(self) -> Self::IntoIter {
        self.stops.iter()
    }
}
