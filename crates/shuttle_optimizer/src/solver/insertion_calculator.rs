use std::sync::Arc;

use crate::{
    error::DispatchError,
    oracle::TravelTimeOracle,
    problem::{
        request::{Request, RequestId},
        stop::{Stop, StopKind},
        timetable::{Timetable, apply_delay, is_delay_absorbable},
        vehicle::VehicleSnapshot,
    },
};

use super::insertion_candidate::InsertionCandidate;

/// A stop that can be inserted at `position`, pushing the stops after it by
/// `delay`.
struct StopInsertion {
    position: usize,
    stop: Stop,
    delay: f64,
    cost: f64,
}

enum Position {
    Feasible(StopInsertion),
    /// This position does not work but a later one might.
    Infeasible,
    /// Neither this position nor any later one can work: the stop would
    /// already be reached too late.
    Exhausted,
}

/// Finds the cheapest way to add a request to a vehicle's timetable, and
/// takes requests back out of a timetable.
///
/// Inputs are never modified: results are returned as new timetables.
pub struct InsertionCalculator<'a, O>
where
    O: TravelTimeOracle + ?Sized,
{
    oracle: &'a O,
    stop_duration: f64,
}

impl<'a, O> InsertionCalculator<'a, O>
where
    O: TravelTimeOracle + ?Sized,
{
    pub fn new(oracle: &'a O, stop_duration: f64) -> Self {
        InsertionCalculator {
            oracle,
            stop_duration,
        }
    }

    /// Tries every pickup position and every drop-off position after it.
    /// The cost is the drive time added by both detours; the first cheapest
    /// pair in enumeration order wins.
    pub fn compute_insertion(
        &self,
        vehicle: &VehicleSnapshot,
        request: &Arc<Request>,
        timetable: &Timetable,
    ) -> InsertionCandidate {
        let latest_stop_start = vehicle.latest_stop_start(self.stop_duration);
        let mut best = InsertionCandidate::infeasible(vehicle.id);

        for pickup_position in 0..=timetable.len() {
            if timetable.occupancy_at(pickup_position) >= vehicle.capacity {
                continue;
            }

            let pickup = match self.evaluate_position(
                vehicle,
                request,
                StopKind::Pickup,
                timetable,
                pickup_position,
                latest_stop_start,
            ) {
                Position::Feasible(pickup) => pickup,
                Position::Infeasible => continue,
                Position::Exhausted => break,
            };

            let pickup_cost = pickup.cost;
            let augmented = timetable.with_inserted(pickup.position, pickup.stop, pickup.delay);

            for drop_off_position in pickup_position + 1..=augmented.len() {
                if augmented.stops()[drop_off_position - 1].is_vehicle_overloaded(vehicle.capacity)
                {
                    break;
                }

                let drop_off = match self.evaluate_position(
                    vehicle,
                    request,
                    StopKind::DropOff,
                    &augmented,
                    drop_off_position,
                    latest_stop_start,
                ) {
                    Position::Feasible(drop_off) => drop_off,
                    Position::Infeasible => continue,
                    Position::Exhausted => break,
                };

                let cost = pickup_cost + drop_off.cost;
                if cost < best.cost {
                    best = InsertionCandidate {
                        vehicle_id: vehicle.id,
                        cost,
                        timetable: Some(augmented.with_inserted(
                            drop_off.position,
                            drop_off.stop,
                            drop_off.delay,
                        )),
                    };
                }
            }
        }

        best
    }

    /// Evaluates serving `request` with a stop of `kind` right before the
    /// stop currently at `position` (or at the end).
    fn evaluate_position(
        &self,
        vehicle: &VehicleSnapshot,
        request: &Arc<Request>,
        kind: StopKind,
        timetable: &Timetable,
        position: usize,
        latest_stop_start: f64,
    ) -> Position {
        let (previous_link, previous_departure) = timetable.departure_point(vehicle, position);
        let occupancy_before = timetable.occupancy_at(position);

        let (stop_link, latest_arrival) = match kind {
            StopKind::Pickup => (request.from_link, request.latest_start_time),
            StopKind::DropOff => (request.to_link, request.latest_arrival_time),
        };

        let to_stop = self
            .oracle
            .travel_time(previous_link, stop_link, previous_departure);
        let arrival_time = previous_departure + to_stop;
        if !(arrival_time <= latest_arrival && arrival_time <= latest_stop_start) {
            return Position::Exhausted;
        }

        let stop = match kind {
            StopKind::Pickup => Stop::pickup(
                Arc::clone(request),
                arrival_time,
                occupancy_before,
                self.stop_duration,
            ),
            StopKind::DropOff => Stop::drop_off(
                Arc::clone(request),
                arrival_time,
                occupancy_before,
                self.stop_duration,
            ),
        };

        let Some(next) = timetable.stops().get(position) else {
            return Position::Feasible(StopInsertion {
                position,
                stop,
                delay: 0.0,
                cost: to_stop,
            });
        };

        let to_next = self
            .oracle
            .travel_time(stop_link, next.link(), stop.departure_time());
        // The matrix is approximate, so the new route can look faster than the
        // old one. Stops are never moved earlier by an insertion.
        let delay = (stop.departure_time() + to_next - next.arrival_time()).max(0.0);
        if !is_delay_absorbable(&timetable.stops()[position..], delay, latest_stop_start) {
            return Position::Infeasible;
        }

        let direct = self
            .oracle
            .travel_time(previous_link, next.link(), previous_departure);

        Position::Feasible(StopInsertion {
            position,
            stop,
            delay,
            cost: (to_stop + to_next - direct).max(0.0),
        })
    }

    /// Removes both stops of `request_id`, moving the following stops earlier
    /// by the time saved. Only requests that have not been picked up can be
    /// removed.
    pub fn remove_request(
        &self,
        vehicle: &VehicleSnapshot,
        request_id: RequestId,
        timetable: &Timetable,
    ) -> Result<Timetable, DispatchError> {
        let not_scheduled = || DispatchError::RequestNotScheduled {
            request_id,
            vehicle_id: vehicle.id,
        };
        let pickup = timetable
            .position(request_id, StopKind::Pickup)
            .ok_or_else(not_scheduled)?;
        let drop_off = timetable
            .position(request_id, StopKind::DropOff)
            .ok_or_else(not_scheduled)?;

        if drop_off < pickup {
            return Err(DispatchError::InvariantViolation {
                vehicle_id: vehicle.id,
                reason: format!("request {request_id} is dropped off before its pickup"),
            });
        }

        let mut result = timetable.clone();

        let stops = result.stops_mut();
        stops.remove(drop_off);
        for stop in &mut stops[pickup + 1..drop_off] {
            stop.remove_pickup_before();
        }
        self.close_gap(vehicle, &mut result, drop_off);

        result.stops_mut().remove(pickup);
        self.close_gap(vehicle, &mut result, pickup);

        Ok(result)
    }

    /// Re-times the stop now at `position` from its new predecessor and moves
    /// the rest of the timetable earlier accordingly.
    fn close_gap(&self, vehicle: &VehicleSnapshot, timetable: &mut Timetable, position: usize) {
        let Some(next) = timetable.stops().get(position) else {
            return;
        };

        let (link, departure) = timetable.departure_point(vehicle, position);
        let arrival_time = departure + self.oracle.travel_time(link, next.link(), departure);
        let delay = (arrival_time - next.arrival_time()).min(0.0);

        apply_delay(&mut timetable.stops_mut()[position..], delay);
    }
}
