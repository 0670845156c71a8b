use std::{collections::BTreeMap, sync::Arc};

use fxhash::FxHashMap;
use serde::Serialize;
use tracing::warn;

use crate::{error::DispatchError, oracle::TravelTimeOracle};

use super::{
    request::{Request, RequestId},
    timetable::Timetable,
    vehicle::{FleetSnapshot, VehicleId},
};

/// Timetables of the whole fleet, which vehicle serves which request, and the
/// requests no vehicle could take.
///
/// `Clone` is a deep copy: solvers clone a schedule before trying changes on
/// it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FleetSchedule {
    timetables: BTreeMap<VehicleId, Timetable>,
    assignments: FxHashMap<RequestId, VehicleId>,
    rejected: BTreeMap<RequestId, Arc<Request>>,
}

impl FleetSchedule {
    /// An empty timetable for every live vehicle.
    pub fn new(vehicles: &FleetSnapshot) -> Self {
        FleetSchedule {
            timetables: vehicles
                .keys()
                .map(|&vehicle_id| (vehicle_id, Timetable::default()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn timetables(&self) -> &BTreeMap<VehicleId, Timetable> {
        &self.timetables
    }

    pub fn timetable(&self, vehicle_id: VehicleId) -> Option<&Timetable> {
        self.timetables.get(&vehicle_id)
    }

    pub fn assignments(&self) -> &FxHashMap<RequestId, VehicleId> {
        &self.assignments
    }

    pub fn vehicle_of(&self, request_id: RequestId) -> Option<VehicleId> {
        self.assignments.get(&request_id).copied()
    }

    pub fn rejected(&self) -> &BTreeMap<RequestId, Arc<Request>> {
        &self.rejected
    }

    pub fn is_rejected(&self, request_id: RequestId) -> bool {
        self.rejected.contains_key(&request_id)
    }

    pub fn num_stops(&self) -> usize {
        self.timetables.values().map(Timetable::len).sum()
    }

    /// Adds an empty timetable for vehicles entering service and drops the
    /// ones of vehicles no longer in `vehicles`. Requests such a vehicle had
    /// not picked up yet are rejected so a later pass can place them again.
    pub fn sync_fleet(&mut self, vehicles: &FleetSnapshot) {
        for &vehicle_id in vehicles.keys() {
            self.timetables.entry(vehicle_id).or_default();
        }

        let ended: Vec<VehicleId> = self
            .timetables
            .keys()
            .filter(|vehicle_id| !vehicles.contains_key(vehicle_id))
            .copied()
            .collect();

        for vehicle_id in ended {
            let Some(timetable) = self.timetables.remove(&vehicle_id) else {
                continue;
            };

            let mut onboard = 0;
            for stop in timetable.iter() {
                self.assignments.remove(&stop.request_id());
                if stop.is_pickup() {
                    self.rejected
                        .insert(stop.request_id(), Arc::clone(stop.request()));
                } else if !timetable.contains_pickup(stop.request_id()) {
                    onboard += 1;
                }
            }

            if !timetable.is_empty() {
                warn!(
                    %vehicle_id,
                    stops = timetable.len(),
                    onboard,
                    "Vehicle left service with a non-empty timetable"
                );
            }
        }
    }

    /// Recomputes every timetable from its vehicle's live position, since the
    /// times planned in an earlier call drift as the vehicles move.
    pub fn resync_times<O>(
        &mut self,
        vehicles: &FleetSnapshot,
        oracle: &O,
    ) -> Result<(), DispatchError>
    where
        O: TravelTimeOracle + ?Sized,
    {
        for (&vehicle_id, timetable) in self.timetables.iter_mut() {
            if timetable.is_empty() {
                continue;
            }

            let vehicle = vehicles
                .get(&vehicle_id)
                .ok_or(DispatchError::UnknownVehicle(vehicle_id))?;
            timetable.recompute_times(vehicle.current_link, vehicle.divertable_time, oracle);
        }

        Ok(())
    }

    /// Assigns `request` to `vehicle_id`, whose timetable becomes `timetable`.
    pub fn commit(&mut self, request: &Request, vehicle_id: VehicleId, timetable: Timetable) {
        self.rejected.remove(&request.id);
        self.assignments.insert(request.id, vehicle_id);
        self.timetables.insert(vehicle_id, timetable);
    }

    pub fn reject(&mut self, request: Arc<Request>) {
        self.assignments.remove(&request.id);
        self.rejected.insert(request.id, request);
    }

    /// Records that `request_id` was taken off `vehicle_id`, whose timetable
    /// becomes `timetable`. The request is neither assigned nor rejected
    /// afterwards.
    pub fn unassign(&mut self, request_id: RequestId, vehicle_id: VehicleId, timetable: Timetable) {
        self.assignments.remove(&request_id);
        self.timetables.insert(vehicle_id, timetable);
    }

    /// Rejected requests that can still be picked up at `now`, in id order.
    pub fn retryable_rejected(&self, now: f64) -> impl Iterator<Item = &Arc<Request>> {
        self.rejected
            .values()
            .filter(move |request| !request.is_expired(now))
    }

    /// Takes the rejected requests that can still be picked up at `now` out
    /// of the rejected set, in id order. Expired requests stay rejected.
    pub fn take_rejected(&mut self, now: f64) -> Vec<Arc<Request>> {
        let (retryable, expired): (Vec<_>, Vec<_>) = std::mem::take(&mut self.rejected)
            .into_values()
            .partition(|request| !request.is_expired(now));

        self.rejected = expired
            .into_iter()
            .map(|request| (request.id, request))
            .collect();
        retryable
    }

    /// Requests scheduled but not picked up yet, by vehicle then by position.
    pub fn open_requests(&self) -> Vec<Arc<Request>> {
        self.timetables
            .values()
            .flat_map(Timetable::open_requests)
            .cloned()
            .collect()
    }

    pub fn check_invariants(&self, vehicles: &FleetSnapshot) -> Result<(), DispatchError> {
        for (&vehicle_id, timetable) in &self.timetables {
            let vehicle = vehicles
                .get(&vehicle_id)
                .ok_or(DispatchError::UnknownVehicle(vehicle_id))?;
            timetable.check_invariants(vehicle)?;

            for stop in timetable {
                if self.vehicle_of(stop.request_id()) != Some(vehicle_id) {
                    return Err(DispatchError::InvariantViolation {
                        vehicle_id,
                        reason: format!(
                            "request {} is not assigned to this vehicle",
                            stop.request_id()
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}
