use std::sync::Arc;

use serde::Serialize;
use shuttle_routing::network::LinkIdx;

use super::request::{Request, RequestId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StopKind {
    Pickup,
    DropOff,
}

/// One pickup or drop-off in a vehicle's timetable.
#[derive(Debug, Clone, Serialize)]
pub struct Stop {
    kind: StopKind,
    request: Arc<Request>,
    arrival_time: f64,
    departure_time: f64,
    occupancy_before: usize,
    stop_duration: f64,
}

impl Stop {
    pub fn pickup(
        request: Arc<Request>,
        arrival_time: f64,
        occupancy_before: usize,
        stop_duration: f64,
    ) -> Self {
        Self::new(
            StopKind::Pickup,
            request,
            arrival_time,
            occupancy_before,
            stop_duration,
        )
    }

    pub fn drop_off(
        request: Arc<Request>,
        arrival_time: f64,
        occupancy_before: usize,
        stop_duration: f64,
    ) -> Self {
        Self::new(
            StopKind::DropOff,
            request,
            arrival_time,
            occupancy_before,
            stop_duration,
        )
    }

    fn new(
        kind: StopKind,
        request: Arc<Request>,
        arrival_time: f64,
        occupancy_before: usize,
        stop_duration: f64,
    ) -> Self {
        let departure_time =
            Self::compute_departure_time(kind, &request, arrival_time, stop_duration);
        Stop {
            kind,
            request,
            arrival_time,
            departure_time,
            occupancy_before,
            stop_duration,
        }
    }

    /// A vehicle arriving early at a pickup waits for the passenger.
    fn compute_departure_time(
        kind: StopKind,
        request: &Request,
        arrival_time: f64,
        stop_duration: f64,
    ) -> f64 {
        match kind {
            StopKind::Pickup => arrival_time.max(request.earliest_start_time) + stop_duration,
            StopKind::DropOff => arrival_time + stop_duration,
        }
    }

    pub fn kind(&self) -> StopKind {
        self.kind
    }

    pub fn is_pickup(&self) -> bool {
        self.kind == StopKind::Pickup
    }

    pub fn request(&self) -> &Arc<Request> {
        &self.request
    }

    pub fn request_id(&self) -> RequestId {
        self.request.id
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn departure_time(&self) -> f64 {
        self.departure_time
    }

    pub fn stop_duration(&self) -> f64 {
        self.stop_duration
    }

    pub fn occupancy_before(&self) -> usize {
        self.occupancy_before
    }

    pub fn occupancy_after(&self) -> usize {
        match self.kind {
            StopKind::Pickup => self.occupancy_before + 1,
            StopKind::DropOff => self.occupancy_before.saturating_sub(1),
        }
    }

    pub fn link(&self) -> LinkIdx {
        match self.kind {
            StopKind::Pickup => self.request.from_link,
            StopKind::DropOff => self.request.to_link,
        }
    }

    /// Latest arrival allowed by the request's time window.
    pub fn latest_arrival_time(&self) -> f64 {
        match self.kind {
            StopKind::Pickup => self.request.latest_start_time,
            StopKind::DropOff => self.request.latest_arrival_time,
        }
    }

    pub fn slack(&self) -> f64 {
        self.latest_arrival_time() - self.arrival_time
    }

    pub fn is_time_constraint_violated(&self, delay: f64) -> bool {
        self.arrival_time + delay > self.latest_arrival_time()
    }

    pub fn is_vehicle_full_before(&self, capacity: usize) -> bool {
        self.occupancy_before >= capacity
    }

    pub fn is_vehicle_overloaded(&self, capacity: usize) -> bool {
        self.occupancy_after() > capacity
    }

    /// How much the departure moves when the arrival moves by `delay`.
    /// Waiting time at a pickup absorbs part of it.
    pub fn effective_delay(&self, delay: f64) -> f64 {
        Self::compute_departure_time(
            self.kind,
            &self.request,
            self.arrival_time + delay,
            self.stop_duration,
        ) - self.departure_time
    }

    pub fn delay_by(&mut self, delay: f64) {
        self.update_arrival_time(self.arrival_time + delay);
    }

    pub fn update_arrival_time(&mut self, arrival_time: f64) {
        self.arrival_time = arrival_time;
        self.departure_time = Self::compute_departure_time(
            self.kind,
            &self.request,
            arrival_time,
            self.stop_duration,
        );
    }

    pub fn add_pickup_before(&mut self) {
        self.occupancy_before += 1;
    }

    pub fn add_drop_off_before(&mut self) {
        self.occupancy_before = self.occupancy_before.saturating_sub(1);
    }

    pub fn remove_pickup_before(&mut self) {
        self.occupancy_before = self.occupancy_before.saturating_sub(1);
    }
}
