use std::sync::Arc;

use shuttle_routing::{network::Network, travel_time::LinkTravelTime};
use tracing::{debug, info};

use crate::{
    error::DispatchError,
    oracle::{exact_oracle::ExactTravelTimeOracle, link_to_link_matrix::LinkToLinkTravelTimeMatrix},
    problem::{
        fleet_schedule::FleetSchedule,
        request::Request,
        vehicle::{FleetSnapshot, VehicleId},
    },
    solver::insertion_calculator::InsertionCalculator,
};

use super::OnlineSolver;

/// Cheapest insertion over the fleet, searched on an approximate matrix built
/// for the request. The chosen timetable is then re-timed with exact routes;
/// if that makes a stop late, the next cheapest vehicle is tried.
pub struct BasicInsertionStrategy {
    network: Arc<Network>,
    travel_time: Arc<dyn LinkTravelTime>,
    exact: ExactTravelTimeOracle,
    stop_duration: f64,
}

impl BasicInsertionStrategy {
    pub fn new(
        network: Arc<Network>,
        travel_time: Arc<dyn LinkTravelTime>,
        stop_duration: f64,
    ) -> Self {
        let exact = ExactTravelTimeOracle::new(Arc::clone(&network), Arc::clone(&travel_time));
        BasicInsertionStrategy {
            network,
            travel_time,
            exact,
            stop_duration,
        }
    }
}

impl OnlineSolver for BasicInsertionStrategy {
    fn insert(
        &self,
        request: &Arc<Request>,
        schedule: &mut FleetSchedule,
        vehicles: &FleetSnapshot,
        now: f64,
    ) -> Result<Option<VehicleId>, DispatchError> {
        schedule.sync_fleet(vehicles);

        let matrix = LinkToLinkTravelTimeMatrix::for_pass(
            Arc::clone(&self.network),
            Arc::clone(&self.travel_time),
            schedule,
            vehicles,
            [request],
            now,
        )?;
        let calculator = InsertionCalculator::new(&matrix, self.stop_duration);

        let mut candidates = Vec::with_capacity(schedule.timetables().len());
        for (&vehicle_id, timetable) in schedule.timetables() {
            let vehicle = vehicles
                .get(&vehicle_id)
                .ok_or(DispatchError::UnknownVehicle(vehicle_id))?;
            let candidate = calculator.compute_insertion(vehicle, request, timetable);
            if candidate.is_feasible() {
                candidates.push(candidate);
            }
        }
        // Stable, so equal costs keep the vehicle order.
        candidates.sort_by(|a, b| a.cost.total_cmp(&b.cost));

        for candidate in candidates {
            let Some((vehicle_id, mut timetable)) = candidate.into_assignment() else {
                continue;
            };
            let vehicle = vehicles
                .get(&vehicle_id)
                .ok_or(DispatchError::UnknownVehicle(vehicle_id))?;

            timetable.recompute_times(vehicle.current_link, vehicle.divertable_time, &self.exact);
            if !timetable.is_on_time(vehicle.latest_stop_start(self.stop_duration)) {
                debug!(
                    request_id = %request.id,
                    %vehicle_id,
                    "Insertion misses a time window with exact routes"
                );
                continue;
            }

            info!(request_id = %request.id, %vehicle_id, stops = timetable.len(), "Inserted request");
            schedule.commit(request, vehicle_id, timetable);
            return Ok(Some(vehicle_id));
        }

        info!(request_id = %request.id, "No vehicle can serve the request, rejecting");
        schedule.reject(Arc::clone(request));
        Ok(None)
    }
}
