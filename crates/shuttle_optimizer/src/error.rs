use shuttle_routing::error::RoutingError;
use thiserror::Error;

use crate::problem::{request::RequestId, vehicle::VehicleId};

/// Failures that abort a dispatch call. An infeasible request is not an
/// error: it ends up in the rejected set of the schedule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("invalid timetable for vehicle {vehicle_id}: {reason}")]
    InvariantViolation { vehicle_id: VehicleId, reason: String },

    #[error("no live snapshot for vehicle {0}")]
    UnknownVehicle(VehicleId),

    #[error("request {0} is not assigned to any vehicle")]
    UnassignedRequest(RequestId),

    #[error("request {request_id} is not scheduled on vehicle {vehicle_id}")]
    RequestNotScheduled {
        request_id: RequestId,
        vehicle_id: VehicleId,
    },

    #[error(transparent)]
    Routing(#[from] RoutingError),
}
