use std::sync::Arc;

use fxhash::FxHashSet;
use shuttle_routing::{
    link_router::{FIRST_LINK_TT, last_link_travel_time},
    network::{LinkIdx, Network},
    node_matrix::NodeToNodeMatrix,
    travel_time::LinkTravelTime,
};
use tracing::debug;

use crate::{
    error::DispatchError,
    problem::{fleet_schedule::FleetSchedule, request::Request, vehicle::FleetSnapshot},
    timer_debug,
};

use super::TravelTimeOracle;

/// Approximate link to link travel times over the links relevant to one
/// solver pass.
///
/// Node to node times are computed once for a single reference time, then
/// composed as `FIRST_LINK_TT + node time + time on the destination link`. The
/// departure time only affects the destination link.
pub struct LinkToLinkTravelTimeMatrix {
    network: Arc<Network>,
    travel_time: Arc<dyn LinkTravelTime>,
    node_matrix: NodeToNodeMatrix,
}

impl LinkToLinkTravelTimeMatrix {
    pub fn new(
        network: Arc<Network>,
        travel_time: Arc<dyn LinkTravelTime>,
        relevant_links: impl IntoIterator<Item = LinkIdx>,
        time: f64,
    ) -> Result<Self, DispatchError> {
        let mut nodes = FxHashSet::default();
        for link in relevant_links {
            let link = network.try_link(link)?;
            nodes.insert(link.from_node());
            nodes.insert(link.to_node());
        }

        let node_matrix = timer_debug!(
            "Link to link travel time matrix",
            NodeToNodeMatrix::compute(&network, travel_time.as_ref(), nodes, time)
        );

        Ok(LinkToLinkTravelTimeMatrix {
            network,
            travel_time,
            node_matrix,
        })
    }

    /// Builds the matrix over the live vehicle positions, the stops already
    /// scheduled and the endpoints of `requests`.
    pub fn for_pass<'r>(
        network: Arc<Network>,
        travel_time: Arc<dyn LinkTravelTime>,
        schedule: &FleetSchedule,
        vehicles: &FleetSnapshot,
        requests: impl IntoIterator<Item = &'r Arc<Request>>,
        time: f64,
    ) -> Result<Self, DispatchError> {
        let links = relevant_links(schedule, vehicles, requests);
        debug!(links = links.len(), time, "Preparing travel time matrix");
        Self::new(network, travel_time, links, time)
    }
}

/// Links a pass can route between. Rejected requests are only covered when
/// they are part of `requests`.
pub fn relevant_links<'r>(
    schedule: &FleetSchedule,
    vehicles: &FleetSnapshot,
    requests: impl IntoIterator<Item = &'r Arc<Request>>,
) -> FxHashSet<LinkIdx> {
    let mut links = FxHashSet::default();
    links.extend(vehicles.values().map(|vehicle| vehicle.current_link));
    for timetable in schedule.timetables().values() {
        links.extend(timetable.links());
    }
    for request in requests {
        links.insert(request.from_link);
        links.insert(request.to_link);
    }
    links
}

impl TravelTimeOracle for LinkToLinkTravelTimeMatrix {
    fn travel_time(&self, from: LinkIdx, to: LinkIdx, departure_time: f64) -> f64 {
        if from == to {
            return 0.0;
        }

        let (Ok(from_link), Ok(to_link)) = (self.network.try_link(from), self.network.try_link(to))
        else {
            debug!(%from, %to, "Unknown link");
            return f64::INFINITY;
        };

        let Some(node_time) = self
            .node_matrix
            .travel_time(from_link.to_node(), to_link.from_node())
        else {
            debug!(%from, %to, "Link pair outside of the travel time matrix");
            return f64::INFINITY;
        };

        if !node_time.is_finite() {
            return f64::INFINITY;
        }

        FIRST_LINK_TT
            + node_time
            + last_link_travel_time(self.travel_time.as_ref(), to_link, departure_time + node_time)
    }
}
