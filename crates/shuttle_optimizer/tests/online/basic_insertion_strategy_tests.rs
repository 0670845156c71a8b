use std::sync::Arc;

use shuttle_optimizer::{
    online::{OnlineSolver, basic_insertion_strategy::BasicInsertionStrategy},
    problem::{
        fleet_schedule::FleetSchedule,
        request::{Request, RequestId},
        vehicle::VehicleId,
    },
    solver::{
        batch_solver::{BatchSolver, OfflineSolver},
        solver_params::{SolverParams, SolverStrategy},
    },
};
use shuttle_routing::travel_time::TimeBinnedTravelTime;

use crate::setup;

#[test]
fn test_online_after_batch() -> anyhow::Result<()> {
    let network = setup::create_line_network(20);
    let vehicles = setup::create_fleet(&[(0, 0, 2), (1, 10, 2)]);

    let mut batch = BatchSolver::from_params(
        Arc::clone(&network),
        setup::free_speed(),
        SolverParams {
            solver: SolverStrategy::Regret,
            ..SolverParams::default()
        },
    );
    let mut schedule = batch.calculate(
        None,
        &vehicles,
        &[setup::create_request(0, 1, 5, 0.0, 900.0)],
        0.0,
    )?;

    let strategy = BasicInsertionStrategy::new(network, setup::free_speed(), setup::STOP_DURATION);
    let request = setup::create_request(1, 11, 14, 0.0, 900.0);
    let vehicle_id = strategy.insert(&request, &mut schedule, &vehicles, 0.0)?;

    assert_eq!(vehicle_id, Some(VehicleId::new(1)));
    assert_eq!(schedule.vehicle_of(request.id), Some(VehicleId::new(1)));
    assert_eq!(schedule.timetable(VehicleId::new(0)).unwrap().len(), 2);
    assert_eq!(schedule.check_invariants(&vehicles), Ok(()));

    Ok(())
}

#[test]
fn test_online_uses_exact_times() -> anyhow::Result<()> {
    let network = setup::create_line_network(20);
    let vehicles = setup::create_fleet(&[(0, 0, 2)]);

    // Links are twice as slow from 60s on. The matrix only knows the
    // congestion of the last link, the exact router sees all of it.
    let travel_time = Arc::new(TimeBinnedTravelTime::new(60.0, vec![1.0, 2.0]));
    let strategy = BasicInsertionStrategy::new(network, travel_time, setup::STOP_DURATION);

    let mut schedule = FleetSchedule::new(&vehicles);
    let request = setup::create_request(0, 1, 4, 0.0, 900.0);
    strategy.insert(&request, &mut schedule, &vehicles, 0.0)?;

    let timetable = schedule.timetable(VehicleId::new(0)).unwrap();
    assert_eq!(timetable.stops()[0].arrival_time(), 11.0);
    // Leaves at 71s: 1s to exit, two links at 20s, then 20s on the last link.
    assert_eq!(timetable.stops()[1].arrival_time(), 71.0 + 1.0 + 40.0 + 20.0);

    Ok(())
}

#[test]
fn test_online_rejects_when_exact_times_miss_the_window() -> anyhow::Result<()> {
    let network = setup::create_line_network(20);
    let vehicles = setup::create_fleet(&[(0, 0, 2)]);

    // The matrix expects the drop-off at 112s, congestion makes it 132s.
    let travel_time = Arc::new(TimeBinnedTravelTime::new(60.0, vec![1.0, 2.0]));
    let strategy = BasicInsertionStrategy::new(network, travel_time, setup::STOP_DURATION);

    let mut schedule = FleetSchedule::new(&vehicles);
    let request = Arc::new(Request::new(
        RequestId::new(0),
        setup::forward_link(1),
        setup::forward_link(4),
        0.0,
        900.0,
        115.0,
    ));

    assert_eq!(strategy.insert(&request, &mut schedule, &vehicles, 0.0)?, None);
    assert!(schedule.is_rejected(request.id));
    assert_eq!(schedule.num_stops(), 0);

    Ok(())
}

#[test]
fn test_online_falls_back_to_next_cheapest_vehicle() -> anyhow::Result<()> {
    let network = setup::create_line_network(20);
    // Vehicle 0 already stands on the pickup link but is only free at 100s.
    let mut vehicles = setup::create_fleet(&[(0, 1, 2), (1, 0, 2)]);
    if let Some(vehicle) = vehicles.get_mut(&VehicleId::new(0)) {
        vehicle.divertable_time = 100.0;
    }

    // Links are twice as slow from 120s on.
    let travel_time = Arc::new(TimeBinnedTravelTime::new(60.0, vec![1.0, 1.0, 2.0]));
    let strategy = BasicInsertionStrategy::new(network, travel_time, setup::STOP_DURATION);

    let mut schedule = FleetSchedule::new(&vehicles);
    let request = Arc::new(Request::new(
        RequestId::new(0),
        setup::forward_link(1),
        setup::forward_link(4),
        0.0,
        900.0,
        210.0,
    ));

    // The matrix ranks vehicle 0 first (41s against 42s) and expects its
    // drop-off at 201s. Exact routes put it at 221s.
    let vehicle_id = strategy.insert(&request, &mut schedule, &vehicles, 0.0)?;

    assert_eq!(vehicle_id, Some(VehicleId::new(1)));
    assert!(schedule.timetable(VehicleId::new(0)).unwrap().is_empty());
    let timetable = schedule.timetable(VehicleId::new(1)).unwrap();
    assert_eq!(timetable.stops()[0].arrival_time(), 11.0);
    assert_eq!(timetable.stops()[1].arrival_time(), 102.0);
    assert!(timetable.is_on_time(setup::SERVICE_END_TIME - setup::STOP_DURATION));
    assert_eq!(schedule.check_invariants(&vehicles), Ok(()));

    Ok(())
}
