use std::sync::Arc;

use shuttle_optimizer::{
    problem::{fleet_schedule::FleetSchedule, vehicle::VehicleId},
    solver::{
        insertion_calculator::InsertionCalculator, regret_insertion::RegretInsertion,
        sequential_insertion::perform_sequential_insertion,
    },
};

use crate::setup;

#[test]
fn test_regret_serves_constrained_request_first() {
    let network = setup::create_line_network(20);
    let matrix = setup::create_full_matrix(&network);
    let calculator = InsertionCalculator::new(&matrix, setup::STOP_DURATION);
    let vehicles = setup::create_fleet(&[(0, 0, 4), (1, 10, 4)]);

    // Both vehicles can serve the first request, the first vehicle a bit
    // cheaper. Only the first vehicle can reach the second one in time, and
    // it cannot serve both.
    let flexible = setup::create_request(0, 5, 6, 0.0, 100.0);
    let constrained = setup::create_request(1, 1, 2, 0.0, 20.0);
    let requests = vec![Arc::clone(&flexible), Arc::clone(&constrained)];

    let mut sequential = FleetSchedule::new(&vehicles);
    perform_sequential_insertion(&calculator, &mut sequential, &vehicles, &requests).unwrap();

    assert_eq!(sequential.vehicle_of(flexible.id), Some(VehicleId::new(0)));
    assert!(sequential.is_rejected(constrained.id));

    let mut regret = FleetSchedule::new(&vehicles);
    RegretInsertion::new(3)
        .insert_requests(&calculator, &mut regret, &vehicles, &requests)
        .unwrap();

    assert_eq!(regret.vehicle_of(constrained.id), Some(VehicleId::new(0)));
    assert_eq!(regret.vehicle_of(flexible.id), Some(VehicleId::new(1)));
    assert!(regret.rejected().is_empty());
    assert_eq!(regret.check_invariants(&vehicles), Ok(()));
}

#[test]
fn test_regret_with_single_vehicle_keeps_input_order() {
    let network = setup::create_line_network(20);
    let matrix = setup::create_full_matrix(&network);
    let calculator = InsertionCalculator::new(&matrix, setup::STOP_DURATION);
    let vehicles = setup::create_fleet(&[(0, 0, 1)]);

    let requests = vec![
        setup::create_request(0, 1, 3, 0.0, 900.0),
        setup::create_request(1, 5, 7, 0.0, 900.0),
    ];

    let mut sequential = FleetSchedule::new(&vehicles);
    perform_sequential_insertion(&calculator, &mut sequential, &vehicles, &requests).unwrap();

    let mut regret = FleetSchedule::new(&vehicles);
    RegretInsertion::new(3)
        .insert_requests(&calculator, &mut regret, &vehicles, &requests)
        .unwrap();

    let order = |schedule: &FleetSchedule| -> Vec<usize> {
        schedule
            .timetable(VehicleId::new(0))
            .unwrap()
            .iter()
            .map(|stop| stop.request_id().get())
            .collect()
    };
    assert_eq!(order(&regret), vec![0, 0, 1, 1]);
    assert_eq!(order(&regret), order(&sequential));
}

#[test]
fn test_regret_without_requests_is_a_no_op() {
    let network = setup::create_line_network(4);
    let matrix = setup::create_full_matrix(&network);
    let calculator = InsertionCalculator::new(&matrix, setup::STOP_DURATION);
    let vehicles = setup::create_fleet(&[(0, 0, 4)]);

    let mut schedule = FleetSchedule::new(&vehicles);
    RegretInsertion::default()
        .insert_requests(&calculator, &mut schedule, &vehicles, &[])
        .unwrap();

    assert_eq!(schedule.num_stops(), 0);
    assert!(schedule.rejected().is_empty());
}
