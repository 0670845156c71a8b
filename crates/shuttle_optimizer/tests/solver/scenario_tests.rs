use std::sync::Arc;

use shuttle_optimizer::{
    problem::{
        fleet_schedule::FleetSchedule,
        request::{Request, RequestId},
        stop::{Stop, StopKind},
        timetable::Timetable,
        vehicle::VehicleId,
    },
    solver::{
        batch_solver::{BatchSolver, OfflineSolver},
        solver_params::{SolverParams, SolverStrategy},
    },
};

use crate::setup;

const STRATEGIES: [SolverStrategy; 3] = [
    SolverStrategy::Sequential,
    SolverStrategy::Regret,
    SolverStrategy::RuinAndRecreate,
];

fn create_solver(strategy: SolverStrategy) -> BatchSolver {
    BatchSolver::from_params(
        setup::create_line_network(20),
        setup::free_speed(),
        SolverParams {
            solver: strategy,
            max_iterations: 20,
            ..SolverParams::default()
        },
    )
}

#[test]
fn test_single_request_is_assigned() {
    for strategy in STRATEGIES {
        let vehicles = setup::create_fleet(&[(0, 0, 4)]);
        let request = setup::create_request(0, 1, 8, 0.0, 900.0);

        let schedule = create_solver(strategy)
            .calculate(None, &vehicles, &[Arc::clone(&request)], 0.0)
            .unwrap();

        assert_eq!(schedule.vehicle_of(request.id), Some(VehicleId::new(0)));
        assert!(schedule.rejected().is_empty());
        setup::assert_on_time(&schedule, &vehicles);

        let timetable = schedule.timetable(VehicleId::new(0)).unwrap();
        let stops: Vec<_> = timetable
            .iter()
            .map(|stop| (stop.kind(), stop.arrival_time()))
            .collect();
        // 11s to the pickup, 60s there, 71s to the drop-off.
        assert_eq!(
            stops,
            vec![(StopKind::Pickup, 11.0), (StopKind::DropOff, 142.0)]
        );
    }
}

#[test]
fn test_full_vehicle_rejects_request() {
    for strategy in STRATEGIES {
        let vehicles = setup::create_fleet(&[(0, 0, 1)]);
        let onboard = setup::create_request(0, 0, 10, 0.0, 900.0);

        let mut previous = FleetSchedule::new(&vehicles);
        previous.commit(
            &onboard,
            VehicleId::new(0),
            Timetable::new(vec![Stop::drop_off(
                Arc::clone(&onboard),
                101.0,
                1,
                setup::STOP_DURATION,
            )]),
        );

        // The vehicle is only free again after 161s, too late for this one.
        let request = setup::create_request(1, 1, 2, 0.0, 100.0);
        let schedule = create_solver(strategy)
            .calculate(Some(previous), &vehicles, &[Arc::clone(&request)], 0.0)
            .unwrap();

        assert!(schedule.is_rejected(request.id), "{strategy:?}");
        assert_eq!(schedule.vehicle_of(onboard.id), Some(VehicleId::new(0)));
        assert_eq!(schedule.timetable(VehicleId::new(0)).unwrap().len(), 1);
        setup::assert_on_time(&schedule, &vehicles);
    }
}

#[test]
fn test_unreachable_pickup_is_rejected() {
    for strategy in STRATEGIES {
        let vehicles = setup::create_fleet(&[(0, 0, 4), (1, 1, 4)]);
        let request = Arc::new(Request::new(
            RequestId::new(0),
            setup::forward_link(9),
            setup::forward_link(10),
            0.0,
            30.0,
            600.0,
        ));

        let schedule = create_solver(strategy)
            .calculate(None, &vehicles, &[Arc::clone(&request)], 0.0)
            .unwrap();

        assert!(schedule.is_rejected(request.id), "{strategy:?}");
        assert!(schedule.assignments().is_empty());
        assert_eq!(schedule.num_stops(), 0);
    }
}

#[test]
fn test_tie_goes_to_first_vehicle() {
    let vehicles = setup::create_fleet(&[(3, 2, 4), (5, 2, 4)]);
    let request = setup::create_request(0, 4, 6, 0.0, 900.0);

    let sequential = create_solver(SolverStrategy::Sequential)
        .calculate(None, &vehicles, &[Arc::clone(&request)], 0.0)
        .unwrap();
    let regret = create_solver(SolverStrategy::Regret)
        .calculate(None, &vehicles, &[Arc::clone(&request)], 0.0)
        .unwrap();

    assert_eq!(sequential.vehicle_of(request.id), Some(VehicleId::new(3)));
    assert_eq!(regret.vehicle_of(request.id), Some(VehicleId::new(3)));
    assert_eq!(
        times(sequential.timetable(VehicleId::new(3)).unwrap()),
        times(regret.timetable(VehicleId::new(3)).unwrap())
    );
}

#[test]
fn test_two_requests_on_two_vehicles_at_equal_cost() {
    let vehicles = setup::create_fleet(&[(0, 0, 4), (1, 10, 4)]);
    // Each request costs 32s on the vehicle next to it.
    let requests = [
        setup::create_request(0, 1, 3, 0.0, 900.0),
        setup::create_request(1, 11, 13, 0.0, 900.0),
    ];

    let sequential = create_solver(SolverStrategy::Sequential)
        .calculate(None, &vehicles, &requests, 0.0)
        .unwrap();
    let regret = create_solver(SolverStrategy::Regret)
        .calculate(None, &vehicles, &requests, 0.0)
        .unwrap();

    for schedule in [&sequential, &regret] {
        assert_eq!(schedule.vehicle_of(requests[0].id), Some(VehicleId::new(0)));
        assert_eq!(schedule.vehicle_of(requests[1].id), Some(VehicleId::new(1)));
        assert!(schedule.rejected().is_empty());
        setup::assert_on_time(schedule, &vehicles);
    }
    for vehicle_id in vehicles.keys() {
        assert_eq!(
            times(sequential.timetable(*vehicle_id).unwrap()),
            times(regret.timetable(*vehicle_id).unwrap())
        );
    }
    assert_eq!(
        times(sequential.timetable(VehicleId::new(1)).unwrap()),
        vec![(11.0, 71.0), (92.0, 152.0)]
    );
}

#[test]
fn test_tight_windows_are_respected() {
    for strategy in STRATEGIES {
        let vehicles = setup::create_fleet(&[(0, 0, 2), (1, 12, 2)]);
        let requests: Vec<_> = (0..8)
            .map(|id| {
                let from = (id * 5) % 18;
                let earliest = (id * 20) as f64;
                setup::create_request(id, from, from + 1, earliest, earliest + 120.0)
            })
            .collect();

        let schedule = create_solver(strategy)
            .calculate(None, &vehicles, &requests, 0.0)
            .unwrap();

        assert_eq!(
            schedule.assignments().len() + schedule.rejected().len(),
            requests.len(),
            "{strategy:?}"
        );
        assert_eq!(schedule.check_invariants(&vehicles), Ok(()));
        setup::assert_on_time(&schedule, &vehicles);
    }
}

#[test]
fn test_no_new_requests_keeps_schedule() {
    let vehicles = setup::create_fleet(&[(0, 0, 4)]);
    let request = setup::create_request(0, 1, 8, 0.0, 900.0);

    let mut solver = create_solver(SolverStrategy::Regret);
    let schedule = solver
        .calculate(None, &vehicles, &[Arc::clone(&request)], 0.0)
        .unwrap();
    let before = times(schedule.timetable(VehicleId::new(0)).unwrap());

    let schedule = solver.calculate(Some(schedule), &vehicles, &[], 5.0).unwrap();

    assert_eq!(schedule.vehicle_of(request.id), Some(VehicleId::new(0)));
    assert_eq!(times(schedule.timetable(VehicleId::new(0)).unwrap()), before);
}

fn times(timetable: &Timetable) -> Vec<(f64, f64)> {
    timetable
        .iter()
        .map(|stop| (stop.arrival_time(), stop.departure_time()))
        .collect()
}
