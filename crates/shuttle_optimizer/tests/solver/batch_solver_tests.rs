use std::sync::Arc;

use shuttle_optimizer::{
    oracle::TravelTimeOracle,
    problem::{fleet_schedule::FleetSchedule, vehicle::VehicleId},
    solver::{
        batch_solver::{BatchSolver, OfflineSolver, PreparedPass, SolverContext},
        solver_params::{SolverAcceptorStrategy, SolverParams, SolverStrategy},
    },
};

use crate::setup;

#[test]
fn test_params_from_partial_json() -> anyhow::Result<()> {
    let params: SolverParams =
        serde_json::from_str(r#"{ "solver": "regret", "max_iterations": 5, "acceptor": "greedy" }"#)?;

    assert_eq!(params.solver, SolverStrategy::Regret);
    assert_eq!(params.max_iterations, 5);
    assert_eq!(params.acceptor, SolverAcceptorStrategy::Greedy);
    assert_eq!(params.stop_duration, 60.0);
    assert_eq!(params.regret_k, 3);
    assert_eq!(params.seed, 1234);

    let params: SolverParams = serde_json::from_str("{}")?;
    assert_eq!(params, SolverParams::default());

    Ok(())
}

#[test]
fn test_consecutive_passes() -> anyhow::Result<()> {
    let mut solver = BatchSolver::from_params(
        setup::create_line_network(20),
        setup::free_speed(),
        SolverParams {
            max_iterations: 10,
            ..SolverParams::default()
        },
    );

    let mut vehicles = setup::create_fleet(&[(0, 0, 3), (1, 12, 3)]);
    let first = vec![
        setup::create_request(0, 2, 6, 0.0, 900.0),
        setup::create_request(1, 13, 16, 0.0, 900.0),
    ];
    let schedule = solver.calculate(None, &vehicles, &first, 0.0)?;

    assert_eq!(schedule.vehicle_of(first[0].id), Some(VehicleId::new(0)));
    assert_eq!(schedule.vehicle_of(first[1].id), Some(VehicleId::new(1)));

    // Vehicle 0 has moved on and vehicle 2 enters service.
    if let Some(vehicle) = vehicles.get_mut(&VehicleId::new(0)) {
        vehicle.current_link = setup::forward_link(1);
        vehicle.divertable_time = 10.0;
    }
    vehicles.insert(VehicleId::new(2), setup::create_vehicle(2, 8, 3));

    let second = vec![setup::create_request(2, 9, 11, 20.0, 900.0)];
    let schedule = solver.calculate(Some(schedule), &vehicles, &second, 20.0)?;

    assert_eq!(schedule.timetables().len(), 3);
    assert_eq!(schedule.assignments().len(), 3);
    assert!(schedule.rejected().is_empty());
    assert_eq!(schedule.check_invariants(&vehicles), Ok(()));

    // Re-timed from where the vehicle can next be diverted.
    let timetable = schedule.timetable(VehicleId::new(0)).unwrap();
    assert_eq!(timetable.stops()[0].arrival_time(), 10.0 + 11.0);

    Ok(())
}

#[test]
fn test_vehicle_leaving_service_rejects_its_requests() -> anyhow::Result<()> {
    let mut solver = BatchSolver::from_params(
        setup::create_line_network(20),
        setup::free_speed(),
        SolverParams {
            solver: SolverStrategy::Sequential,
            ..SolverParams::default()
        },
    );

    let mut vehicles = setup::create_fleet(&[(0, 0, 3), (1, 15, 3)]);
    let request = setup::create_request(0, 1, 4, 0.0, 900.0);
    let schedule = solver.calculate(None, &vehicles, &[Arc::clone(&request)], 0.0)?;
    assert_eq!(schedule.vehicle_of(request.id), Some(VehicleId::new(0)));

    vehicles.remove(&VehicleId::new(0));
    let other = setup::create_request(1, 16, 17, 0.0, 900.0);
    let schedule = solver.calculate(Some(schedule), &vehicles, &[other], 0.0)?;

    assert!(schedule.timetable(VehicleId::new(0)).is_none());
    assert!(schedule.is_rejected(request.id));
    assert_eq!(schedule.vehicle_of(request.id), None);

    Ok(())
}

#[test]
fn test_rejected_requests_are_retried_until_they_expire() -> anyhow::Result<()> {
    let pass = |now: f64| -> anyhow::Result<_> {
        let mut solver = BatchSolver::from_params(
            setup::create_line_network(20),
            setup::free_speed(),
            SolverParams {
                ruin_proportion: 0.5,
                max_iterations: 10,
                ..SolverParams::default()
            },
        );

        let mut vehicles = setup::create_fleet(&[(0, 0, 3)]);
        let request = setup::create_request(0, 1, 4, 0.0, 900.0);
        let schedule = solver.calculate(None, &vehicles, &[Arc::clone(&request)], 0.0)?;

        // Vehicle 0 leaves with the request, vehicle 1 takes over.
        vehicles.remove(&VehicleId::new(0));
        vehicles.insert(VehicleId::new(1), setup::create_vehicle(1, 15, 3));
        let others = [
            setup::create_request(1, 16, 17, now, now + 900.0),
            setup::create_request(2, 17, 18, now, now + 900.0),
        ];
        let schedule = solver.calculate(Some(schedule), &vehicles, &others, now)?;

        assert_eq!(schedule.vehicle_of(others[0].id), Some(VehicleId::new(1)));
        assert_eq!(schedule.vehicle_of(others[1].id), Some(VehicleId::new(1)));
        assert_eq!(schedule.check_invariants(&vehicles), Ok(()));
        setup::assert_on_time(&schedule, &vehicles);

        Ok((schedule.vehicle_of(request.id), schedule.is_rejected(request.id)))
    };

    // Still within its pickup window at 100s.
    assert_eq!(pass(100.0)?, (Some(VehicleId::new(1)), false));
    // Its pickup window closed at 900s.
    assert_eq!(pass(1000.0)?, (None, true));

    Ok(())
}

#[test]
fn test_pass_matrix_covers_only_retried_requests() -> anyhow::Result<()> {
    let context = SolverContext::new(
        setup::create_line_network(20),
        setup::free_speed(),
        SolverParams::default(),
    );
    let vehicles = setup::create_fleet(&[(0, 0, 3)]);
    let rejected = setup::create_request(0, 9, 10, 0.0, 900.0);
    let new_requests = [setup::create_request(1, 1, 2, 0.0, 900.0)];

    let reach_rejected = |now: f64, retry_rejected: bool| -> anyhow::Result<f64> {
        let mut previous = FleetSchedule::new(&vehicles);
        previous.reject(Arc::clone(&rejected));

        match context.prepare(Some(previous), &vehicles, &new_requests, now, retry_rejected)? {
            PreparedPass::Ready { schedule, matrix } => {
                assert!(schedule.is_rejected(rejected.id));
                Ok(matrix.travel_time(setup::forward_link(0), rejected.from_link, now))
            }
            PreparedPass::Idle(_) => anyhow::bail!("expected a pass to run"),
        }
    };

    assert_eq!(reach_rejected(0.0, true)?, 91.0);
    assert_eq!(reach_rejected(0.0, false)?, f64::INFINITY);
    // Its pickup window closed at 900s.
    assert_eq!(reach_rejected(1000.0, true)?, f64::INFINITY);

    Ok(())
}
