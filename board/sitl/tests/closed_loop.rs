//! End-to-end tests of the control stack against the simulated device.

use balancer::{BalancerConfig, Vehicle};
use sitl::{MotorState, Sim, SitlBoard};

fn vehicle_on(sim: &Sim) -> Vehicle {
    let mut vehicle = Vehicle::new(SitlBoard::new(sim.clone()), BalancerConfig::default())
        .expect("default config is valid");
    vehicle.init().expect("simulated sensor always wakes");
    vehicle
}

#[test]
fn fused_angle_converges_to_simulated_tilt() {
    let sim = Sim::new();
    sim.set_tilt(6.0);
    let mut vehicle = vehicle_on(&sim);

    vehicle.run_for(300);

    let angle = vehicle.fused_angle();
    assert!(
        (angle - 6.0).abs() < 0.5,
        "fused angle {angle} should settle near 6 degrees"
    );
}

#[test]
fn motor_polarity_follows_tilt_sign() {
    let sim = Sim::new();
    sim.set_tilt(6.0);
    let mut vehicle = vehicle_on(&sim);
    vehicle.run_for(300);

    // positive tilt -> negative correction -> forward, both wheels lockstep
    match (sim.left_motor(), sim.right_motor()) {
        (MotorState::Forward(l), MotorState::Forward(r)) => {
            assert!(l > 0.0);
            assert_eq!(l, r);
        }
        other => panic!("expected forward lockstep drive, got {other:?}"),
    }

    sim.set_tilt(-6.0);
    vehicle.run_for(300);
    match sim.left_motor() {
        MotorState::Backward(duty) => assert!(duty > 0.0),
        other => panic!("expected backward drive for negative tilt, got {other:?}"),
    }
}

#[test]
fn calibration_removes_gyro_rest_bias() {
    // the sim carries a constant gyro bias; after init the estimate must
    // not drift even though the absolute angle stays at zero
    let sim = Sim::new();
    let mut vehicle = vehicle_on(&sim);

    vehicle.run_for(500);
    assert!(
        vehicle.fused_angle().abs() < 0.3,
        "angle {} drifted despite calibration",
        vehicle.fused_angle()
    );
}

#[test]
fn injected_bus_faults_degrade_but_do_not_stop_the_loop() {
    let sim = Sim::new();
    sim.set_tilt(3.0);
    let mut vehicle = vehicle_on(&sim);
    vehicle.run_for(50);

    // three consecutive transaction faults: one read exhausts its budget
    sim.inject_bus_faults(3);
    vehicle.run_for(200);

    let diag = vehicle.diagnostics();
    assert_eq!(diag.read_failures, 3);
    assert_eq!(diag.retries_exhausted, 1);

    let angle = vehicle.fused_angle();
    assert!(
        (angle - 3.0).abs() < 0.5,
        "loop should keep tracking after a degraded tick, angle {angle}"
    );
}

#[test]
fn temperature_is_reported_from_the_device_model() {
    let sim = Sim::new();
    let mut vehicle = vehicle_on(&sim);
    let temp = vehicle.temperature();
    assert!((temp - 31.0).abs() < 0.5, "temperature {temp}");
}
