use estimator::{Kalman1D, TiltAngles};
use hal::{BusError, ImuDiagnostics};
use log::{debug, info};
use pid::{PIDError, PID};
use thiserror::Error;

use crate::actuator::ActuatorMapper;
use crate::board::{Board, Resources};
use crate::config::BalancerConfig;

#[derive(Error, Debug)]
pub enum BalancerError {
    /// The inertial sensor did not respond during startup; no meaningful
    /// operation is possible without it.
    #[error("sensor initialization failed: {0}")]
    Init(#[from] BusError),

    #[error("invalid controller configuration: {0}")]
    Config(#[from] PIDError),
}

/// The balance vehicle's control loop.
///
/// One fixed-shape iteration: read sensors, estimate tilt, fuse, compute
/// the PID correction, dispatch motor commands. The loop measures its own
/// period from the monotonic clock; true periodicity is whatever each
/// iteration actually costs (soft real-time).
pub struct Vehicle {
    resources: Resources,

    kalman: Kalman1D,
    pid: PID,
    mapper: ActuatorMapper,

    desired_angle: f32,
    last_tick_ms: u32,
    last_output: f32,
}

impl Vehicle {
    pub fn new(board: impl Board, config: BalancerConfig) -> Result<Self, BalancerError> {
        info!("building vehicle for board '{}'", board.name());
        let resources = board.split_resources();
        Ok(Vehicle {
            resources,
            kalman: Kalman1D::default(),
            pid: PID::with_gains(config.kp, config.ki, config.kd)?,
            mapper: ActuatorMapper::new(config.output_window),
            desired_angle: config.desired_angle,
            last_tick_ms: 0,
            last_output: 0.0,
        })
    }

    /// Bring the sensor up and measure gyro rest offsets.
    ///
    /// Blocks for the entire calibration window; the vehicle must be
    /// stationary. Must complete before the first `tick`.
    pub fn init(&mut self) -> Result<(), BalancerError> {
        self.resources.imu.init()?;
        info!("sensor awake, calibrating gyro (vehicle must be stationary)");
        self.resources.imu.calibrate_gyro();
        self.last_tick_ms = self.resources.clock.now_ms();
        info!("calibration done, entering control loop");
        Ok(())
    }

    /// Run one control iteration.
    ///
    /// A degraded sensor read (NaN angle or rate) carries no new
    /// information: filter and controller state stay untouched and no motor
    /// command is issued; the loop simply continues at the next period.
    pub fn tick(&mut self) {
        let now = self.resources.clock.now_ms();
        let dt = now.wrapping_sub(self.last_tick_ms) as f32 / 1000.0;
        self.last_tick_ms = now;

        let accel = self.resources.imu.read_accel();
        let rate = self.resources.imu.read_gyro().y;

        // The balance axis is the sensor's y axis as mounted on this
        // vehicle: the roll-like tilt fused with the y gyro rate.
        let angle = TiltAngles::from_accel(&accel).in_degrees().roll;

        if angle.is_nan() || rate.is_nan() {
            debug!("degraded sensor read, holding state this tick");
            return;
        }

        let fused = self.kalman.update(rate, angle, dt);
        let output = self.pid.compute(self.desired_angle, fused, dt);

        let (left, right) = self.mapper.map(output);
        left.dispatch(self.resources.left_motor.as_mut());
        right.dispatch(self.resources.right_motor.as_mut());

        self.last_output = output;
    }

    /// Run the control loop until the process is taken down
    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
        }
    }

    /// Run a bounded number of iterations (simulation and tests)
    pub fn run_for(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Current fused tilt angle, degrees
    pub fn fused_angle(&self) -> f32 {
        self.kalman.angle()
    }

    /// Controller output from the most recent completed tick
    pub fn last_output(&self) -> f32 {
        self.last_output
    }

    /// Sensor failure counters
    pub fn diagnostics(&self) -> ImuDiagnostics {
        self.resources.imu.diagnostics()
    }

    /// Sensor die temperature, Celsius; NaN when unavailable
    pub fn temperature(&mut self) -> f32 {
        self.resources.imu.read_temperature()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::{Clock, ImuSensor, MotorDriver, Vector3d};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct StubImu {
        accel: Vector3d,
        gyro: Vector3d,
    }

    impl ImuSensor for StubImu {
        fn init(&mut self) -> Result<(), BusError> {
            Ok(())
        }
        fn read_accel(&mut self) -> Vector3d {
            self.accel
        }
        fn read_gyro(&mut self) -> Vector3d {
            self.gyro
        }
        fn read_temperature(&mut self) -> f32 {
            25.0
        }
        fn calibrate_gyro(&mut self) {}
        fn diagnostics(&self) -> ImuDiagnostics {
            ImuDiagnostics::default()
        }
    }

    #[derive(Clone, Default)]
    struct SpyMotor {
        log: Rc<RefCell<Vec<(&'static str, f32)>>>,
    }

    impl MotorDriver for SpyMotor {
        fn forward(&mut self, fraction: f32) {
            self.log.borrow_mut().push(("forward", fraction));
        }
        fn backward(&mut self, fraction: f32) {
            self.log.borrow_mut().push(("backward", fraction));
        }
        fn stop(&mut self) {
            self.log.borrow_mut().push(("stop", 0.0));
        }
    }

    #[derive(Clone)]
    struct TestClock {
        now: Rc<Cell<u32>>,
    }

    impl Clock for TestClock {
        fn now_ms(&self) -> u32 {
            // each observation advances time by one nominal period
            let t = self.now.get();
            self.now.set(t + 20);
            t
        }
    }

    struct TestBoard {
        imu: StubImu,
        motor: SpyMotor,
        clock: TestClock,
    }

    impl Board for TestBoard {
        fn name(&self) -> &str {
            "test"
        }
        fn split_resources(self) -> Resources {
            Resources {
                imu: Box::new(self.imu),
                left_motor: Box::new(self.motor.clone()),
                right_motor: Box::new(self.motor),
                clock: Box::new(self.clock),
            }
        }
    }

    fn board(accel: Vector3d, gyro: Vector3d) -> (TestBoard, Rc<RefCell<Vec<(&'static str, f32)>>>) {
        let motor = SpyMotor::default();
        let log = motor.log.clone();
        (
            TestBoard {
                imu: StubImu { accel, gyro },
                motor,
                clock: TestClock {
                    now: Rc::new(Cell::new(0)),
                },
            },
            log,
        )
    }

    #[test]
    fn upright_stationary_vehicle_issues_zero_duty() {
        let (board, log) = board(Vector3d::new(0.0, 0.0, 1.0), Vector3d::zeros());
        let mut vehicle = Vehicle::new(board, BalancerConfig::default()).unwrap();
        vehicle.init().unwrap();
        vehicle.tick();

        let log = log.borrow();
        // both motors commanded, zero error maps to zero duty backward
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], ("backward", 0.0));
        assert_eq!(log[1], ("backward", 0.0));
    }

    #[test]
    fn positive_tilt_drives_motors_forward() {
        // gravity leaning toward -x gives a positive roll-like angle
        let a = 20.0_f32.to_radians();
        let (board, log) = board(Vector3d::new(-a.sin(), 0.0, a.cos()), Vector3d::zeros());
        let mut vehicle = Vehicle::new(board, BalancerConfig::default()).unwrap();
        vehicle.init().unwrap();
        vehicle.run_for(50);

        assert!(vehicle.fused_angle() > 5.0);
        // positive angle, setpoint 0 -> negative error -> negative output -> forward
        let (direction, duty) = *log.borrow().last().unwrap();
        assert_eq!(direction, "forward");
        assert!(duty > 0.0);
        assert!(vehicle.last_output() < 0.0);
    }

    #[test]
    fn degraded_read_holds_state_and_motors() {
        let (board, log) = board(
            Vector3d::new(f32::NAN, f32::NAN, f32::NAN),
            Vector3d::new(f32::NAN, f32::NAN, f32::NAN),
        );
        let mut vehicle = Vehicle::new(board, BalancerConfig::default()).unwrap();
        vehicle.init().unwrap();
        let angle_before = vehicle.fused_angle();
        vehicle.run_for(10);

        assert!(log.borrow().is_empty(), "no motor commands on NaN ticks");
        assert_eq!(vehicle.fused_angle(), angle_before);
    }

    #[test]
    fn non_finite_gains_fail_construction() {
        let (board, _) = board(Vector3d::zeros(), Vector3d::zeros());
        let config = BalancerConfig {
            kp: f32::NAN,
            ..Default::default()
        };
        assert!(Vehicle::new(board, config).is_err());
    }
}
