use balancer::{Board, Resources};
use driver::{Mpu6050, Mpu6050Config};

use crate::sim::Sim;

/// Board wiring the vehicle to the simulated device
pub struct SitlBoard {
    sim: Sim,
    imu_config: Mpu6050Config,
}

impl SitlBoard {
    pub fn new(sim: Sim) -> Self {
        SitlBoard {
            sim,
            imu_config: Mpu6050Config::default(),
        }
    }

    pub fn with_imu_config(sim: Sim, imu_config: Mpu6050Config) -> Self {
        SitlBoard { sim, imu_config }
    }
}

impl Board for SitlBoard {
    fn name(&self) -> &str {
        "sitl"
    }

    fn split_resources(self) -> Resources {
        let imu = Mpu6050::new(self.sim.bus(), self.sim.delay(), self.imu_config);
        Resources {
            imu: Box::new(imu),
            left_motor: Box::new(self.sim.left_motor_handle()),
            right_motor: Box::new(self.sim.right_motor_handle()),
            clock: Box::new(self.sim.clock()),
        }
    }
}
