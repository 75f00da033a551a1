pub mod imu;

pub use imu::mpu6050::{AccelRange, GyroRange, Mpu6050, Mpu6050Config};
pub use imu::RawTriple;
