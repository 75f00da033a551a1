mod actuator;
mod board;
mod config;
mod vehicle;

pub use actuator::{ActuatorMapper, Direction, MotorCommand};
pub use board::{Board, Resources};
pub use config::BalancerConfig;
pub use vehicle::{BalancerError, Vehicle};
