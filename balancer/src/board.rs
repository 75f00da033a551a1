use hal::{Clock, ImuSensor, MotorDriver};

/// A board wires concrete hardware (or a simulation of it) into the
/// resources the vehicle needs.
pub trait Board
where
    Self: Sized,
{
    fn name(&self) -> &str;

    fn split_resources(self) -> Resources;
}

/// Hardware handles consumed by the vehicle; owned exclusively by the
/// single control-loop thread.
pub struct Resources {
    pub imu: Box<dyn ImuSensor>,
    pub left_motor: Box<dyn MotorDriver>,
    pub right_motor: Box<dyn MotorDriver>,
    pub clock: Box<dyn Clock>,
}
