use hal::MotorDriver;

/// Drive direction for a motor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Stop,
}

/// One motor's drive for the current tick; derived fresh each iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorCommand {
    pub direction: Direction,
    /// Normalized drive strength, always in [0, 1]
    pub duty_fraction: f32,
}

impl MotorCommand {
    pub fn stop() -> Self {
        MotorCommand {
            direction: Direction::Stop,
            duty_fraction: 0.0,
        }
    }

    /// Apply this command through a motor driver
    pub fn dispatch(&self, motor: &mut dyn MotorDriver) {
        match self.direction {
            Direction::Forward => motor.forward(self.duty_fraction),
            Direction::Backward => motor.backward(self.duty_fraction),
            Direction::Stop => motor.stop(),
        }
    }
}

/// Maps a signed controller output onto lockstep motor commands.
///
/// The magnitude is clamped into a fixed operating window and normalized to
/// a [0, 1] duty fraction used identically by both wheels; this vehicle
/// drives them in lockstep, not differentially.
///
/// The polarity convention (negative output drives forward) was fixed by
/// controller tuning, not by vehicle kinematics. Treat it as a calibration
/// constant.
#[derive(Debug, Clone, Copy)]
pub struct ActuatorMapper {
    window: f32,
}

impl Default for ActuatorMapper {
    fn default() -> Self {
        ActuatorMapper { window: 300.0 }
    }
}

impl ActuatorMapper {
    /// Mapper saturating at `window` controller-output units
    pub fn new(window: f32) -> Self {
        ActuatorMapper { window }
    }

    /// Convert a controller output into commands for the left and right
    /// motors. Saturates at the window boundary.
    pub fn map(&self, pid_output: f32) -> (MotorCommand, MotorCommand) {
        let duty_fraction = (pid_output.abs().min(self.window)) / self.window;

        let direction = if pid_output < 0.0 {
            Direction::Forward
        } else {
            Direction::Backward
        };

        let command = MotorCommand {
            direction,
            duty_fraction,
        };
        (command, command)
    }
}
