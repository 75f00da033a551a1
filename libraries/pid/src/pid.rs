// PID controller over variable time steps
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PIDError {
    #[error("Invalid gain configuration: {0}")]
    InvalidGain(String),
}

/// PID controller for one axis.
///
/// Gains are fixed at construction. The integral term deliberately carries
/// no clamp: adding anti-windup would change the closed-loop behavior this
/// controller was tuned with.
pub struct PID {
    kp: f32,
    ki: f32,
    kd: f32,

    last_error: f32,
    integral: f32,
}

impl PID {
    /// Create a new PID controller with the specified gains.
    ///
    /// # Arguments
    ///
    /// * `kp` - Proportional gain
    /// * `ki` - Integral gain
    /// * `kd` - Derivative gain
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            last_error: 0.0,
            integral: 0.0,
        }
    }

    /// Create a new PID controller, rejecting non-finite gains.
    pub fn with_gains(kp: f32, ki: f32, kd: f32) -> Result<Self, PIDError> {
        for (name, value) in [("kp", kp), ("ki", ki), ("kd", kd)] {
            if !value.is_finite() {
                return Err(PIDError::InvalidGain(format!(
                    "{name} value {value} is not a valid number"
                )));
            }
        }
        Ok(Self::new(kp, ki, kd))
    }

    pub fn kp(&self) -> f32 {
        self.kp
    }

    pub fn ki(&self) -> f32 {
        self.ki
    }

    pub fn kd(&self) -> f32 {
        self.kd
    }

    /// Accumulated integral term, exposed for telemetry
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Compute the correction for the current error.
    ///
    /// The derivative term is suppressed when `dt` is zero; the integral
    /// still accumulates `error * 0`, which is harmless.
    pub fn compute(&mut self, desired: f32, measured: f32, dt: f32) -> f32 {
        let error = desired - measured;

        self.integral += error * dt;

        let derivative = if dt > 0.0 {
            (error - self.last_error) / dt
        } else {
            0.0
        };

        let output = self.kp * error + self.ki * self.integral + self.kd * derivative;

        self.last_error = error;

        output
    }

    /// Clear accumulated state
    pub fn reset(&mut self) {
        self.last_error = 0.0;
        self.integral = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::PID;

    #[test]
    fn proportional_only_output_is_gain_times_error() {
        // Kp=1, Ki=0, Kd=0: output must be exactly the error, whatever dt is
        for dt in [0.0, 0.001, 0.02, 1.0] {
            let mut pid = PID::new(1.0, 0.0, 0.0);
            assert_eq!(pid.compute(10.0, 3.0, dt), 7.0);
        }
    }

    #[test]
    fn zero_dt_suppresses_derivative() {
        let mut pid = PID::new(0.0, 0.0, 1.0);
        pid.compute(1.0, 0.0, 0.02);
        // dt = 0: derivative contribution must be exactly zero
        let output = pid.compute(5.0, 0.0, 0.0);
        assert_eq!(output, 0.0);
    }

    #[test]
    fn integral_accumulates_over_calls() {
        let mut pid = PID::new(0.0, 1.0, 0.0);
        pid.compute(1.0, 0.0, 0.5);
        let output = pid.compute(1.0, 0.0, 0.5);
        assert!((output - 1.0).abs() < 1e-6, "got {output}");
    }

    #[test]
    fn integral_has_no_windup_clamp() {
        let mut pid = PID::new(0.0, 1.0, 0.0);
        for _ in 0..1000 {
            pid.compute(100.0, 0.0, 1.0);
        }
        assert!(pid.integral() > 99_000.0);
    }

    #[test]
    fn reset_clears_state() {
        let mut pid = PID::new(1.0, 1.0, 1.0);
        pid.compute(1.0, 0.0, 0.1);
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        // derivative sees no previous error after reset
        let output = pid.compute(1.0, 0.0, 1.0);
        assert!((output - (1.0 + 1.0 + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn non_finite_gains_are_rejected() {
        assert!(PID::with_gains(f32::NAN, 0.0, 0.0).is_err());
        assert!(PID::with_gains(1.0, f32::INFINITY, 0.0).is_err());
        assert!(PID::with_gains(3.2, 0.01, 0.04).is_ok());
    }
}
