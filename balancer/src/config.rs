/// Closed-loop tuning for the balance vehicle, fixed at construction
#[derive(Debug, Clone, Copy)]
pub struct BalancerConfig {
    /// Setpoint tilt angle in degrees (0 = upright)
    pub desired_angle: f32,

    /// Proportional gain
    pub kp: f32,

    /// Integral gain
    pub ki: f32,

    /// Derivative gain
    pub kd: f32,

    /// Controller-output magnitude that maps to full motor duty
    pub output_window: f32,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            desired_angle: 0.0,
            kp: 3.2,
            ki: 0.01,
            kd: 0.04,
            output_window: 300.0,
        }
    }
}
