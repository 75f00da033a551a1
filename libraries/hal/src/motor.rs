/// Motor driver interface
///
/// A motor is driven by a normalized duty fraction; hardware-specific
/// scaling (PWM resolution, pin polarity) lives behind this trait.

/// Interface for a single DC motor channel
pub trait MotorDriver {
    /// Drive the motor forward at the given duty fraction in [0, 1]
    fn forward(&mut self, fraction: f32);

    /// Drive the motor backward at the given duty fraction in [0, 1]
    fn backward(&mut self, fraction: f32);

    /// Cut drive to the motor
    fn stop(&mut self);
}

/// Convert a duty fraction into a hardware PWM duty value.
///
/// Fractions outside (0, 1] yield zero drive; otherwise the fraction is
/// scaled to `max_scale` and rounded.
pub fn hardware_duty(fraction: f32, max_scale: u16) -> u16 {
    if fraction <= 0.0 || fraction > 1.0 {
        0
    } else {
        libm::roundf(fraction * max_scale as f32) as u16
    }
}
