use crate::{EstimatorError, EstimatorResult};

/// Rate-noise standard deviation of the gyroscope, deg/s
const DEFAULT_RATE_NOISE_STD: f32 = 4.0;

/// Measurement-noise standard deviation of the accelerometer angle, deg
const DEFAULT_MEASURE_NOISE_STD: f32 = 3.0;

/// Initial angle uncertainty, deg²
const INITIAL_UNCERTAINTY: f32 = 4.0;

/// Scalar (single-degree-of-freedom) Kalman filter for one tilt axis.
///
/// Fuses a drift-prone angular rate with a noisy absolute angle into one
/// low-variance estimate. The angle and its uncertainty are the filter's
/// only memory; there is no reset path. The angle is only ever advanced by
/// `dt * rate` plus a bounded correction, never jumped.
#[derive(Debug, Clone)]
pub struct Kalman1D {
    angle: f32,
    uncertainty: f32,
    /// Process noise variance per unit dt², deg²/s²
    q_rate: f32,
    /// Measurement noise variance, deg²
    r_measure: f32,
}

impl Default for Kalman1D {
    fn default() -> Self {
        Kalman1D {
            angle: 0.0,
            uncertainty: INITIAL_UNCERTAINTY,
            q_rate: DEFAULT_RATE_NOISE_STD * DEFAULT_RATE_NOISE_STD,
            r_measure: DEFAULT_MEASURE_NOISE_STD * DEFAULT_MEASURE_NOISE_STD,
        }
    }
}

impl Kalman1D {
    /// Filter starting at `angle` degrees with the default noise model
    pub fn new(angle: f32) -> Self {
        Kalman1D {
            angle,
            ..Default::default()
        }
    }

    /// Filter with explicit noise standard deviations.
    ///
    /// `rate_noise_std` is the gyroscope rate noise in deg/s,
    /// `measure_noise_std` the absolute-angle noise in degrees. Both must
    /// be positive and finite.
    pub fn with_noise(rate_noise_std: f32, measure_noise_std: f32) -> EstimatorResult<Self> {
        if !(rate_noise_std.is_finite() && rate_noise_std > 0.0) {
            return Err(EstimatorError::InvalidNoise(format!(
                "rate noise std {rate_noise_std} must be positive and finite"
            )));
        }
        if !(measure_noise_std.is_finite() && measure_noise_std > 0.0) {
            return Err(EstimatorError::InvalidNoise(format!(
                "measurement noise std {measure_noise_std} must be positive and finite"
            )));
        }
        Ok(Kalman1D {
            q_rate: rate_noise_std * rate_noise_std,
            r_measure: measure_noise_std * measure_noise_std,
            ..Default::default()
        })
    }

    /// Run one predict/correct cycle and return the fused angle in degrees.
    ///
    /// `rate` is the gyroscope rate in deg/s, `measured` the absolute angle
    /// in degrees, `dt` the elapsed time in seconds. Executed without
    /// branching; state persists across calls.
    pub fn update(&mut self, rate: f32, measured: f32, dt: f32) -> f32 {
        // Predict
        self.angle += dt * rate;
        self.uncertainty += dt * dt * self.q_rate;

        // Correct
        let gain = self.uncertainty / (self.uncertainty + self.r_measure);
        self.angle += gain * (measured - self.angle);
        self.uncertainty *= 1.0 - gain;

        self.angle
    }

    /// Current fused angle, degrees
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Current estimate variance, deg²; never negative
    pub fn uncertainty(&self) -> f32 {
        self.uncertainty
    }
}
