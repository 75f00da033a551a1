//! # Estimator - tilt estimation and fusion for a balance vehicle
//!
//! Two stages turn raw inertial data into one low-noise tilt angle:
//!
//! - [`tilt`]: a gravity-vector decomposition of the accelerometer triple
//!   into pitch- and roll-like angles. Noisy, and only valid while net
//!   acceleration is dominated by gravity, but drift-free.
//! - [`kalman`]: a scalar Kalman recursion that fuses the drift-free but
//!   noisy absolute angle with the clean but drift-prone gyroscope rate
//!   into a single estimate per axis.

use thiserror::Error;

pub mod kalman;
pub mod tilt;
pub mod utils;

pub use kalman::Kalman1D;
pub use tilt::TiltAngles;

/// Errors that can occur while configuring an estimator
#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("Invalid noise parameter: {0}")]
    InvalidNoise(String),
}

/// Result type for estimator operations
pub type EstimatorResult<T> = Result<T, EstimatorError>;
