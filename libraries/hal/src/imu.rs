/// IMU (Inertial Measurement Unit) sensor interface
use crate::bus::BusError;
use crate::types::Vector3d;

/// Inertial sensor interface for the balance loop.
///
/// Reads degrade rather than fail: a read that cannot be completed within
/// the driver's retry budget returns a NaN triple, which callers must treat
/// as "no new information this tick".
pub trait ImuSensor {
    /// Wake the device and apply the configured ranges and filtering.
    ///
    /// An `Err` here is fatal: without a responding device no meaningful
    /// operation is possible.
    fn init(&mut self) -> Result<(), BusError>;

    /// Acceleration in g, bias-corrected. NaN components on a degraded read.
    fn read_accel(&mut self) -> Vector3d;

    /// Angular rate in deg/s, calibration offsets subtracted.
    /// NaN components on a degraded read.
    fn read_gyro(&mut self) -> Vector3d;

    /// Die temperature in Celsius; NaN on bus failure.
    fn read_temperature(&mut self) -> f32;

    /// Measure gyroscope rest offsets.
    ///
    /// The device must be stationary. Blocks the caller for the entire
    /// sampling window and must run before closed-loop control starts.
    fn calibrate_gyro(&mut self);

    /// Running failure counters for observability
    fn diagnostics(&self) -> ImuDiagnostics;
}

/// Bus failure counters owned by the sensor driver.
///
/// Replaces process-wide mutable counters with an explicit record returned
/// on request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImuDiagnostics {
    /// Total failed bus attempts across all reads
    pub read_failures: u32,

    /// Reads that exhausted the full retry budget and degraded to NaN
    pub retries_exhausted: u32,
}
