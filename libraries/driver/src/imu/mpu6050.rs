use hal::{BusError, Delay, I2cBus, ImuDiagnostics, ImuSensor, Vector3d};
use log::{debug, info, warn};

use super::RawTriple;

// MPU6050 I2C address (AD0 low)
pub const MPU6050_I2C_ADDR: u8 = 0x68;

// Register addresses
pub const MPU6050_REG_PWR_MGMT_1: u8 = 0x6B;
pub const MPU6050_REG_DLPF_CONFIG: u8 = 0x1A;
pub const MPU6050_REG_GYRO_CONFIG: u8 = 0x1B;
pub const MPU6050_REG_ACCEL_CONFIG: u8 = 0x1C;
pub const MPU6050_REG_ACCEL_XOUT0: u8 = 0x3B;
pub const MPU6050_REG_TEMP_OUT0: u8 = 0x41;
pub const MPU6050_REG_GYRO_XOUT0: u8 = 0x43;

// Wake command and settle time after it
pub const MPU6050_WAKE: u8 = 0x00;
const WAKE_SETTLE_MS: u32 = 5;

// Retry policy for data reads: a settling delay is observed before every
// attempt, including the first, and the attempt bound is a hard ceiling.
const READ_ATTEMPTS: u32 = 3;
const READ_SETTLE_MS: u32 = 10;

// Gyro calibration window: 2000 samples at 1 ms spacing
const GYRO_CAL_SAMPLES: u32 = 2000;
const GYRO_CAL_INTERVAL_MS: u32 = 1;

// Highest valid digital low-pass filter setting
const DLPF_MAX: u8 = 6;

/// Local gravity, m/s², for acceleration unit conversion
pub const GRAVITY_MS2: f32 = 9.79473;

/// Accelerometer full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelRange {
    G2,
    G4,
    G8,
    G16,
}

impl AccelRange {
    /// Register encoding of this range
    pub fn bits(self) -> u8 {
        match self {
            AccelRange::G2 => 0x00,
            AccelRange::G4 => 0x08,
            AccelRange::G8 => 0x10,
            AccelRange::G16 => 0x18,
        }
    }

    /// Decode a config register byte; `None` for unknown values
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0x00 => Some(AccelRange::G2),
            0x08 => Some(AccelRange::G4),
            0x10 => Some(AccelRange::G8),
            0x18 => Some(AccelRange::G16),
            _ => None,
        }
    }

    /// Full-scale sensitivity, LSB per g
    pub fn sensitivity(self) -> f32 {
        match self {
            AccelRange::G2 => 16384.0,
            AccelRange::G4 => 8192.0,
            AccelRange::G8 => 4096.0,
            AccelRange::G16 => 2048.0,
        }
    }
}

/// Gyroscope full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GyroRange {
    Dps250,
    Dps500,
    Dps1000,
    Dps2000,
}

impl GyroRange {
    /// Register encoding of this range
    pub fn bits(self) -> u8 {
        match self {
            GyroRange::Dps250 => 0x00,
            GyroRange::Dps500 => 0x08,
            GyroRange::Dps1000 => 0x10,
            GyroRange::Dps2000 => 0x18,
        }
    }

    /// Decode a config register byte; `None` for unknown values
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0x00 => Some(GyroRange::Dps250),
            0x08 => Some(GyroRange::Dps500),
            0x10 => Some(GyroRange::Dps1000),
            0x18 => Some(GyroRange::Dps2000),
            _ => None,
        }
    }

    /// Full-scale sensitivity, LSB per deg/s
    pub fn sensitivity(self) -> f32 {
        match self {
            GyroRange::Dps250 => 131.0,
            GyroRange::Dps500 => 65.5,
            GyroRange::Dps1000 => 32.8,
            GyroRange::Dps2000 => 16.4,
        }
    }
}

/// Configuration for the MPU6050 driver, fixed at construction
#[derive(Debug, Clone, Copy)]
pub struct Mpu6050Config {
    /// I2C address of the device
    pub addr: u8,

    /// Accelerometer full-scale range applied at init
    pub accel_range: AccelRange,

    /// Gyroscope full-scale range applied at init
    pub gyro_range: GyroRange,

    /// Digital low-pass filter setting (0..=6). Higher settings increase
    /// data latency.
    pub low_pass_filter: u8,

    /// Fixed mounting-offset bias in g, subtracted from every scaled
    /// accelerometer read. Determined empirically for the vehicle.
    pub accel_bias: Vector3d,
}

impl Default for Mpu6050Config {
    fn default() -> Self {
        Self {
            addr: MPU6050_I2C_ADDR,
            accel_range: AccelRange::G8,
            gyro_range: GyroRange::Dps500,
            low_pass_filter: 5,
            accel_bias: Vector3d::new(0.038, -0.019, 0.069),
        }
    }
}

/// MPU6050 inertial sensor driver over a blocking register bus.
///
/// Owns its failure counters and calibration offsets; nothing here is
/// process-global. Data reads retry up to a fixed bound and degrade to NaN
/// triples so a transient bus fault never aborts the control loop.
pub struct Mpu6050<B, D> {
    bus: B,
    delay: D,
    config: Mpu6050Config,
    accel_range: AccelRange,
    gyro_range: GyroRange,
    gyro_offsets: Vector3d,
    diagnostics: ImuDiagnostics,
}

impl<B: I2cBus, D: Delay> Mpu6050<B, D> {
    pub fn new(bus: B, delay: D, config: Mpu6050Config) -> Self {
        Self {
            bus,
            delay,
            config,
            accel_range: config.accel_range,
            gyro_range: config.gyro_range,
            gyro_offsets: Vector3d::zeros(),
            diagnostics: ImuDiagnostics::default(),
        }
    }

    /// Wake the device and apply the configured ranges and filtering.
    ///
    /// The device powers up asleep; a failed wake write is fatal and is
    /// surfaced to the caller, since nothing can work without it.
    pub fn init(&mut self) -> Result<(), BusError> {
        self.bus
            .write_reg(self.config.addr, MPU6050_REG_PWR_MGMT_1, MPU6050_WAKE)?;
        self.delay.delay_ms(WAKE_SETTLE_MS);

        self.set_accel_range(self.config.accel_range)?;
        self.set_gyro_range(self.config.gyro_range)?;
        self.set_low_pass_filter(self.config.low_pass_filter)?;

        info!(
            "MPU6050 at 0x{:02X} awake, accel {:?}, gyro {:?}, dlpf {}",
            self.config.addr, self.accel_range, self.gyro_range, self.config.low_pass_filter
        );
        Ok(())
    }

    /// Set the accelerometer full-scale range
    pub fn set_accel_range(&mut self, range: AccelRange) -> Result<(), BusError> {
        self.bus
            .write_reg(self.config.addr, MPU6050_REG_ACCEL_CONFIG, range.bits())?;
        self.accel_range = range;
        Ok(())
    }

    /// Set the gyroscope full-scale range
    pub fn set_gyro_range(&mut self, range: GyroRange) -> Result<(), BusError> {
        self.bus
            .write_reg(self.config.addr, MPU6050_REG_GYRO_CONFIG, range.bits())?;
        self.gyro_range = range;
        Ok(())
    }

    /// Set the digital low-pass filter.
    ///
    /// Out-of-range settings are forced to 0 with a warning rather than
    /// rejected; an invalid configuration value is never fatal.
    pub fn set_low_pass_filter(&mut self, setting: u8) -> Result<(), BusError> {
        let setting = if setting > DLPF_MAX {
            warn!("invalid low-pass filter setting {setting}, must be 0..=6, forcing 0");
            0
        } else {
            setting
        };
        self.bus
            .write_reg(self.config.addr, MPU6050_REG_DLPF_CONFIG, setting)
    }

    /// Raw accelerometer range config byte, as the device reports it
    pub fn accel_range_raw(&mut self) -> Result<u8, BusError> {
        self.bus.read_reg(self.config.addr, MPU6050_REG_ACCEL_CONFIG)
    }

    /// Raw gyroscope range config byte, as the device reports it
    pub fn gyro_range_raw(&mut self) -> Result<u8, BusError> {
        self.bus.read_reg(self.config.addr, MPU6050_REG_GYRO_CONFIG)
    }

    /// Read the active accelerometer range back from the device.
    ///
    /// An unknown register value falls back to the narrowest range with a
    /// warning; scaling with too large a sensitivity understates motion,
    /// which is the safe direction.
    pub fn read_accel_range(&mut self) -> Result<AccelRange, BusError> {
        let bits = self.accel_range_raw()?;
        let range = AccelRange::from_bits(bits).unwrap_or_else(|| {
            warn!("unknown accel range byte 0x{bits:02X}, falling back to ±2g");
            AccelRange::G2
        });
        self.accel_range = range;
        Ok(range)
    }

    /// Read the active gyroscope range back from the device.
    ///
    /// Unknown register values fall back to ±250 deg/s with a warning.
    pub fn read_gyro_range(&mut self) -> Result<GyroRange, BusError> {
        let bits = self.gyro_range_raw()?;
        let range = GyroRange::from_bits(bits).unwrap_or_else(|| {
            warn!("unknown gyro range byte 0x{bits:02X}, falling back to ±250 deg/s");
            GyroRange::Dps250
        });
        self.gyro_range = range;
        Ok(range)
    }

    /// Acceleration in g, scaled by the active range and bias-corrected.
    /// NaN components when the read degrades.
    pub fn read_accel(&mut self) -> Vector3d {
        match self.read_raw_triple(MPU6050_REG_ACCEL_XOUT0) {
            Some(raw) => {
                let s = self.accel_range.sensitivity();
                Vector3d::new(
                    raw.x as f32 / s - self.config.accel_bias.x,
                    raw.y as f32 / s - self.config.accel_bias.y,
                    raw.z as f32 / s - self.config.accel_bias.z,
                )
            }
            None => Vector3d::new(f32::NAN, f32::NAN, f32::NAN),
        }
    }

    /// Acceleration in m/s²
    pub fn read_accel_ms2(&mut self) -> Vector3d {
        self.read_accel() * GRAVITY_MS2
    }

    /// Magnitude of the acceleration vector in g
    pub fn read_accel_abs(&mut self) -> f32 {
        self.read_accel().norm()
    }

    /// Angular rate in deg/s, scaled by the active range with the measured
    /// rest offsets subtracted. NaN components when the read degrades.
    pub fn read_gyro(&mut self) -> Vector3d {
        match self.read_raw_triple(MPU6050_REG_GYRO_XOUT0) {
            Some(raw) => {
                let s = self.gyro_range.sensitivity();
                Vector3d::new(
                    raw.x as f32 / s - self.gyro_offsets.x,
                    raw.y as f32 / s - self.gyro_offsets.y,
                    raw.z as f32 / s - self.gyro_offsets.z,
                )
            }
            None => Vector3d::new(f32::NAN, f32::NAN, f32::NAN),
        }
    }

    /// Die temperature in Celsius from the manufacturer's linear model.
    ///
    /// A single attempt, no retry: temperature is not in the control path,
    /// so a failed read just yields NaN.
    pub fn read_temperature(&mut self) -> f32 {
        let mut buf = [0u8; 2];
        match self
            .bus
            .read_regs(self.config.addr, MPU6050_REG_TEMP_OUT0, &mut buf)
        {
            Ok(()) => {
                let raw = i16::from_be_bytes(buf);
                raw as f32 / 340.0 + 36.53
            }
            Err(err) => {
                warn!("temperature read failed: {err}");
                f32::NAN
            }
        }
    }

    /// Measure gyroscope rest offsets by averaging a stationary window.
    ///
    /// Blocks for the whole window (2000 samples at 1 ms spacing). Samples
    /// that degrade to NaN are skipped so a transient bus fault cannot
    /// poison the offsets. Must run before closed-loop control starts.
    pub fn calibrate_gyro(&mut self) {
        self.gyro_offsets = Vector3d::zeros();

        let mut sum = Vector3d::zeros();
        let mut collected = 0u32;
        for _ in 0..GYRO_CAL_SAMPLES {
            let sample = self.read_gyro();
            if !sample.x.is_nan() {
                sum += sample;
                collected += 1;
            }
            self.delay.delay_ms(GYRO_CAL_INTERVAL_MS);
        }

        if collected == 0 {
            warn!("gyro calibration collected no samples, offsets left at zero");
            return;
        }

        self.gyro_offsets = sum / collected as f32;
        info!(
            "gyro calibration complete over {collected} samples: offsets {:?}",
            self.gyro_offsets
        );
    }

    /// Measured gyroscope rest offsets, deg/s
    pub fn gyro_offsets(&self) -> Vector3d {
        self.gyro_offsets
    }

    /// Failure counters accumulated since construction
    pub fn diagnostics(&self) -> ImuDiagnostics {
        self.diagnostics
    }

    /// Burst-read one data triple with the bounded retry policy.
    ///
    /// The settling delay is observed before every attempt, including the
    /// first. Each failed attempt bumps `read_failures`; exhausting the
    /// budget bumps `retries_exhausted` and degrades to `None`.
    fn read_raw_triple(&mut self, reg: u8) -> Option<RawTriple> {
        for attempt in 1..=READ_ATTEMPTS {
            self.delay.delay_ms(READ_SETTLE_MS);
            let mut buf = [0u8; 6];
            match self.bus.read_regs(self.config.addr, reg, &mut buf) {
                Ok(()) => return Some(RawTriple::decode(&buf)),
                Err(err) => {
                    self.diagnostics.read_failures += 1;
                    debug!("read of 0x{reg:02X} attempt {attempt}/{READ_ATTEMPTS} failed: {err}");
                }
            }
        }
        self.diagnostics.retries_exhausted += 1;
        warn!("read of 0x{reg:02X} failed after {READ_ATTEMPTS} attempts, degrading to NaN");
        None
    }
}

impl<B: I2cBus, D: Delay> ImuSensor for Mpu6050<B, D> {
    fn init(&mut self) -> Result<(), BusError> {
        Mpu6050::init(self)
    }

    fn read_accel(&mut self) -> Vector3d {
        Mpu6050::read_accel(self)
    }

    fn read_gyro(&mut self) -> Vector3d {
        Mpu6050::read_gyro(self)
    }

    fn read_temperature(&mut self) -> f32 {
        Mpu6050::read_temperature(self)
    }

    fn calibrate_gyro(&mut self) {
        Mpu6050::calibrate_gyro(self)
    }

    fn diagnostics(&self) -> ImuDiagnostics {
        Mpu6050::diagnostics(self)
    }
}
