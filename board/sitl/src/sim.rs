//! Register-level simulation of the inertial sensor, clock and motors.
//!
//! The simulated device lives behind `Rc<RefCell<_>>` so the bus, clock,
//! delay and motor handles can share it with the test harness. The control
//! loop itself is single-threaded, so this mirrors the real ownership
//! model: one logical thread, no locking.

use std::cell::RefCell;
use std::rc::Rc;

use driver::{AccelRange, GyroRange, Mpu6050Config};
use hal::{hardware_duty, BusError, Clock, Delay, I2cBus, MotorDriver};
use log::debug;

// Register addresses mirrored from the device
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_GYRO_CONFIG: u8 = 0x1B;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT0: u8 = 0x3B;
const REG_TEMP_OUT0: u8 = 0x41;
const REG_GYRO_XOUT0: u8 = 0x43;

/// Last drive applied to a simulated motor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotorState {
    Forward(f32),
    Backward(f32),
    Stopped,
}

struct SimInner {
    regs: [u8; 256],
    asleep: bool,

    /// Body tilt about the balance axis, degrees
    tilt_deg: f32,
    /// Body rotation rate about the balance axis, deg/s
    rate_dps: f32,
    /// Constant gyro rest bias the calibration should average out, deg/s
    gyro_bias_dps: f32,
    /// Die temperature, Celsius
    temperature_c: f32,

    /// Fail the next N data transactions (injected faults)
    fail_transactions: u32,

    now_ms: u32,
    left_motor: MotorState,
    right_motor: MotorState,
}

impl SimInner {
    fn sample_accel(&self) -> [u8; 6] {
        let bias = Mpu6050Config::default().accel_bias;
        let tilt = self.tilt_deg.to_radians();
        // gravity decomposition for a tilt about the y (balance) axis,
        // with the vehicle's mounting offsets baked back in
        let ax = -tilt.sin() + bias.x;
        let ay = 0.0 + bias.y;
        let az = tilt.cos() + bias.z;

        let s = AccelRange::from_bits(self.regs[REG_ACCEL_CONFIG as usize])
            .unwrap_or(AccelRange::G2)
            .sensitivity();
        encode_triple(ax * s, ay * s, az * s)
    }

    fn sample_gyro(&self) -> [u8; 6] {
        let s = GyroRange::from_bits(self.regs[REG_GYRO_CONFIG as usize])
            .unwrap_or(GyroRange::Dps250)
            .sensitivity();
        let rate = self.rate_dps + self.gyro_bias_dps;
        encode_triple(self.gyro_bias_dps * s, rate * s, self.gyro_bias_dps * s)
    }

    fn sample_temperature(&self) -> [u8; 2] {
        let raw = ((self.temperature_c - 36.53) * 340.0) as i16;
        raw.to_be_bytes()
    }
}

fn encode_triple(x: f32, y: f32, z: f32) -> [u8; 6] {
    let mut buf = [0u8; 6];
    buf[0..2].copy_from_slice(&(x as i16).to_be_bytes());
    buf[2..4].copy_from_slice(&(y as i16).to_be_bytes());
    buf[4..6].copy_from_slice(&(z as i16).to_be_bytes());
    buf
}

/// Handle to the simulated world shared by bus, clock, motors and tests
#[derive(Clone)]
pub struct Sim {
    inner: Rc<RefCell<SimInner>>,
}

impl Sim {
    pub fn new() -> Self {
        Sim {
            inner: Rc::new(RefCell::new(SimInner {
                regs: [0; 256],
                asleep: true,
                tilt_deg: 0.0,
                rate_dps: 0.0,
                gyro_bias_dps: 0.7,
                temperature_c: 31.0,
                fail_transactions: 0,
                now_ms: 0,
                left_motor: MotorState::Stopped,
                right_motor: MotorState::Stopped,
            })),
        }
    }

    /// Command the simulated body to a tilt angle in degrees
    pub fn set_tilt(&self, deg: f32) {
        self.inner.borrow_mut().tilt_deg = deg;
    }

    /// Command the simulated rotation rate in deg/s
    pub fn set_rate(&self, dps: f32) {
        self.inner.borrow_mut().rate_dps = dps;
    }

    /// Make the next `n` data transactions fail with a NACK
    pub fn inject_bus_faults(&self, n: u32) {
        self.inner.borrow_mut().fail_transactions = n;
    }

    pub fn left_motor(&self) -> MotorState {
        self.inner.borrow().left_motor
    }

    pub fn right_motor(&self) -> MotorState {
        self.inner.borrow().right_motor
    }

    pub fn now_ms(&self) -> u32 {
        self.inner.borrow().now_ms
    }

    pub fn bus(&self) -> SimBus {
        SimBus { sim: self.clone() }
    }

    pub fn clock(&self) -> SimClock {
        SimClock { sim: self.clone() }
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay { sim: self.clone() }
    }

    pub fn left_motor_handle(&self) -> SimMotor {
        SimMotor {
            sim: self.clone(),
            left: true,
        }
    }

    pub fn right_motor_handle(&self) -> SimMotor {
        SimMotor {
            sim: self.clone(),
            left: false,
        }
    }
}

impl Default for Sim {
    fn default() -> Self {
        Self::new()
    }
}

/// Bus endpoint of the simulated device
pub struct SimBus {
    sim: Sim,
}

impl I2cBus for SimBus {
    fn write(&mut self, _addr: u8, data: &[u8]) -> Result<(), BusError> {
        let mut inner = self.sim.inner.borrow_mut();
        let reg = data[0];

        // the wake write is honored even while asleep
        if reg == REG_PWR_MGMT_1 {
            inner.regs[reg as usize] = data[1];
            inner.asleep = data[1] != 0x00;
            return Ok(());
        }
        if inner.asleep {
            return Err(BusError::Nack);
        }
        inner.regs[reg as usize] = data[1];
        Ok(())
    }

    fn read(&mut self, _addr: u8, _data: &mut [u8]) -> Result<(), BusError> {
        Err(BusError::Nack)
    }

    fn write_read(
        &mut self,
        _addr: u8,
        write_data: &[u8],
        read_data: &mut [u8],
    ) -> Result<(), BusError> {
        let mut inner = self.sim.inner.borrow_mut();
        if inner.asleep {
            return Err(BusError::Nack);
        }
        if inner.fail_transactions > 0 {
            inner.fail_transactions -= 1;
            debug!("sim: injected bus fault");
            return Err(BusError::Nack);
        }

        let reg = write_data[0];
        match reg {
            REG_ACCEL_XOUT0 => read_data.copy_from_slice(&inner.sample_accel()),
            REG_GYRO_XOUT0 => read_data.copy_from_slice(&inner.sample_gyro()),
            REG_TEMP_OUT0 => read_data.copy_from_slice(&inner.sample_temperature()),
            _ => {
                let start = reg as usize;
                read_data.copy_from_slice(&inner.regs[start..start + read_data.len()]);
            }
        }
        Ok(())
    }
}

/// Simulated monotonic clock; advances only through `SimDelay` and tick cost
pub struct SimClock {
    sim: Sim,
}

impl Clock for SimClock {
    fn now_ms(&self) -> u32 {
        self.sim.inner.borrow().now_ms
    }
}

/// Delay endpoint; advances simulated time instead of sleeping
pub struct SimDelay {
    sim: Sim,
}

impl Delay for SimDelay {
    fn delay_ms(&mut self, ms: u32) {
        let mut inner = self.sim.inner.borrow_mut();
        inner.now_ms = inner.now_ms.wrapping_add(ms);
    }
}

/// One simulated motor channel
pub struct SimMotor {
    sim: Sim,
    left: bool,
}

// PWM resolution of the motor driver being simulated (L298N behind a
// 10-bit timer)
const PWM_MAX: u16 = 1023;

impl SimMotor {
    fn set(&mut self, state: MotorState) {
        let mut inner = self.sim.inner.borrow_mut();
        if self.left {
            inner.left_motor = state;
        } else {
            inner.right_motor = state;
        }
    }

    fn side(&self) -> &'static str {
        if self.left {
            "left"
        } else {
            "right"
        }
    }
}

impl MotorDriver for SimMotor {
    fn forward(&mut self, fraction: f32) {
        debug!(
            "sim: {} motor forward pwm {}",
            self.side(),
            hardware_duty(fraction, PWM_MAX)
        );
        self.set(MotorState::Forward(fraction));
    }

    fn backward(&mut self, fraction: f32) {
        debug!(
            "sim: {} motor backward pwm {}",
            self.side(),
            hardware_duty(fraction, PWM_MAX)
        );
        self.set(MotorState::Backward(fraction));
    }

    fn stop(&mut self) {
        self.set(MotorState::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_starts_asleep_and_wakes_on_power_write() {
        let sim = Sim::new();
        let mut bus = sim.bus();
        let mut buf = [0u8; 6];
        assert_eq!(
            bus.write_read(0x68, &[REG_ACCEL_XOUT0], &mut buf),
            Err(BusError::Nack)
        );

        bus.write(0x68, &[REG_PWR_MGMT_1, 0x00]).unwrap();
        assert!(bus.write_read(0x68, &[REG_ACCEL_XOUT0], &mut buf).is_ok());
    }

    #[test]
    fn delay_advances_simulated_time() {
        let sim = Sim::new();
        let mut delay = sim.delay();
        delay.delay_ms(25);
        assert_eq!(sim.now_ms(), 25);
    }
}
