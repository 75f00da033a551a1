/// Register-addressed bus interface
use thiserror::Error;

/// Error raised by a single bus transaction
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Device did not acknowledge the transfer
    #[error("device did not acknowledge the transfer")]
    Nack,

    /// Transfer did not complete in time
    #[error("bus transfer timed out")]
    Timeout,
}

/// Blocking I2C-style bus interface.
///
/// The bus is accessed exclusively and serially by one owner; there is no
/// concurrent access in this system.
pub trait I2cBus {
    /// Write raw bytes to a device at the specified address
    fn write(&mut self, addr: u8, data: &[u8]) -> Result<(), BusError>;

    /// Read raw bytes from a device at the specified address
    fn read(&mut self, addr: u8, data: &mut [u8]) -> Result<(), BusError>;

    /// Write to a device and then read from it in one transaction
    fn write_read(&mut self, addr: u8, write_data: &[u8], read_data: &mut [u8])
        -> Result<(), BusError>;

    /// Read a single register from a device
    fn read_reg(&mut self, addr: u8, reg: u8) -> Result<u8, BusError> {
        let mut buffer = [0u8; 1];
        self.write_read(addr, &[reg], &mut buffer)?;
        Ok(buffer[0])
    }

    /// Write to a single register on a device
    fn write_reg(&mut self, addr: u8, reg: u8, value: u8) -> Result<(), BusError> {
        self.write(addr, &[reg, value])
    }

    /// Burst-read consecutive registers starting at `reg`
    fn read_regs(&mut self, addr: u8, reg: u8, data: &mut [u8]) -> Result<(), BusError> {
        self.write_read(addr, &[reg], data)
    }
}
