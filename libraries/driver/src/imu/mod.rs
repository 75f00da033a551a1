// Inertial sensor drivers
//
// Drivers follow a common pattern: a configuration struct passed at
// construction, a blocking register bus behind `hal::I2cBus`, and reads
// that degrade to NaN instead of aborting the control loop.

pub mod mpu6050;

/// One raw register burst from a triple-axis sensor, before unit conversion.
///
/// Produced once per read and immediately converted to physical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTriple {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawTriple {
    /// Decode a 6-byte burst of big-endian two's-complement pairs
    pub fn decode(buf: &[u8; 6]) -> Self {
        RawTriple {
            x: i16::from_be_bytes([buf[0], buf[1]]),
            y: i16::from_be_bytes([buf[2], buf[3]]),
            z: i16::from_be_bytes([buf[4], buf[5]]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RawTriple;

    #[test]
    fn decodes_big_endian_twos_complement() {
        let triple = RawTriple::decode(&[0x01, 0x00, 0xFF, 0xFF, 0x80, 0x00]);
        assert_eq!(triple.x, 256);
        assert_eq!(triple.y, -1);
        assert_eq!(triple.z, -32768);
    }
}
