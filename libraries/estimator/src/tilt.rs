use nalgebra as na;

use crate::utils::rad_to_deg;

/// Gravity-referenced tilt of the vehicle body, in radians.
///
/// `pitch` is the rotation about the x axis, `roll` about the y axis,
/// matching the sensor's silkscreen orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TiltAngles {
    pub pitch: f32,
    pub roll: f32,
}

impl TiltAngles {
    /// Decompose an acceleration triple (in g) into tilt angles.
    ///
    /// Standard gravity-vector decomposition:
    /// `pitch = atan2(ay, sqrt(az² + ax²))`,
    /// `roll  = atan2(-ax, sqrt(az² + ay²))`.
    ///
    /// Only meaningful while the net acceleration is dominated by gravity;
    /// dynamic acceleration shows up as transient error, which the fusion
    /// filter exists to suppress. NaN components propagate to the result.
    pub fn from_accel(accel: &na::Vector3<f32>) -> Self {
        let pitch = accel.y.atan2((accel.z * accel.z + accel.x * accel.x).sqrt());
        let roll = (-accel.x).atan2((accel.z * accel.z + accel.y * accel.y).sqrt());
        TiltAngles { pitch, roll }
    }

    /// The same angles in degrees
    pub fn in_degrees(&self) -> TiltAngles {
        TiltAngles {
            pitch: rad_to_deg(self.pitch),
            roll: rad_to_deg(self.roll),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_2;

    #[test]
    fn level_body_has_zero_tilt() {
        let tilt = TiltAngles::from_accel(&na::Vector3::new(0.0, 0.0, 1.0));
        assert!(tilt.pitch.abs() < 1e-6);
        assert!(tilt.roll.abs() < 1e-6);
    }

    #[test]
    fn gravity_along_y_pitches_ninety_degrees() {
        let tilt = TiltAngles::from_accel(&na::Vector3::new(0.0, 1.0, 0.0));
        assert!((tilt.pitch - FRAC_PI_2).abs() < 1e-6);
        assert!(tilt.roll.abs() < 1e-6);
    }

    #[test]
    fn gravity_along_x_rolls_minus_ninety_degrees() {
        let tilt = TiltAngles::from_accel(&na::Vector3::new(1.0, 0.0, 0.0));
        assert!((tilt.roll + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn small_tilt_matches_expected_angle() {
        // 10 degree pitch: ay = sin(10°), az = cos(10°)
        let a = 10.0_f32.to_radians();
        let tilt = TiltAngles::from_accel(&na::Vector3::new(0.0, a.sin(), a.cos()));
        assert!((tilt.in_degrees().pitch - 10.0).abs() < 1e-3);
    }

    #[test]
    fn nan_components_propagate() {
        let tilt = TiltAngles::from_accel(&na::Vector3::new(f32::NAN, f32::NAN, f32::NAN));
        assert!(tilt.pitch.is_nan());
        assert!(tilt.roll.is_nan());
    }
}
