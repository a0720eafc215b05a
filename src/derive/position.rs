//! Body position derivation from IMU orientation
//!
//! Converts an IMU's Euler-angle orientation into two clinical series:
//! roll about the body's long axis (supine/left/right/prone) and trunk
//! inclination from horizontal. The Euler angles go through a
//! quaternion so the gravity direction can be rotated into the sensor
//! frame without gimbal artifacts near vertical.

use crate::measurement::ImuMeasurement;
use crate::types::Sample;

/// Unit quaternion in (w, x, y, z) order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Quaternion {
    w: f64,
    x: f64,
    y: f64,
    z: f64,
}

impl Quaternion {
    /// From intrinsic X-Y-Z Euler angles in degrees.
    fn from_euler_deg(angles: [f64; 3]) -> Self {
        let [hx, hy, hz] = angles.map(|a| a.to_radians() / 2.0);
        let (sx, cx) = hx.sin_cos();
        let (sy, cy) = hy.sin_cos();
        let (sz, cz) = hz.sin_cos();
        // q = qx * qy * qz
        Self {
            w: cx * cy * cz - sx * sy * sz,
            x: sx * cy * cz + cx * sy * sz,
            y: cx * sy * cz - sx * cy * sz,
            z: cx * cy * sz + sx * sy * cz,
        }
    }

    fn conjugate(self) -> Self {
        Self {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Rotate a vector: v' = q v q*.
    fn rotate(self, v: [f64; 3]) -> [f64; 3] {
        let Self { w, x, y, z } = self;
        // t = 2 q_vec × v
        let tx = 2.0 * (y * v[2] - z * v[1]);
        let ty = 2.0 * (z * v[0] - x * v[2]);
        let tz = 2.0 * (x * v[1] - y * v[0]);
        [
            v[0] + w * tx + (y * tz - z * ty),
            v[1] + w * ty + (z * tx - x * tz),
            v[2] + w * tz + (x * ty - y * tx),
        ]
    }
}

/// Roll and inclination angles derived from one IMU measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionAngles {
    /// Rotation about the body's long axis, degrees in (-180, 180].
    pub roll: Sample,
    /// Absolute trunk tilt from horizontal, degrees in [0, 90].
    pub inclination: Sample,
}

/// Stateless body-position processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyPositionProcessor;

impl BodyPositionProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Derive roll and inclination from one measurement.
    pub fn process(&self, measurement: &ImuMeasurement) -> PositionAngles {
        let q = Quaternion::from_euler_deg(measurement.angle);
        // World "up" expressed in the sensor frame.
        let g = q.conjugate().rotate([0.0, 0.0, 1.0]);
        let roll = g[0].atan2(g[2]).to_degrees();
        let inclination = g[1].atan2((g[0] * g[0] + g[2] * g[2]).sqrt()).abs().to_degrees();
        PositionAngles {
            roll: Sample::new(measurement.timestamp, roll),
            inclination: Sample::new(measurement.timestamp, inclination),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn imu(angle: [f64; 3]) -> ImuMeasurement {
        ImuMeasurement {
            timestamp: 1000.0,
            acceleration: [0.0, 0.0, 1.0],
            angular_velocity: [0.0, 0.0, 0.0],
            angle,
        }
    }

    #[test]
    fn test_flat_on_back() {
        let out = BodyPositionProcessor::new().process(&imu([0.0, 0.0, 0.0]));
        assert_relative_eq!(out.roll.value, 0.0, epsilon = 1e-9);
        assert_relative_eq!(out.inclination.value, 0.0, epsilon = 1e-9);
        assert_relative_eq!(out.roll.timestamp, 1000.0);
    }

    #[test]
    fn test_quarter_roll() {
        // Rolled 90 degrees about the longitudinal (Y) axis.
        let out = BodyPositionProcessor::new().process(&imu([0.0, 90.0, 0.0]));
        assert_relative_eq!(out.roll.value.abs(), 90.0, epsilon = 1e-6);
        assert_relative_eq!(out.inclination.value, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_half_roll_is_prone() {
        let out = BodyPositionProcessor::new().process(&imu([0.0, 180.0, 0.0]));
        assert_relative_eq!(out.roll.value.abs(), 180.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sitting_up() {
        // Pitched 90 degrees about the lateral (X) axis: fully upright.
        let out = BodyPositionProcessor::new().process(&imu([90.0, 0.0, 0.0]));
        assert_relative_eq!(out.inclination.value, 90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_inclination_sign_folded() {
        let up = BodyPositionProcessor::new().process(&imu([45.0, 0.0, 0.0]));
        let down = BodyPositionProcessor::new().process(&imu([-45.0, 0.0, 0.0]));
        assert_relative_eq!(up.inclination.value, down.inclination.value, epsilon = 1e-9);
        assert_relative_eq!(up.inclination.value, 45.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rotate_identity() {
        let q = Quaternion::from_euler_deg([0.0, 0.0, 0.0]);
        let v = q.rotate([0.3, -0.4, 0.5]);
        assert_relative_eq!(v[0], 0.3, epsilon = 1e-12);
        assert_relative_eq!(v[1], -0.4, epsilon = 1e-12);
        assert_relative_eq!(v[2], 0.5, epsilon = 1e-12);
    }
}
