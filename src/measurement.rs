//! Raw measurement shapes produced by sensor drivers
//!
//! Drivers live outside this crate; the derivation pipelines consume these
//! shapes and never construct them. All measurements carry an epoch
//! millisecond timestamp that is non-decreasing per device.

use serde::{Deserialize, Serialize};

/// A heart rate measurement from a chest strap or PPG sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateMeasurement {
    /// Epoch milliseconds.
    pub timestamp: f64,
    /// Heart rate in beats per minute.
    pub heart_rate_bpm: f64,
    /// RR intervals in seconds, zero or more per measurement.
    #[serde(default)]
    pub rr_intervals: Vec<f64>,
    /// Whether the sensor reports skin contact.
    #[serde(default)]
    pub sensor_contact: Option<bool>,
    /// Accumulated energy expenditure in kilojoules, if reported.
    #[serde(default)]
    pub energy_expended: Option<u16>,
}

/// An inertial measurement (accelerometer, gyroscope, orientation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuMeasurement {
    /// Epoch milliseconds.
    pub timestamp: f64,
    /// 3-axis acceleration in g.
    pub acceleration: [f64; 3],
    /// 3-axis angular velocity in degrees per second.
    pub angular_velocity: [f64; 3],
    /// 3-axis Euler angle in degrees, XYZ rotation order.
    pub angle: [f64; 3],
}

/// A generic scalar measurement (temperature and similar channels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueMeasurement {
    /// Epoch milliseconds.
    pub timestamp: f64,
    /// Measured value in sensor units.
    pub value: f64,
}
