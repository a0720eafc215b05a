//! Derived physiological series
//!
//! Stateful processors that turn raw sensor measurements into derived
//! channels, one output per input:
//!
//! - [`hrv`]: RMSSD heart-rate variability from RR intervals
//! - [`position`]: body roll and inclination from IMU orientation
//! - [`movement`]: gravity-free movement magnitude from accelerometry

pub mod hrv;
pub mod movement;
pub mod position;

pub use hrv::{HrvOutput, HrvProcessor};
pub use movement::MovementProcessor;
pub use position::{BodyPositionProcessor, PositionAngles};
