//! `eyes-perception` – turns detector boxes and a relative depth map into
//! metric distances.
//!
//! # Modules
//!
//! - [`distance`] – [`DistanceEstimator`][distance::DistanceEstimator]: fuses a
//!   depth-map median with a pinhole-geometry estimate into one calibrated
//!   distance per detection.
//! - [`luminance`] – [`is_low_light`][luminance::is_low_light]: mean-brightness
//!   heuristic that tells the caller whether the frame needed enhancement.
//!
//! Both are pure functions of the current frame; nothing is carried between
//! frames.

pub mod distance;
pub mod luminance;

pub use distance::DistanceEstimator;
pub use luminance::{is_low_light, mean_brightness};
