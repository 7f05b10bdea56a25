//! Distance Estimator.
//!
//! Combines two independent, noisy signals into a single distance in metres
//! for every detection:
//!
//! - **Depth map** – median relative inverse depth over the centre of the
//!   box, normalized against the whole map and mapped linearly onto
//!   `[0.3, 15.0]` m. Scene-relative: it knows *which* object is closer, not
//!   how far it really is.
//! - **Pinhole** – classic `D = F × H_real / H_px` using a known physical
//!   height for the label. Metric, but only for labels with a known height.
//!
//! Whichever strategies succeed are averaged:
//! ```text
//! distance = mean({depth, pinhole} that produced a value)   or 0.0 if none
//! ```
//! `0.0` is the "unknown" sentinel and must never be read as "very close".
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use eyes_perception::distance::DistanceEstimator;
//! use eyes_types::{BoundingBox, ClassificationTables, Detection, PerceptionSettings};
//!
//! let estimator = DistanceEstimator::new(
//!     Arc::new(ClassificationTables::default()),
//!     &PerceptionSettings::default(),
//! );
//!
//! // A 1.7 m person spanning 200 px of a 640 px frame: 600 × 1.7 / 200.
//! let person = Detection::new("person", 0.9, BoundingBox::new(100, 100, 180, 300)).unwrap();
//! let d = estimator.estimate(None, &person, 640).unwrap();
//! assert!((d - 5.1).abs() < 1e-4);
//! ```

use std::sync::Arc;

use eyes_types::{
    BoundingBox, ClassificationTables, DepthMap, Detection, EyesError, PerceptionSettings,
    RangedDetection,
};
use tracing::debug;

// ────────────────────────────────────────────────────────────────────────────
// Constants
// ────────────────────────────────────────────────────────────────────────────

/// Nearest distance the depth-map strategy can report (metres).
pub const DEPTH_MIN_DISTANCE_M: f32 = 0.3;
/// Farthest distance the depth-map strategy can report (metres).
pub const DEPTH_MAX_DISTANCE_M: f32 = 15.0;
/// Pinhole output clamp (metres).
pub const PINHOLE_MIN_DISTANCE_M: f32 = 0.2;
pub const PINHOLE_MAX_DISTANCE_M: f32 = 20.0;

/// Half-extent of the sampled centre region as a fraction of the box size
/// (0.3 on each side → 60 % of width and height).
const CENTRE_HALF_FRACTION: f32 = 0.3;

/// Closeness at or below which the object is pinned to the far limit.
const FAR_CLOSENESS: f32 = 0.01;

// ────────────────────────────────────────────────────────────────────────────
// DistanceEstimator
// ────────────────────────────────────────────────────────────────────────────

/// Per-detection distance fusion.
///
/// Holds only immutable data, so one instance can serve any number of frames
/// concurrently.
#[derive(Debug, Clone)]
pub struct DistanceEstimator {
    tables: Arc<ClassificationTables>,
    focal_length_px: f32,
    reference_height_px: f32,
}

impl DistanceEstimator {
    pub fn new(tables: Arc<ClassificationTables>, settings: &PerceptionSettings) -> Self {
        Self {
            tables,
            focal_length_px: settings.focal_length_px,
            reference_height_px: settings.reference_height_px,
        }
    }

    /// Fused distance for one detection, or `0.0` when neither strategy
    /// produced a value.
    ///
    /// # Errors
    ///
    /// - [`EyesError::InvalidBoundingBox`] – the box is inverted.
    /// - [`EyesError::InvalidImageHeight`] – `image_height_px` is zero.
    pub fn estimate(
        &self,
        depth_map: Option<&DepthMap>,
        detection: &Detection,
        image_height_px: u32,
    ) -> Result<f32, EyesError> {
        detection.bbox.validate(&detection.label)?;
        if image_height_px == 0 {
            return Err(EyesError::InvalidImageHeight);
        }

        let from_depth = depth_map.and_then(|map| depth_map_distance(map, &detection.bbox));
        let from_pinhole =
            self.pinhole_distance(&detection.label, detection.bbox_height_px, image_height_px);
        let fused = fuse(from_depth, from_pinhole);

        debug!(
            label = %detection.label,
            depth = ?from_depth,
            pinhole = ?from_pinhole,
            fused,
            "distance estimate"
        );
        Ok(fused)
    }

    /// Attach a distance to every detection of a frame, preserving order.
    ///
    /// A strategy that cannot produce a value for one detection only degrades
    /// that detection to the unknown sentinel.
    pub fn estimate_all(
        &self,
        depth_map: Option<&DepthMap>,
        detections: &[Detection],
        image_height_px: u32,
    ) -> Result<Vec<RangedDetection>, EyesError> {
        detections
            .iter()
            .map(|det| {
                let distance = self.estimate(depth_map, det, image_height_px)?;
                Ok(RangedDetection {
                    detection: det.clone(),
                    distance,
                })
            })
            .collect()
    }

    /// Pinhole estimate `F' × H_real / H_px`, where `F'` is the focal length
    /// rescaled from the reference height to `image_height_px`.
    ///
    /// `None` when the label has no known height or the box has no height.
    pub fn pinhole_distance(
        &self,
        label: &str,
        bbox_height_px: u32,
        image_height_px: u32,
    ) -> Option<f32> {
        let known_height = self.tables.known_height(label)?;
        if bbox_height_px == 0 {
            return None;
        }
        let scaled_focal = self.focal_length_px * (image_height_px as f32 / self.reference_height_px);
        let distance = scaled_focal * known_height / bbox_height_px as f32;
        Some(round_cm(distance.clamp(PINHOLE_MIN_DISTANCE_M, PINHOLE_MAX_DISTANCE_M)))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Depth-map strategy
// ────────────────────────────────────────────────────────────────────────────

/// Depth-map estimate for `bbox`, or `None` when the clipped box is empty,
/// the sampled median is not positive, or the map has no dynamic range.
pub fn depth_map_distance(map: &DepthMap, bbox: &BoundingBox) -> Option<f32> {
    let (w, h) = (map.width() as i64, map.height() as i64);
    let x1 = (bbox.x1 as i64).max(0);
    let y1 = (bbox.y1 as i64).max(0);
    let x2 = (bbox.x2 as i64).min(w);
    let y2 = (bbox.y2 as i64).min(h);
    if x2 <= x1 || y2 <= y1 {
        return None;
    }
    let (x1, y1, x2, y2) = (x1 as usize, y1 as usize, x2 as usize, y2 as usize);

    // Centre 60 % of the box keeps background and occluder edges out.
    let cx = (x1 + x2) / 2;
    let cy = (y1 + y2) / 2;
    let rw = (((x2 - x1) as f32 * CENTRE_HALF_FRACTION) as usize).max(1);
    let rh = (((y2 - y1) as f32 * CENTRE_HALF_FRACTION) as usize).max(1);
    let rx1 = cx.saturating_sub(rw);
    let ry1 = cy.saturating_sub(rh);
    let rx2 = (cx + rw).min(map.width());
    let ry2 = (cy + rh).min(map.height());

    let mut samples = map.region(rx1, ry1, rx2, ry2);
    if samples.is_empty() {
        samples = map.region(x1, y1, x2, y2);
    }

    let median_val = median(&mut samples)?;
    if median_val <= 0.0 {
        return None;
    }

    let (depth_min, depth_max) = map.min_max()?;
    let range = depth_max - depth_min;
    if range <= 0.0 {
        return None;
    }

    Some(closeness_to_metres((median_val - depth_min) / range))
}

/// Map normalized closeness (`1` = nearest pixel in the frame, `0` =
/// farthest) linearly onto `[0.3, 15.0]` m.
///
/// The result never increases as closeness grows.
pub fn closeness_to_metres(closeness: f32) -> f32 {
    if closeness <= FAR_CLOSENESS {
        return DEPTH_MAX_DISTANCE_M;
    }
    let distance =
        DEPTH_MIN_DISTANCE_M + (1.0 - closeness) * (DEPTH_MAX_DISTANCE_M - DEPTH_MIN_DISTANCE_M);
    round_cm(distance.clamp(DEPTH_MIN_DISTANCE_M, DEPTH_MAX_DISTANCE_M))
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Average of the strategies that succeeded; `0.0` when none did.
pub fn fuse(from_depth: Option<f32>, from_pinhole: Option<f32>) -> f32 {
    let estimates: Vec<f32> = [from_depth, from_pinhole]
        .into_iter()
        .flatten()
        .filter(|d| *d > 0.0)
        .collect();
    if estimates.is_empty() {
        return 0.0;
    }
    round_cm(estimates.iter().sum::<f32>() / estimates.len() as f32)
}

/// Median; even-length inputs average the two middle values.
fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) * 0.5)
    } else {
        Some(values[mid])
    }
}

fn round_cm(metres: f32) -> f32 {
    (metres * 100.0).round() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
