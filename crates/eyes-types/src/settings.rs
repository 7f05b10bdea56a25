//! Calibration constants and thresholds for the perception core.

use serde::{Deserialize, Serialize};

/// Numeric knobs read once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionSettings {
    /// Focal length in pixels at [`reference_height_px`](Self::reference_height_px).
    pub focal_length_px: f32,
    /// Image height the focal length was calibrated at.
    pub reference_height_px: f32,
    /// Metres. Urgent alert for any tier.
    pub distance_very_close: f32,
    /// Metres. Standard alert for critical objects.
    pub distance_close: f32,
    /// Metres. Soft haptic band only, never alerts.
    pub distance_medium: f32,
    /// Mean brightness in `[0, 1]` below which a frame counts as low light.
    pub low_light_threshold: f32,
    /// Proximity bonus given to detections with unknown distance.
    pub unknown_distance_bonus: f32,
    pub max_priority_items: usize,
}

impl Default for PerceptionSettings {
    fn default() -> Self {
        Self {
            focal_length_px: 600.0,
            reference_height_px: 640.0,
            distance_very_close: 1.0,
            distance_close: 3.0,
            distance_medium: 5.0,
            low_light_threshold: 0.15,
            unknown_distance_bonus: 10.0,
            max_priority_items: 3,
        }
    }
}
