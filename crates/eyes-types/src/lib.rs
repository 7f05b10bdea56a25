//! `eyes-types` – shared data model for the EYES perception core.
//!
//! Every value here lives for exactly one camera frame, except the
//! [`ClassificationTables`][tables::ClassificationTables] and
//! [`PerceptionSettings`][settings::PerceptionSettings], which are built once
//! at process start and shared read-only.

pub mod settings;
pub mod tables;

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use settings::PerceptionSettings;
pub use tables::{ClassificationTables, Criticality, Denomination, SceneRule};

/// Label used for the priority sentinel when a frame has no detections.
pub const NO_OBJECT_LABEL: &str = "No object";

/// Pixel-space box `(x1, y1, x2, y2)`, serialized as a four-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Saturates at the `i32` bounds for extreme coordinates.
    pub fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Reject inverted boxes (`x2 < x1` or `y2 < y1`). Zero-area boxes are
    /// allowed; they simply degrade the depth-map strategy.
    pub fn validate(&self, label: &str) -> Result<(), EyesError> {
        if self.x2 < self.x1 || self.y2 < self.y1 {
            return Err(EyesError::InvalidBoundingBox {
                label: label.to_string(),
                x1: self.x1,
                y1: self.y1,
                x2: self.x2,
                y2: self.y2,
            });
        }
        Ok(())
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One recognized object instance, as produced by the external detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub bbox_height_px: u32,
}

impl Detection {
    /// Build a detection whose pixel height is derived from the box.
    ///
    /// # Errors
    ///
    /// [`EyesError::InvalidBoundingBox`] when the box is inverted.
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Result<Self, EyesError> {
        let label = label.into();
        bbox.validate(&label)?;
        Ok(Self {
            bbox_height_px: bbox.height() as u32,
            label,
            confidence,
            bbox,
        })
    }
}

/// A [`Detection`] with its fused distance attached.
///
/// `distance == 0.0` means "unknown"; it is never a real measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangedDetection {
    pub detection: Detection,
    pub distance: f32,
}

impl RangedDetection {
    pub fn label(&self) -> &str {
        &self.detection.label
    }

    pub fn confidence(&self) -> f32 {
        self.detection.confidence
    }

    pub fn has_distance(&self) -> bool {
        self.distance > 0.0
    }
}

/// Wire shape of a row-major grid, validated into [`DepthMap`] or [`LumaFrame`].
#[derive(Debug, Deserialize)]
pub struct GridData<T> {
    pub width: usize,
    pub height: usize,
    pub data: Vec<T>,
}

/// Dense `height × width` relative inverse-depth grid (higher = closer).
///
/// The scale is arbitrary and changes from frame to frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "GridData<f32>")]
pub struct DepthMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl DepthMap {
    /// Wrap a row-major buffer.
    ///
    /// # Errors
    ///
    /// [`EyesError::DepthMapShape`] when `data.len() != width * height`.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, EyesError> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(EyesError::DepthMapShape {
                width,
                height,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Copy out the values inside `[x1, x2) × [y1, y2)`. Bounds must already
    /// be clipped to the map.
    pub fn region(&self, x1: usize, y1: usize, x2: usize, y2: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(x2.saturating_sub(x1) * y2.saturating_sub(y1));
        for y in y1..y2 {
            let row = &self.data[y * self.width..(y + 1) * self.width];
            out.extend_from_slice(&row[x1..x2]);
        }
        out
    }

    /// Global `(min, max)` over the whole map, or `None` when empty.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

impl TryFrom<GridData<f32>> for DepthMap {
    type Error = EyesError;

    fn try_from(raw: GridData<f32>) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height, raw.data)
    }
}

/// 8-bit greyscale frame used for the low-light check.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "GridData<u8>")]
pub struct LumaFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl LumaFrame {
    /// # Errors
    ///
    /// [`EyesError::LumaFrameShape`] when `data.len() != width * height`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, EyesError> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(EyesError::LumaFrameShape {
                width,
                height,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }
}

impl TryFrom<GridData<u8>> for LumaFrame {
    type Error = EyesError;

    fn try_from(raw: GridData<u8>) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height, raw.data)
    }
}

/// One entry of the priority shortlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PriorityItem {
    pub label: String,
    pub distance: f32,
    pub confidence: f32,
}

impl PriorityItem {
    /// The sentinel returned when a frame has nothing to rank.
    pub fn no_object() -> Self {
        Self {
            label: NO_OBJECT_LABEL.to_string(),
            distance: 0.0,
            confidence: 0.0,
        }
    }
}

/// Coarse environment label inferred from the set of detected labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SceneLabel {
    Kitchen,
    Bathroom,
    Bedroom,
    #[serde(rename = "Living room")]
    LivingRoom,
    #[serde(rename = "Dining area")]
    DiningArea,
    #[serde(rename = "Office / Desk")]
    OfficeDesk,
    #[serde(rename = "Outdoor / Street")]
    OutdoorStreet,
    #[serde(rename = "Outdoor / Road")]
    OutdoorRoad,
    #[serde(rename = "Outdoor / Park")]
    OutdoorPark,
    #[serde(rename = "General area")]
    GeneralArea,
    Unknown,
}

impl SceneLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneLabel::Kitchen => "Kitchen",
            SceneLabel::Bathroom => "Bathroom",
            SceneLabel::Bedroom => "Bedroom",
            SceneLabel::LivingRoom => "Living room",
            SceneLabel::DiningArea => "Dining area",
            SceneLabel::OfficeDesk => "Office / Desk",
            SceneLabel::OutdoorStreet => "Outdoor / Street",
            SceneLabel::OutdoorRoad => "Outdoor / Road",
            SceneLabel::OutdoorPark => "Outdoor / Park",
            SceneLabel::GeneralArea => "General area",
            SceneLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SceneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which alert rule fired. Severity is implied by the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTier {
    /// A critical object inside the very-close threshold.
    UrgentCritical,
    /// A hazard object inside the very-close threshold.
    UrgentHazard,
    /// Any other object inside the very-close threshold.
    UrgentNeutral,
    /// A critical object inside the close threshold.
    Proximity,
}

/// A proximity alert destined for the spoken feedback layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub tier: AlertTier,
    pub label: String,
    pub distance: f32,
    pub message: String,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Distance bucket used to pick the haptic intensity on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProximityBand {
    VeryClose,
    Close,
    Medium,
    Far,
    Unknown,
}

/// Everything the external collaborators hand over for one frame.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameInput {
    /// Height of the original (pre-resize) camera image.
    pub image_height_px: u32,
    #[serde(default)]
    pub detections: Vec<Detection>,
    /// Absent when the detector found nothing.
    #[serde(default)]
    pub depth_map: Option<DepthMap>,
    #[serde(default)]
    pub luma: Option<LumaFrame>,
}

/// Per-detection entry of the frame result.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct DetectionReport {
    pub label: String,
    pub confidence: f32,
    #[schemars(with = "[i32; 4]")]
    pub bbox: BoundingBox,
    pub distance: f32,
    pub band: ProximityBand,
}

/// Structured output of one processed frame, handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct FrameResult {
    pub priority_objects: Vec<PriorityItem>,
    pub alerts: Vec<String>,
    pub scene_type: SceneLabel,
    pub currency: Option<String>,
    pub detections: Vec<DetectionReport>,
    pub low_light: bool,
    /// Wall-clock processing time in seconds.
    pub processing_time: f64,
}

/// `width × height` for error messages, without overflowing.
fn grid_len(width: &usize, height: &usize) -> String {
    match width.checked_mul(*height) {
        Some(n) => n.to_string(),
        None => "more than usize::MAX".to_string(),
    }
}

/// Caller contract violations. Degraded signals are never errors.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EyesError {
    #[error("Invalid bounding box for '{label}': ({x1}, {y1}, {x2}, {y2})")]
    InvalidBoundingBox {
        label: String,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    },

    #[error("max_items must be at least 1")]
    InvalidMaxItems,

    #[error("image_height_px must be positive")]
    InvalidImageHeight,

    #[error("Depth map shape mismatch: {width}x{height} needs {} values, got {actual}", grid_len(.width, .height))]
    DepthMapShape {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("Luma frame shape mismatch: {width}x{height} needs {} values, got {actual}", grid_len(.width, .height))]
    LumaFrameShape {
        width: usize,
        height: usize,
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_serializes_as_array() {
        let json = serde_json::to_string(&BoundingBox::new(1, 2, 30, 40)).unwrap();
        assert_eq!(json, "[1,2,30,40]");
        let back: BoundingBox = serde_json::from_str("[5,6,7,8]").unwrap();
        assert_eq!(back, BoundingBox::new(5, 6, 7, 8));
    }

    #[test]
    fn inverted_bbox_is_rejected() {
        let err = Detection::new("car", 0.9, BoundingBox::new(50, 0, 10, 20)).unwrap_err();
        assert!(matches!(err, EyesError::InvalidBoundingBox { .. }));
        assert!(err.to_string().contains("car"));

        assert!(BoundingBox::new(0, 30, 10, 20).validate("x").is_err());
    }

    #[test]
    fn detection_new_derives_pixel_height() {
        let det = Detection::new("person", 0.8, BoundingBox::new(10, 20, 60, 220)).unwrap();
        assert_eq!(det.bbox_height_px, 200);
    }

    #[test]
    fn depth_map_shape_is_checked() {
        let err = DepthMap::new(3, 2, vec![0.0; 5]).unwrap_err();
        assert_eq!(
            err,
            EyesError::DepthMapShape {
                width: 3,
                height: 2,
                actual: 5
            }
        );
        assert!(err.to_string().contains("needs 6 values"));
    }

    #[test]
    fn oversized_depth_map_header_is_rejected() {
        // usize::MAX × 2 overflows; the wrapped product must not pass the check.
        let err = DepthMap::new(usize::MAX, 2, vec![]).unwrap_err();
        assert!(matches!(err, EyesError::DepthMapShape { actual: 0, .. }));
        assert!(err.to_string().contains("more than usize::MAX"), "{err}");

        let half = 1_usize << (usize::BITS / 2);
        assert!(DepthMap::new(half, half, vec![]).is_err());
    }

    #[test]
    fn oversized_depth_map_in_frame_json_fails_to_parse() {
        let json = format!(
            r#"{{"image_height_px":640,"depth_map":{{"width":{big},"height":{big},"data":[]}}}}"#,
            big = 1_u64 << 32
        );
        let err = serde_json::from_str::<FrameInput>(&json).unwrap_err();
        assert!(err.to_string().contains("Depth map shape mismatch"), "{err}");
    }

    #[test]
    fn luma_frame_shape_is_checked() {
        let err = LumaFrame::new(4, 2, vec![0; 7]).unwrap_err();
        assert_eq!(
            err,
            EyesError::LumaFrameShape {
                width: 4,
                height: 2,
                actual: 7
            }
        );
        assert!(err.to_string().contains("needs 8 values"));

        let half = 1_usize << (usize::BITS / 2);
        assert!(matches!(
            LumaFrame::new(half, half, vec![]),
            Err(EyesError::LumaFrameShape { .. })
        ));
        assert!(serde_json::from_str::<LumaFrame>(r#"{"width":2,"height":2,"data":[1,2,3]}"#).is_err());
    }

    #[test]
    fn extreme_bbox_coordinates_saturate() {
        let b = BoundingBox::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(b.width(), i32::MAX);
        assert_eq!(b.height(), i32::MAX);
        let det = Detection::new("car", 0.5, b).unwrap();
        assert_eq!(det.bbox_height_px, i32::MAX as u32);
    }

    #[test]
    fn depth_map_region_and_range() {
        // 3×2 grid:
        // 1 2 3
        // 4 5 6
        let map = DepthMap::new(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(map.get(2, 1), 6.0);
        assert_eq!(map.region(1, 0, 3, 2), vec![2.0, 3.0, 5.0, 6.0]);
        assert_eq!(map.min_max(), Some((1.0, 6.0)));
        assert_eq!(DepthMap::new(0, 0, vec![]).unwrap().min_max(), None);
    }

    #[test]
    fn depth_map_deserialize_validates_shape() {
        let ok: DepthMap =
            serde_json::from_str(r#"{"width":2,"height":1,"data":[0.5,1.5]}"#).unwrap();
        assert_eq!(ok.width(), 2);
        let bad = serde_json::from_str::<DepthMap>(r#"{"width":2,"height":2,"data":[0.5]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn frame_input_optional_fields_default() {
        let input: FrameInput = serde_json::from_str(
            r#"{"image_height_px":640,"detections":[{"label":"dog","confidence":0.7,"bbox":[0,0,10,10],"bbox_height_px":10}]}"#,
        )
        .unwrap();
        assert_eq!(input.detections.len(), 1);
        assert!(input.depth_map.is_none());
        assert!(input.luma.is_none());
    }

    #[test]
    fn scene_label_serializes_as_display_name() {
        let json = serde_json::to_string(&SceneLabel::OfficeDesk).unwrap();
        assert_eq!(json, "\"Office / Desk\"");
        assert_eq!(SceneLabel::LivingRoom.to_string(), "Living room");
        let back: SceneLabel = serde_json::from_str("\"General area\"").unwrap();
        assert_eq!(back, SceneLabel::GeneralArea);
    }

    #[test]
    fn no_object_sentinel() {
        let s = PriorityItem::no_object();
        assert_eq!(s.label, "No object");
        assert_eq!(s.distance, 0.0);
        assert_eq!(s.confidence, 0.0);
    }

    #[test]
    fn eyes_error_roundtrip() {
        let err = EyesError::InvalidMaxItems;
        let json = serde_json::to_string(&err).unwrap();
        let back: EyesError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
