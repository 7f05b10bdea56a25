//! [`FramePipeline`] – runs one camera frame through the perception core.
//!
//! Each call to [`FramePipeline::process`]:
//!
//! 1. **Light** – when a greyscale frame is supplied, flag low light.
//! 2. **Range** – fuse depth map and pinhole geometry into a distance per
//!    detection ([`DistanceEstimator`]).
//! 3. **Scene** – infer a coarse scene label ([`SceneClassifier`]).
//! 4. **Currency** – summarize bills and coins ([`CurrencyAggregator`]).
//! 5. **Prioritize** – rank the shortlist and raise alerts
//!    ([`PriorityEngine`]).
//!
//! Steps 3–5 only read the output of step 2. The pipeline holds no per-frame
//! state, so a single instance may process independent frames from several
//! threads at once.
//!
//! # Example
//!
//! ```
//! use eyes_runtime::pipeline::FramePipeline;
//! use eyes_types::{FrameInput, SceneLabel};
//!
//! let pipeline = FramePipeline::with_defaults();
//! let empty = FrameInput {
//!     image_height_px: 640,
//!     detections: Vec::new(),
//!     depth_map: None,
//!     luma: None,
//! };
//!
//! let result = pipeline.process(&empty).unwrap();
//! assert_eq!(result.priority_objects[0].label, "No object");
//! assert_eq!(result.scene_type, SceneLabel::Unknown);
//! assert!(result.alerts.is_empty());
//! assert!(result.currency.is_none());
//! ```

use std::sync::Arc;
use std::time::Instant;

use eyes_perception::{DistanceEstimator, is_low_light};
use eyes_safety::{CurrencyAggregator, PriorityEngine, SceneClassifier};
use eyes_types::{
    ClassificationTables, DetectionReport, EyesError, FrameInput, FrameResult, PerceptionSettings,
};
use tracing::{info, warn};

/// The per-frame orchestrator.
#[derive(Debug, Clone)]
pub struct FramePipeline {
    estimator: DistanceEstimator,
    priority: PriorityEngine,
    scene: SceneClassifier,
    currency: CurrencyAggregator,
    settings: PerceptionSettings,
}

impl FramePipeline {
    /// Build every component from one shared set of tables.
    pub fn new(tables: Arc<ClassificationTables>, settings: PerceptionSettings) -> Self {
        Self {
            estimator: DistanceEstimator::new(Arc::clone(&tables), &settings),
            priority: PriorityEngine::new(Arc::clone(&tables), &settings),
            scene: SceneClassifier::new(Arc::clone(&tables)),
            currency: CurrencyAggregator::new(tables),
            settings,
        }
    }

    /// Pipeline over the built-in tables and calibration.
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(ClassificationTables::default()),
            PerceptionSettings::default(),
        )
    }

    pub fn settings(&self) -> &PerceptionSettings {
        &self.settings
    }

    /// Process one frame.
    ///
    /// # Errors
    ///
    /// - [`EyesError::InvalidBoundingBox`] – a detection box is inverted.
    /// - [`EyesError::InvalidImageHeight`] – detections were supplied with a
    ///   zero image height.
    /// - [`EyesError::InvalidMaxItems`] – `max_priority_items` is zero.
    pub fn process(&self, input: &FrameInput) -> Result<FrameResult, EyesError> {
        let started = Instant::now();

        let low_light = input
            .luma
            .as_ref()
            .is_some_and(|frame| is_low_light(frame, self.settings.low_light_threshold));
        if low_light {
            warn!(
                threshold = self.settings.low_light_threshold,
                "low-light frame; detections may be unreliable"
            );
        }

        let ranged = self.estimator.estimate_all(
            input.depth_map.as_ref(),
            &input.detections,
            input.image_height_px,
        )?;

        let scene_type = self.scene.classify_detections(&input.detections);
        let currency = self.currency.summarize(&input.detections);
        let priority_objects = self
            .priority
            .rank(&ranged, self.settings.max_priority_items)?;
        let alerts: Vec<String> = self
            .priority
            .alerts(&ranged)
            .into_iter()
            .map(|a| a.message)
            .collect();

        let detections = ranged
            .iter()
            .map(|r| DetectionReport {
                label: r.label().to_string(),
                confidence: round_to(r.confidence(), 1000.0),
                bbox: r.detection.bbox,
                distance: r.distance,
                band: self.priority.band(r.distance),
            })
            .collect();

        let processing_time = (started.elapsed().as_secs_f64() * 1000.0).round() / 1000.0;
        info!(
            detections = ranged.len(),
            priority = %priority_objects[0].label,
            scene = %scene_type,
            alerts = alerts.len(),
            depth_map = input.depth_map.is_some(),
            processing_time,
            "frame processed"
        );

        Ok(FrameResult {
            priority_objects,
            alerts,
            scene_type,
            currency,
            detections,
            low_light,
            processing_time,
        })
    }
}

/// JSON Schema of [`FrameResult`], the contract handed to the transport layer.
pub fn result_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(FrameResult);
    serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
}

fn round_to(value: f32, scale: f32) -> f32 {
    (value * scale).round() / scale
}
