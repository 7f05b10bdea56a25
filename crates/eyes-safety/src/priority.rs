//! [`PriorityEngine`] – ranks detections and raises proximity alerts.
//!
//! Every ranged detection gets a score:
//!
//! ```text
//! score = 100 · [critical] + proximity_bonus + 20 · confidence
//! proximity_bonus = max(0, 50 − 5 · distance)   if distance > 0
//!                 = unknown_distance_bonus      otherwise (default 10)
//! ```
//!
//! The critical bonus is larger than the combined proximity and confidence
//! ceilings (50 + 20), so a far critical object always outranks a near
//! neutral one.
//!
//! Alerts are computed independently of the ranking and keep input order.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use eyes_safety::PriorityEngine;
//! use eyes_types::{
//!     BoundingBox, ClassificationTables, Detection, PerceptionSettings, RangedDetection,
//! };
//!
//! let engine = PriorityEngine::new(
//!     Arc::new(ClassificationTables::default()),
//!     &PerceptionSettings::default(),
//! );
//! let car = RangedDetection {
//!     detection: Detection::new("car", 0.9, BoundingBox::new(0, 0, 50, 50)).unwrap(),
//!     distance: 0.5,
//! };
//!
//! let top = engine.rank(&[car.clone()], 3).unwrap();
//! assert_eq!(top[0].label, "car");
//!
//! let alerts = engine.alerts(&[car]);
//! assert_eq!(alerts.len(), 1);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use eyes_types::{
    Alert, AlertTier, ClassificationTables, Criticality, EyesError, PerceptionSettings,
    PriorityItem, ProximityBand, RangedDetection,
};
use tracing::debug;

/// Bonus for labels in the critical tier.
pub const CRITICAL_BONUS: f32 = 100.0;
/// Proximity bonus at zero distance.
pub const PROXIMITY_CEILING: f32 = 50.0;
/// Proximity bonus lost per metre.
pub const PROXIMITY_FALLOFF_PER_M: f32 = 5.0;
/// Multiplier on detector confidence.
pub const CONFIDENCE_WEIGHT: f32 = 20.0;

/// Scores, ranks and deduplicates detections; emits alert messages.
#[derive(Debug, Clone)]
pub struct PriorityEngine {
    tables: Arc<ClassificationTables>,
    very_close: f32,
    close: f32,
    medium: f32,
    unknown_distance_bonus: f32,
}

impl PriorityEngine {
    pub fn new(tables: Arc<ClassificationTables>, settings: &PerceptionSettings) -> Self {
        Self {
            tables,
            very_close: settings.distance_very_close,
            close: settings.distance_close,
            medium: settings.distance_medium,
            unknown_distance_bonus: settings.unknown_distance_bonus,
        }
    }

    /// Safety score of a single detection. Higher is more important.
    pub fn score(&self, det: &RangedDetection) -> f32 {
        let critical = if self.tables.is_critical(det.label()) {
            CRITICAL_BONUS
        } else {
            0.0
        };
        let proximity = if det.has_distance() {
            (PROXIMITY_CEILING - PROXIMITY_FALLOFF_PER_M * det.distance).max(0.0)
        } else {
            self.unknown_distance_bonus
        };
        critical + proximity + det.confidence() * CONFIDENCE_WEIGHT
    }

    /// Top `max_items` detections by score, one per label.
    ///
    /// Equal scores keep input order. An empty frame yields the single
    /// [`PriorityItem::no_object`] sentinel.
    ///
    /// # Errors
    ///
    /// [`EyesError::InvalidMaxItems`] when `max_items` is zero.
    pub fn rank(
        &self,
        detections: &[RangedDetection],
        max_items: usize,
    ) -> Result<Vec<PriorityItem>, EyesError> {
        if max_items == 0 {
            return Err(EyesError::InvalidMaxItems);
        }
        if detections.is_empty() {
            return Ok(vec![PriorityItem::no_object()]);
        }

        let mut scored: Vec<(f32, &RangedDetection)> =
            detections.iter().map(|d| (self.score(d), d)).collect();
        // sort_by is stable
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut seen: HashSet<&str> = HashSet::new();
        Ok(scored
            .into_iter()
            .filter(|(_, d)| seen.insert(d.label()))
            .take(max_items)
            .map(|(_, d)| PriorityItem {
                label: d.label().to_string(),
                distance: d.distance,
                confidence: d.confidence(),
            })
            .collect())
    }

    /// Proximity alerts in input order.
    ///
    /// | Distance | Critical | Hazard | Neutral |
    /// |---|---|---|---|
    /// | unknown (`≤ 0`) | – | – | – |
    /// | `≤ very_close` | urgent | urgent | urgent |
    /// | `≤ close` | standard | – | – |
    /// | farther | – | – | – |
    pub fn alerts(&self, detections: &[RangedDetection]) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for det in detections {
            if !det.has_distance() {
                continue;
            }
            let label = det.label();
            let d = det.distance;
            let shown = display_metres(d);
            let criticality = self.tables.criticality(label);

            let fired = if d <= self.very_close {
                Some(match criticality {
                    Criticality::Critical => (
                        AlertTier::UrgentCritical,
                        format!("⚠️ Danger: {label} very close – {shown:.1}m"),
                    ),
                    Criticality::Hazard => (
                        AlertTier::UrgentHazard,
                        format!("⚠️ Caution: {label} very close – {shown:.1}m"),
                    ),
                    Criticality::Neutral => (
                        AlertTier::UrgentNeutral,
                        format!("{label} very close – {shown:.1}m"),
                    ),
                })
            } else if d <= self.close && criticality == Criticality::Critical {
                Some((AlertTier::Proximity, format!("{label} nearby – {shown:.1}m")))
            } else {
                None
            };

            if let Some((tier, message)) = fired {
                debug!(label, distance = d, ?tier, "proximity alert");
                alerts.push(Alert {
                    tier,
                    label: label.to_string(),
                    distance: d,
                    message,
                });
            }
        }
        alerts
    }

    /// Haptic band for a fused distance.
    pub fn band(&self, distance: f32) -> ProximityBand {
        if distance <= 0.0 {
            ProximityBand::Unknown
        } else if distance <= self.very_close {
            ProximityBand::VeryClose
        } else if distance <= self.close {
            ProximityBand::Close
        } else if distance <= self.medium {
            ProximityBand::Medium
        } else {
            ProximityBand::Far
        }
    }
}

/// Centimetre-rounded distance widened to `f64` for display.
///
/// A centimetre value such as 2.35 is stored in `f32` just below the decimal
/// and would print as "2.3"; re-rounding after widening restores the decimal.
pub fn display_metres(distance: f32) -> f64 {
    (f64::from(distance) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyes_types::{BoundingBox, Detection};

    // ------------------------------------------------------------------ helpers
    fn engine() -> PriorityEngine {
        PriorityEngine::new(
            Arc::new(ClassificationTables::default()),
            &PerceptionSettings::default(),
        )
    }

    fn ranged(label: &str, confidence: f32, distance: f32) -> RangedDetection {
        RangedDetection {
            detection: Detection::new(label, confidence, BoundingBox::new(0, 0, 10, 10)).unwrap(),
            distance,
        }
    }

    // ------------------------------------------------------------------ score

    #[test]
    fn score_components() {
        let e = engine();
        // 100 + (50 − 10) + 0.5 × 20
        assert!((e.score(&ranged("car", 0.5, 2.0)) - 150.0).abs() < 1e-4);
        // 0 + 0 (clamped) + 1.0 × 20
        assert!((e.score(&ranged("vase", 1.0, 12.0)) - 20.0).abs() < 1e-4);
        // unknown distance: flat 10
        assert!((e.score(&ranged("vase", 0.0, 0.0)) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn unknown_distance_sits_between_near_and_far() {
        let e = engine();
        let unknown = e.score(&ranged("vase", 0.5, 0.0));
        let far = e.score(&ranged("vase", 0.5, 15.0));
        let near = e.score(&ranged("vase", 0.5, 1.0));
        assert!(far < unknown && unknown < near);
    }

    #[test]
    fn unknown_distance_bonus_is_configurable() {
        let settings = PerceptionSettings {
            unknown_distance_bonus: 0.0,
            ..PerceptionSettings::default()
        };
        let e = PriorityEngine::new(Arc::new(ClassificationTables::default()), &settings);
        assert_eq!(e.score(&ranged("vase", 0.0, 0.0)), 0.0);
    }

    // ------------------------------------------------------------------ rank

    #[test]
    fn far_critical_outranks_near_neutral() {
        let top = engine()
            .rank(&[ranged("vase", 1.0, 0.1), ranged("person", 0.0, 10.0)], 3)
            .unwrap();
        assert_eq!(top[0].label, "person");
        assert_eq!(top[1].label, "vase");
    }

    #[test]
    fn duplicate_labels_keep_highest_score() {
        let top = engine()
            .rank(
                &[
                    ranged("car", 0.4, 8.0),
                    ranged("car", 0.9, 2.0),
                    ranged("chair", 0.9, 1.0),
                ],
                3,
            )
            .unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].label, "car");
        assert_eq!(top[0].distance, 2.0);
        assert_eq!(top[0].confidence, 0.9);
    }

    #[test]
    fn output_is_truncated_to_max_items() {
        let dets = vec![
            ranged("car", 0.9, 1.0),
            ranged("dog", 0.9, 2.0),
            ranged("person", 0.9, 3.0),
            ranged("bus", 0.9, 4.0),
        ];
        let top = engine().rank(&dets, 3).unwrap();
        assert_eq!(top.len(), 3);
        let labels: Vec<_> = top.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["car", "dog", "person"]);
        assert_eq!(engine().rank(&dets, 1).unwrap().len(), 1);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let top = engine()
            .rank(&[ranged("vase", 0.5, 2.0), ranged("book", 0.5, 2.0)], 2)
            .unwrap();
        assert_eq!(top[0].label, "vase");
        assert_eq!(top[1].label, "book");
    }

    #[test]
    fn empty_frame_yields_sentinel() {
        let top = engine().rank(&[], 3).unwrap();
        assert_eq!(top, vec![PriorityItem::no_object()]);
    }

    #[test]
    fn zero_max_items_is_rejected() {
        assert_eq!(
            engine().rank(&[ranged("car", 0.9, 1.0)], 0),
            Err(EyesError::InvalidMaxItems)
        );
    }

    // ------------------------------------------------------------------ alerts

    #[test]
    fn critical_alert_tiers_by_distance() {
        let e = engine();
        let urgent = e.alerts(&[ranged("car", 0.9, 0.5)]);
        assert_eq!(urgent[0].tier, AlertTier::UrgentCritical);
        assert_eq!(urgent[0].message, "⚠️ Danger: car very close – 0.5m");

        let standard = e.alerts(&[ranged("car", 0.9, 2.0)]);
        assert_eq!(standard[0].tier, AlertTier::Proximity);
        assert_eq!(standard[0].message, "car nearby – 2.0m");

        assert!(e.alerts(&[ranged("car", 0.9, 3.5)]).is_empty());
    }

    #[test]
    fn hazard_and_neutral_only_alert_when_very_close() {
        let e = engine();
        let hazard = e.alerts(&[ranged("chair", 0.9, 0.8)]);
        assert_eq!(hazard[0].tier, AlertTier::UrgentHazard);
        assert!(hazard[0].message.contains("Caution"));

        let neutral = e.alerts(&[ranged("vase", 0.9, 1.0)]);
        assert_eq!(neutral[0].tier, AlertTier::UrgentNeutral);
        assert_eq!(neutral[0].to_string(), "vase very close – 1.0m");

        assert!(e.alerts(&[ranged("chair", 0.9, 2.0)]).is_empty());
        assert!(e.alerts(&[ranged("vase", 0.9, 2.0)]).is_empty());
    }

    #[test]
    fn unknown_distance_never_alerts() {
        assert!(engine().alerts(&[ranged("car", 0.9, 0.0)]).is_empty());
    }

    #[test]
    fn alerts_preserve_input_order() {
        let alerts = engine().alerts(&[
            ranged("vase", 0.9, 0.5),
            ranged("bus", 0.9, 2.5),
            ranged("car", 0.9, 0.3),
        ]);
        let labels: Vec<_> = alerts.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, ["vase", "bus", "car"]);
    }

    // ------------------------------------------------------------------ band

    #[test]
    fn alert_text_rounds_centimetres_half_up() {
        let e = engine();
        let near = e.alerts(&[ranged("car", 0.9, 2.35)]);
        assert_eq!(near[0].message, "car nearby – 2.4m");
        let urgent = e.alerts(&[ranged("car", 0.9, 0.45)]);
        assert_eq!(urgent[0].message, "⚠️ Danger: car very close – 0.5m");
        assert_eq!(display_metres(2.35), 2.35);
    }

    #[test]
    fn proximity_bands() {
        let e = engine();
        assert_eq!(e.band(0.0), ProximityBand::Unknown);
        assert_eq!(e.band(1.0), ProximityBand::VeryClose);
        assert_eq!(e.band(2.9), ProximityBand::Close);
        assert_eq!(e.band(5.0), ProximityBand::Medium);
        assert_eq!(e.band(5.1), ProximityBand::Far);
    }
}
