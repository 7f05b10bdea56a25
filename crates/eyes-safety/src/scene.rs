//! [`SceneClassifier`] – rule-based coarse environment label.
//!
//! Each [`SceneRule`][eyes_types::SceneRule] names a set of labels that
//! corroborate a scene. A rule matches when at least `min(2, |required|)` of
//! its labels are present, so multi-label rules need two corroborating
//! detections while single-label rules need one. Among matching rules the one
//! with the largest overlap wins; on a tie the rule declared first wins.

use std::collections::HashSet;
use std::sync::Arc;

use eyes_types::{ClassificationTables, Detection, SceneLabel};

/// Corroborating labels a multi-label rule needs before it can match.
const MIN_CORROBORATION: usize = 2;

#[derive(Debug, Clone)]
pub struct SceneClassifier {
    tables: Arc<ClassificationTables>,
}

impl SceneClassifier {
    pub fn new(tables: Arc<ClassificationTables>) -> Self {
        Self { tables }
    }

    /// Best-matching scene for a set of detected labels.
    ///
    /// - empty set → [`SceneLabel::Unknown`]
    /// - no rule matches → [`SceneLabel::GeneralArea`]
    pub fn classify(&self, labels: &HashSet<&str>) -> SceneLabel {
        if labels.is_empty() {
            return SceneLabel::Unknown;
        }

        let mut best = SceneLabel::GeneralArea;
        let mut best_overlap = 0;
        for rule in &self.tables.scene_rules {
            let overlap = rule
                .required
                .iter()
                .filter(|label| labels.contains(label.as_str()))
                .count();
            let min_needed = MIN_CORROBORATION.min(rule.required.len());
            if overlap >= min_needed && overlap > best_overlap {
                best_overlap = overlap;
                best = rule.scene;
            }
        }
        best
    }

    /// Convenience wrapper over [`classify`](Self::classify) for a frame.
    pub fn classify_detections(&self, detections: &[Detection]) -> SceneLabel {
        let labels: HashSet<&str> = detections.iter().map(|d| d.label.as_str()).collect();
        self.classify(&labels)
    }
}
