//! Static semantic tables: criticality tiers, physical heights, currency
//! denominations and scene rules.
//!
//! Built once (defaults or config file), then shared read-only behind an
//! `Arc`. Nothing in the perception core mutates a table after construction.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::SceneLabel;

/// Safety tier of a detector label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criticality {
    /// Imminent physical danger: vehicles, people, animals, sharp objects.
    Critical,
    /// Trip or collision hazard.
    Hazard,
    Neutral,
}

/// Display name and face value of one currency class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Denomination {
    pub name: String,
    pub value: f64,
}

/// One scene inference rule: the labels that corroborate `scene`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRule {
    pub required: BTreeSet<String>,
    pub scene: SceneLabel,
}

impl SceneRule {
    pub fn new(required: &[&str], scene: SceneLabel) -> Self {
        Self {
            required: required.iter().map(|s| s.to_string()).collect(),
            scene,
        }
    }
}

/// Process-wide classification data.
///
/// Every field falls back to the built-in default when absent from a config
/// file, so a `[tables]` section only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationTables {
    pub critical: BTreeSet<String>,
    pub hazard: BTreeSet<String>,
    /// Prefix for the formatted currency total.
    pub currency_symbol: String,
    /// Real-world height in metres of the dominant visible vertical extent.
    pub known_heights: BTreeMap<String, f32>,
    pub currency: BTreeMap<String, Denomination>,
    /// Evaluated in order; declare the most specific rule first.
    pub scene_rules: Vec<SceneRule>,
}

impl ClassificationTables {
    /// Tables with every set, map and rule list empty.
    pub fn empty() -> Self {
        Self {
            critical: BTreeSet::new(),
            hazard: BTreeSet::new(),
            known_heights: BTreeMap::new(),
            currency: BTreeMap::new(),
            currency_symbol: default_currency_symbol(),
            scene_rules: Vec::new(),
        }
    }

    /// Tier of `label`. A label listed in both sets is critical.
    pub fn criticality(&self, label: &str) -> Criticality {
        if self.critical.contains(label) {
            Criticality::Critical
        } else if self.hazard.contains(label) {
            Criticality::Hazard
        } else {
            Criticality::Neutral
        }
    }

    pub fn is_critical(&self, label: &str) -> bool {
        self.critical.contains(label)
    }

    pub fn known_height(&self, label: &str) -> Option<f32> {
        self.known_heights.get(label).copied()
    }

    pub fn denomination(&self, label: &str) -> Option<&Denomination> {
        self.currency.get(label)
    }
}

impl Default for ClassificationTables {
    fn default() -> Self {
        Self {
            critical: to_set(DEFAULT_CRITICAL),
            hazard: to_set(DEFAULT_HAZARD),
            known_heights: DEFAULT_KNOWN_HEIGHTS
                .iter()
                .map(|(label, h)| (label.to_string(), *h))
                .collect(),
            currency: DEFAULT_CURRENCY
                .iter()
                .map(|(label, name, value)| {
                    (
                        label.to_string(),
                        Denomination {
                            name: name.to_string(),
                            value: *value,
                        },
                    )
                })
                .collect(),
            currency_symbol: default_currency_symbol(),
            scene_rules: default_scene_rules(),
        }
    }
}

fn to_set(labels: &[&str]) -> BTreeSet<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

fn default_currency_symbol() -> String {
    "₱".to_string()
}

/// Default rule list, most specific first.
pub fn default_scene_rules() -> Vec<SceneRule> {
    vec![
        SceneRule::new(&["oven", "refrigerator", "sink", "microwave"], SceneLabel::Kitchen),
        SceneRule::new(&["toilet", "sink"], SceneLabel::Bathroom),
        SceneRule::new(&["bed", "clock"], SceneLabel::Bedroom),
        SceneRule::new(&["couch", "tv", "remote"], SceneLabel::LivingRoom),
        SceneRule::new(
            &["dining table", "cup", "fork", "knife", "spoon", "bowl"],
            SceneLabel::DiningArea,
        ),
        SceneRule::new(&["laptop", "keyboard", "mouse", "monitor"], SceneLabel::OfficeDesk),
        SceneRule::new(
            &["car", "truck", "bus", "traffic light", "stop sign"],
            SceneLabel::OutdoorStreet,
        ),
        SceneRule::new(&["bicycle", "motorcycle"], SceneLabel::OutdoorRoad),
        SceneRule::new(&["bench", "potted plant", "bird"], SceneLabel::OutdoorPark),
        SceneRule::new(&["person"], SceneLabel::GeneralArea),
    ]
}

const DEFAULT_CRITICAL: &[&str] = &[
    // moving vehicles
    "car", "truck", "bus", "motorcycle", "bicycle", "train",
    // traffic infrastructure
    "traffic light", "stop sign", "fire hydrant", "parking meter",
    // living beings that move unpredictably
    "person", "dog", "horse", "cow", "elephant", "bear",
    // sharp or heavy handheld objects
    "knife", "scissors", "baseball bat",
];

const DEFAULT_HAZARD: &[&str] = &[
    "bench", "potted plant", "suitcase", "backpack", "skateboard", "sports ball", "bird", "cat",
    "sheep", "zebra", "couch", "chair", "dining table",
];

const DEFAULT_CURRENCY: &[(&str, &str, f64)] = &[
    ("20_peso", "₱20 bill", 20.0),
    ("50_peso", "₱50 bill", 50.0),
    ("100_peso", "₱100 bill", 100.0),
    ("200_peso", "₱200 bill", 200.0),
    ("500_peso", "₱500 bill", 500.0),
    ("1000_peso", "₱1000 bill", 1000.0),
    ("coin_1", "₱1 coin", 1.0),
    ("coin_5", "₱5 coin", 5.0),
    ("coin_10", "₱10 coin", 10.0),
];

// Heights for all 80 COCO classes.
const DEFAULT_KNOWN_HEIGHTS: &[(&str, f32)] = &[
    // people & riding
    ("person", 1.7),
    ("bicycle", 1.0),
    ("motorcycle", 1.1),
    ("skateboard", 0.15),
    ("surfboard", 1.8),
    ("skis", 1.6),
    ("snowboard", 1.4),
    // vehicles
    ("car", 1.5),
    ("truck", 3.0),
    ("bus", 3.2),
    ("train", 3.5),
    ("airplane", 5.0),
    ("boat", 2.0),
    // traffic infrastructure
    ("traffic light", 0.6),
    ("fire hydrant", 0.6),
    ("stop sign", 0.75),
    ("parking meter", 1.2),
    ("bench", 0.5),
    // animals (shoulder height unless noted)
    ("bird", 0.2),
    ("cat", 0.3),
    ("dog", 0.5),
    ("horse", 1.6),
    ("sheep", 0.9),
    ("cow", 1.4),
    ("elephant", 3.0),
    ("bear", 1.2),
    ("zebra", 1.5),
    ("giraffe", 5.0),
    // accessories
    ("backpack", 0.45),
    ("umbrella", 0.9),
    ("handbag", 0.3),
    ("tie", 1.4),
    ("suitcase", 0.7),
    // sports
    ("frisbee", 0.27),
    ("sports ball", 0.22),
    ("kite", 0.8),
    ("baseball bat", 0.85),
    ("baseball glove", 0.25),
    ("tennis racket", 0.68),
    // food & kitchen
    ("bottle", 0.25),
    ("wine glass", 0.22),
    ("cup", 0.15),
    ("fork", 0.20),
    ("knife", 0.25),
    ("spoon", 0.18),
    ("bowl", 0.10),
    ("banana", 0.18),
    ("apple", 0.08),
    ("sandwich", 0.12),
    ("orange", 0.08),
    ("broccoli", 0.20),
    ("carrot", 0.18),
    ("hot dog", 0.15),
    ("pizza", 0.30),
    ("donut", 0.10),
    ("cake", 0.15),
    // indoor furniture & appliances
    ("chair", 0.90),
    ("couch", 0.85),
    ("potted plant", 0.40),
    ("bed", 0.60),
    ("dining table", 0.75),
    ("toilet", 0.40),
    ("tv", 0.60),
    ("laptop", 0.30),
    ("mouse", 0.04),
    ("remote", 0.18),
    ("keyboard", 0.03),
    ("cell phone", 0.15),
    ("microwave", 0.30),
    ("oven", 0.90),
    ("toaster", 0.20),
    ("sink", 0.50),
    ("refrigerator", 1.80),
    ("clock", 0.30),
    ("vase", 0.30),
    ("scissors", 0.18),
    ("teddy bear", 0.30),
    ("hair drier", 0.25),
    ("toothbrush", 0.18),
    ("book", 0.25),
];
