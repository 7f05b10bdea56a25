//! `eyes-safety` – Safety prioritization
//!
//! Decides what the user needs to hear about first. Every component reads the
//! shared [`ClassificationTables`][eyes_types::ClassificationTables] and
//! never mutates it.
//!
//! # Modules
//!
//! - [`priority`] – [`PriorityEngine`][priority::PriorityEngine]: scores and
//!   ranks ranged detections into a deduplicated shortlist, and emits
//!   proximity [`Alert`][eyes_types::Alert]s by criticality tier.
//! - [`scene`] – [`SceneClassifier`][scene::SceneClassifier]: infers a coarse
//!   [`SceneLabel`][eyes_types::SceneLabel] from the set of detected labels
//!   using ordered corroboration rules.
//! - [`currency`] – [`CurrencyAggregator`][currency::CurrencyAggregator]:
//!   counts bill and coin detections and builds a spoken total.

pub mod currency;
pub mod priority;
pub mod scene;

pub use currency::CurrencyAggregator;
pub use priority::PriorityEngine;
pub use scene::SceneClassifier;
