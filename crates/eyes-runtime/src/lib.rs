//! `eyes-runtime` – Frame orchestration and process plumbing
//!
//! Wires the perception and safety crates into a single per-frame call and
//! owns the process-level concerns (tracing, result schema) that every host of
//! the core needs.
//!
//! # Modules
//!
//! - [`pipeline`] – [`FramePipeline`][pipeline::FramePipeline]:
//!   runs one [`FrameInput`][eyes_types::FrameInput] through distance
//!   estimation, scene classification, currency aggregation, priority ranking
//!   and alert generation, returning a
//!   [`FrameResult`][eyes_types::FrameResult].  The pipeline is stateless
//!   between frames and may be shared across threads.
//!   [`result_schema`][pipeline::result_schema] exposes the JSON Schema of the
//!   result for transport layers.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   initialises the global `tracing` subscriber with an optional OTLP span
//!   exporter.  Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace export
//!   to Jaeger, Grafana Tempo, or any OTLP-compatible collector.

pub mod pipeline;
pub mod telemetry;

pub use pipeline::{FramePipeline, result_schema};
pub use telemetry::{LogFormat, TelemetryOptions, TracerProviderGuard, init_tracing};
