//! Conversion pipeline
//!
//! - `telemetry` - Record ingestion: sensor paths, JSON flattening, fixed schemas
//! - `metrics` - Metric point model and line protocol encoding
//! - `error` - Pipeline error taxonomy

pub mod error;
pub mod metrics;
pub mod telemetry;

pub use error::TelemetryError;
pub use metrics::{FieldSet, FieldValue, MetricPoint, TagSet};
pub use telemetry::{AdapterOptions, TelemetryAdapter, TelemetryRecord};
