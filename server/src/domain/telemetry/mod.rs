//! Telemetry ingestion
//!
//! Converts device records into metric points: sensor path resolution,
//! JSON flattening and fixed-schema event decoding.

mod adapter;
mod flatten;
mod path;
pub mod schema;

pub use adapter::{AdapterOptions, DEFAULT_MEASUREMENT, TelemetryAdapter, TelemetryRecord};
pub use flatten::{flatten, scalar_to_field_value};
pub use path::{
    HierarchicalPath, PathElement, normalize_flat_path, resolve_path, resolve_path_into,
};
