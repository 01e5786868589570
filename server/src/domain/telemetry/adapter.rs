//! Record ingestion
//!
//! Selects a decoding strategy per inbound record and produces metric points.
//! Fixed-schema events go through the static schema table; anything else is
//! treated as a generic sensor-path payload and flattened.

use bytes::Bytes;
use serde_json::Value as JsonValue;

use super::flatten::flatten;
use super::path::{HierarchicalPath, normalize_flat_path, resolve_path};
use super::schema;
use crate::domain::error::TelemetryError;
use crate::domain::metrics::{MetricPoint, TagSet};

/// Default measurement used when a generic record has no path names
pub const DEFAULT_MEASUREMENT: &str = "telemetry";

/// One inbound record, discriminated by how the payload is identified.
#[derive(Debug, Clone)]
pub enum TelemetryRecord {
    /// Numeric event key with a JSON body
    Event { key: u32, body: Bytes },
    /// gNMI-style sensor path with a JSON body
    SensorPath { path: String, body: Bytes },
}

/// Adapter options
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// Parse numeric-looking strings into numbers during flattening
    pub convert_strings_to_numbers: bool,
    /// Measurement for generic records whose flat path is empty
    pub default_measurement: String,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            convert_strings_to_numbers: false,
            default_measurement: DEFAULT_MEASUREMENT.to_string(),
        }
    }
}

/// Stateless record-to-points converter.
///
/// `ingest` is synchronous and performs no I/O, so a single adapter can be
/// shared across all request handlers.
#[derive(Debug, Clone, Default)]
pub struct TelemetryAdapter {
    options: AdapterOptions,
}

impl TelemetryAdapter {
    pub fn new(options: AdapterOptions) -> Self {
        Self { options }
    }

    /// Convert one record into points stamped with `timestamp_ns`.
    ///
    /// Any decode failure rejects the whole record.
    pub fn ingest(
        &self,
        record: &TelemetryRecord,
        timestamp_ns: i64,
    ) -> Result<Vec<MetricPoint>, TelemetryError> {
        match record {
            TelemetryRecord::Event { key, body } => match schema::lookup(*key) {
                Some(schema) => {
                    tracing::trace!(event_key = *key, schema = schema.name, "Typed ingestion");
                    schema.decode(body, timestamp_ns)
                }
                None => {
                    tracing::trace!(event_key = *key, "Unknown event key, generic ingestion");
                    self.ingest_generic(&HierarchicalPath::default(), body, timestamp_ns)
                        .map(|point| vec![point])
                }
            },
            TelemetryRecord::SensorPath { path, body } => {
                let parsed = HierarchicalPath::parse(path)?;
                self.ingest_generic(&parsed, body, timestamp_ns)
                    .map(|point| vec![point])
            }
        }
    }

    fn ingest_generic(
        &self,
        path: &HierarchicalPath,
        body: &[u8],
        timestamp_ns: i64,
    ) -> Result<MetricPoint, TelemetryError> {
        let mut tags = TagSet::new();
        let flat = normalize_flat_path(&resolve_path(path, "", &mut tags)?);

        let value: JsonValue = serde_json::from_slice(body)?;
        let fields = flatten(&flat, &value, self.options.convert_strings_to_numbers);

        let measurement = if flat.is_empty() {
            self.options.default_measurement.as_str()
        } else {
            flat.as_str()
        };

        MetricPoint::new(measurement, tags, fields, timestamp_ns)
    }
}
