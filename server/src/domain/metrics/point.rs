//! Metric point model
//!
//! A [`MetricPoint`] is the flat, typed unit handed to the line protocol
//! encoder: one measurement, a sorted tag set, an ordered field set and a
//! nanosecond timestamp.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;

use crate::domain::error::TelemetryError;

/// Tag name -> tag value. `BTreeMap` keeps iteration sorted by key.
pub type TagSet = BTreeMap<String, String>;

/// A value that can be stored in a line protocol field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit signed integer (`42i`)
    SignedInt64(i64),
    /// 64-bit unsigned integer (`42u`)
    UnsignedInt64(u64),
    /// 64-bit float
    Float64(f64),
    /// UTF-8 string
    Text(String),
    /// Boolean
    Bool(bool),
    /// Value whose type could not be resolved; encoded as `"unknown"`
    Unresolved,
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::SignedInt64(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        Self::UnsignedInt64(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Field name -> value with unique keys and insertion order preserved.
///
/// Re-inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    entries: IndexMap<String, FieldValue>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// One time-series sample ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    measurement: String,
    tags: TagSet,
    fields: FieldSet,
    timestamp_ns: i64,
}

impl MetricPoint {
    /// Build a point. Fails when the measurement name or the field set is empty.
    pub fn new(
        measurement: impl Into<String>,
        tags: TagSet,
        fields: FieldSet,
        timestamp_ns: i64,
    ) -> Result<Self, TelemetryError> {
        let measurement = measurement.into();
        if measurement.is_empty() {
            return Err(TelemetryError::EmptyMeasurement);
        }
        if fields.is_empty() {
            return Err(TelemetryError::EmptyFields { measurement });
        }
        Ok(Self {
            measurement,
            tags,
            fields,
            timestamp_ns,
        })
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn timestamp_ns(&self) -> i64 {
        self.timestamp_ns
    }
}

impl fmt::Display for MetricPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} tags, {} fields) @ {}",
            self.measurement,
            self.tags.len(),
            self.fields.len(),
            self.timestamp_ns
        )
    }
}
