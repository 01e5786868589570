//! Metric points and their line protocol encoding

pub mod line_protocol;
mod point;

pub use point::{FieldSet, FieldValue, MetricPoint, TagSet};
