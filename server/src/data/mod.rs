//! Data layer
//!
//! - `sink` - Delivery of encoded metric batches to the metrics backend

pub mod sink;

pub use sink::{MetricsSink, SinkError, SinkService};
