//! Telemetry bridge: receives JSON telemetry from network devices over gRPC,
//! converts it into line protocol points and forwards them to a metrics sink.

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
