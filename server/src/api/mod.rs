//! gRPC ingestion endpoint

pub mod grpc;
pub mod proto;

pub use grpc::{JsonService, TelemetryGrpcServer};
