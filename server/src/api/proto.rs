//! Generated gRPC bindings for `telebridge.v1`

#![allow(clippy::all)]

tonic::include_proto!("telebridge.v1");
