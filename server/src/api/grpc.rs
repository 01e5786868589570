//! gRPC telemetry server
//!
//! Devices push one JSON document per `JsonSend` call. Each call is turned
//! into a [`TelemetryRecord`], converted to metric points, encoded and
//! handed to the configured sink before the reply is sent.

use std::net::{SocketAddr, ToSocketAddrs};

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::sync::watch;
use tonic::transport::Server as TonicServer;
use tonic::{Request, Response, Status};

use super::proto::json_request::Selector;
use super::proto::json_server::{Json, JsonServer};
use super::proto::{JsonReply, JsonRequest};
use crate::core::config::AppConfig;
use crate::core::shutdown::ShutdownService;
use crate::data::sink::{SinkError, SinkService};
use crate::domain::metrics::line_protocol::encode_batch;
use crate::domain::{TelemetryAdapter, TelemetryError, TelemetryRecord};
use crate::utils::time::timestamp_with_offset;

/// Reply code for an accepted record
pub const REPLY_OK: i32 = 1;

pub struct TelemetryGrpcServer {
    addr: SocketAddr,
    max_message_bytes: usize,
    service: JsonService,
}

impl TelemetryGrpcServer {
    pub fn new(config: &AppConfig, sink: SinkService, shutdown: ShutdownService) -> Result<Self> {
        let listen = config.server.listen_addr();
        let addr = listen
            .to_socket_addrs()
            .with_context(|| format!("Invalid listen address: {}", listen))?
            .next()
            .with_context(|| format!("Listen address resolved to nothing: {}", listen))?;

        let adapter = TelemetryAdapter::new(config.telemetry.adapter_options());
        let service = JsonService::new(
            adapter,
            sink,
            shutdown,
            config.telemetry.timestamp_offset_secs,
        );

        Ok(Self {
            addr,
            max_message_bytes: config.telemetry.max_message_bytes,
            service,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn start(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        let addr = self.addr;

        tracing::debug!(%addr, "Starting telemetry gRPC server");

        TonicServer::builder()
            .add_service(
                JsonServer::new(self.service)
                    .max_decoding_message_size(self.max_message_bytes)
                    .max_encoding_message_size(self.max_message_bytes),
            )
            .serve_with_shutdown(addr, async move {
                let _ = shutdown_rx.wait_for(|&v| v).await;
                tracing::debug!("Telemetry gRPC server shutting down");
            })
            .await
            .with_context(|| format!("gRPC server failed on {}", addr))?;

        Ok(())
    }
}

/// `telebridge.v1.Json` service implementation.
#[derive(Clone)]
pub struct JsonService {
    adapter: TelemetryAdapter,
    sink: SinkService,
    shutdown: ShutdownService,
    timestamp_offset_secs: i64,
}

impl JsonService {
    pub fn new(
        adapter: TelemetryAdapter,
        sink: SinkService,
        shutdown: ShutdownService,
        timestamp_offset_secs: i64,
    ) -> Self {
        Self {
            adapter,
            sink,
            shutdown,
            timestamp_offset_secs,
        }
    }

    /// Convert, encode and deliver one record. Returns the number of points
    /// handed to the sink.
    pub async fn process(&self, record: TelemetryRecord) -> Result<usize, Status> {
        let timestamp_ns = timestamp_with_offset(self.timestamp_offset_secs);

        let points = self
            .adapter
            .ingest(&record, timestamp_ns)
            .map_err(telemetry_status)?;
        let lines = encode_batch(&points).map_err(telemetry_status)?;

        if lines.is_empty() {
            tracing::debug!("Record produced no points");
            return Ok(0);
        }

        if self.shutdown.is_triggered() {
            return Err(Status::unavailable("Server is shutting down"));
        }

        self.sink.send(&lines).await.map_err(sink_status)?;

        tracing::debug!(points = lines.len(), sink = self.sink.name(), "Sent points");
        Ok(lines.len())
    }
}

#[tonic::async_trait]
impl Json for JsonService {
    async fn json_send(
        &self,
        request: Request<JsonRequest>,
    ) -> Result<Response<JsonReply>, Status> {
        let remote = request.remote_addr();
        let req = request.into_inner();
        tracing::trace!(
            remote = ?remote,
            device_info_len = req.device_info.len(),
            body_len = req.json_string.len(),
            "JsonSend"
        );

        let record = record_from_request(req)?;
        self.process(record).await?;

        Ok(Response::new(JsonReply { ret: REPLY_OK }))
    }
}

/// Map the request selector to a record variant
pub fn record_from_request(req: JsonRequest) -> Result<TelemetryRecord, Status> {
    let body = Bytes::from(req.json_string);
    match req.selector {
        Some(Selector::JsonEvent(key)) => Ok(TelemetryRecord::Event { key, body }),
        Some(Selector::SensorPath(path)) => Ok(TelemetryRecord::SensorPath { path, body }),
        None => Err(Status::invalid_argument(
            "Request carries neither json_event nor sensor_path",
        )),
    }
}

fn telemetry_status(err: TelemetryError) -> Status {
    if err.is_payload_error() {
        tracing::warn!(error = %err, "Rejected telemetry record");
        Status::invalid_argument(err.to_string())
    } else {
        tracing::error!(error = %err, "Failed to encode telemetry record");
        Status::internal(err.to_string())
    }
}

fn sink_status(err: SinkError) -> Status {
    tracing::error!(error = %err, "Failed to deliver batch");
    Status::unavailable(err.to_string())
}
