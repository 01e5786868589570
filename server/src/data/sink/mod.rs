//! Metrics sinks
//!
//! Encoded line protocol batches leave the bridge through a single
//! [`MetricsSink`] selected by configuration: an HTTP push to a `/write`
//! endpoint, or a stdout dump for debugging.

mod error;
mod http;
mod provider;
mod stdout;

pub use error::SinkError;
pub use http::HttpSink;
pub use provider::MetricsSink;
pub use stdout::StdoutSink;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::core::config::{SinkConfig, SinkKind};

#[derive(Debug, Clone)]
pub struct SinkService {
    sink: Arc<dyn MetricsSink>,
}

impl SinkService {
    /// Initialize from config. Constructs the appropriate sink.
    pub fn init(config: &SinkConfig) -> Result<Self> {
        let sink: Arc<dyn MetricsSink> = match config.kind {
            SinkKind::Http => Arc::new(HttpSink::new(
                &config.url,
                Duration::from_secs(config.timeout_secs),
            )?),
            SinkKind::Stdout => Arc::new(StdoutSink),
        };

        tracing::debug!(sink = sink.name(), target = %sink.target(), "Metrics sink initialized");
        Ok(Self { sink })
    }

    /// Wrap an existing sink (tests, embedding)
    pub fn from_sink(sink: Arc<dyn MetricsSink>) -> Self {
        Self { sink }
    }

    /// Send a batch. Empty batches are skipped without touching the sink.
    pub async fn send(&self, lines: &[String]) -> Result<(), SinkError> {
        if lines.is_empty() {
            tracing::trace!(sink = self.sink.name(), "Empty batch, nothing to send");
            return Ok(());
        }
        self.sink.send(lines).await?;
        tracing::debug!(sink = self.sink.name(), points = lines.len(), "Batch delivered");
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        self.sink.name()
    }

    pub fn target(&self) -> String {
        self.sink.target()
    }
}
