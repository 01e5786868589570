use async_trait::async_trait;

use super::error::SinkError;

/// Destination for encoded line protocol batches.
#[async_trait]
pub trait MetricsSink: Send + Sync + std::fmt::Debug {
    /// Deliver a batch of pre-encoded lines. No retry is attempted here.
    async fn send(&self, lines: &[String]) -> Result<(), SinkError>;

    /// Human-readable sink name
    fn name(&self) -> &'static str;

    /// Where the batch goes, for logs and the startup banner
    fn target(&self) -> String;
}
