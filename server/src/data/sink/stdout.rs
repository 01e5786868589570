use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::error::SinkError;
use super::provider::MetricsSink;
use crate::domain::metrics::line_protocol::join_lines;

/// Debug sink that prints every batch to stdout, one point per line.
#[derive(Debug, Default)]
pub struct StdoutSink;

#[async_trait]
impl MetricsSink for StdoutSink {
    async fn send(&self, lines: &[String]) -> Result<(), SinkError> {
        let mut payload = join_lines(lines);
        payload.push('\n');

        let mut stdout = tokio::io::stdout();
        stdout.write_all(payload.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }

    fn target(&self) -> String {
        "stdout".to_string()
    }
}
