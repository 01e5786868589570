use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderValue};

use super::error::SinkError;
use super::provider::MetricsSink;
use crate::core::constants::SINK_WRITE_PATH;
use crate::domain::metrics::line_protocol::join_lines;

/// Pushes line protocol batches to an HTTP listener (`POST /write`),
/// e.g. a Telegraf `http_listener_v2` input or an InfluxDB v1 endpoint.
#[derive(Debug)]
pub struct HttpSink {
    client: reqwest::Client,
    write_url: String,
}

impl HttpSink {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SinkError> {
        let base = base_url.trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(SinkError::Config(format!(
                "sink url must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Config(format!("failed to build HTTP client: {}", e)))?;

        let write_url = format!("{}{}", base, SINK_WRITE_PATH);
        tracing::debug!(url = %write_url, timeout_secs = timeout.as_secs(), "HTTP sink initialized");

        Ok(Self { client, write_url })
    }
}

#[async_trait]
impl MetricsSink for HttpSink {
    async fn send(&self, lines: &[String]) -> Result<(), SinkError> {
        let resp = self
            .client
            .post(&self.write_url)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .body(join_lines(lines))
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let body = error_body(resp.text().await);
        tracing::warn!(
            status = status.as_u16(),
            body = %body,
            url = %self.write_url,
            "Sink rejected batch"
        );
        Err(SinkError::status(self.name(), status.as_u16(), body))
    }

    fn name(&self) -> &'static str {
        "http"
    }

    fn target(&self) -> String {
        self.write_url.clone()
    }
}

/// Body of a rejected write; a read failure is logged and reported in its place.
fn error_body(text: Result<String, reqwest::Error>) -> String {
    match text {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read sink response body");
            format!("<unreadable body: {}>", e)
        }
    }
}
