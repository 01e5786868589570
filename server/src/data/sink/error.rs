//! Sink error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Sink configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sink ({sink}) returned {status}: {body}")]
    Status {
        sink: &'static str,
        status: u16,
        body: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    pub fn status(sink: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            sink,
            status,
            body: body.into(),
        }
    }
}
