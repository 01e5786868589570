//! Conversion pipeline error types

use thiserror::Error;

/// Errors raised while turning one inbound record into metric points.
///
/// Any of these aborts the whole record; no partial points are emitted.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Malformed JSON body
    #[error("Payload decode error: {0}")]
    PayloadDecode(#[from] serde_json::Error),

    /// Unparsable sensor path
    #[error("Invalid sensor path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Accumulation surface (flat path or output line) could not be written
    #[error("Write error: {0}")]
    Write(#[from] std::fmt::Error),

    /// Point has no fields (line protocol requires at least one)
    #[error("Encoding error: metric point '{measurement}' has no fields")]
    EmptyFields { measurement: String },

    /// Point has an empty measurement name
    #[error("Encoding error: measurement name is empty")]
    EmptyMeasurement,
}

impl TelemetryError {
    pub fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the inbound payload (caller's fault)
    pub fn is_payload_error(&self) -> bool {
        matches!(self, Self::PayloadDecode(_) | Self::InvalidPath { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_display() {
        let err = TelemetryError::invalid_path("/a[b", "unclosed '['");
        assert_eq!(err.to_string(), "Invalid sensor path '/a[b': unclosed '['");
    }

    #[test]
    fn test_empty_fields_display() {
        let err = TelemetryError::EmptyFields {
            measurement: "ifm".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Encoding error: metric point 'ifm' has no fields"
        );
    }

    #[test]
    fn test_is_payload_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(TelemetryError::from(json_err).is_payload_error());
        assert!(TelemetryError::invalid_path("x", "y").is_payload_error());
        assert!(!TelemetryError::EmptyMeasurement.is_payload_error());
        assert!(!TelemetryError::Write(std::fmt::Error).is_payload_error());
    }
}
