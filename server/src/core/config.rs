use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_PORT,
    DEFAULT_SINK_TIMEOUT_SECS, DEFAULT_SINK_URL,
};
use crate::domain::telemetry::{AdapterOptions, DEFAULT_MEASUREMENT};

// =============================================================================
// Sink Kind Enum
// =============================================================================

/// Where encoded batches are delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// POST to `<url>/write`
    #[default]
    Http,
    /// Print to stdout (debugging)
    Stdout,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Http => write!(f, "http"),
            SinkKind::Stdout => write!(f, "stdout"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON, all fields optional)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Sink configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SinkFileConfig {
    pub kind: Option<SinkKind>,
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Telemetry conversion section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TelemetryFileConfig {
    pub convert_strings_to_numbers: Option<bool>,
    pub timestamp_offset_secs: Option<i64>,
    pub default_measurement: Option<String>,
    pub max_message_bytes: Option<usize>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub sink: Option<SinkFileConfig>,
    pub telemetry: Option<TelemetryFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(sink) = other.sink {
            let current = self.sink.get_or_insert_with(SinkFileConfig::default);
            if sink.kind.is_some() {
                current.kind = sink.kind;
            }
            if sink.url.is_some() {
                tracing::trace!(url = ?sink.url, "Merging sink.url");
                current.url = sink.url;
            }
            if sink.timeout_secs.is_some() {
                current.timeout_secs = sink.timeout_secs;
            }
        }

        if let Some(telemetry) = other.telemetry {
            let current = self
                .telemetry
                .get_or_insert_with(TelemetryFileConfig::default);
            if telemetry.convert_strings_to_numbers.is_some() {
                current.convert_strings_to_numbers = telemetry.convert_strings_to_numbers;
            }
            if telemetry.timestamp_offset_secs.is_some() {
                current.timestamp_offset_secs = telemetry.timestamp_offset_secs;
            }
            if telemetry.default_measurement.is_some() {
                current.default_measurement = telemetry.default_measurement;
            }
            if telemetry.max_message_bytes.is_some() {
                current.max_message_bytes = telemetry.max_message_bytes;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `host:port` form, bracketing bare IPv6 literals
    pub fn listen_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Sink configuration
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub kind: SinkKind,
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            url: DEFAULT_SINK_URL.to_string(),
            timeout_secs: DEFAULT_SINK_TIMEOUT_SECS,
        }
    }
}

/// Telemetry conversion configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub convert_strings_to_numbers: bool,
    pub timestamp_offset_secs: i64,
    pub default_measurement: String,
    pub max_message_bytes: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            convert_strings_to_numbers: false,
            timestamp_offset_secs: 0,
            default_measurement: DEFAULT_MEASUREMENT.to_string(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl TelemetryConfig {
    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            convert_strings_to_numbers: self.convert_strings_to_numbers,
            default_measurement: self.default_measurement.clone(),
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sink: SinkConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.telebridge/telebridge.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(path);
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::layer(cli, file_config);
        config.validate()?;

        tracing::debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn layer(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_sink = file_config.sink.unwrap_or_default();
        let file_telemetry = file_config.telemetry.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let sink = SinkConfig {
            kind: cli.sink.or(file_sink.kind).unwrap_or_default(),
            url: cli
                .sink_url
                .clone()
                .or(file_sink.url)
                .unwrap_or_else(|| DEFAULT_SINK_URL.to_string()),
            timeout_secs: cli
                .sink_timeout_secs
                .or(file_sink.timeout_secs)
                .unwrap_or(DEFAULT_SINK_TIMEOUT_SECS),
        };

        let telemetry = TelemetryConfig {
            convert_strings_to_numbers: cli
                .convert_strings
                .or(file_telemetry.convert_strings_to_numbers)
                .unwrap_or(false),
            timestamp_offset_secs: cli
                .timestamp_offset_secs
                .or(file_telemetry.timestamp_offset_secs)
                .unwrap_or(0),
            default_measurement: cli
                .default_measurement
                .clone()
                .or(file_telemetry.default_measurement)
                .unwrap_or_else(|| DEFAULT_MEASUREMENT.to_string()),
            max_message_bytes: file_telemetry
                .max_message_bytes
                .unwrap_or(DEFAULT_MAX_MESSAGE_BYTES),
        };

        Self {
            server,
            sink,
            telemetry,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind a random port devices cannot be pointed at
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.sink.kind == SinkKind::Http {
            let url = self.sink.url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!(
                    "Configuration error: sink.url must start with http:// or https:// (got '{}')",
                    self.sink.url
                );
            }
            if self.sink.timeout_secs == 0 {
                anyhow::bail!("Configuration error: sink.timeout_secs must be greater than 0");
            }
        }

        if self.telemetry.default_measurement.is_empty() {
            anyhow::bail!("Configuration error: telemetry.default_measurement must not be empty");
        }

        if self.telemetry.max_message_bytes == 0 {
            anyhow::bail!("Configuration error: telemetry.max_message_bytes must be greater than 0");
        }

        if self.telemetry.timestamp_offset_secs < 0 {
            tracing::warn!(
                offset_secs = self.telemetry.timestamp_offset_secs,
                "Negative timestamp offset, points will be stamped in the future"
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.telebridge/telebridge.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Expand a leading `~/` to the home directory
fn expand_path(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
