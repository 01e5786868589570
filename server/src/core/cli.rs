use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::SinkKind;
use super::constants::{
    ENV_CONFIG, ENV_CONVERT_STRINGS, ENV_DEFAULT_MEASUREMENT, ENV_HOST, ENV_PORT, ENV_SINK_KIND,
    ENV_SINK_TIMEOUT_SECS, ENV_SINK_URL, ENV_TIMESTAMP_OFFSET_SECS,
};

#[derive(Parser)]
#[command(name = "telebridge")]
#[command(version, about = "Device telemetry to line protocol bridge", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// gRPC listen address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// gRPC listen port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Metrics sink (http or stdout)
    #[arg(long, global = true, env = ENV_SINK_KIND, value_parser = parse_sink_kind)]
    pub sink: Option<SinkKind>,

    /// Base URL of the metrics backend (`/write` is appended)
    #[arg(long, global = true, env = ENV_SINK_URL)]
    pub sink_url: Option<String>,

    /// Sink request timeout in seconds
    #[arg(long, global = true, env = ENV_SINK_TIMEOUT_SECS)]
    pub sink_timeout_secs: Option<u64>,

    /// Parse numeric-looking strings in generic payloads into numbers
    #[arg(long, global = true, env = ENV_CONVERT_STRINGS)]
    pub convert_strings: Option<bool>,

    /// Seconds subtracted from the receive time when stamping points
    #[arg(long, global = true, env = ENV_TIMESTAMP_OFFSET_SECS, allow_hyphen_values = true)]
    pub timestamp_offset_secs: Option<i64>,

    /// Measurement used for generic records without a path
    #[arg(long, global = true, env = ENV_DEFAULT_MEASUREMENT)]
    pub default_measurement: Option<String>,
}

/// Parse sink kind from CLI/env string
fn parse_sink_kind(s: &str) -> Result<SinkKind, String> {
    match s.to_lowercase().as_str() {
        "http" => Ok(SinkKind::Http),
        "stdout" => Ok(SinkKind::Stdout),
        _ => Err(format!("Invalid sink '{}'. Valid options: http, stdout", s)),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the bridge (default command)
    Start,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub sink: Option<SinkKind>,
    pub sink_url: Option<String>,
    pub sink_timeout_secs: Option<u64>,
    pub convert_strings: Option<bool>,
    pub timestamp_offset_secs: Option<i64>,
    pub default_measurement: Option<String>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            config: cli.config,
            sink: cli.sink,
            sink_url: cli.sink_url,
            sink_timeout_secs: cli.sink_timeout_secs,
            convert_strings: cli.convert_strings,
            timestamp_offset_secs: cli.timestamp_offset_secs,
            default_measurement: cli.default_measurement,
        }
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let mut cli = Cli::parse();
    let command = cli.command.take();
    (CliConfig::from(cli), command)
}
