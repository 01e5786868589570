// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Telebridge";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "telebridge";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".telebridge";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "telebridge.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "TELEBRIDGE_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "TELEBRIDGE_LOG";

/// Default log filter when neither TELEBRIDGE_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info,telebridge=info";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for gRPC listen host
pub const ENV_HOST: &str = "TELEBRIDGE_HOST";

/// Environment variable for gRPC listen port
pub const ENV_PORT: &str = "TELEBRIDGE_PORT";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default listen host (all interfaces, devices dial in)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default gRPC port
pub const DEFAULT_PORT: u16 = 12345;

/// Default maximum decoded gRPC message size (4 MB)
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

// =============================================================================
// Environment Variables - Sink
// =============================================================================

/// Environment variable for sink kind (http or stdout)
pub const ENV_SINK_KIND: &str = "TELEBRIDGE_SINK_KIND";

/// Environment variable for sink base URL
pub const ENV_SINK_URL: &str = "TELEBRIDGE_SINK_URL";

/// Environment variable for sink request timeout
pub const ENV_SINK_TIMEOUT_SECS: &str = "TELEBRIDGE_SINK_TIMEOUT_SECS";

// =============================================================================
// Sink Defaults
// =============================================================================

/// Default metrics backend base URL
pub const DEFAULT_SINK_URL: &str = "http://127.0.0.1:8881";

/// Path appended to the sink base URL
pub const SINK_WRITE_PATH: &str = "/write";

/// Default sink request timeout in seconds
pub const DEFAULT_SINK_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Environment Variables - Telemetry
// =============================================================================

/// Environment variable for numeric string conversion
pub const ENV_CONVERT_STRINGS: &str = "TELEBRIDGE_CONVERT_STRINGS";

/// Environment variable for timestamp offset in seconds
pub const ENV_TIMESTAMP_OFFSET_SECS: &str = "TELEBRIDGE_TIMESTAMP_OFFSET_SECS";

/// Environment variable for generic record fallback measurement
pub const ENV_DEFAULT_MEASUREMENT: &str = "TELEBRIDGE_DEFAULT_MEASUREMENT";

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
