//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//! Values are read once at startup and never change afterwards.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::serial::DEFAULT_MAX_LINE_LENGTH;
use crate::websocket::HubConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub hub: HubConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial device configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    #[serde(default = "default_serial_path")]
    pub path: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

fn default_serial_path() -> String {
    "/dev/ttyACM0".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_max_line_length() -> usize {
    DEFAULT_MAX_LINE_LENGTH
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: default_serial_path(),
            baud_rate: default_baud_rate(),
            max_line_length: default_max_line_length(),
        }
    }
}

/// HTTP / WebSocket listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served to non-upgrade requests
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("monitor").join("config.toml")),
            Some(PathBuf::from("/etc/monitor/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a `MONITOR_*` key lookup
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Serial overrides
        if let Some(path) = lookup("MONITOR_SERIAL_PATH") {
            self.serial.path = path;
        }
        if let Some(baud) = lookup("MONITOR_BAUD_RATE").and_then(|s| s.parse().ok()) {
            self.serial.baud_rate = baud;
        }
        if let Some(limit) = lookup("MONITOR_MAX_LINE_LENGTH").and_then(|s| s.parse().ok()) {
            self.serial.max_line_length = limit;
        }

        // Server overrides
        if let Some(host) = lookup("MONITOR_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("MONITOR_PORT").and_then(|s| s.parse().ok()) {
            self.server.port = port;
        }
        if let Some(dir) = lookup("MONITOR_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }

        // Hub overrides
        if let Some(max) = lookup("MONITOR_MAX_CONNECTIONS").and_then(|s| s.parse().ok()) {
            self.hub.max_connections = max;
        }

        // Logging overrides
        if let Some(level) = lookup("MONITOR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("MONITOR_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Monitor Configuration
#
# Environment variables override these settings:
# - MONITOR_SERIAL_PATH
# - MONITOR_BAUD_RATE
# - MONITOR_MAX_LINE_LENGTH
# - MONITOR_HOST
# - MONITOR_PORT
# - MONITOR_STATIC_DIR
# - MONITOR_MAX_CONNECTIONS
# - MONITOR_LOG_LEVEL
# - MONITOR_LOG_FORMAT

[serial]
# Serial device the sensor is attached to
path = "/dev/ttyACM0"

# Baud rate of the serial link
baud_rate = 9600

# Longest kept line (bytes); longer lines are dropped as line noise
max_line_length = 4096

[server]
# Listener host
host = "0.0.0.0"

# Listener port (HTTP and WebSocket share it)
port = 3000

# Directory served to non-WebSocket requests
static_dir = "public"

[hub]
# Maximum number of concurrent WebSocket clients
max_connections = 1000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.serial.path, "/dev/ttyACM0");
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.addr(), "0.0.0.0:3000");
        assert_eq!(config.server.static_dir, PathBuf::from("public"));
        assert_eq!(config.hub.max_connections, 1000);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.serial.path, defaults.serial.path);
        assert_eq!(config.serial.baud_rate, defaults.serial.baud_rate);
        assert_eq!(config.serial.max_line_length, defaults.serial.max_line_length);
        assert_eq!(config.server.addr(), defaults.server.addr());
        assert_eq!(config.server.static_dir, defaults.server.static_dir);
        assert_eq!(config.hub.max_connections, defaults.hub.max_connections);
        assert_eq!(config.logging.level, defaults.logging.level);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = Config::parse(
            r#"
            [serial]
            path = "/dev/ttyUSB1"
            baud_rate = 115200
            "#,
        )
        .unwrap();

        assert_eq!(config.serial.path, "/dev/ttyUSB1");
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 8080\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MONITOR_SERIAL_PATH", "/dev/ttyUSB0"),
            ("MONITOR_BAUD_RATE", "57600"),
            ("MONITOR_MAX_LINE_LENGTH", "256"),
            ("MONITOR_PORT", "9000"),
            ("MONITOR_STATIC_DIR", "/srv/www"),
            ("MONITOR_MAX_CONNECTIONS", "16"),
            ("MONITOR_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.serial.path, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 57600);
        assert_eq!(config.serial.max_line_length, 256);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.static_dir, PathBuf::from("/srv/www"));
        assert_eq!(config.hub.max_connections, 16);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_hub_section_parses() {
        let config = Config::parse("[hub]\nmax_connections = 5\n").unwrap();
        assert_eq!(config.hub.max_connections, 5);
    }

    #[test]
    fn test_unparseable_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "MONITOR_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.server.port, 3000);
    }
}
