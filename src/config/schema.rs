/// Configuration schema for chartboard.
///
/// All structs derive `Serialize`/`Deserialize` with `#[serde(default)]` so
/// that partial TOML files work: any missing field falls back to its
/// built-in default.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Root config
// ---------------------------------------------------------------------------

/// Root configuration, mapping to the top-level TOML sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartboardConfig {
    pub server: ServerConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    pub port: u16,
    /// Debug mode prints per-output timings to stdout.
    pub debug: bool,
    /// Open the dashboard in the default browser on startup.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8050,
            debug: false,
            open_browser: true,
        }
    }
}

impl ServerConfig {
    /// `host:port`, as accepted by the HTTP server.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

/// Which dashboard to serve and where its dataset lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dashboard id: `launches` or `sales`.
    pub kind: String,
    /// CSV dataset path. Empty means `<kind>.csv` in the working directory.
    pub data_path: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            kind: "launches".to_string(),
            data_path: String::new(),
        }
    }
}

impl DashboardConfig {
    /// Dataset path with `~` expanded and the per-kind default applied.
    pub fn resolved_data_path(&self) -> std::path::PathBuf {
        if self.data_path.is_empty() {
            return std::path::PathBuf::from(format!("{}.csv", self.kind));
        }
        expand_home(&self.data_path)
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Interaction log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether interactions are appended to the JSONL log.
    pub enabled: bool,
    /// Path to the log file. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.chartboard/events.jsonl".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn resolved_path(&self) -> std::path::PathBuf {
        expand_home(&self.path)
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> std::path::PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    std::path::PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Default TOML template
// ---------------------------------------------------------------------------

impl ChartboardConfig {
    /// Annotated default config written by `chartboard config init`.
    pub fn default_toml() -> String {
        r#"# chartboard configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Command-line flags
#   2. Environment variables (CHARTBOARD_*)
#   3. Project config (.chartboard.toml in current directory)
#   4. User global config (~/.chartboard/config.toml)
#   5. Built-in defaults

[server]
host = "127.0.0.1"
port = 8050
debug = false         # Print per-output timings
open_browser = true

[dashboard]
kind = "launches"     # launches | sales
data_path = ""        # Empty: <kind>.csv in the working directory

[logging]
enabled = true
path = "~/.chartboard/events.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
