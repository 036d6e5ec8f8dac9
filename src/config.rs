//! Application configuration loaded from environment variables.
//!
//! Every variable is optional:
//! - `BFXCHART_WEBSOCKET_URL` - feed endpoint
//! - `BFXCHART_PREFERENCES` - file holding the last chart settings
//! - `BFXCHART_LOG_FILE` - where tracing output goes (the terminal belongs to the UI)
//! - `BFXCHART_PING_INTERVAL_SECS` / `BFXCHART_PONG_TIMEOUT_SECS` - heartbeat timing

use std::path::PathBuf;
use std::time::Duration;

/// Default public WebSocket endpoint.
const DEFAULT_WEBSOCKET_URL: &str = "wss://api-pub.bitfinex.com/ws/2";

/// Default log file, relative to the working directory.
const DEFAULT_LOG_FILE: &str = "bfxchart.log";

/// How often a ping is sent while the connection is open.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

/// How long the session survives without a pong.
pub const DEFAULT_PONG_TIMEOUT: Duration = Duration::from_secs(60);

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub preferences_path: PathBuf,
    pub log_file: PathBuf,
}

/// Feed connection settings.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub websocket_url: String,
    pub heartbeat: HeartbeatConfig,
}

/// Ping/pong timing used by the heartbeat supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    pub ping_interval: Duration,
    pub pong_timeout: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            ping_interval: DEFAULT_PING_INTERVAL,
            pong_timeout: DEFAULT_PONG_TIMEOUT,
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`ChartError::Config`](crate::ChartError::Config) if a duration
/// variable is not a positive integer, or if the pong timeout does not
/// exceed the ping interval.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let websocket_url = non_empty_var("BFXCHART_WEBSOCKET_URL")
        .unwrap_or_else(|| DEFAULT_WEBSOCKET_URL.to_string());

    let preferences_path = non_empty_var("BFXCHART_PREFERENCES")
        .map(PathBuf::from)
        .unwrap_or_else(default_preferences_path);

    let log_file = non_empty_var("BFXCHART_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    let ping_interval =
        duration_var("BFXCHART_PING_INTERVAL_SECS")?.unwrap_or(DEFAULT_PING_INTERVAL);
    let pong_timeout = duration_var("BFXCHART_PONG_TIMEOUT_SECS")?.unwrap_or(DEFAULT_PONG_TIMEOUT);

    if pong_timeout <= ping_interval {
        return Err(crate::ChartError::Config(format!(
            "BFXCHART_PONG_TIMEOUT_SECS ({}) must be larger than BFXCHART_PING_INTERVAL_SECS ({})",
            pong_timeout.as_secs(),
            ping_interval.as_secs()
        )));
    }

    Ok(AppConfig {
        feed: FeedConfig {
            websocket_url,
            heartbeat: HeartbeatConfig {
                ping_interval,
                pong_timeout,
            },
        },
        preferences_path,
        log_file,
    })
}

fn default_preferences_path() -> PathBuf {
    match non_empty_var("HOME") {
        Some(home) => PathBuf::from(home)
            .join(".config")
            .join("bfxchart")
            .join("preferences.json"),
        None => PathBuf::from("bfxchart-preferences.json"),
    }
}

/// Parses a whole number of seconds, rejecting zero.
fn duration_var(name: &str) -> crate::Result<Option<Duration>> {
    let Some(raw) = non_empty_var(name) else {
        return Ok(None);
    };

    match raw.trim().parse::<u64>() {
        Ok(0) => Err(crate::ChartError::Config(format!(
            "{name} must be greater than zero"
        ))),
        Ok(secs) => Ok(Some(Duration::from_secs(secs))),
        Err(e) => Err(crate::ChartError::Config(format!(
            "{name} is not a number of seconds: {e}"
        ))),
    }
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
