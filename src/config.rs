//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "STAT_TRACKER_CONFIG_PATH";

const DEFAULT_PAGE_SIZE: usize = 5;
const DEFAULT_OPPONENT_SCORE: u32 = 32;
const DEFAULT_FAN_OUT_LIMIT: usize = 8;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Number of teams or players fetched per listing page.
    pub page_size: usize,
    /// Opponent side of the game score until real opponent scoring exists.
    pub placeholder_opponent_score: u32,
    /// Maximum number of concurrent per-game or per-player store reads.
    pub fan_out_limit: usize,
    /// Timeout applied to outbound HTTP calls.
    pub request_timeout: Duration,
    /// Sessions without activity for this long are signed out. Zero keeps them until sign-out.
    pub session_idle_timeout: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        page_size = app_config.page_size,
                        fan_out_limit = app_config.fan_out_limit,
                        session_idle_timeout_secs = app_config.session_idle_timeout.as_secs(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    page_size: usize,
    placeholder_opponent_score: u32,
    fan_out_limit: usize,
    request_timeout_ms: u64,
    session_idle_timeout_secs: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            placeholder_opponent_score: DEFAULT_OPPONENT_SCORE,
            fan_out_limit: DEFAULT_FAN_OUT_LIMIT,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            session_idle_timeout_secs: DEFAULT_SESSION_IDLE_TIMEOUT_SECS,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            page_size: value.page_size.max(1),
            placeholder_opponent_score: value.placeholder_opponent_score,
            fan_out_limit: value.fan_out_limit.max(1),
            request_timeout: Duration::from_millis(value.request_timeout_ms),
            session_idle_timeout: Duration::from_secs(value.session_idle_timeout_secs),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.placeholder_opponent_score, 32);
        assert_eq!(config.fan_out_limit, 8);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let raw: RawConfig = serde_json::from_str(r#"{ "page_size": 10 }"#).unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.placeholder_opponent_score, 32);
    }

    #[test]
    fn zero_limits_are_clamped() {
        let raw: RawConfig =
            serde_json::from_str(r#"{ "page_size": 0, "fan_out_limit": 0 }"#).unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.page_size, 1);
        assert_eq!(config.fan_out_limit, 1);
    }
}
