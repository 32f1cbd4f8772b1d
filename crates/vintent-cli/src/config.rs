//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vintent_client::DEFAULT_BASE_URL;
use vintent_session::{ConnectivityMonitor, RetryPolicy, SessionConfig};

/// Overrides the config file location
pub const CONFIG_PATH_ENV: &str = "VINTENT_CONFIG_PATH";
/// Overrides the service base URL (below `--api-url`, above the file)
pub const BASE_URL_ENV: &str = "VINTENT_API_BASE_URL";

/// Confidence threshold advertised by the service. Not used by the client.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Configuration for vintent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the NLU service
    pub api_base_url: Option<String>,
    /// Intent confidence threshold (currently unused)
    pub threshold: Option<f64>,
    /// Retries after the first failed analysis attempt
    pub max_retries: Option<u32>,
    /// Fixed delay between analysis attempts
    pub retry_delay_ms: Option<u64>,
    /// Seconds between health checks
    pub health_interval_secs: Option<u64>,
    /// Per-attempt timeout in seconds, 0 disables it
    pub request_timeout_secs: Option<u64>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vintent")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "failed to parse config file: {}", e);
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to read config file: {}", e);
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Write config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if !path.exists() {
            Self::defaults().save_to(&path)?;
        }
        Ok(path)
    }

    /// Every field set to its built-in value
    pub fn defaults() -> Self {
        let retry = RetryPolicy::default();
        Self {
            api_base_url: Some(DEFAULT_BASE_URL.to_string()),
            threshold: Some(DEFAULT_THRESHOLD),
            max_retries: Some(retry.max_retries),
            retry_delay_ms: Some(retry.delay.as_millis() as u64),
            health_interval_secs: Some(ConnectivityMonitor::DEFAULT_INTERVAL.as_secs()),
            request_timeout_secs: Some(SessionConfig::DEFAULT_ATTEMPT_TIMEOUT.as_secs()),
            tui: Some(true),
        }
    }

    /// Base URL with precedence: CLI flag, environment, file, default
    pub fn resolve_base_url(&self, cli: Option<String>, env: Option<String>) -> String {
        cli.or(env.filter(|v| !v.trim().is_empty()))
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Session settings derived from this config
    pub fn session_config(&self) -> SessionConfig {
        let defaults = SessionConfig::default();

        let retry = RetryPolicy::fixed(
            self.max_retries.unwrap_or(defaults.retry.max_retries),
            self.retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.delay),
        );

        let attempt_timeout = match self.request_timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.attempt_timeout,
        };

        let health_interval = self
            .health_interval_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.health_interval);

        SessionConfig {
            retry,
            attempt_timeout,
            health_interval,
        }
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# vintent configuration file
# Place at ~/.config/vintent/config.toml (Linux), ~/Library/Application Support/vintent/config.toml (macOS)
# or %APPDATA%\vintent\config.toml (Windows). VINTENT_CONFIG_PATH overrides the location.

# NLU service base URL (VINTENT_API_BASE_URL and --api-url take precedence)
api_base_url = "https://hypothalamic-lianne-unfurnitured.ngrok-free.dev"

# Intent confidence threshold. Reserved; the client does not use it yet.
threshold = 0.5

# Analysis retries after the first failure, with a fixed delay between attempts
max_retries = 3
retry_delay_ms = 1000

# Seconds between health checks (skipped while an analysis is running)
health_interval_secs = 30

# Per-attempt request timeout in seconds (0 waits forever)
request_timeout_secs = 30

# Whether to use TUI mode by default
# Set to false for simple stdin/stdout mode
tui = true
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_bad_toml_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_retries = \"three\"").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_example_config_parses_to_defaults() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config, Config::defaults());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            api_base_url: Some("http://localhost:8000".into()),
            max_retries: Some(5),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_base_url_precedence() {
        let config = Config {
            api_base_url: Some("http://file".into()),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_base_url(Some("http://cli".into()), Some("http://env".into())),
            "http://cli"
        );
        assert_eq!(
            config.resolve_base_url(None, Some("http://env".into())),
            "http://env"
        );
        assert_eq!(config.resolve_base_url(None, Some("  ".into())), "http://file");
        assert_eq!(
            Config::default().resolve_base_url(None, None),
            DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_session_config_mapping() {
        let config = Config {
            max_retries: Some(1),
            retry_delay_ms: Some(250),
            request_timeout_secs: Some(0),
            health_interval_secs: Some(5),
            ..Config::default()
        };
        let session = config.session_config();
        assert_eq!(session.retry.max_retries, 1);
        assert_eq!(session.retry.delay, Duration::from_millis(250));
        assert_eq!(session.attempt_timeout, None);
        assert_eq!(session.health_interval, Duration::from_secs(5));

        let session = Config::default().session_config();
        assert_eq!(session.retry, RetryPolicy::default());
        assert_eq!(session.attempt_timeout, Some(Duration::from_secs(30)));
        assert_eq!(session.health_interval, Duration::from_secs(30));
    }
}
