//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
///
/// Shared by the `serve` and `poll` commands; each reads the keys it needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP port the record store listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    // === Polling Client ===
    /// Base URL of the record store, as seen from the polling client.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Poll interval in milliseconds.
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Upper bound for a single outbound call (connect and read), in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Observability ===
    /// Install the Prometheus recorder.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Port for the polling client's metrics listener (disabled when unset).
    #[serde(default)]
    pub metrics_port: Option<u16>,

    /// Log filter directives (e.g. `info`, `user_api=debug,warn`).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging; overrides `rust_log`.
    #[serde(default)]
    pub verbose: bool,
}

const VERBOSE_DIRECTIVES: &str = "user_api=debug,info";

fn default_port() -> u16 {
    3000
}

fn default_api_url() -> String {
    "http://user-api-backend-service:3000".to_string()
}

fn default_interval() -> u64 {
    10_000
}

fn default_http_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            api_url: default_api_url(),
            interval: default_interval(),
            http_timeout_ms: default_http_timeout_ms(),
            metrics_enabled: default_true(),
            metrics_port: None,
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.interval == 0 {
            return Err("INTERVAL must be greater than 0".to_string());
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        let url = Url::parse(&self.api_url)
            .map_err(|e| format!("API_URL is not a valid URL: {}", e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err("API_URL must use http or https".to_string());
        }
        if url.host_str().is_none() {
            return Err("API_URL must include a host".to_string());
        }

        Ok(())
    }

    /// Filter directives for the tracing subscriber.
    ///
    /// `verbose` is the command-line flag; either it or `VERBOSE` switches
    /// this crate to debug level.
    pub fn log_directives(&self, verbose: bool) -> String {
        if verbose || self.verbose {
            VERBOSE_DIRECTIVES.to_string()
        } else {
            self.rust_log.clone()
        }
    }

    /// Parsed base URL of the record store.
    pub fn api_base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.api_url)
    }

    /// Poll interval as a duration.
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval)
    }

    /// Outbound call bound as a duration.
    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.http_timeout_ms)
    }
}
