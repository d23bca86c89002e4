use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Outbound proxy URL applied uniformly to all sources and scrapers.
    /// Absence means a direct connection.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Directory holding the database and downloaded covers.
    /// Defaults to `./avmeta-data` when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts made by a source's session bootstrap before giving up.
    #[serde(default = "default_cookie_retry_times")]
    pub cookie_retry_times: u32,

    /// Fixed delay before each bootstrap attempt, in milliseconds.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            cookie_retry_times: default_cookie_retry_times(),
            retry_interval_ms: default_retry_interval_ms(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_cookie_retry_times() -> u32 {
    5
}

fn default_retry_interval_ms() -> u64 {
    500
}
