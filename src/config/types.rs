use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Pulse-Scraper
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub scheduler: SchedulerConfig,
    pub fetcher: FetcherConfig,
    pub store: StoreConfig,
    pub events: EventsConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "0.0.0.0:4000"
    #[serde(rename = "bind-address")]
    pub bind_address: String,

    /// Path prefix every route is mounted under (empty for none)
    #[serde(rename = "api-prefix")]
    pub api_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
            api_prefix: "/api/v1".to_string(),
        }
    }
}

/// Task submission and scheduling configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Capacity of the bounded queue between intake and the scheduler
    #[serde(rename = "submission-queue-capacity")]
    pub submission_queue_capacity: usize,

    /// How long a submission may wait for queue space before failing (milliseconds)
    #[serde(rename = "submission-timeout-ms")]
    pub submission_timeout_ms: u64,
}

impl SchedulerConfig {
    pub fn submission_timeout(&self) -> Duration {
        Duration::from_millis(self.submission_timeout_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            submission_queue_capacity: 64,
            submission_timeout_ms: 250,
        }
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Upper bound on a single fetch (milliseconds); further capped by the task interval
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Connection establishment timeout (milliseconds)
    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,

    /// Name sent in the User-Agent header
    #[serde(rename = "user-agent-name")]
    pub user_agent_name: String,

    /// Version sent in the User-Agent header
    #[serde(rename = "user-agent-version")]
    pub user_agent_version: String,

    /// Maximum number of redirects followed per fetch
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl FetcherConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Formats the User-Agent header value: Name/Version
    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.user_agent_name, self.user_agent_version)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
            user_agent_name: "PulseScraper".to_string(),
            user_agent_version: env!("CARGO_PKG_VERSION").to_string(),
            max_redirects: 10,
        }
    }
}

/// Result history configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Results retained per task key; the oldest are evicted first
    #[serde(rename = "max-history-per-key")]
    pub max_history_per_key: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_history_per_key: 1000,
        }
    }
}

/// Status event buffering configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Events buffered between producers and the log writer
    #[serde(rename = "buffer-capacity")]
    pub buffer_capacity: usize,

    /// How long a producer waits on a full buffer before the event is dropped (milliseconds)
    #[serde(rename = "overflow-wait-ms")]
    pub overflow_wait_ms: u64,
}

impl EventsConfig {
    pub fn overflow_wait(&self) -> Duration {
        Duration::from_millis(self.overflow_wait_ms)
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 1024,
            overflow_wait_ms: 50,
        }
    }
}
