//! Pulse-Scraper: periodic page scraping with a queryable history
//!
//! This crate accepts scrape tasks (a URL plus an interval), runs each one on its
//! own repeating timer, and keeps a bounded, time-ordered history of every fetch
//! result per task so that clients can read it back by key and by timestamp.

pub mod config;
pub mod events;
pub mod fetch;
pub mod scheduler;
pub mod server;
pub mod service;
pub mod storage;
pub mod task;
pub mod url;

use thiserror::Error;

/// Errors that prevent the service from starting
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL cannot be empty")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Errors surfaced synchronously to whoever submits or manages a task
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Submission queue is full")]
    QueueFull,

    #[error("Scheduler is not running")]
    SchedulerClosed,
}

impl From<UrlError> for IntakeError {
    fn from(err: UrlError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type alias for Pulse-Scraper operations
pub type Result<T> = std::result::Result<T, PulseError>;

// Re-export commonly used types
pub use config::Config;
pub use scheduler::{Scheduler, SchedulerHandle};
pub use service::PulseService;
pub use storage::{MemoryStore, ResultStore, ScrapeResult};
pub use task::{Task, TaskIntake, TaskKey};
pub use crate::url::{fingerprint, normalize_url};
