use crate::config::types::{
    Config, EventsConfig, FetcherConfig, SchedulerConfig, ServerConfig, StoreConfig,
};
use crate::ConfigError;
use std::net::SocketAddr;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_scheduler_config(&config.scheduler)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_store_config(&config.store)?;
    validate_events_config(&config.events)?;
    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind_address.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!(
            "bind_address '{}' is not a socket address: {}",
            config.bind_address, e
        ))
    })?;

    validate_api_prefix(&config.api_prefix)?;

    Ok(())
}

/// Validates a route prefix: empty, or "/segment[/segment...]" without a trailing slash
fn validate_api_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() {
        return Ok(());
    }

    if !prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "api_prefix must start with '/', got '{}'",
            prefix
        )));
    }

    if prefix.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "api_prefix must not end with '/', got '{}'",
            prefix
        )));
    }

    Ok(())
}

/// Validates scheduler configuration
fn validate_scheduler_config(config: &SchedulerConfig) -> Result<(), ConfigError> {
    if config.submission_queue_capacity < 1 {
        return Err(ConfigError::Validation(
            "submission_queue_capacity must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    if config.connect_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_ms must be >= 1ms".to_string(),
        ));
    }

    if config.user_agent_name.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent_name cannot be empty".to_string(),
        ));
    }

    if !config
        .user_agent_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "user_agent_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.user_agent_name
        )));
    }

    Ok(())
}

/// Validates store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.max_history_per_key < 1 {
        return Err(ConfigError::Validation(
            "max_history_per_key must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates event sink configuration
fn validate_events_config(config: &EventsConfig) -> Result<(), ConfigError> {
    if config.buffer_capacity < 1 {
        return Err(ConfigError::Validation(
            "buffer_capacity must be >= 1".to_string(),
        ));
    }

    Ok(())
}
