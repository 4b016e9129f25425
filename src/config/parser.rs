use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Reads, parses and validates the TOML file at `path`
///
/// # Errors
///
/// * `ConfigError::Io` - the file could not be read
/// * `ConfigError::Parse` - the file is not valid TOML for [`Config`]
/// * `ConfigError::Validation` - a value is out of range
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use pulse_scraper::config::load_config;
///
/// let config = load_config(Path::new("pulse.toml")).unwrap();
/// println!("History cap: {}", config.store.max_history_per_key);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&fs::read_to_string(path)?)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex SHA-256 of a configuration file's raw bytes
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(hash_content(&fs::read_to_string(path)?))
}

/// Loads a configuration together with the hash of the exact text it was parsed from
///
/// The hash is logged at startup to identify which file a running instance
/// was started with.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
