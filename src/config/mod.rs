//! Service configuration
//!
//! TOML with kebab-case keys. Every section, and every key within a section,
//! is optional and falls back to its default; the merged result is validated
//! before use.
//!
//! ```no_run
//! use pulse_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pulse.toml")).unwrap();
//! println!("Listening on {}", config.server.bind_address);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use types::{
    Config, EventsConfig, FetcherConfig, SchedulerConfig, ServerConfig, StoreConfig,
};
pub use validation::validate;
