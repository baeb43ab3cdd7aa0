//! Configuration module for ASN-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so the crawler runs without a file at all.
//!
//! # Example
//!
//! ```no_run
//! use asn_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Writing dataset to: {}", config.output.path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, DEFAULT_BASE_URL, DEFAULT_OUTPUT_PATH,
    DEFAULT_USER_AGENT, DEFAULT_WORLD_PATH,
};

// Re-export parser functions
pub use parser::{load_config, load_or_default, parse_config};
pub use validation::validate;
