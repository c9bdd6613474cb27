//! Configuration module for Site-Spider
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section and key is optional; command-line flags override what the file
//! sets.
//!
//! # Example
//!
//! ```no_run
//! use site_spider::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("spider.toml")).unwrap();
//! println!("Probe timeout: {}s", config.spider.probe_timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, OutputConfig, PolicyConfig, SpiderConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

pub use validation::{validate, validate_timeout};
