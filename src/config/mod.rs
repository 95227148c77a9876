//! Configuration module - host settings
//!
//! This module provides functionality for:
//! - Loading configuration from `<config_dir>/calc-bridge/config.json`
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, SpreadsheetConfig, FormConfig)
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{APP_DIR_NAME, DEFAULT_PLACEHOLDER_TITLE};

pub use types::{Config, FormConfig, SpreadsheetConfig};

pub use loader::{default_config_path, load_config, load_config_from, parse_config};

#[cfg(test)]
pub use defaults::{
    DEFAULT_DATE_FORMAT, DEFAULT_EPISODE_MAX_LENGTH, DEFAULT_FALLBACK_COVER, DEFAULT_SHEET_NAME,
    DEFAULT_USER_AGENT,
};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
