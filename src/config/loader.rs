//! Configuration loading from file system
//!
//! Handles locating and parsing the JSON config file.

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::{APP_DIR_NAME, CONFIG_FILE_NAME};
use super::types::Config;
use crate::error::{BridgeError, Result};

/// Default location: `<config_dir>/calc-bridge/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from `explicit_path`, or from the default location.
///
/// Returns Config::default() if the file is missing or cannot be parsed.
#[instrument(name = "load_config")]
pub fn load_config(explicit_path: Option<&Path>) -> Config {
    let config_path = match explicit_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
    {
        Some(path) => path,
        None => {
            info!("No config directory on this platform, using defaults");
            return Config::default();
        }
    };

    load_config_from(&config_path)
}

/// Load and parse a config file, falling back to defaults on any failure
pub fn load_config_from(config_path: &Path) -> Config {
    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    let contents = match std::fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(
                path = %config_path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            return Config::default();
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            info!(
                path = %config_path.display(),
                spreadsheet = %config.spreadsheet.path.display(),
                sheet = %config.spreadsheet.sheet_name,
                "Successfully loaded config"
            );
            config
        }
        Err(e) => {
            warn!(
                path = %config_path.display(),
                error = %e,
                "Failed to parse config JSON, using defaults"
            );
            Config::default()
        }
    }
}

/// Parse config JSON. Type mismatches carry an example in the message.
pub fn parse_config(contents: &str) -> Result<Config> {
    serde_json::from_str::<Config>(contents).map_err(|e| {
        let hint = if e.to_string().contains("invalid type") {
            "\n\nHint: paths and names are strings, sizes are numbers. Example:\n\
            {\n\
              \"spreadsheet\": { \"path\": \"/home/me/Documents/list.ods\", \"sheetName\": \"Sheet1\" },\n\
              \"form\": { \"episodeMaxLength\": 5 }\n\
            }"
        } else {
            ""
        };
        BridgeError::Config(format!("{}{}", e, hint))
    })
}
