//! Configuration type definitions
//!
//! This module contains all the struct definitions for configuration.

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::PathBuf;
use tracing::warn;

use super::defaults::*;

// ============================================
// SPREADSHEET CONFIG
// ============================================

/// Where appended rows go. Passed to the appender at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetConfig {
    /// Path of the .ods document (default: ~/Documents/MeineAblage.ods)
    #[serde(default = "default_spreadsheet_path")]
    pub path: PathBuf,
    /// Sheet receiving the rows (default: "Sheet1")
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
}

pub(crate) fn default_spreadsheet_path() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(DEFAULT_SPREADSHEET_FILE_NAME)
}
fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        SpreadsheetConfig {
            path: default_spreadsheet_path(),
            sheet_name: default_sheet_name(),
        }
    }
}

// ============================================
// FORM CONFIG
// ============================================

/// Popup form geometry and limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    #[serde(default = "default_form_width")]
    pub width: f32,
    #[serde(default = "default_form_height")]
    pub height: f32,
    /// Edge length of the square the preview is fitted into
    #[serde(default = "default_preview_size")]
    pub preview_size: f32,
    /// Maximum characters accepted by the episode field (default: 5)
    #[serde(default = "default_episode_max_length")]
    pub episode_max_length: usize,
}

fn default_form_width() -> f32 {
    DEFAULT_FORM_WIDTH
}
fn default_form_height() -> f32 {
    DEFAULT_FORM_HEIGHT
}
fn default_preview_size() -> f32 {
    DEFAULT_PREVIEW_SIZE
}
fn default_episode_max_length() -> usize {
    DEFAULT_EPISODE_MAX_LENGTH
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig {
            width: DEFAULT_FORM_WIDTH,
            height: DEFAULT_FORM_HEIGHT,
            preview_size: DEFAULT_PREVIEW_SIZE,
            episode_max_length: DEFAULT_EPISODE_MAX_LENGTH,
        }
    }
}

// ============================================
// MAIN CONFIG
// ============================================

/// Top-level host configuration, read from config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub spreadsheet: SpreadsheetConfig,
    #[serde(default)]
    pub form: FormConfig,
    /// User agent for scraping and preview downloads
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Cover used for the form preview (and stored for scraped entries) when none was found
    #[serde(default = "default_fallback_cover")]
    pub fallback_cover: String,
    /// strftime format of the date column
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Printed to the console after a manual run
    #[serde(default = "default_manual_confirmation")]
    pub manual_confirmation: String,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_fallback_cover() -> String {
    DEFAULT_FALLBACK_COVER.to_string()
}
fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}
fn default_manual_confirmation() -> String {
    DEFAULT_MANUAL_CONFIRMATION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            spreadsheet: SpreadsheetConfig::default(),
            form: FormConfig::default(),
            user_agent: default_user_agent(),
            fallback_cover: default_fallback_cover(),
            date_format: default_date_format(),
            manual_confirmation: default_manual_confirmation(),
        }
    }
}

impl Config {
    /// Date formatted for the date column.
    ///
    /// An invalid `dateFormat` falls back to the default format instead of panicking
    /// inside chrono's Display impl.
    pub fn date_stamp(&self, date: chrono::NaiveDate) -> String {
        let mut stamp = String::new();
        if write!(stamp, "{}", date.format(&self.date_format)).is_err() {
            warn!(date_format = %self.date_format, "Invalid date format, using default");
            return date.format(DEFAULT_DATE_FORMAT).to_string();
        }
        stamp
    }
}
