//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// File name of the spreadsheet when no path is configured
pub const DEFAULT_SPREADSHEET_FILE_NAME: &str = "MeineAblage.ods";

/// Sheet that receives appended rows
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// User agent sent with page scrape and preview requests
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Cover shown in the form when a page yields no image
pub const DEFAULT_FALLBACK_COVER: &str = "icon.png";

/// Date stamp format for the third column (chrono strftime syntax)
pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

/// Console message printed after a manual (non-browser) run
pub const DEFAULT_MANUAL_CONFIRMATION: &str = "Gespeichert!";

/// Placeholder title used when the browser sent no usable text
pub const DEFAULT_PLACEHOLDER_TITLE: &str = "Fill";

/// Popup form geometry
pub const DEFAULT_FORM_WIDTH: f32 = 400.0;
pub const DEFAULT_FORM_HEIGHT: f32 = 560.0;
pub const DEFAULT_PREVIEW_SIZE: f32 = 160.0;

/// Maximum number of characters in the episode field
pub const DEFAULT_EPISODE_MAX_LENGTH: usize = 5;

/// Application directory name under the platform config/data dirs
pub const APP_DIR_NAME: &str = "calc-bridge";

/// Config file name inside the application config directory
pub const CONFIG_FILE_NAME: &str = "config.json";
