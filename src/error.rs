use thiserror::Error;
use tracing::{error, warn};

/// Domain-specific errors for the calc bridge host
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode or decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request to '{url}' failed: {message}")]
    Http { url: String, message: String },

    #[error("Failed to {action} spreadsheet '{path}': {message}")]
    Spreadsheet {
        path: String,
        action: &'static str,
        message: String,
    },

    #[error("Native message of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Window operation failed: {0}")]
    Window(String),

    #[error("Host registration failed: {0}")]
    Install(String),
}

impl BridgeError {
    /// Short message suitable for the console in manual mode
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(e) => format!("File access failed: {}", e),
            Self::Json(e) => format!("Invalid message format: {}", e),
            Self::Http { url, .. } => format!("Could not load {}", url),
            Self::Spreadsheet { path, action, .. } => {
                format!("Could not {} spreadsheet {}", action, path)
            }
            Self::FrameTooLarge { len, .. } => format!("Reply too large ({} bytes)", len),
            Self::Config(msg) => format!("Configuration issue: {}", msg),
            Self::Window(msg) => msg.clone(),
            Self::Install(msg) => msg.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use calc_bridge::error::ResultExt;
///
/// // Page could not be fetched: fall back to no metadata
/// let html = fetcher.fetch_text(url).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
