//! calc-bridge - browser native messaging host
//!
//! Receives one framed JSON message from a browser extension, optionally
//! scrapes the source page, asks the user to confirm the entry in a popup
//! form and appends it to an OpenDocument spreadsheet.

pub mod components;
pub mod config;
pub mod error;
pub mod host;
pub mod install;
pub mod logging;
pub mod popup_form;
pub mod preview;
pub mod protocol;
pub mod scraper;
pub mod spreadsheet;
