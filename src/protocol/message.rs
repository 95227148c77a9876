//! Native messaging payloads
//!
//! The browser sends a loosely-typed JSON object; nothing is validated up front.
//! [`Request`] keeps the decoded key/value bag verbatim and exposes typed
//! accessors for the keys the extension is known to send.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys sent by the browser extension
pub mod keys {
    pub const TEXT: &str = "text";
    pub const URL: &str = "url";
    pub const IMAGE_SRC: &str = "imageSrc";
    pub const TITLE: &str = "title";
    pub const NETFLIX: &str = "netflix";
    pub const FSMIRROR: &str = "fsmirror";
}

/// One request from the browser: an unordered JSON object.
///
/// A key holding the wrong JSON type reads as absent through the typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Request {
    fields: Map<String, Value>,
}

impl Request {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// The raw decoded bag
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// String value of `key`, or None when absent or not a string
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// True only when `key` holds JSON `true`
    pub fn flag(&self, key: &str) -> bool {
        self.fields
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn text(&self) -> Option<&str> {
        self.str_field(keys::TEXT)
    }

    /// Source page URL, empty when absent
    pub fn url(&self) -> &str {
        self.str_field(keys::URL).unwrap_or_default()
    }

    /// Cover image found by the extension, empty when absent
    pub fn image_src(&self) -> &str {
        self.str_field(keys::IMAGE_SRC).unwrap_or_default()
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field(keys::TITLE)
    }

    pub fn is_netflix(&self) -> bool {
        self.flag(keys::NETFLIX)
    }

    pub fn is_fsmirror(&self) -> bool {
        self.flag(keys::FSMIRROR)
    }
}

/// Result indicator written back to the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultStatus {
    #[serde(rename = "OK")]
    Ok,
}

/// The single reply per request: `{"result":"OK"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub result: ResultStatus,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            result: ResultStatus::Ok,
        }
    }
}
