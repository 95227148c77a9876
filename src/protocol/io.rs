//! Protocol I/O for length-prefixed native messaging frames
//!
//! Wire format, both directions: a 4-byte unsigned length in native byte order,
//! followed by that many bytes of UTF-8 JSON.
//!
//! This module provides:
//! - `read_frame` / `read_request` for the single inbound message
//! - `encode_frame` / `write_message` / `send_response` for the reply
//! - `read_message` for typed reads (used by the simulator on the reply side)

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Read, Write};
use tracing::{debug, warn};

use super::message::{Request, Response};
use crate::error::{BridgeError, Result};

/// Size of the length prefix in bytes
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Browsers drop host messages larger than 1 MiB
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Maximum length for raw JSON in logs (data: URIs can be huge)
const MAX_RAW_LOG_PREVIEW: usize = 200;

/// Get a truncated preview of raw JSON for logging, cut on a char boundary
pub fn log_preview(raw: &str) -> (&str, usize) {
    let len = raw.len();
    match raw.char_indices().nth(MAX_RAW_LOG_PREVIEW) {
        Some((byte_idx, _)) => (&raw[..byte_idx], len),
        None => (raw, len),
    }
}

/// Fill `buf` completely. Returns Ok(false) if the stream ended first.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Read one raw frame body.
///
/// # Returns
/// * `Ok(Some(bytes))` - a complete frame
/// * `Ok(None)` - fewer than 4 prefix bytes, or a body shorter than announced
/// * `Err(e)` - the underlying reader failed
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut prefix = [0u8; LENGTH_PREFIX_BYTES];
    if !read_full(reader, &mut prefix)? {
        debug!("Input ended before a full length prefix");
        return Ok(None);
    }

    let expected = u64::from(u32::from_ne_bytes(prefix));

    // Bounded read: a bogus length never turns into a giant allocation up front
    let mut body = Vec::new();
    Read::by_ref(reader).take(expected).read_to_end(&mut body)?;

    if (body.len() as u64) < expected {
        warn!(
            expected_bytes = expected,
            received_bytes = body.len(),
            "Truncated native message body"
        );
        return Ok(None);
    }

    debug!(bytes = body.len(), "Read native message frame");
    Ok(Some(body))
}

/// Parse a frame body into a request bag.
///
/// Invalid UTF-8, invalid JSON and non-object JSON all read as "no request".
pub fn parse_request(body: &[u8]) -> Option<Request> {
    let text = match std::str::from_utf8(body) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Native message is not valid UTF-8");
            return None;
        }
    };

    let (preview, raw_len) = log_preview(text);
    match serde_json::from_str::<Request>(text) {
        Ok(request) => {
            debug!(raw_preview = %preview, raw_len, "Parsed native message");
            Some(request)
        }
        Err(e) => {
            warn!(
                raw_preview = %preview,
                raw_len,
                error = %e,
                "Native message is not a JSON object"
            );
            None
        }
    }
}

/// Block until the single request arrives.
///
/// Returns None when no (complete, well-formed) request was received. This is
/// the manual-invocation case, not an error.
pub fn read_request<R: Read>(reader: &mut R) -> Option<Request> {
    match read_frame(reader) {
        Ok(Some(body)) => parse_request(&body),
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "Failed to read native message");
            None
        }
    }
}

/// Read one frame and deserialize it as `T`.
///
/// Unlike `read_request` this is strict: malformed payloads are errors.
pub fn read_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<Option<T>> {
    match read_frame(reader)? {
        Some(body) => Ok(Some(serde_json::from_slice(&body)?)),
        None => Ok(None),
    }
}

/// Serialize `msg` to a complete frame: length prefix + JSON bytes
pub fn encode_frame<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(msg)?;
    if payload.len() > MAX_RESPONSE_BYTES {
        return Err(BridgeError::FrameTooLarge {
            len: payload.len(),
            max: MAX_RESPONSE_BYTES,
        });
    }

    // Fits: MAX_RESPONSE_BYTES is far below u32::MAX
    let prefix = (payload.len() as u32).to_ne_bytes();
    let mut frame = Vec::with_capacity(LENGTH_PREFIX_BYTES + payload.len());
    frame.extend_from_slice(&prefix);
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Write one framed message and flush
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, msg: &T) -> Result<()> {
    let frame = encode_frame(msg)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    debug!(bytes = frame.len(), "Wrote native message frame");
    Ok(())
}

/// Send the reply to the browser
pub fn send_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    write_message(writer, response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Cursor;

    fn frame_bytes(payload: &[u8]) -> Vec<u8> {
        let mut bytes = (payload.len() as u32).to_ne_bytes().to_vec();
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_read_request_matches_decoded_json() {
        let sent = json!({
            "text": "Babylon Berlin",
            "url": "https://example.com/bb",
            "imageSrc": "https://example.com/bb.jpg",
            "netflix": false,
            "nested": {"a": [1, 2, 3]},
            "count": 3
        });
        let payload = serde_json::to_vec(&sent).unwrap();
        let mut input = Cursor::new(frame_bytes(&payload));

        let request = read_request(&mut input).expect("request");
        assert_eq!(Value::Object(request.fields().clone()), sent);
    }

    #[test]
    fn test_read_request_short_prefix_is_no_request() {
        for len in 0..LENGTH_PREFIX_BYTES {
            let mut input = Cursor::new(vec![1u8; len]);
            assert!(read_request(&mut input).is_none(), "prefix of {} bytes", len);
        }
    }

    #[test]
    fn test_read_request_truncated_body_is_no_request() {
        let mut bytes = 100u32.to_ne_bytes().to_vec();
        bytes.extend_from_slice(br#"{"text":"cut"#);
        let mut input = Cursor::new(bytes);
        assert!(read_request(&mut input).is_none());
    }

    #[test]
    fn test_read_request_huge_length_does_not_preallocate() {
        let mut input = Cursor::new(u32::MAX.to_ne_bytes().to_vec());
        assert!(read_request(&mut input).is_none());
    }

    #[test]
    fn test_read_request_malformed_payloads_are_no_request() {
        for payload in [&b"not json"[..], b"[1,2,3]", b"\"text\"", &[0xff, 0xfe, 0xfd]] {
            let mut input = Cursor::new(frame_bytes(payload));
            assert!(read_request(&mut input).is_none());
        }
    }

    #[test]
    fn test_read_request_empty_object() {
        let mut input = Cursor::new(frame_bytes(b"{}"));
        let request = read_request(&mut input).expect("request");
        assert!(request.fields().is_empty());
    }

    #[test]
    fn test_send_response_exact_framing() {
        let mut out = Vec::new();
        send_response(&mut out, &Response::ok()).unwrap();

        let json = br#"{"result":"OK"}"#;
        assert_eq!(out.len(), LENGTH_PREFIX_BYTES + json.len());
        let prefix: [u8; 4] = out[..4].try_into().unwrap();
        assert_eq!(u32::from_ne_bytes(prefix) as usize, json.len());
        assert_eq!(&out[4..], json);
    }

    #[test]
    fn test_length_counts_utf8_bytes_not_chars() {
        let msg = json!({"text": "Grüße 🎬"});
        let frame = encode_frame(&msg).unwrap();
        let payload = serde_json::to_vec(&msg).unwrap();

        let prefix: [u8; 4] = frame[..4].try_into().unwrap();
        assert_eq!(u32::from_ne_bytes(prefix) as usize, payload.len());
        assert!(payload.len() > "Grüße 🎬".chars().count());
    }

    #[test]
    fn test_oversized_reply_is_rejected() {
        let msg = json!({"text": "x".repeat(MAX_RESPONSE_BYTES)});
        let mut out = Vec::new();
        let err = write_message(&mut out, &msg).unwrap_err();
        assert!(matches!(err, BridgeError::FrameTooLarge { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_read_message_reads_written_reply() {
        let mut wire = Vec::new();
        send_response(&mut wire, &Response::ok()).unwrap();

        let reply: Option<Response> = read_message(&mut Cursor::new(wire)).unwrap();
        assert_eq!(reply, Some(Response::ok()));

        let nothing: Option<Response> = read_message(&mut Cursor::new(Vec::new())).unwrap();
        assert_eq!(nothing, None);
    }

    #[test]
    fn test_log_preview_truncates_on_char_boundary() {
        let raw = "ä".repeat(300);
        let (preview, len) = log_preview(&raw);
        assert_eq!(preview.chars().count(), 200);
        assert_eq!(len, raw.len());

        let (short, _) = log_preview("{}");
        assert_eq!(short, "{}");
    }
}
