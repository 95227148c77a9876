//! Preview image loading for the popup form
//!
//! A preview source is a `data:` URI, an http(s) URL or a local path. Every
//! failure is swallowed: the form simply renders without a preview.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use gpui::RenderImage;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::error::ResultExt;
use crate::scraper::PageFetcher;

/// Where a preview source points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewSource<'a> {
    DataUri(&'a str),
    Remote(&'a str),
    File(&'a Path),
}

impl<'a> PreviewSource<'a> {
    /// Classify a source string. Empty strings have no preview.
    pub fn parse(source: &'a str) -> Option<Self> {
        let source = source.trim();
        if source.is_empty() {
            None
        } else if source.starts_with("data:") {
            Some(Self::DataUri(source))
        } else if source.starts_with("http://") || source.starts_with("https://") {
            Some(Self::Remote(source))
        } else {
            Some(Self::File(Path::new(source)))
        }
    }
}

/// Decode the payload of a base64 `data:` URI
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let (header, payload) = uri.strip_prefix("data:")?.split_once(',')?;
    if !header.ends_with(";base64") {
        debug!(header, "Unsupported data URI encoding");
        return None;
    }
    BASE64.decode(payload.trim()).warn_on_err()
}

/// Relative paths are tried as given, then next to the executable
fn resolve_file(path: &Path) -> Option<PathBuf> {
    if path.exists() {
        return Some(path.to_path_buf());
    }
    if path.is_relative() {
        let beside_exe = std::env::current_exe()
            .ok()?
            .parent()?
            .join(path);
        if beside_exe.exists() {
            return Some(beside_exe);
        }
    }
    None
}

/// Raw image bytes for `source`, or None
pub fn load_preview_bytes(source: &str, fetcher: &dyn PageFetcher) -> Option<Vec<u8>> {
    match PreviewSource::parse(source)? {
        PreviewSource::DataUri(uri) => decode_data_uri(uri),
        PreviewSource::Remote(url) => fetcher.fetch_bytes(url).warn_on_err(),
        PreviewSource::File(path) => {
            let Some(resolved) = resolve_file(path) else {
                debug!(path = %path.display(), "Preview file not found");
                return None;
            };
            std::fs::read(resolved).warn_on_err()
        }
    }
}

/// Decode any supported format into a BGRA frame (gpui's pixel order)
pub fn decode_bgra(bytes: &[u8]) -> Result<image::RgbaImage, image::ImageError> {
    let mut rgba = image::load_from_memory(bytes)?.to_rgba8();
    for pixel in rgba.pixels_mut() {
        pixel.0.swap(0, 2);
    }
    Ok(rgba)
}

/// Decode image bytes into a renderable image
pub fn decode_render_image(bytes: &[u8]) -> Result<Arc<RenderImage>, image::ImageError> {
    let frame = image::Frame::new(decode_bgra(bytes)?);
    Ok(Arc::new(RenderImage::new(SmallVec::from_elem(frame, 1))))
}

/// Resolve, fetch and decode a preview. None when any step fails.
pub fn load_preview(source: &str, fetcher: &dyn PageFetcher) -> Option<Arc<RenderImage>> {
    let bytes = load_preview_bytes(source, fetcher)?;
    match decode_render_image(&bytes) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(error = %e, bytes = bytes.len(), "Failed to decode preview image");
            None
        }
    }
}
