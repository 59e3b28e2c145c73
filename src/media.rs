//! Image loading and encoding.
//!
//! Images are sent to the API inline as base64 data URIs. The MIME type is
//! detected from the file contents first (magic bytes), then from the file
//! extension, and only falls back to `image/jpeg` when both fail.

use std::fs;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use image::ImageFormat;
use tracing::{debug, trace};

use crate::error::Result;

/// MIME type assumed when neither content sniffing nor the file extension
/// identifies the image format.
pub const FALLBACK_MIME_TYPE: &str = "image/jpeg";

/// Read the file at `path` and return its contents as standard base64.
///
/// The whole file is loaded into memory; there is no streaming and no size
/// limit. Fails with an I/O error if the path does not exist or is
/// unreadable.
pub fn encode_image(path: impl AsRef<Path>) -> Result<String> {
    let bytes = fs::read(path.as_ref())?;
    trace!(len = bytes.len(), "Read image file");
    Ok(general_purpose::STANDARD.encode(bytes))
}

/// An image payload ready to embed in an API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// MIME type of the image (e.g. "image/png")
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

impl ImageFile {
    /// Load an image from disk, encoding it and detecting its MIME type.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mime_type = detect_mime_type(&bytes, Some(path));
        debug!(mime_type, len = bytes.len(), "Loaded image file");
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: general_purpose::STANDARD.encode(bytes),
        })
    }

    /// Create an image payload from raw bytes with an explicit MIME type.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Create an image payload from raw bytes, sniffing the MIME type from
    /// the content (falls back to `image/jpeg`).
    pub fn sniff(bytes: &[u8]) -> Self {
        let mime_type = detect_mime_type(bytes, None);
        Self {
            mime_type: mime_type.to_string(),
            data: general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Render as a `data:<mime>;base64,<payload>` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn detect_mime_type(bytes: &[u8], path: Option<&Path>) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    path.and_then(|p| p.extension())
        .and_then(ImageFormat::from_extension)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME_TYPE)
}
