//! Image encoding for vision requests.
//!
//! An image file is read once, base64 encoded, and rendered as a data URL
//! (`data:image/jpeg;base64,...`) suitable for an `image_url` content part.
//!
//! The MIME type in the data URL is the *declared* format, which defaults to
//! JPEG. The file contents are never validated against it; the format sniffed
//! from the magic bytes is only logged.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Image formats that can be declared in a data URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ImageFormat {
    /// JPEG format (default).
    #[default]
    Jpeg,
    /// PNG format.
    Png,
    /// GIF format.
    Gif,
    /// WebP format.
    Webp,
}

impl ImageFormat {
    /// Get the MIME type for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Parse a format name or file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Detect format from magic bytes (file signature).
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, 0x50, 0x4E, 0x47, ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x47, 0x49, 0x46, 0x38, ..] => Some(Self::Gif),
            [0x52, 0x49, 0x46, 0x46, _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s)
            .ok_or_else(|| Error::config(format!("unsupported image format: {s}")))
    }
}

/// A base64 encoded image with its declared format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    data: String,
    format: ImageFormat,
}

impl EncodedImage {
    /// Encode raw bytes, declaring them as `format`.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], format: ImageFormat) -> Self {
        Self {
            data: encode_bytes(bytes),
            format,
        }
    }

    /// The base64 payload.
    #[must_use]
    pub fn as_base64(&self) -> &str {
        &self.data
    }

    /// Render as a data URL (`data:<mime>;base64,<payload>`).
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.data)
    }
}

/// Base64 encode bytes with the standard padded alphabet.
#[must_use]
pub fn encode_bytes(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Read the file at `path` and encode it, declaring it as `format`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file does not exist or cannot be read.
pub async fn encode_image(path: impl AsRef<Path>, format: ImageFormat) -> Result<EncodedImage> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::io(path, e))?;

    let sniffed = ImageFormat::from_magic_bytes(&bytes);
    if sniffed.is_some_and(|f| f != format) {
        debug!(
            path = %path.display(),
            declared = format.mime_type(),
            detected = ?sniffed,
            "image content does not match declared format"
        );
    }

    let image = EncodedImage::from_bytes(&bytes, format);
    debug!(
        path = %path.display(),
        bytes = bytes.len(),
        encoded = image.as_base64().len(),
        "encoded image"
    );
    Ok(image)
}
