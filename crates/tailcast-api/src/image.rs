//! Image input for vision prompts.
//!
//! Any file with an image MIME type is accepted. No size limit is enforced;
//! 4MB is only a recommendation.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Advisory upper bound on image size.
pub const RECOMMENDED_MAX_BYTES: usize = 4 * 1024 * 1024;

/// MIME type used when the caller cannot tell.
pub const FALLBACK_MIME: &str = "image/png";

/// A base64-encoded inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePart {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("not an image: {0}")]
    NotAnImage(String),

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

impl ImagePart {
    /// Encode raw bytes. An empty MIME type falls back to `image/png`.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Result<Self, ImageError> {
        let mime_type = if mime_type.is_empty() {
            FALLBACK_MIME
        } else {
            mime_type
        };
        if !mime_type.starts_with("image/") {
            return Err(ImageError::NotAnImage(mime_type.to_string()));
        }
        if bytes.len() > RECOMMENDED_MAX_BYTES {
            tracing::debug!(size = bytes.len(), "image exceeds recommended size");
        }
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        })
    }

    /// Read and encode an image file, deriving the MIME type from its extension.
    pub async fn from_path(path: &Path) -> Result<Self, ImageError> {
        let mime = mime_for_path(path)
            .ok_or_else(|| ImageError::NotAnImage(path.display().to_string()))?;
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(mime, &bytes)
    }

    /// Split a `data:<mime>;base64,<payload>` URL into an image part.
    pub fn from_data_url(url: &str) -> Result<Self, ImageError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| ImageError::NotAnImage("not a data URL".into()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::NotAnImage("malformed data URL".into()))?;
        let mime_type = header.trim_end_matches(";base64");
        if !mime_type.starts_with("image/") {
            return Err(ImageError::NotAnImage(mime_type.to_string()));
        }
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime)
}
