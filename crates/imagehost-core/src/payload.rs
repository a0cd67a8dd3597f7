//! Data-URL payload decoder
//!
//! Parses the `data:image/<fmt>;base64,<body>` envelope uploads arrive in,
//! classifies the media type against a fixed allow-list, and decodes the
//! body into raw bytes under a configured size cap. Pure functions, no
//! side effects.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::AppError;

/// The `,` separating the media-type prefix from the base64 body must sit
/// within this many leading bytes (`data:image/jpeg;base64,` is 23).
const SEPARATOR_WINDOW: usize = 24;

/// Accepted image formats. `Jpg` is kept distinct from `Jpeg` so the
/// stored extension mirrors the declared media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Jpg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "image/jpeg" => Some(ImageFormat::Jpeg),
            "image/jpg" => Some(ImageFormat::Jpg),
            "image/png" => Some(ImageFormat::Png),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    /// File extension used in the storage key and retrieval URL.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Jpg => "image/jpg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }
}

/// An envelope decoded into classified raw bytes.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Decode a `data:` URL envelope into raw image bytes.
///
/// The size cap is enforced from the encoded length before any decoding
/// happens (4 base64 chars decode to at most 3 bytes), then re-checked
/// exactly on the decoded output.
pub fn decode_envelope(envelope: &str, max_decoded_bytes: usize) -> Result<DecodedImage, AppError> {
    let comma = envelope
        .as_bytes()
        .iter()
        .take(SEPARATOR_WINDOW)
        .position(|&b| b == b',')
        .ok_or_else(|| {
            AppError::MalformedPayload("could not locate media type separator".to_string())
        })?;

    let prefix = &envelope[..comma];
    let body = &envelope[comma + 1..];

    let media_type = prefix
        .strip_prefix("data:")
        .and_then(|rest| rest.strip_suffix(";base64"))
        .ok_or_else(|| {
            AppError::MalformedPayload(format!("not a base64 data URL: {prefix}"))
        })?;

    let format = ImageFormat::from_media_type(media_type).ok_or_else(|| {
        AppError::MalformedPayload(format!("unsupported media type: {media_type}"))
    })?;

    // Upper bound on the decoded size without touching the body; padding
    // can only shrink it by two bytes.
    let decoded_upper_bound = body.len() / 4 * 3;
    if decoded_upper_bound > max_decoded_bytes + 2 {
        return Err(AppError::PayloadTooLarge {
            actual: decoded_upper_bound,
            limit: max_decoded_bytes,
        });
    }

    let bytes = BASE64
        .decode(body)
        .map_err(|e| AppError::MalformedPayload(format!("invalid base64 body: {e}")))?;

    if bytes.len() > max_decoded_bytes {
        return Err(AppError::PayloadTooLarge {
            actual: bytes.len(),
            limit: max_decoded_bytes,
        });
    }

    Ok(DecodedImage { format, bytes })
}
