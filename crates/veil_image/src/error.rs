//! Image error types

use thiserror::Error;

/// Errors raised while resolving or decoding an image
#[derive(Error, Debug)]
pub enum ImageError {
    /// Failed to read an image file
    #[error("Failed to load image file: {0}")]
    FileLoad(String),

    /// Bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Malformed base64 payload or data URI
    #[error("Invalid base64 image data: {0}")]
    Base64(String),

    /// The decoder cannot fetch this kind of source
    #[error("Unsupported image source: {0}")]
    UnsupportedSource(String),
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        ImageError::Decode(err.to_string())
    }
}

impl From<base64::DecodeError> for ImageError {
    fn from(err: base64::DecodeError) -> Self {
        ImageError::Base64(err.to_string())
    }
}

/// Result type for image operations
pub type Result<T> = std::result::Result<T, ImageError>;
