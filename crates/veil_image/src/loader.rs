//! Natural dimension loading

use base64::Engine;
use image::GenericImageView;
use veil_platform::DecodedImage;

use crate::error::{ImageError, Result};
use crate::source::ImageSource;

/// Decode an image from a source and report its natural size
///
/// Remote URLs are not fetched; the browser backend handles those.
pub fn load(source: &ImageSource) -> Result<DecodedImage> {
    match source {
        ImageSource::File(path) => {
            let data = std::fs::read(path)
                .map_err(|e| ImageError::FileLoad(format!("{}: {}", path.display(), e)))?;
            load_bytes(&data)
        }
        ImageSource::Base64(data) => load_base64(data),
        ImageSource::Url(url) => Err(ImageError::UnsupportedSource(format!(
            "{url}: remote images require a networked platform"
        ))),
    }
}

/// Decode image bytes
pub fn load_bytes(data: &[u8]) -> Result<DecodedImage> {
    let img = image::load_from_memory(data)?;
    let (width, height) = img.dimensions();
    Ok(DecodedImage::new(width, height))
}

/// Decode a base64 payload
///
/// Supports both plain base64 and data URIs like
/// `data:image/png;base64,iVBORw0KGgo...`.
pub fn load_base64(data: &str) -> Result<DecodedImage> {
    let payload = if data.starts_with("data:") {
        data.find(";base64,")
            .map(|pos| &data[pos + 8..])
            .ok_or_else(|| ImageError::Base64("Invalid data URI format".to_string()))?
    } else {
        data
    };

    let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
    load_bytes(&bytes)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_data_uri() {
        let decoded = load(&ImageSource::parse(fixtures::PIXEL_PNG)).unwrap();
        assert_eq!(decoded, DecodedImage::new(1, 1));
        assert_eq!(decoded.aspect_ratio(), Some(1.0));
    }

    #[test]
    fn test_invalid_data_uri() {
        let err = load_base64("data:image/png,nope").unwrap_err();
        assert!(matches!(err, ImageError::Base64(_)));
    }

    #[test]
    fn test_garbage_bytes() {
        assert!(matches!(
            load_bytes(b"not an image"),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load(&ImageSource::parse("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, ImageError::FileLoad(_)));
    }

    #[test]
    fn test_remote_url_unsupported() {
        let err = load(&ImageSource::parse("https://example.com/a.png")).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedSource(_)));
    }
}
