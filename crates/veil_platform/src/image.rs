//! Image decode facility

/// What to load for one image channel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageRequest {
    /// Primary source URL or path
    pub src: Option<String>,
    /// Responsive source candidates (`srcset` syntax)
    pub src_set: Option<String>,
    /// Layout size hints for `src_set` (`sizes` syntax)
    pub sizes: Option<String>,
}

impl ImageRequest {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Default::default()
        }
    }

    pub fn src_set(mut self, src_set: impl Into<String>) -> Self {
        self.src_set = Some(src_set.into());
        self
    }

    pub fn sizes(mut self, sizes: impl Into<String>) -> Self {
        self.sizes = Some(sizes.into());
        self
    }

    /// True when there is nothing the decoder could fetch
    pub fn is_empty(&self) -> bool {
        self.src.is_none() && self.src_set.is_none()
    }

    /// Short label used in logs
    pub fn label(&self) -> &str {
        self.src
            .as_deref()
            .or(self.src_set.as_deref())
            .unwrap_or("<empty>")
    }
}

/// Natural dimensions reported once an image finished decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedImage {
    pub natural_width: u32,
    pub natural_height: u32,
}

impl DecodedImage {
    pub fn new(natural_width: u32, natural_height: u32) -> Self {
        Self {
            natural_width,
            natural_height,
        }
    }

    /// Height over width, `None` for a zero-width image
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.natural_width == 0 {
            return None;
        }
        Some(self.natural_height as f64 / self.natural_width as f64)
    }
}

/// Called once when the image has been decoded
pub type ImageLoadCallback = Box<dyn FnOnce(DecodedImage)>;

/// Platform image decoder
///
/// `on_load` fires at most once, asynchronously. A failed decode never fires it.
pub trait ImageDecoder {
    fn decode(&self, request: ImageRequest, on_load: ImageLoadCallback);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(DecodedImage::new(500, 100).aspect_ratio(), Some(0.2));
        assert_eq!(DecodedImage::new(100, 100).aspect_ratio(), Some(1.0));
        assert_eq!(DecodedImage::new(0, 100).aspect_ratio(), None);
    }

    #[test]
    fn test_request_label() {
        assert_eq!(ImageRequest::new("a.jpg").label(), "a.jpg");
        let set_only = ImageRequest {
            src_set: Some("a.jpg 1x, b.jpg 2x".into()),
            ..Default::default()
        };
        assert_eq!(set_only.label(), "a.jpg 1x, b.jpg 2x");
        assert!(ImageRequest::default().is_empty());
    }
}
