//! Image source resolution

use std::path::PathBuf;

/// Where an image `src` points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Local file path (plain path or `file://` URL)
    File(PathBuf),
    /// Inline `data:` URI or bare base64 payload
    Base64(String),
    /// Remote URL
    Url(String),
}

impl ImageSource {
    /// Classify a `src` string
    pub fn parse(src: &str) -> Self {
        let src = src.trim();
        if src.starts_with("data:") {
            ImageSource::Base64(src.to_string())
        } else if let Some(path) = src.strip_prefix("file://") {
            ImageSource::File(PathBuf::from(path))
        } else if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("//")
        {
            ImageSource::Url(src.to_string())
        } else {
            ImageSource::File(PathBuf::from(src))
        }
    }
}

/// First candidate URL of a `srcset` list
///
/// `"small.jpg 480w, large.jpg 1080w"` yields `"small.jpg"`.
pub fn first_candidate(src_set: &str) -> Option<&str> {
    src_set
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .next()
}
