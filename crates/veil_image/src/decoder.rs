//! Native image decoder
//!
//! Implements the platform [`ImageDecoder`] for hosts without a browser: the
//! source is resolved and decoded with the `image` crate, and the natural size
//! is reported on a later event loop turn so `on_load` never runs inside the
//! caller's stack. Failures are logged and never reported; there are no retries.

use std::rc::Rc;

use veil_platform::{ImageDecoder, ImageLoadCallback, ImageRequest, TaskScheduler};

use crate::error::{ImageError, Result};
use crate::loader;
use crate::source::{first_candidate, ImageSource};

pub struct BytesImageDecoder {
    tasks: Rc<dyn TaskScheduler>,
}

impl BytesImageDecoder {
    pub fn new(tasks: Rc<dyn TaskScheduler>) -> Self {
        Self { tasks }
    }

    /// Pick the source to decode: `src` first, then the first `srcset` candidate
    pub fn resolve(request: &ImageRequest) -> Result<ImageSource> {
        request
            .src
            .as_deref()
            .or_else(|| request.src_set.as_deref().and_then(first_candidate))
            .map(ImageSource::parse)
            .ok_or_else(|| ImageError::UnsupportedSource("request has no source".to_string()))
    }
}

impl ImageDecoder for BytesImageDecoder {
    fn decode(&self, request: ImageRequest, on_load: ImageLoadCallback) {
        let decoded = Self::resolve(&request).and_then(|source| loader::load(&source));
        match decoded {
            Ok(decoded) => {
                tracing::debug!(src = request.label(), "image decoded");
                self.tasks.defer(Box::new(move || on_load(decoded)));
            }
            Err(e) => {
                tracing::warn!(src = request.label(), "image failed to load: {}", e);
            }
        }
    }
}
