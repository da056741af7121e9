//! `HtmlImageElement` decoding
//!
//! A detached `<img>` is created per request; the browser fetches and decodes
//! it and `onload` reports the natural size. Failed loads are logged and never
//! signal. Either outcome detaches both handlers.

use veil_platform::{DecodedImage, ImageDecoder, ImageLoadCallback, ImageRequest};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::HtmlImageElement;

#[derive(Default)]
pub struct WebImageDecoder;

impl WebImageDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ImageDecoder for WebImageDecoder {
    fn decode(&self, request: ImageRequest, on_load: ImageLoadCallback) {
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(?err, src = %request.label(), "could not create image element");
                return;
            }
        };

        let loaded = image.clone();
        let onload = Closure::once_into_js(move || {
            loaded.set_onload(None);
            loaded.set_onerror(None);
            on_load(DecodedImage::new(loaded.natural_width(), loaded.natural_height()));
        });
        let failed = image.clone();
        let label = request.label().to_string();
        let onerror = Closure::once_into_js(move || {
            failed.set_onload(None);
            failed.set_onerror(None);
            tracing::warn!(src = %label, "image failed to load");
        });
        image.set_onload(Some(onload.unchecked_ref()));
        image.set_onerror(Some(onerror.unchecked_ref()));

        // sizes and srcset before src so the browser picks the right candidate
        if let Some(sizes) = &request.sizes {
            image.set_sizes(sizes);
        }
        if let Some(src_set) = &request.src_set {
            image.set_srcset(src_set);
        }
        if let Some(src) = &request.src {
            image.set_src(src);
        }
    }
}
