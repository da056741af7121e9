//! Veil Web Platform
//!
//! Browser backend for Veil: `setTimeout` and `requestAnimationFrame`
//! scheduling, `HtmlImageElement` decoding and a native `IntersectionObserver`.
//!
//! # Example
//!
//! ```ignore
//! use veil_platform_web::{bind_element, install};
//!
//! let platform = Rc::new(install()?);
//! let host = Host::mount(img("hero.jpg").lazy(), platform)?;
//! // tag each DOM node and insert it into the document before mounting
//! bind_element(id, &node);
//! ```

pub mod image;
pub mod intersection;
pub mod scheduler;

pub use image::WebImageDecoder;
pub use intersection::{
    bind_element, element_selector, has_native_intersection_observer, parse_element_id,
    unbind_element, WebIntersectionProvider, ELEMENT_ID_ATTR,
};
pub use scheduler::WebScheduler;

use std::rc::Rc;

use veil_platform::{
    install_intersection_provider, FrameScheduler, ImageDecoder, Platform, PlatformError,
    TaskScheduler,
};

/// Browser platform implementation
pub struct WebPlatform {
    scheduler: Rc<WebScheduler>,
    images: Rc<WebImageDecoder>,
}

impl WebPlatform {
    pub fn new() -> Result<Self, PlatformError> {
        let window =
            web_sys::window().ok_or_else(|| PlatformError::Unavailable("window".to_string()))?;
        Ok(Self {
            scheduler: Rc::new(WebScheduler::new(window)),
            images: Rc::new(WebImageDecoder::new()),
        })
    }
}

impl Platform for WebPlatform {
    fn name(&self) -> &'static str {
        "web"
    }

    fn tasks(&self) -> Rc<dyn TaskScheduler> {
        self.scheduler.clone()
    }

    fn frames(&self) -> Rc<dyn FrameScheduler> {
        self.scheduler.clone()
    }

    fn images(&self) -> Rc<dyn ImageDecoder> {
        self.images.clone()
    }
}

/// Create the platform and install intersection support
///
/// The provider is only installed when the browser has a native
/// `IntersectionObserver`; without one, lazy components fail to mount with
/// `UnsupportedPlatform` unless a polyfill is loaded first.
pub fn install() -> Result<WebPlatform, PlatformError> {
    let window =
        web_sys::window().ok_or_else(|| PlatformError::Unavailable("window".to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| PlatformError::Unavailable("document".to_string()))?;
    if has_native_intersection_observer(&window) {
        install_intersection_provider(Rc::new(WebIntersectionProvider::new(document)));
        tracing::debug!("IntersectionObserver provider installed");
    } else {
        tracing::warn!("IntersectionObserver missing, lazy loading unavailable");
    }
    WebPlatform::new()
}
