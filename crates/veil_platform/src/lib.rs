//! Veil Platform Abstraction Layer
//!
//! This crate provides the platform-agnostic traits that Veil components are
//! written against: element identity, viewport intersection, image decoding
//! and event loop scheduling.
//!
//! # Architecture
//!
//! - [`Platform`] - bundles the schedulers and the image decoder
//! - [`IntersectionProvider`] - per-thread viewport intersection support
//! - [`TaskScheduler`] / [`FrameScheduler`] - next tick and next frame
//! - [`ImageDecoder`] - asynchronous decode reporting natural dimensions
//!
//! # Platform Implementations
//!
//! - `veil_runtime` - headless event loop, used by hosts and tests
//! - `veil_platform_web` - browsers, via `web-sys`

pub mod element;
mod error;
pub mod image;
pub mod intersection;
mod platform;
pub mod scheduler;

// Re-export all public types
pub use element::ElementId;
pub use error::{PlatformError, Result};
pub use image::{DecodedImage, ImageDecoder, ImageLoadCallback, ImageRequest};
pub use intersection::{
    has_intersection_support, install_intersection_provider, intersection_provider,
    uninstall_intersection_provider, IntersectionBatch, IntersectionCallback, IntersectionEntry,
    IntersectionFacility, IntersectionProvider,
};
pub use platform::Platform;
pub use scheduler::{FrameScheduler, Task, TaskScheduler};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::element::ElementId;
    pub use crate::error::{PlatformError, Result};
    pub use crate::image::{DecodedImage, ImageDecoder, ImageRequest};
    pub use crate::intersection::{IntersectionEntry, IntersectionFacility, IntersectionProvider};
    pub use crate::platform::Platform;
    pub use crate::scheduler::{FrameScheduler, TaskScheduler};
}
