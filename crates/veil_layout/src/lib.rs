//! Veil components
//!
//! Deferred and visibility-triggered building blocks:
//!
//! - [`Defer`] - render a placeholder, call a producer once, swap in its result
//! - [`ProgressiveImage`] - blurred placeholder first, full image faded in after decode
//! - [`OnScreen`] - run a callback the first time a marker becomes visible
//!
//! All three can wait for visibility through the shared
//! [`veil_core::VisibilityObserver`]; lazy components fail to mount with
//! [`veil_core::VeilError::UnsupportedPlatform`] when the platform has no
//! intersection support.

pub mod defer;
pub mod img;
pub mod loading;
pub mod on_screen;

pub use defer::{defer, Defer, DeferPhase, Module, Produced, Resolved};
pub use img::{img, ProgressiveImage, ProgressiveImageState};
pub use loading::{LoadingStrategy, OBSERVED_ATTR};
pub use on_screen::{on_screen, OnScreen};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::defer::{defer, Defer, DeferPhase, Module, Produced, Resolved};
    pub use crate::img::{img, ProgressiveImage};
    pub use crate::loading::LoadingStrategy;
    pub use crate::on_screen::{on_screen, OnScreen};
    pub use veil_core::prelude::*;
}
