//! Veil Core Runtime
//!
//! This crate provides the foundational primitives for Veil's deferred and
//! visibility-triggered components:
//!
//! - **Visibility Observer**: one shared intersection facility per UI thread,
//!   dispatching one-shot callbacks per element
//! - **Element Handles**: late-bound references to rendered nodes
//! - **Liveness**: suppression of async completions after unmount
//! - **Frame Pacing**: delays counted in rendering opportunities
//! - **View Description**: plain `ViewNode` trees and inline styles
//! - **Component Lifecycle**: render / mount / unmount driven by a host
//!
//! # Example
//!
//! ```ignore
//! use veil_core::prelude::*;
//!
//! let wrapper = ElementRef::new();
//! let view = div().with_ref(&wrapper).attr("data-observed", "");
//!
//! // after the host has rendered `view` and bound `wrapper`
//! observe(&wrapper, move || println!("visible"))?;
//! ```

pub mod component;
pub mod config;
pub mod element_ref;
pub mod error;
pub mod frame;
pub mod lifecycle;
pub mod observer;
pub mod style;
pub mod view;

pub use component::{Component, MountContext, Rebuild};
pub use config::VeilConfig;
pub use element_ref::ElementRef;
pub use error::{Result, VeilError};
pub use frame::after_frames;
pub use lifecycle::Liveness;
pub use observer::{observe, observe_element, ObserverStats, VisibilityObserver};
pub use style::{percent, style, Style};
pub use view::{div, img, text, ViewNode};

// Re-export the platform ids used throughout the public API
pub use veil_platform::ElementId;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::component::{Component, MountContext, Rebuild};
    pub use crate::config::VeilConfig;
    pub use crate::element_ref::ElementRef;
    pub use crate::error::{Result, VeilError};
    pub use crate::observer::observe;
    pub use crate::style::{style, Style};
    pub use crate::view::{div, img, text, ViewNode};
}
