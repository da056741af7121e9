//! Core error types

use thiserror::Error;
use veil_platform::PlatformError;

/// Errors surfaced by Veil components and the visibility observer
#[derive(Error, Debug)]
pub enum VeilError {
    /// No intersection provider is installed on this thread
    #[error(
        "This platform doesn't support IntersectionObserver, consider adding a polyfill or installing an intersection provider"
    )]
    UnsupportedPlatform,

    /// The element handle is not bound to a rendered node
    #[error("Cannot observe an element that is not attached to the view")]
    DetachedElement,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error from the platform layer
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type alias for Veil operations
pub type Result<T> = std::result::Result<T, VeilError>;
