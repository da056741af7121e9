//! Veil Embedding SDK
//!
//! Run Veil components outside the browser: a headless event loop, a platform
//! backed by it, and a host that owns a root component.

pub mod event_loop;
pub mod headless;
pub mod host;

pub use veil_core;
pub use veil_image;
pub use veil_platform;

#[cfg(feature = "veil_layout")]
pub use veil_layout;

pub use event_loop::EventLoop;
pub use headless::{HeadlessPlatform, HeadlessViewport};
pub use host::Host;

use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "veil=info";

/// Initialize the Veil runtime
///
/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG`. Calling it
/// again, or after the embedder installed its own subscriber, is harmless.
pub fn init() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::event_loop::EventLoop;
    pub use crate::headless::HeadlessPlatform;
    pub use crate::host::Host;

    #[cfg(not(feature = "veil_layout"))]
    pub use veil_core::prelude::*;

    #[cfg(feature = "veil_layout")]
    pub use veil_layout::prelude::*;
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_init_is_idempotent() {
        assert!(super::init().is_ok());
        assert!(super::init().is_ok());
    }
}
