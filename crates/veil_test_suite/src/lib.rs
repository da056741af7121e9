//! Veil Test Suite
//!
//! Test doubles and a mount-and-drive harness for Veil components.
//!
//! Every libtest test runs on its own thread, and the visibility observer and
//! intersection provider are per thread, so tests never share observer state.

pub mod harness;
pub mod mock;

pub use harness::{TestHarness, TestPlatform};
pub use mock::{MockImageDecoder, MockIntersectionProvider};

use tracing_subscriber::EnvFilter;

/// Route `tracing` output through libtest's captured writer
///
/// Filtered by `RUST_LOG`, silent otherwise. Safe to call from every test.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::harness::{TestHarness, TestPlatform};
    pub use crate::mock::{MockImageDecoder, MockIntersectionProvider};
}
