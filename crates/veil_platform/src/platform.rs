//! Platform trait and abstraction

use std::rc::Rc;

use crate::image::ImageDecoder;
use crate::scheduler::{FrameScheduler, TaskScheduler};

/// Platform abstraction trait
///
/// Implemented by each backend (headless, web) to give components access to
/// the event loop and the image decoder. Intersection support is installed
/// separately per thread, see [`crate::intersection`].
pub trait Platform {
    /// Get the platform name
    ///
    /// Returns a string like "headless", "test" or "web".
    fn name(&self) -> &'static str;

    /// Macrotask queue and local executor
    fn tasks(&self) -> Rc<dyn TaskScheduler>;

    /// Rendering opportunity queue
    fn frames(&self) -> Rc<dyn FrameScheduler>;

    /// Image decoder
    fn images(&self) -> Rc<dyn ImageDecoder>;
}
