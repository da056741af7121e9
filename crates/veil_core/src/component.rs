//! Component lifecycle
//!
//! A host drives every component the same way:
//!
//! 1. `render()` the initial tree and bind its element handles
//! 2. `mount()` with a [`MountContext`] (handles are bound at this point)
//! 3. `render()` again whenever the component calls [`Rebuild::request`]
//! 4. `unmount()` on teardown
//!
//! Components keep a clone of the context for the asynchronous work they start
//! during mount.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use veil_platform::{FrameScheduler, ImageDecoder, Platform, TaskScheduler};

use crate::error::Result;
use crate::view::ViewNode;

/// Lifecycle hooks implemented by Veil components
pub trait Component {
    /// Describe the current output
    fn render(&self) -> ViewNode;

    /// Called once after the first render has been committed
    fn mount(&mut self, cx: &MountContext) -> Result<()>;

    /// Called once when the component is removed
    fn unmount(&mut self);
}

/// Re-render request handle
///
/// Wraps the host's dirty flag. Cloning shares the flag.
#[derive(Clone, Default)]
pub struct Rebuild {
    dirty: Rc<Cell<bool>>,
    requests: Rc<Cell<u64>>,
}

impl Rebuild {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the host to render again
    pub fn request(&self) {
        self.dirty.set(true);
        self.requests.set(self.requests.get() + 1);
    }

    /// Check and clear the dirty flag
    pub fn take(&self) -> bool {
        self.dirty.replace(false)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Total number of requests so far
    pub fn count(&self) -> u64 {
        self.requests.get()
    }
}

impl fmt::Debug for Rebuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rebuild")
            .field("dirty", &self.dirty.get())
            .field("requests", &self.requests.get())
            .finish()
    }
}

/// Everything a component needs after mount
#[derive(Clone)]
pub struct MountContext {
    platform: Rc<dyn Platform>,
    rebuild: Rebuild,
}

impl MountContext {
    pub fn new(platform: Rc<dyn Platform>, rebuild: Rebuild) -> Self {
        Self { platform, rebuild }
    }

    pub fn platform(&self) -> &Rc<dyn Platform> {
        &self.platform
    }

    pub fn tasks(&self) -> Rc<dyn TaskScheduler> {
        self.platform.tasks()
    }

    pub fn frames(&self) -> Rc<dyn FrameScheduler> {
        self.platform.frames()
    }

    pub fn images(&self) -> Rc<dyn ImageDecoder> {
        self.platform.images()
    }

    pub fn rebuild(&self) -> &Rebuild {
        &self.rebuild
    }

    /// Shorthand for `self.rebuild().request()`
    pub fn request_rebuild(&self) {
        self.rebuild.request();
    }
}
