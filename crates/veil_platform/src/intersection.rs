//! Viewport intersection facility
//!
//! Backends that can tell when an element enters the viewport install an
//! [`IntersectionProvider`] for the UI thread. A thread without a provider is
//! treated as a platform that lacks intersection support entirely.
//!
//! # Example
//!
//! ```ignore
//! use veil_platform::intersection::{install_intersection_provider, intersection_provider};
//!
//! install_intersection_provider(Rc::new(MyProvider::default()));
//!
//! let provider = intersection_provider().expect("installed above");
//! let facility = provider.create(Rc::new(|entries| {
//!     for entry in entries {
//!         println!("{} visible: {}", entry.target, entry.is_intersecting);
//!     }
//! }));
//! facility.observe(element);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::element::ElementId;

/// One report from the intersection facility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionEntry {
    /// Element the report is about
    pub target: ElementId,
    /// Whether the element currently intersects the viewport
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub fn visible(target: ElementId) -> Self {
        Self {
            target,
            is_intersecting: true,
        }
    }

    pub fn hidden(target: ElementId) -> Self {
        Self {
            target,
            is_intersecting: false,
        }
    }
}

/// A batch of entries delivered in one facility callback
pub type IntersectionBatch = SmallVec<[IntersectionEntry; 4]>;

/// Callback invoked by the facility with a batch of entries
pub type IntersectionCallback = Rc<dyn Fn(&[IntersectionEntry])>;

/// A live intersection watcher bound to a single callback
pub trait IntersectionFacility {
    /// Start watching an element
    fn observe(&self, target: ElementId);

    /// Stop watching an element
    fn unobserve(&self, target: ElementId);
}

/// Factory for intersection facilities
pub trait IntersectionProvider {
    /// Create a facility that reports to `callback`
    fn create(&self, callback: IntersectionCallback) -> Rc<dyn IntersectionFacility>;
}

thread_local! {
    static PROVIDER: RefCell<Option<Rc<dyn IntersectionProvider>>> = const { RefCell::new(None) };
}

/// Install the intersection provider for the current thread
///
/// Returns the previously installed provider, if any.
pub fn install_intersection_provider(
    provider: Rc<dyn IntersectionProvider>,
) -> Option<Rc<dyn IntersectionProvider>> {
    PROVIDER.with(|slot| slot.borrow_mut().replace(provider))
}

/// Remove the intersection provider for the current thread
pub fn uninstall_intersection_provider() -> Option<Rc<dyn IntersectionProvider>> {
    PROVIDER.with(|slot| slot.borrow_mut().take())
}

/// Get the intersection provider for the current thread
pub fn intersection_provider() -> Option<Rc<dyn IntersectionProvider>> {
    PROVIDER.with(|slot| slot.borrow().clone())
}

/// Check whether the current thread supports intersection observation
pub fn has_intersection_support() -> bool {
    PROVIDER.with(|slot| slot.borrow().is_some())
}
