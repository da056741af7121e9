//! Shared visibility observer
//!
//! One [`VisibilityObserver`] per UI thread wraps the platform intersection
//! facility and turns its batched reports into one-shot callbacks keyed by
//! element. Components never create observers themselves; they go through
//! [`observe`], which creates the shared instance on first use.
//!
//! # Semantics
//!
//! - at most one pending registration per element, a later `observe` on the
//!   same element replaces the callback
//! - a registration fires at most once: on the first intersecting report the
//!   element is deregistered, unwatched and its callback invoked
//! - non-intersecting reports are ignored; an intersecting report about an
//!   unknown element only unwatches it
//! - without an installed provider every `observe` fails with
//!   [`VeilError::UnsupportedPlatform`]; nothing is cached, so installing a
//!   provider later makes the next call succeed
//!
//! # Example
//!
//! ```ignore
//! use veil_core::observer::observe;
//!
//! let wrapper = ElementRef::new();
//! // ... render a node carrying `wrapper` and let the host bind it ...
//! observe(&wrapper, || tracing::info!("wrapper scrolled into view"))?;
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use veil_platform::{
    intersection_provider, ElementId, IntersectionEntry, IntersectionFacility,
    IntersectionProvider,
};

use crate::element_ref::ElementRef;
use crate::error::{Result, VeilError};

thread_local! {
    static OBSERVER: RefCell<Option<Rc<VisibilityObserver>>> = const { RefCell::new(None) };
}

struct Registration {
    callback: Box<dyn FnOnce()>,
}

/// Snapshot of observer activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserverStats {
    /// Registrations waiting for their element to become visible
    pub pending: usize,
    /// Callbacks fired so far
    pub fired: u64,
    /// Reports ignored because nothing was registered for the element
    pub ignored: u64,
}

pub struct VisibilityObserver {
    facility: Rc<dyn IntersectionFacility>,
    registrations: RefCell<FxHashMap<ElementId, Registration>>,
    fired: Cell<u64>,
    ignored: Cell<u64>,
}

impl VisibilityObserver {
    fn new(provider: &dyn IntersectionProvider) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| {
            let this = this.clone();
            let facility = provider.create(Rc::new(move |entries: &[IntersectionEntry]| {
                if let Some(observer) = this.upgrade() {
                    observer.dispatch(entries);
                }
            }));
            Self {
                facility,
                registrations: RefCell::new(FxHashMap::default()),
                fired: Cell::new(0),
                ignored: Cell::new(0),
            }
        })
    }

    /// Get the observer for this thread, creating it on first use
    pub fn global() -> Result<Rc<Self>> {
        OBSERVER.with(|slot| {
            if let Some(observer) = slot.borrow().as_ref() {
                return Ok(observer.clone());
            }
            let provider = intersection_provider().ok_or(VeilError::UnsupportedPlatform)?;
            let observer = Self::new(provider.as_ref());
            *slot.borrow_mut() = Some(observer.clone());
            debug!("visibility observer created");
            Ok(observer)
        })
    }

    /// Get the observer if it has already been created on this thread
    pub fn try_global() -> Option<Rc<Self>> {
        OBSERVER.with(|slot| slot.borrow().clone())
    }

    pub fn is_initialized() -> bool {
        OBSERVER.with(|slot| slot.borrow().is_some())
    }

    /// Register a one-shot callback for `element`
    pub fn observe(&self, element: ElementId, on_intersection: impl FnOnce() + 'static) {
        let replaced = self
            .registrations
            .borrow_mut()
            .insert(
                element,
                Registration {
                    callback: Box::new(on_intersection),
                },
            )
            .is_some();

        if replaced {
            debug!(%element, "replaced pending visibility callback");
        } else {
            debug!(%element, "observing element");
            self.facility.observe(element);
        }
    }

    /// Drop the pending registration for `element`, if any
    pub fn cancel(&self, element: ElementId) -> bool {
        let removed = self.registrations.borrow_mut().remove(&element).is_some();
        if removed {
            trace!(%element, "visibility registration cancelled");
            self.facility.unobserve(element);
        }
        removed
    }

    pub fn is_observing(&self, element: ElementId) -> bool {
        self.registrations.borrow().contains_key(&element)
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.borrow().len()
    }

    pub fn stats(&self) -> ObserverStats {
        ObserverStats {
            pending: self.registration_count(),
            fired: self.fired.get(),
            ignored: self.ignored.get(),
        }
    }

    fn dispatch(&self, entries: &[IntersectionEntry]) {
        for entry in entries {
            if !entry.is_intersecting {
                continue;
            }

            // Registry borrow must end before the callback runs, it may observe again
            let registration = self.registrations.borrow_mut().remove(&entry.target);
            self.facility.unobserve(entry.target);
            let Some(registration) = registration else {
                trace!(element = %entry.target, "ignoring report for unregistered element");
                self.ignored.set(self.ignored.get() + 1);
                continue;
            };

            self.fired.set(self.fired.get() + 1);
            debug!(element = %entry.target, "element became visible");
            (registration.callback)();
        }
    }
}

/// Register `on_intersection` to run once when `target` becomes visible
///
/// Fails with [`VeilError::UnsupportedPlatform`] when this thread has no
/// intersection provider (checked first, whatever the target), and with
/// [`VeilError::DetachedElement`] when `target` is not bound to an element.
pub fn observe(target: &ElementRef, on_intersection: impl FnOnce() + 'static) -> Result<()> {
    let observer = VisibilityObserver::global()?;
    let element = target.get().ok_or(VeilError::DetachedElement)?;
    observer.observe(element, on_intersection);
    Ok(())
}

/// Same as [`observe`] for callers that already hold an id
pub fn observe_element(element: ElementId, on_intersection: impl FnOnce() + 'static) -> Result<()> {
    VisibilityObserver::global()?.observe(element, on_intersection);
    Ok(())
}

/// Drop a pending registration; a no-op if the observer was never created
pub fn cancel(element: ElementId) -> bool {
    VisibilityObserver::try_global().is_some_and(|observer| observer.cancel(element))
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_platform::{install_intersection_provider, IntersectionCallback};

    #[derive(Default)]
    struct RecordingFacility {
        observed: RefCell<Vec<ElementId>>,
        observe_calls: Cell<usize>,
        unobserve_calls: Cell<usize>,
    }

    impl IntersectionFacility for RecordingFacility {
        fn observe(&self, target: ElementId) {
            self.observe_calls.set(self.observe_calls.get() + 1);
            self.observed.borrow_mut().push(target);
        }

        fn unobserve(&self, target: ElementId) {
            self.unobserve_calls.set(self.unobserve_calls.get() + 1);
            self.observed.borrow_mut().retain(|id| *id != target);
        }
    }

    #[derive(Default)]
    struct RecordingProvider {
        facility: Rc<RecordingFacility>,
        callback: RefCell<Option<IntersectionCallback>>,
        created: Cell<usize>,
    }

    impl RecordingProvider {
        fn install() -> Rc<Self> {
            let provider = Rc::new(Self::default());
            install_intersection_provider(provider.clone());
            provider
        }

        fn report(&self, entries: &[IntersectionEntry]) {
            let callback = self.callback.borrow().clone();
            if let Some(callback) = callback {
                callback(entries);
            }
        }
    }

    impl IntersectionProvider for RecordingProvider {
        fn create(&self, callback: IntersectionCallback) -> Rc<dyn IntersectionFacility> {
            self.created.set(self.created.get() + 1);
            *self.callback.borrow_mut() = Some(callback);
            self.facility.clone()
        }
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        (hits, move || h.set(h.get() + 1))
    }

    fn bound_ref() -> ElementRef {
        let handle = ElementRef::new();
        handle.attach(ElementId::next());
        handle
    }

    #[test]
    fn test_unsupported_platform_is_reported_first() {
        let unbound = ElementRef::new();
        let err = observe(&unbound, || {}).unwrap_err();
        assert!(matches!(err, VeilError::UnsupportedPlatform));
        assert!(err.to_string().contains("polyfill"));

        let err = observe(&bound_ref(), || {}).unwrap_err();
        assert!(matches!(err, VeilError::UnsupportedPlatform));
        assert!(!VisibilityObserver::is_initialized());
    }

    #[test]
    fn test_provider_installed_later_is_picked_up() {
        assert!(observe(&bound_ref(), || {}).is_err());
        RecordingProvider::install();
        assert!(observe(&bound_ref(), || {}).is_ok());
    }

    #[test]
    fn test_observe_by_id() {
        assert!(matches!(
            observe_element(ElementId::next(), || {}),
            Err(VeilError::UnsupportedPlatform)
        ));

        let provider = RecordingProvider::install();
        let id = ElementId::next();
        let (hits, callback) = counter();
        observe_element(id, callback).unwrap();
        assert_eq!(*provider.facility.observed.borrow(), vec![id]);

        provider.report(&[IntersectionEntry::visible(id)]);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_detached_element() {
        RecordingProvider::install();
        let err = observe(&ElementRef::new(), || {}).unwrap_err();
        assert!(matches!(err, VeilError::DetachedElement));
    }

    #[test]
    fn test_fires_exactly_once() {
        let provider = RecordingProvider::install();
        let target = bound_ref();
        let id = target.get().unwrap();
        let (hits, callback) = counter();

        observe(&target, callback).unwrap();
        assert_eq!(*provider.facility.observed.borrow(), vec![id]);

        provider.report(&[IntersectionEntry::visible(id)]);
        provider.report(&[IntersectionEntry::visible(id)]);

        assert_eq!(hits.get(), 1);
        assert!(provider.facility.observed.borrow().is_empty());
        // the stray second report is unwatched again but fires nothing
        assert_eq!(provider.facility.unobserve_calls.get(), 2);
        assert_eq!(VisibilityObserver::global().unwrap().registration_count(), 0);
    }

    #[test]
    fn test_non_intersecting_and_foreign_reports_ignored() {
        let provider = RecordingProvider::install();
        let target = bound_ref();
        let id = target.get().unwrap();
        let (hits, callback) = counter();
        observe(&target, callback).unwrap();

        provider.report(&[
            IntersectionEntry::hidden(id),
            IntersectionEntry::visible(ElementId::next()),
        ]);
        assert_eq!(hits.get(), 0);

        let observer = VisibilityObserver::global().unwrap();
        assert!(observer.is_observing(id));
        assert_eq!(observer.stats().ignored, 1);
        assert_eq!(provider.facility.unobserve_calls.get(), 1);
        assert_eq!(*provider.facility.observed.borrow(), vec![id]);

        provider.report(&[IntersectionEntry::visible(id)]);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_duplicate_entries_in_one_batch() {
        let provider = RecordingProvider::install();
        let target = bound_ref();
        let id = target.get().unwrap();
        let (hits, callback) = counter();
        observe(&target, callback).unwrap();

        provider.report(&[IntersectionEntry::visible(id), IntersectionEntry::visible(id)]);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_single_shared_facility() {
        let provider = RecordingProvider::install();
        let (first_hits, first) = counter();
        let (second_hits, second) = counter();
        let a = bound_ref();
        let b = bound_ref();

        observe(&a, first).unwrap();
        observe(&b, second).unwrap();
        assert_eq!(provider.created.get(), 1);

        provider.report(&[IntersectionEntry::visible(b.get().unwrap())]);
        assert_eq!(first_hits.get(), 0);
        assert_eq!(second_hits.get(), 1);
        assert!(Rc::ptr_eq(
            &VisibilityObserver::global().unwrap(),
            &VisibilityObserver::try_global().unwrap()
        ));
    }

    #[test]
    fn test_reregistration_replaces_callback() {
        let provider = RecordingProvider::install();
        let target = bound_ref();
        let id = target.get().unwrap();
        let (old_hits, old) = counter();
        let (new_hits, new) = counter();

        observe(&target, old).unwrap();
        observe(&target, new).unwrap();
        assert_eq!(provider.facility.observe_calls.get(), 1);

        provider.report(&[IntersectionEntry::visible(id)]);
        assert_eq!(old_hits.get(), 0);
        assert_eq!(new_hits.get(), 1);
    }

    #[test]
    fn test_callback_may_register_again() {
        let provider = RecordingProvider::install();
        let target = bound_ref();
        let id = target.get().unwrap();
        let (hits, second) = counter();

        let again = target.clone();
        observe(&target, move || {
            observe(&again, second).unwrap();
        })
        .unwrap();

        provider.report(&[IntersectionEntry::visible(id)]);
        assert_eq!(hits.get(), 0);
        assert!(VisibilityObserver::global().unwrap().is_observing(id));

        provider.report(&[IntersectionEntry::visible(id)]);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_cancel() {
        let provider = RecordingProvider::install();
        let target = bound_ref();
        let id = target.get().unwrap();
        let (hits, callback) = counter();

        assert!(!cancel(id));
        observe(&target, callback).unwrap();
        assert!(cancel(id));
        assert!(provider.facility.observed.borrow().is_empty());

        provider.report(&[IntersectionEntry::visible(id)]);
        assert_eq!(hits.get(), 0);
    }
}
