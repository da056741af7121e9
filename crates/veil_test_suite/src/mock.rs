//! Platform test doubles
//!
//! Both mocks are passive: nothing is reported until the test says so.
//!
//! - [`MockIntersectionProvider`] records watched elements; `trigger*` reports
//!   them, `report*` delivers arbitrary entries (foreign elements included)
//! - [`MockImageDecoder`] records requests; `trigger_load*` completes them with
//!   the given natural size

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use smallvec::SmallVec;
use veil_platform::{
    install_intersection_provider, DecodedImage, ElementId, ImageDecoder, ImageLoadCallback,
    ImageRequest, IntersectionBatch, IntersectionCallback, IntersectionEntry,
    IntersectionFacility, IntersectionProvider,
};

// ============================================================================
// Intersection
// ============================================================================

#[derive(Default)]
struct IntersectionState {
    callbacks: RefCell<Vec<IntersectionCallback>>,
    observed: RefCell<Vec<ElementId>>,
    observe_count: Cell<usize>,
    unobserve_count: Cell<usize>,
}

thread_local! {
    static CURRENT: RefCell<Option<Rc<MockIntersectionProvider>>> = const { RefCell::new(None) };
}

#[derive(Default)]
pub struct MockIntersectionProvider {
    state: Rc<IntersectionState>,
}

impl MockIntersectionProvider {
    /// The mock for this thread, installed as the intersection provider
    ///
    /// Reuses the thread's mock if there is one: the visibility observer keeps
    /// the facility it was created with for the rest of the thread.
    pub fn install() -> Rc<Self> {
        let provider = CURRENT.with(|slot| {
            slot.borrow_mut()
                .get_or_insert_with(|| Rc::new(Self::default()))
                .clone()
        });
        install_intersection_provider(provider.clone());
        provider
    }

    /// Facilities created so far
    pub fn facility_count(&self) -> usize {
        self.state.callbacks.borrow().len()
    }

    pub fn observed(&self) -> Vec<ElementId> {
        self.state.observed.borrow().clone()
    }

    pub fn is_observed(&self, element: ElementId) -> bool {
        self.state.observed.borrow().contains(&element)
    }

    pub fn observe_count(&self) -> usize {
        self.state.observe_count.get()
    }

    pub fn unobserve_count(&self) -> usize {
        self.state.unobserve_count.get()
    }

    /// Report `element` visible if it is being watched
    pub fn trigger(&self, element: ElementId) -> bool {
        if !self.is_observed(element) {
            return false;
        }
        self.report(&[IntersectionEntry::visible(element)]);
        true
    }

    /// Report every watched element visible in one batch
    pub fn trigger_all(&self) -> usize {
        let batch: IntersectionBatch = self
            .observed()
            .into_iter()
            .map(IntersectionEntry::visible)
            .collect();
        if !batch.is_empty() {
            self.report(&batch);
        }
        batch.len()
    }

    pub fn trigger_not_intersecting(&self, element: ElementId) {
        self.report(&[IntersectionEntry::hidden(element)]);
    }

    /// Report `element` visible whether or not it is watched
    pub fn report_visible(&self, element: ElementId) {
        self.report(&[IntersectionEntry::visible(element)]);
    }

    /// Deliver raw entries to every facility
    pub fn report(&self, entries: &[IntersectionEntry]) {
        let callbacks: SmallVec<[IntersectionCallback; 1]> =
            self.state.callbacks.borrow().iter().cloned().collect();
        for callback in callbacks {
            callback(entries);
        }
    }
}

impl IntersectionProvider for MockIntersectionProvider {
    fn create(&self, callback: IntersectionCallback) -> Rc<dyn IntersectionFacility> {
        self.state.callbacks.borrow_mut().push(callback);
        Rc::new(MockFacility {
            state: self.state.clone(),
        })
    }
}

struct MockFacility {
    state: Rc<IntersectionState>,
}

impl IntersectionFacility for MockFacility {
    fn observe(&self, target: ElementId) {
        self.state.observe_count.set(self.state.observe_count.get() + 1);
        let mut observed = self.state.observed.borrow_mut();
        if !observed.contains(&target) {
            observed.push(target);
        }
    }

    fn unobserve(&self, target: ElementId) {
        self.state
            .unobserve_count
            .set(self.state.unobserve_count.get() + 1);
        self.state.observed.borrow_mut().retain(|id| *id != target);
    }
}

// ============================================================================
// Images
// ============================================================================

struct PendingDecode {
    request: ImageRequest,
    on_load: ImageLoadCallback,
}

#[derive(Default)]
pub struct MockImageDecoder {
    pending: RefCell<Vec<PendingDecode>>,
    requests: RefCell<Vec<ImageRequest>>,
}

impl MockImageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.borrow().clone()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Complete pending decodes whose `src` (or `srcset`) equals `src`
    pub fn trigger_load(&self, src: &str, width: u32, height: u32) -> usize {
        self.complete(
            |request| request.src.as_deref() == Some(src) || request.src_set.as_deref() == Some(src),
            width,
            height,
        )
    }

    /// Complete every pending decode
    pub fn trigger_all(&self, width: u32, height: u32) -> usize {
        self.complete(|_| true, width, height)
    }

    fn complete(&self, matches: impl Fn(&ImageRequest) -> bool, width: u32, height: u32) -> usize {
        let due: Vec<PendingDecode> = {
            let mut pending = self.pending.borrow_mut();
            let (due, rest) = pending.drain(..).partition(|p| matches(&p.request));
            *pending = rest;
            due
        };
        let completed = due.len();
        for decode in due {
            (decode.on_load)(DecodedImage::new(width, height));
        }
        completed
    }
}

impl ImageDecoder for MockImageDecoder {
    fn decode(&self, request: ImageRequest, on_load: ImageLoadCallback) {
        self.requests.borrow_mut().push(request.clone());
        self.pending.borrow_mut().push(PendingDecode { request, on_load });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_only_observed() {
        let provider = MockIntersectionProvider::install();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let facility = provider.create(Rc::new(move |entries: &[IntersectionEntry]| {
            s.borrow_mut().extend_from_slice(entries);
        }));

        let watched = ElementId::next();
        let stranger = ElementId::next();
        facility.observe(watched);

        assert!(provider.trigger(watched));
        assert!(!provider.trigger(stranger));
        provider.report_visible(stranger);
        assert_eq!(seen.borrow().len(), 2);

        facility.unobserve(watched);
        assert_eq!(provider.trigger_all(), 0);
        assert_eq!(provider.unobserve_count(), 1);
    }

    #[test]
    fn test_install_reuses_thread_mock() {
        let first = MockIntersectionProvider::install();
        let second = MockIntersectionProvider::install();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_image_trigger_by_src() {
        let decoder = MockImageDecoder::new();
        let loaded = Rc::new(RefCell::new(Vec::new()));
        for src in ["a.jpg", "b.jpg"] {
            let l = loaded.clone();
            decoder.decode(
                ImageRequest::new(src),
                Box::new(move |d| l.borrow_mut().push((src, d))),
            );
        }

        assert_eq!(decoder.trigger_load("b.jpg", 4, 2), 1);
        assert_eq!(decoder.pending_count(), 1);
        assert_eq!(decoder.trigger_load("b.jpg", 4, 2), 0);
        assert_eq!(decoder.trigger_all(1, 1), 1);
        assert_eq!(
            *loaded.borrow(),
            vec![
                ("b.jpg", DecodedImage::new(4, 2)),
                ("a.jpg", DecodedImage::new(1, 1))
            ]
        );
        assert_eq!(decoder.requests().len(), 2);
    }
}
