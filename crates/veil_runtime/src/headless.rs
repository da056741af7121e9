//! Headless platform
//!
//! Runs Veil components without a display. Images are decoded from disk or
//! data URIs with [`BytesImageDecoder`], and the [`HeadlessViewport`] treats
//! every observed element as on screen: it reports the element visible on the
//! loop turn after it was observed.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use veil_image::BytesImageDecoder;
use veil_platform::{
    install_intersection_provider, ElementId, FrameScheduler, ImageDecoder, IntersectionBatch,
    IntersectionCallback, IntersectionEntry, IntersectionFacility, IntersectionProvider, Platform,
    TaskScheduler,
};

use crate::event_loop::EventLoop;

pub struct HeadlessPlatform {
    event_loop: Rc<EventLoop>,
    images: Rc<BytesImageDecoder>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        let event_loop = EventLoop::new();
        let images = Rc::new(BytesImageDecoder::new(event_loop.clone()));
        Self { event_loop, images }
    }

    /// Install a [`HeadlessViewport`] as this thread's intersection provider
    pub fn install_viewport(&self) {
        install_intersection_provider(Rc::new(HeadlessViewport::new(self.event_loop.clone())));
    }

    pub fn event_loop(&self) -> &Rc<EventLoop> {
        &self.event_loop
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn tasks(&self) -> Rc<dyn TaskScheduler> {
        self.event_loop.clone()
    }

    fn frames(&self) -> Rc<dyn FrameScheduler> {
        self.event_loop.clone()
    }

    fn images(&self) -> Rc<dyn ImageDecoder> {
        self.images.clone()
    }
}

/// Intersection provider for a viewport that shows everything
pub struct HeadlessViewport {
    tasks: Rc<dyn TaskScheduler>,
}

impl HeadlessViewport {
    pub fn new(tasks: Rc<dyn TaskScheduler>) -> Self {
        Self { tasks }
    }
}

impl IntersectionProvider for HeadlessViewport {
    fn create(&self, callback: IntersectionCallback) -> Rc<dyn IntersectionFacility> {
        Rc::new_cyclic(|this: &Weak<ViewportFacility>| ViewportFacility {
            this: this.clone(),
            tasks: self.tasks.clone(),
            callback,
            watched: RefCell::new(SmallVec::new()),
        })
    }
}

struct ViewportFacility {
    this: Weak<ViewportFacility>,
    tasks: Rc<dyn TaskScheduler>,
    callback: IntersectionCallback,
    watched: RefCell<SmallVec<[ElementId; 8]>>,
}

impl ViewportFacility {
    fn report(&self) {
        let entries: IntersectionBatch = self
            .watched
            .borrow()
            .iter()
            .copied()
            .map(IntersectionEntry::visible)
            .collect();
        if !entries.is_empty() {
            (self.callback)(&entries);
        }
    }
}

impl IntersectionFacility for ViewportFacility {
    fn observe(&self, target: ElementId) {
        let mut watched = self.watched.borrow_mut();
        if watched.contains(&target) {
            return;
        }
        watched.push(target);
        drop(watched);

        let this = self.this.clone();
        self.tasks.defer(Box::new(move || {
            if let Some(facility) = this.upgrade() {
                facility.report();
            }
        }));
    }

    fn unobserve(&self, target: ElementId) {
        self.watched.borrow_mut().retain(|id| *id != target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use veil_core::{observe, ElementRef};

    #[test]
    fn test_viewport_reports_everything_visible() {
        let platform = HeadlessPlatform::new();
        platform.install_viewport();

        let target = ElementRef::new();
        target.attach(ElementId::next());
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        observe(&target, move || h.set(h.get() + 1)).unwrap();

        assert_eq!(hits.get(), 0);
        platform.event_loop().run_until_stalled();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_platform_name() {
        assert_eq!(HeadlessPlatform::new().name(), "headless");
    }
}
