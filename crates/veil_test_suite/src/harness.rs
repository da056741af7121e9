//! Test harness
//!
//! Mounts a component on a [`TestPlatform`] and lets the test drive every
//! outside event by hand: loop turns, animation frames, intersections and
//! image decodes. Each driver re-renders the tree afterwards if the component
//! asked for a rebuild.
//!
//! ```ignore
//! let mut h = TestHarness::mount(img("big.jpg").placeholder_src("small.jpg"))?;
//! h.load_image("small.jpg", 20, 10);
//! assert!(h.contains("placeholder"));
//! ```

use std::rc::Rc;

use veil_core::{Component, Result, ViewNode};
use veil_platform::{
    uninstall_intersection_provider, FrameScheduler, ImageDecoder, Platform, TaskScheduler,
};
use veil_runtime::{EventLoop, Host};

use crate::mock::{MockImageDecoder, MockIntersectionProvider};

/// Platform backed by a manual [`EventLoop`] and a [`MockImageDecoder`]
pub struct TestPlatform {
    event_loop: Rc<EventLoop>,
    images: Rc<MockImageDecoder>,
}

impl TestPlatform {
    pub fn new() -> Self {
        Self {
            event_loop: EventLoop::new(),
            images: Rc::new(MockImageDecoder::new()),
        }
    }

    pub fn event_loop(&self) -> &Rc<EventLoop> {
        &self.event_loop
    }

    pub fn image_decoder(&self) -> &Rc<MockImageDecoder> {
        &self.images
    }
}

impl Default for TestPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for TestPlatform {
    fn name(&self) -> &'static str {
        "test"
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

pub struct TestHarness<C: Component> {
    host: Host<C>,
    platform: Rc<TestPlatform>,
    intersections: Option<Rc<MockIntersectionProvider>>,
}

impl<C: Component> TestHarness<C> {
    /// Mount with the thread's [`MockIntersectionProvider`] installed
    pub fn mount(component: C) -> Result<Self> {
        let intersections = MockIntersectionProvider::install();
        Self::mount_with(component, Some(intersections))
    }

    /// Mount on a platform without intersection support
    ///
    /// Only meaningful on a thread where the visibility observer has not been
    /// created yet; once it exists it keeps its facility.
    pub fn mount_without_intersection(component: C) -> Result<Self> {
        uninstall_intersection_provider();
        Self::mount_with(component, None)
    }

    fn mount_with(component: C, intersections: Option<Rc<MockIntersectionProvider>>) -> Result<Self> {
        crate::init_test_logging();
        let platform = Rc::new(TestPlatform::new());
        let host = Host::mount(component, platform.clone())?;
        Ok(Self {
            host,
            platform,
            intersections,
        })
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn component(&self) -> &C {
        self.host.root()
    }

    pub fn component_mut(&mut self) -> &mut C {
        self.host.root_mut()
    }

    pub fn tree(&self) -> &ViewNode {
        self.host.tree()
    }

    /// First node in the current tree with this test id
    pub fn find(&self, test_id: &str) -> Option<&ViewNode> {
        self.host.tree().find(test_id)
    }

    pub fn contains(&self, test_id: &str) -> bool {
        self.host.tree().contains(test_id)
    }

    pub fn render_count(&self) -> u64 {
        self.host.render_count()
    }

    pub fn rebuild_requests(&self) -> u64 {
        self.host.rebuild_requests()
    }

    pub fn platform(&self) -> &Rc<TestPlatform> {
        &self.platform
    }

    /// The intersection mock
    ///
    /// Panics for harnesses created with [`Self::mount_without_intersection`].
    pub fn intersections(&self) -> &MockIntersectionProvider {
        self.intersections
            .as_deref()
            .expect("harness was mounted without intersection support")
    }

    pub fn images(&self) -> &MockImageDecoder {
        self.platform.image_decoder()
    }

    // ========================================================================
    // Driving
    // ========================================================================

    /// Re-render if a rebuild was requested
    pub fn update(&mut self) -> bool {
        self.host.update()
    }

    pub fn tick(&mut self) -> usize {
        let ran = self.platform.event_loop().tick();
        self.update();
        ran
    }

    pub fn run_until_stalled(&mut self) -> usize {
        let ran = self.platform.event_loop().run_until_stalled();
        self.update();
        ran
    }

    pub fn run_frames(&mut self, frames: usize) -> usize {
        let ran = self.platform.event_loop().run_frames(frames);
        self.update();
        ran
    }

    /// Report every observed element visible
    pub fn intersect_all(&mut self) -> usize {
        let reported = self.intersections().trigger_all();
        self.update();
        reported
    }

    /// Report the element behind `test_id` visible, if it is observed
    pub fn intersect(&mut self, test_id: &str) -> bool {
        let element = self
            .find(test_id)
            .and_then(|node| node.element_ref.as_ref())
            .and_then(|handle| handle.get());
        let reported = match element {
            Some(element) => self.intersections().trigger(element),
            None => false,
        };
        self.update();
        reported
    }

    /// Finish pending decodes of `src` with the given natural size
    pub fn load_image(&mut self, src: &str, width: u32, height: u32) -> usize {
        let loaded = self.images().trigger_load(src, width, height);
        self.update();
        loaded
    }

    pub fn load_all_images(&mut self, width: u32, height: u32) -> usize {
        let loaded = self.images().trigger_all(width, height);
        self.update();
        loaded
    }

    pub fn unmount(&mut self) {
        self.host.unmount();
    }
}
