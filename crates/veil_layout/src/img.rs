//! Progressive image
//!
//! Reserves the image's box up front, shows a blurred low-resolution
//! placeholder as soon as it decodes, and fades the full image in once it has
//! decoded and a few frames have passed:
//!
//! ```rust,ignore
//! use veil_layout::prelude::*;
//!
//! let hero = img("hero-1600.jpg")
//!     .src_set("hero-800.jpg 800w, hero-1600.jpg 1600w")
//!     .sizes("100vw")
//!     .placeholder_src("hero-32.jpg")
//!     .aspect_ratio(9.0 / 16.0)
//!     .alt("Harbour at dawn")
//!     .lazy();
//! ```
//!
//! The wrapper keeps its height through `padding-bottom`, a percentage of its
//! width. The ratio is the configured `aspect_ratio` if set, else the last one
//! reported by either decoded image, else [`VeilConfig::default_aspect_ratio`].

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, warn};
use veil_core::observer::{self, observe};
use veil_core::{
    after_frames, div, img as img_node, percent, style, Component, ElementRef, Liveness,
    MountContext, Result, Style, VeilConfig, ViewNode,
};
use veil_image::{usable_ratio, ChannelKind, ChannelState, ImageChannel};
use veil_platform::ImageRequest;

use crate::loading::LoadingStrategy;

/// Snapshot of a progressive image's load state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressiveImageState {
    pub placeholder: ChannelState,
    pub main: ChannelState,
    /// The full image is fading in
    pub ready: bool,
    /// Last aspect ratio reported by either image
    pub aspect_ratio: Option<f64>,
}

#[derive(Debug)]
struct ImageState {
    placeholder: ImageChannel,
    main: ImageChannel,
    ready: bool,
    aspect_ratio: Option<f64>,
    started: bool,
}

impl ImageState {
    fn new() -> Self {
        Self {
            placeholder: ImageChannel::new(ChannelKind::Placeholder),
            main: ImageChannel::new(ChannelKind::Main),
            ready: false,
            aspect_ratio: None,
            started: false,
        }
    }

    fn channel_mut(&mut self, kind: ChannelKind) -> &mut ImageChannel {
        match kind {
            ChannelKind::Placeholder => &mut self.placeholder,
            ChannelKind::Main => &mut self.main,
        }
    }
}

/// Everything the load pipeline needs once it leaves the component
#[derive(Clone)]
struct Pipeline {
    main: ImageRequest,
    placeholder: Option<String>,
    ready_frame_delay: u32,
    state: Rc<RefCell<ImageState>>,
    liveness: Liveness,
}

impl Pipeline {
    /// Request both channels; only the first call does anything
    fn begin(&self, cx: &MountContext) {
        {
            let mut state = self.state.borrow_mut();
            if state.started {
                return;
            }
            state.started = true;
        }

        debug!(src = self.main.label(), "progressive image load started");
        let images = cx.images();

        if let Some(src) = &self.placeholder {
            self.state.borrow_mut().placeholder.request();
            let pipeline = self.clone();
            let cx = cx.clone();
            images.decode(
                ImageRequest::new(src.clone()),
                Box::new(move |decoded| {
                    pipeline.liveness.guard("placeholder image load", || {
                        pipeline.record(ChannelKind::Placeholder, decoded);
                        cx.request_rebuild();
                    });
                }),
            );
        }

        if self.main.is_empty() {
            warn!("progressive image has neither src nor srcset, main image will not load");
            return;
        }

        self.state.borrow_mut().main.request();
        let pipeline = self.clone();
        let cx = cx.clone();
        images.decode(
            self.main.clone(),
            Box::new(move |decoded| {
                pipeline.liveness.guard("main image load", || {
                    pipeline.record(ChannelKind::Main, decoded);
                    cx.request_rebuild();
                    pipeline.schedule_ready(&cx);
                });
            }),
        );
    }

    fn record(&self, kind: ChannelKind, decoded: veil_platform::DecodedImage) {
        let mut state = self.state.borrow_mut();
        if let Some(ratio) = state.channel_mut(kind).complete(decoded) {
            state.aspect_ratio = Some(ratio);
        }
    }

    fn schedule_ready(&self, cx: &MountContext) {
        let state = self.state.clone();
        let liveness = self.liveness.clone();
        let rebuild = cx.rebuild().clone();
        after_frames(cx.frames(), self.ready_frame_delay, move || {
            liveness.guard("image ready", || {
                state.borrow_mut().ready = true;
                debug!("progressive image ready");
                rebuild.request();
            });
        });
    }
}

pub struct ProgressiveImage {
    src: Option<String>,
    src_set: Option<String>,
    sizes: Option<String>,
    alt: Option<String>,
    placeholder_src: Option<String>,
    background: Option<String>,
    aspect_ratio: Option<f64>,
    loading: LoadingStrategy,
    style: Style,
    attrs: IndexMap<String, String>,
    config: Rc<VeilConfig>,
    wrapper: ElementRef,
    liveness: Liveness,
    state: Rc<RefCell<ImageState>>,
}

/// Create a progressive image from a source
pub fn img(src: impl Into<String>) -> ProgressiveImage {
    ProgressiveImage::new(src)
}

impl ProgressiveImage {
    pub fn new(src: impl Into<String>) -> Self {
        let mut image = Self::empty();
        image.src = Some(src.into());
        image
    }

    /// An image described only by a `srcset`
    pub fn from_src_set(src_set: impl Into<String>) -> Self {
        Self::empty().src_set(src_set)
    }

    fn empty() -> Self {
        Self {
            src: None,
            src_set: None,
            sizes: None,
            alt: None,
            placeholder_src: None,
            background: None,
            aspect_ratio: None,
            loading: LoadingStrategy::Eager,
            style: Style::new(),
            attrs: IndexMap::new(),
            config: Rc::new(VeilConfig::default()),
            wrapper: ElementRef::new(),
            liveness: Liveness::new(),
            state: Rc::new(RefCell::new(ImageState::new())),
        }
    }

    pub fn src_set(mut self, src_set: impl Into<String>) -> Self {
        self.src_set = Some(src_set.into());
        self
    }

    pub fn sizes(mut self, sizes: impl Into<String>) -> Self {
        self.sizes = Some(sizes.into());
        self
    }

    pub fn alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// Low-resolution image shown blurred until the full image is ready
    pub fn placeholder_src(mut self, src: impl Into<String>) -> Self {
        self.placeholder_src = Some(src.into());
        self
    }

    /// Wrapper background colour
    pub fn background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    /// Height over width used to size the wrapper
    ///
    /// Takes precedence over ratios discovered from the decoded images.
    /// Non-positive or non-finite values are ignored.
    pub fn aspect_ratio(mut self, ratio: f64) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }

    /// Only start loading once the wrapper is visible
    pub fn lazy(mut self) -> Self {
        self.loading = LoadingStrategy::Lazy;
        self
    }

    pub fn load_on_visible(mut self, load_on_visible: bool) -> Self {
        self.loading = LoadingStrategy::from_load_on_visible(load_on_visible);
        self
    }

    pub fn loading_strategy(mut self, strategy: LoadingStrategy) -> Self {
        self.loading = strategy;
        self
    }

    /// Style overrides for the wrapper
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Extra attribute on the wrapper
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_config(mut self, config: Rc<VeilConfig>) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> ProgressiveImageState {
        let state = self.state.borrow();
        ProgressiveImageState {
            placeholder: state.placeholder.state(),
            main: state.main.state(),
            ready: state.ready,
            aspect_ratio: state.aspect_ratio,
        }
    }

    pub fn get_loading_strategy(&self) -> LoadingStrategy {
        self.loading
    }

    /// Handle bound to the wrapper node
    pub fn wrapper(&self) -> &ElementRef {
        &self.wrapper
    }

    /// Ratio currently used for the wrapper's `padding-bottom`
    pub fn effective_aspect_ratio(&self) -> f64 {
        self.aspect_ratio
            .filter(|r| usable_ratio(*r))
            .or(self.state.borrow().aspect_ratio)
            .unwrap_or(self.config.default_aspect_ratio)
    }

    fn pipeline(&self) -> Pipeline {
        Pipeline {
            main: ImageRequest {
                src: self.src.clone(),
                src_set: self.src_set.clone(),
                sizes: self.sizes.clone(),
            },
            placeholder: self.placeholder_src.clone(),
            ready_frame_delay: self.config.ready_frame_delay,
            state: self.state.clone(),
            liveness: self.liveness.clone(),
        }
    }

    fn layer_style(&self) -> Style {
        style()
            .prop("position", "absolute")
            .prop("top", "0")
            .prop("left", "0")
            .prop("width", "100%")
            .prop("height", "auto")
            .prop("transition", self.config.fade_transition.clone())
    }

    fn render_main(&self, ready: bool) -> ViewNode {
        let opacity = if ready { 1.0 } else { self.config.loading_opacity };
        img_node()
            .test_id("img")
            .attr_opt("src", self.src.as_deref())
            .attr_opt("srcset", self.src_set.as_deref())
            .attr_opt("sizes", self.sizes.as_deref())
            .attr_opt("alt", self.alt.as_deref())
            .style(self.layer_style().opacity(opacity).z_index(2))
    }

    fn render_placeholder(&self, src: &str, ready: bool) -> ViewNode {
        let opacity = if ready { 0.0 } else { self.config.placeholder_opacity };
        img_node().test_id("placeholder").attr("src", src).style(
            self.layer_style()
                .prop("filter", format!("blur({}px)", self.config.placeholder_blur_px))
                .prop("transform", "scale(1)")
                .opacity(opacity)
                .z_index(1),
        )
    }
}

impl Component for ProgressiveImage {
    fn render(&self) -> ViewNode {
        let (main_loaded, placeholder_loaded, ready) = {
            let state = self.state.borrow();
            (state.main.is_loaded(), state.placeholder.is_loaded(), state.ready)
        };

        let background = self
            .background
            .clone()
            .unwrap_or_else(|| self.config.default_background.clone());
        let wrapper_style = style()
            .prop("position", "relative")
            .prop("overflow", "hidden")
            .merge(&self.style)
            .prop("background-color", background)
            .prop("padding-bottom", percent(self.effective_aspect_ratio()));

        let has_source = self.src.is_some() || self.src_set.is_some();
        let main = (has_source && main_loaded).then(|| self.render_main(ready));
        let placeholder = self
            .placeholder_src
            .as_deref()
            .filter(|_| placeholder_loaded)
            .map(|src| self.render_placeholder(src, ready));

        div()
            .test_id("wrapper")
            .attrs(&self.attrs)
            .style(wrapper_style)
            .with_ref(&self.wrapper)
            .child_opt(main)
            .child_opt(placeholder)
    }

    fn mount(&mut self, cx: &MountContext) -> Result<()> {
        self.liveness.mark_mounted();
        let pipeline = self.pipeline();

        match self.loading {
            LoadingStrategy::Eager => pipeline.begin(cx),
            LoadingStrategy::Lazy => {
                let cx = cx.clone();
                let on_visible = move || {
                    pipeline
                        .liveness
                        .clone()
                        .guard("visibility change", || pipeline.begin(&cx));
                };
                if let Err(e) = observe(&self.wrapper, on_visible) {
                    self.liveness.mark_unmounted();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn unmount(&mut self) {
        self.liveness.mark_unmounted();
        if let Some(element) = self.wrapper.release() {
            observer::cancel(element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::VeilError;
    use veil_test_suite::TestHarness;

    fn opacity(h: &TestHarness<ProgressiveImage>, test_id: &str) -> Option<String> {
        h.find(test_id)
            .and_then(|n| n.style.get("opacity"))
            .map(str::to_string)
    }

    #[test]
    fn test_wrapper_reserves_space() {
        let h = TestHarness::mount(img("a.jpg").aspect_ratio(1.0 / 5.0)).unwrap();
        let wrapper = h.find("wrapper").unwrap();
        assert_eq!(wrapper.style.get("padding-bottom"), Some("20%"));
        assert_eq!(wrapper.style.get("background-color"), Some("#f6f6f6"));
        assert_eq!(wrapper.style.get("position"), Some("relative"));
        assert_eq!(wrapper.style.get("overflow"), Some("hidden"));

        let h = TestHarness::mount(img("b.jpg")).unwrap();
        assert_eq!(
            h.find("wrapper").unwrap().style.get("padding-bottom"),
            Some("50%")
        );
    }

    #[test]
    fn test_discovered_ratio_sizes_wrapper() {
        let mut h = TestHarness::mount(img("a.jpg")).unwrap();
        h.load_image("a.jpg", 400, 300);
        assert_eq!(
            h.find("wrapper").unwrap().style.get("padding-bottom"),
            Some("75%")
        );

        // configured ratio wins over the discovered one
        let mut h = TestHarness::mount(img("c.jpg").aspect_ratio(0.5625)).unwrap();
        h.load_image("c.jpg", 100, 100);
        assert_eq!(
            h.find("wrapper").unwrap().style.get("padding-bottom"),
            Some("56.25%")
        );
    }

    #[test]
    fn test_placeholder_ratio_sizes_wrapper_until_main_decodes() {
        let mut h = TestHarness::mount(img("big.jpg").placeholder_src("small.jpg")).unwrap();
        h.load_image("small.jpg", 40, 10);
        assert_eq!(
            h.find("wrapper").unwrap().style.get("padding-bottom"),
            Some("25%")
        );
        assert_eq!(h.component().state().aspect_ratio, Some(0.25));

        h.load_image("big.jpg", 400, 300);
        assert_eq!(
            h.find("wrapper").unwrap().style.get("padding-bottom"),
            Some("75%")
        );
    }

    #[test]
    fn test_pending_rebuild_does_not_rebind_after_unmount() {
        let mut h = TestHarness::mount(img("a.jpg")).unwrap();
        h.images().trigger_load("a.jpg", 10, 10);
        h.unmount();

        assert!(!h.update());
        assert!(!h.component().wrapper().is_attached());
    }

    #[test]
    fn test_placeholder_then_main_then_ready() {
        let mut h =
            TestHarness::mount(img("big.jpg").placeholder_src("small.jpg").alt("A cat")).unwrap();
        assert!(!h.contains("img"));
        assert!(!h.contains("placeholder"));
        assert_eq!(h.component().state().main, ChannelState::Requested);

        h.load_image("small.jpg", 20, 10);
        assert!(h.contains("placeholder"));
        assert!(!h.contains("img"));
        assert_eq!(opacity(&h, "placeholder").as_deref(), Some("0.99"));
        assert_eq!(
            h.find("wrapper").unwrap().style.get("padding-bottom"),
            Some("50%")
        );

        h.load_image("big.jpg", 1000, 500);
        let main = h.find("img").unwrap();
        assert_eq!(main.get_attr("src"), Some("big.jpg"));
        assert_eq!(main.get_attr("alt"), Some("A cat"));
        assert_eq!(main.style.get("z-index"), Some("2"));
        assert_eq!(opacity(&h, "img").as_deref(), Some("0.1"));
        assert!(!h.component().state().ready);

        h.run_frames(5);
        assert!(!h.component().state().ready);
        assert_eq!(opacity(&h, "img").as_deref(), Some("0.1"));

        h.run_frames(1);
        assert!(h.component().state().ready);
        assert_eq!(opacity(&h, "img").as_deref(), Some("1"));
        assert_eq!(opacity(&h, "placeholder").as_deref(), Some("0"));
    }

    #[test]
    fn test_main_before_placeholder() {
        let mut h = TestHarness::mount(img("big.jpg").placeholder_src("small.jpg")).unwrap();
        h.load_image("big.jpg", 100, 100);
        h.run_frames(6);
        assert!(h.component().state().ready);
        assert!(!h.contains("placeholder"));

        h.load_image("small.jpg", 10, 10);
        assert_eq!(opacity(&h, "placeholder").as_deref(), Some("0"));
        assert_eq!(opacity(&h, "img").as_deref(), Some("1"));
    }

    #[test]
    fn test_placeholder_style() {
        let mut h = TestHarness::mount(img("big.jpg").placeholder_src("small.jpg")).unwrap();
        h.load_image("small.jpg", 10, 10);
        let placeholder = h.find("placeholder").unwrap();
        assert_eq!(placeholder.style.get("filter"), Some("blur(50px)"));
        assert_eq!(placeholder.style.get("transform"), Some("scale(1)"));
        assert_eq!(placeholder.style.get("z-index"), Some("1"));
        assert_eq!(placeholder.style.get("position"), Some("absolute"));
        assert_eq!(
            placeholder.style.get("transition"),
            Some("opacity 1s linear")
        );
    }

    #[test]
    fn test_src_set_and_sizes_passed_through() {
        let mut h = TestHarness::mount(
            ProgressiveImage::from_src_set("a.jpg 1x, b.jpg 2x").sizes("50vw"),
        )
        .unwrap();
        let request = h.images().requests()[0].clone();
        assert_eq!(request.src, None);
        assert_eq!(request.src_set.as_deref(), Some("a.jpg 1x, b.jpg 2x"));
        assert_eq!(request.sizes.as_deref(), Some("50vw"));

        h.load_all_images(200, 100);
        let main = h.find("img").unwrap();
        assert!(!main.has_attr("src"));
        assert_eq!(main.get_attr("srcset"), Some("a.jpg 1x, b.jpg 2x"));
        assert_eq!(main.get_attr("sizes"), Some("50vw"));
    }

    #[test]
    fn test_lazy_loads_after_intersection() {
        let mut h = TestHarness::mount(img("big.jpg").placeholder_src("small.jpg").lazy()).unwrap();
        assert!(h.images().requests().is_empty());
        assert_eq!(h.component().state().main, ChannelState::NotRequested);

        h.intersect_all();
        let requested: Vec<_> = h
            .images()
            .requests()
            .iter()
            .filter_map(|r| r.src.clone())
            .collect();
        assert_eq!(requested, vec!["small.jpg".to_string(), "big.jpg".to_string()]);

        h.intersect_all();
        assert_eq!(h.images().requests().len(), 2);
    }

    #[test]
    fn test_ready_needs_frames_not_ticks() {
        let mut h = TestHarness::mount(img("big.jpg")).unwrap();
        h.load_image("big.jpg", 10, 10);
        h.run_until_stalled();
        assert!(!h.component().state().ready);
        h.run_frames(6);
        assert!(h.component().state().ready);
    }

    #[test]
    fn test_configurable_delay_and_look() {
        let config = VeilConfig {
            ready_frame_delay: 1,
            default_background: "black".to_string(),
            ..Default::default()
        };
        let mut h = TestHarness::mount(
            img("big.jpg")
                .with_config(Rc::new(config))
                .style(style().prop("overflow", "visible").prop("border-radius", "4px")),
        )
        .unwrap();
        let wrapper = h.find("wrapper").unwrap();
        assert_eq!(wrapper.style.get("background-color"), Some("black"));
        assert_eq!(wrapper.style.get("overflow"), Some("visible"));
        assert_eq!(wrapper.style.get("border-radius"), Some("4px"));

        h.load_image("big.jpg", 10, 10);
        h.run_frames(1);
        assert!(!h.component().state().ready);
        h.run_frames(1);
        assert!(h.component().state().ready);
    }

    #[test]
    fn test_background_override() {
        let h = TestHarness::mount(img("a.jpg").background("#000")).unwrap();
        assert_eq!(
            h.find("wrapper").unwrap().style.get("background-color"),
            Some("#000")
        );
    }

    #[test]
    fn test_late_completions_ignored_after_unmount() {
        let mut h = TestHarness::mount(img("big.jpg").placeholder_src("small.jpg")).unwrap();
        h.load_image("big.jpg", 100, 50);
        h.unmount();

        h.load_image("small.jpg", 10, 10);
        h.run_frames(10);
        let state = h.component().state();
        assert!(!state.ready);
        assert_eq!(state.placeholder, ChannelState::Requested);
        assert!(!h.component().wrapper().is_attached());
    }

    #[test]
    fn test_lazy_without_intersection_support() {
        let result = TestHarness::mount_without_intersection(img("a.jpg").lazy());
        assert!(matches!(result, Err(VeilError::UnsupportedPlatform)));
    }
}
