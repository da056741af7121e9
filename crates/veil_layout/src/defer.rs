//! Deferred rendering
//!
//! `Defer` shows an optional placeholder, calls a producer once, and swaps in
//! whatever the producer yields. With [`Defer::lazy`] nothing happens until
//! the wrapper scrolls into view.
//!
//! ```text
//!   Idle ──visible──▶ Loading ──produced──▶ Ready
//!  (lazy only)      placeholder            content
//! ```
//!
//! # Example
//!
//! ```ignore
//! use veil_layout::prelude::*;
//!
//! // Immediate content, shown on the tick after mount
//! let quick = defer(|| text("hello").into()).placeholder(text("..."));
//!
//! // Content behind a future, fetched once the wrapper is visible
//! let chart = defer(|| Produced::pending(async { Module::new().with_default(render_chart()) }))
//!     .placeholder(text("loading chart"))
//!     .lazy();
//! ```

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use indexmap::IndexMap;
use tracing::{debug, warn};
use veil_core::observer::{self, observe};
use veil_core::{
    Component, ElementRef, Liveness, MountContext, Rebuild, Result, Style, VeilConfig, ViewNode,
};

use crate::loading::{observed_wrapper, LoadingStrategy};

// ============================================================================
// Producer results
// ============================================================================

/// What a producer returns
pub enum Produced {
    /// Content available right away
    Immediate(ViewNode),
    /// Content available once the future resolves
    Pending(LocalBoxFuture<'static, Resolved>),
}

impl Produced {
    /// Wrap any future whose output converts into [`Resolved`]
    pub fn pending<F, T>(future: F) -> Self
    where
        F: Future<Output = T> + 'static,
        T: Into<Resolved>,
    {
        Produced::Pending(Box::pin(async move { future.await.into() }))
    }
}

impl From<ViewNode> for Produced {
    fn from(view: ViewNode) -> Self {
        Produced::Immediate(view)
    }
}

impl fmt::Debug for Produced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Produced::Immediate(view) => f.debug_tuple("Immediate").field(view).finish(),
            Produced::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A record of named views with an optional default
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub default: Option<ViewNode>,
    pub exports: IndexMap<String, ViewNode>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, view: ViewNode) -> Self {
        self.default = Some(view);
        self
    }

    pub fn export(mut self, name: impl Into<String>, view: ViewNode) -> Self {
        self.exports.insert(name.into(), view);
        self
    }
}

/// Output of a pending producer
#[derive(Debug, Clone)]
pub enum Resolved {
    View(ViewNode),
    Module(Module),
    /// Anything that is neither a view nor a module
    Unrecognized,
}

impl Resolved {
    /// The view to render: the value itself, or a module's default
    pub fn into_view(self) -> Option<ViewNode> {
        match self {
            Resolved::View(view) => Some(view),
            Resolved::Module(module) => module.default,
            Resolved::Unrecognized => None,
        }
    }
}

impl From<ViewNode> for Resolved {
    fn from(view: ViewNode) -> Self {
        Resolved::View(view)
    }
}

impl From<Module> for Resolved {
    fn from(module: Module) -> Self {
        Resolved::Module(module)
    }
}

// ============================================================================
// State
// ============================================================================

/// Observable phase of a [`Defer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferPhase {
    Idle,
    Loading,
    Ready,
}

enum DeferState {
    Idle,
    Loading,
    Ready(ViewNode),
}

type Producer = Box<dyn FnOnce() -> Produced>;

struct Shared {
    state: RefCell<DeferState>,
    producer: RefCell<Option<Producer>>,
}

impl Shared {
    fn phase(&self) -> DeferPhase {
        match &*self.state.borrow() {
            DeferState::Idle => DeferPhase::Idle,
            DeferState::Loading => DeferPhase::Loading,
            DeferState::Ready(_) => DeferPhase::Ready,
        }
    }

    /// Leave `Idle`; false if already past it
    fn enter_loading(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if matches!(*state, DeferState::Idle) {
            *state = DeferState::Loading;
            true
        } else {
            false
        }
    }
}

// ============================================================================
// Defer
// ============================================================================

pub struct Defer {
    shared: Rc<Shared>,
    placeholder: Option<ViewNode>,
    loading: LoadingStrategy,
    style: Style,
    attrs: IndexMap<String, String>,
    config: Rc<VeilConfig>,
    wrapper: ElementRef,
    liveness: Liveness,
}

/// Create a deferred view from a producer
pub fn defer(producer: impl FnOnce() -> Produced + 'static) -> Defer {
    Defer::new(producer)
}

impl Defer {
    pub fn new(producer: impl FnOnce() -> Produced + 'static) -> Self {
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(DeferState::Loading),
                producer: RefCell::new(Some(Box::new(producer))),
            }),
            placeholder: None,
            loading: LoadingStrategy::Eager,
            style: Style::new(),
            attrs: IndexMap::new(),
            config: Rc::new(VeilConfig::default()),
            wrapper: ElementRef::new(),
            liveness: Liveness::new(),
        }
    }

    /// Content shown while loading
    pub fn placeholder(mut self, placeholder: ViewNode) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Wait for the wrapper to become visible before calling the producer
    pub fn lazy(self) -> Self {
        self.loading_strategy(LoadingStrategy::Lazy)
    }

    pub fn load_on_visible(self, load_on_visible: bool) -> Self {
        self.loading_strategy(LoadingStrategy::from_load_on_visible(load_on_visible))
    }

    pub fn loading_strategy(mut self, strategy: LoadingStrategy) -> Self {
        self.loading = strategy;
        *self.shared.state.borrow_mut() = match strategy {
            LoadingStrategy::Lazy => DeferState::Idle,
            LoadingStrategy::Eager => DeferState::Loading,
        };
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

    pub fn phase(&self) -> DeferPhase {
        self.shared.phase()
    }

    pub fn get_loading_strategy(&self) -> LoadingStrategy {
        self.loading
    }

    /// Handle bound to the wrapper node
    pub fn wrapper(&self) -> &ElementRef {
        &self.wrapper
    }
}

/// Call the producer, at most once per component
fn run_producer(shared: &Rc<Shared>, cx: &MountContext, liveness: &Liveness) {
    let producer = shared.producer.borrow_mut().take();
    let Some(producer) = producer else {
        return;
    };

    debug!("running deferred producer");
    let rebuild = cx.rebuild().clone();
    let shared = shared.clone();
    let liveness = liveness.clone();
    match producer() {
        Produced::Immediate(view) => {
            cx.tasks().defer(Box::new(move || {
                finish(&shared, &liveness, &rebuild, Resolved::View(view));
            }));
        }
        Produced::Pending(future) => {
            cx.tasks().spawn_local(Box::pin(async move {
                let resolved = future.await;
                finish(&shared, &liveness, &rebuild, resolved);
            }));
        }
    }
}

fn finish(shared: &Shared, liveness: &Liveness, rebuild: &Rebuild, resolved: Resolved) {
    liveness.guard("deferred content", || match resolved.into_view() {
        Some(view) => {
            *shared.state.borrow_mut() = DeferState::Ready(view);
            debug!("deferred content ready");
            rebuild.request();
        }
        None => {
            warn!("deferred producer resolved to neither a view nor a module default, staying in loading state");
        }
    });
}

impl Component for Defer {
    fn render(&self) -> ViewNode {
        let state = self.shared.state.borrow();
        match &*state {
            DeferState::Ready(view) => view.clone(),
            DeferState::Loading => {
                observed_wrapper(&self.config, &self.style, &self.attrs, &self.wrapper)
                    .child_opt(self.placeholder.clone())
            }
            DeferState::Idle => {
                observed_wrapper(&self.config, &self.style, &self.attrs, &self.wrapper)
            }
        }
    }

    fn mount(&mut self, cx: &MountContext) -> Result<()> {
        self.liveness.mark_mounted();

        match self.loading {
            LoadingStrategy::Eager => run_producer(&self.shared, cx, &self.liveness),
            LoadingStrategy::Lazy => {
                let shared = self.shared.clone();
                let liveness = self.liveness.clone();
                let cx = cx.clone();
                let on_visible = move || {
                    liveness.guard("visibility change", || {
                        if shared.enter_loading() {
                            debug!("deferred wrapper visible");
                            cx.request_rebuild();
                            run_producer(&shared, &cx, &liveness);
                        }
                    });
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
