//! Run a callback the first time an empty marker scrolls into view
//!
//! Useful for analytics beacons and "load more" triggers:
//!
//! ```ignore
//! let marker = on_screen(move || feed.load_next_page());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;
use veil_core::observer::{self, observe};
use veil_core::{Component, ElementRef, Liveness, MountContext, Result, Style, VeilConfig, ViewNode};

use crate::loading::observed_wrapper;

type Execute = Box<dyn FnOnce()>;

pub struct OnScreen {
    execute: Rc<RefCell<Option<Execute>>>,
    notified: Rc<Cell<bool>>,
    style: Style,
    attrs: IndexMap<String, String>,
    config: Rc<VeilConfig>,
    marker: ElementRef,
    liveness: Liveness,
}

pub fn on_screen(execute: impl FnOnce() + 'static) -> OnScreen {
    OnScreen::new(execute)
}

impl OnScreen {
    pub fn new(execute: impl FnOnce() + 'static) -> Self {
        Self {
            execute: Rc::new(RefCell::new(Some(Box::new(execute)))),
            notified: Rc::new(Cell::new(false)),
            style: Style::new(),
            attrs: IndexMap::new(),
            config: Rc::new(VeilConfig::default()),
            marker: ElementRef::new(),
            liveness: Liveness::new(),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_config(mut self, config: Rc<VeilConfig>) -> Self {
        self.config = config;
        self
    }

    /// Whether `execute` has run
    pub fn is_notified(&self) -> bool {
        self.notified.get()
    }

    pub fn marker(&self) -> &ElementRef {
        &self.marker
    }
}

impl Component for OnScreen {
    fn render(&self) -> ViewNode {
        observed_wrapper(&self.config, &self.style, &self.attrs, &self.marker).test_id("on-screen")
    }

    fn mount(&mut self, _cx: &MountContext) -> Result<()> {
        self.liveness.mark_mounted();
        let execute = self.execute.clone();
        let notified = self.notified.clone();
        let liveness = self.liveness.clone();
        let result = observe(&self.marker, move || {
            liveness.guard("on-screen notification", || {
                let execute = execute.borrow_mut().take();
                if let Some(execute) = execute {
                    notified.set(true);
                    tracing::debug!("on-screen marker visible");
                    execute();
                }
            });
        });
        if result.is_err() {
            self.liveness.mark_unmounted();
        }
        result
    }

    fn unmount(&mut self) {
        self.liveness.mark_unmounted();
        if let Some(element) = self.marker.release() {
            observer::cancel(element);
        }
    }
}
