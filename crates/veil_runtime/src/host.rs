//! Component host
//!
//! Owns a root [`Component`] and drives its lifecycle: the first render binds
//! element handles, `mount` runs once those handles are bound, and rebuild
//! requests made by the component are picked up by [`Host::update`].
//!
//! # Example
//!
//! ```ignore
//! use veil_runtime::prelude::*;
//!
//! let platform = Rc::new(HeadlessPlatform::new());
//! platform.install_viewport();
//!
//! let mut host = Host::mount(img("hero.png").lazy(), platform.clone())?;
//! platform.event_loop().run_until_stalled();
//! platform.event_loop().run_frames(6);
//! host.update();
//! println!("{:#?}", host.tree());
//! ```

use std::rc::Rc;

use veil_core::{Component, ElementId, MountContext, Rebuild, Result, ViewNode};
use veil_platform::Platform;

pub struct Host<C: Component> {
    root: C,
    context: MountContext,
    tree: ViewNode,
    renders: u64,
    mounted: bool,
}

impl<C: Component> Host<C> {
    /// Render `root`, bind its handles and mount it
    ///
    /// A mount error is returned as is; the component is dropped without an
    /// `unmount` call since it never finished mounting.
    pub fn mount(root: C, platform: Rc<dyn Platform>) -> Result<Self> {
        let context = MountContext::new(platform, Rebuild::new());
        let mut host = Self {
            root,
            context,
            tree: ViewNode::default(),
            renders: 0,
            mounted: false,
        };
        host.render();
        host.root.mount(&host.context)?;
        host.mounted = true;
        tracing::debug!(platform = host.context.platform().name(), "component mounted");
        Ok(host)
    }

    /// Render unconditionally, clearing any pending rebuild request
    pub fn render(&mut self) -> &ViewNode {
        self.context.rebuild().take();
        self.tree = self.root.render();
        self.tree.bind_refs(&mut |_: &ViewNode| ElementId::next());
        self.renders += 1;
        &self.tree
    }

    /// Render if the component asked for it; returns whether it did
    ///
    /// Always false once unmounted: released handles must stay unbound.
    pub fn update(&mut self) -> bool {
        if self.mounted && self.context.rebuild().is_dirty() {
            self.render();
            true
        } else {
            false
        }
    }

    /// Last rendered tree
    pub fn tree(&self) -> &ViewNode {
        &self.tree
    }

    pub fn root(&self) -> &C {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut C {
        &mut self.root
    }

    pub fn context(&self) -> &MountContext {
        &self.context
    }

    /// Number of renders so far, the initial one included
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Number of rebuild requests made by the component
    pub fn rebuild_requests(&self) -> u64 {
        self.context.rebuild().count()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Unmount the root; later calls are no-ops
    pub fn unmount(&mut self) {
        if self.mounted {
            self.mounted = false;
            self.root.unmount();
            self.context.rebuild().take();
            tracing::debug!("component unmounted");
        }
    }
}

impl<C: Component> Drop for Host<C> {
    fn drop(&mut self) {
        self.unmount();
    }
}
