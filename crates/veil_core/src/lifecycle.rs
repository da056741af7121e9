//! Mounted-state guard for asynchronous completions
//!
//! Image decodes, producer futures and frame callbacks are never cancelled.
//! Instead each component shares a [`Liveness`] flag with every closure it
//! schedules, and those closures apply their effect only while the component
//! is still mounted. Completions that arrive later are stale updates and are
//! dropped.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Default, Debug)]
pub struct Liveness {
    mounted: Rc<Cell<bool>>,
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_mounted(&self) {
        self.mounted.set(true);
    }

    pub fn mark_unmounted(&self) {
        self.mounted.set(false);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Run `effect` only while mounted
    ///
    /// Returns whether the effect ran. `what` names the update in the trace
    /// emitted when it is dropped.
    pub fn guard(&self, what: &str, effect: impl FnOnce()) -> bool {
        if self.mounted.get() {
            effect();
            true
        } else {
            tracing::trace!("dropping stale update after unmount: {}", what);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_runs_only_while_mounted() {
        let liveness = Liveness::new();
        let hits = Rc::new(Cell::new(0));

        let h = hits.clone();
        assert!(!liveness.guard("before mount", move || h.set(h.get() + 1)));

        liveness.mark_mounted();
        let h = hits.clone();
        assert!(liveness.guard("mounted", move || h.set(h.get() + 1)));

        let shared = liveness.clone();
        liveness.mark_unmounted();
        let h = hits.clone();
        assert!(!shared.guard("after unmount", move || h.set(h.get() + 1)));

        assert_eq!(hits.get(), 1);
    }
}
