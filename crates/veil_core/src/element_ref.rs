//! Element handles
//!
//! An [`ElementRef`] is created by a component before anything is rendered and
//! placed on the node it wants to watch. The renderer binds the handle to the
//! node's [`ElementId`] when it materializes the node; the component releases it
//! again on teardown so it never keeps a removed node reachable.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use veil_platform::ElementId;

/// Shared, late-bound handle to a rendered element
#[derive(Clone, Default)]
pub struct ElementRef {
    slot: Rc<Cell<Option<ElementId>>>,
}

impl ElementRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the handle to a rendered element, replacing any previous binding
    pub fn attach(&self, id: ElementId) {
        self.slot.set(Some(id));
    }

    /// Unbind the handle, returning the element it pointed at
    pub fn release(&self) -> Option<ElementId> {
        self.slot.take()
    }

    pub fn get(&self) -> Option<ElementId> {
        self.slot.get()
    }

    pub fn is_attached(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Whether two handles share the same slot
    pub fn ptr_eq(&self, other: &ElementRef) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(id) => write!(f, "ElementRef({id})"),
            None => f.write_str("ElementRef(unbound)"),
        }
    }
}
