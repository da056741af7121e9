//! Element identity
//!
//! Platform backends hand out an [`ElementId`] for every rendered node that a
//! component may want to watch. Ids are never reused within a process, so they
//! are safe to use as registry keys long after the node itself is gone.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a rendered element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

impl ElementId {
    /// Allocate a fresh, process-unique id
    pub fn next() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild an id from its raw value (e.g. read back from a DOM attribute)
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = ElementId::next();
        let b = ElementId::next();
        assert_ne!(a, b);
        assert!(b.as_raw() > a.as_raw());
    }

    #[test]
    fn test_raw_round_trip() {
        let id = ElementId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
        assert_eq!(id.to_string(), "#42");
    }
}
