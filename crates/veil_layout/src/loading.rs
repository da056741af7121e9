//! Loading strategy and the observed wrapper shared by the components

use indexmap::IndexMap;
use veil_core::{div, ElementRef, Style, VeilConfig, ViewNode};

/// Attribute marking a node watched by the visibility observer
pub const OBSERVED_ATTR: &str = "data-observed";

// ============================================================================
// Loading Strategy
// ============================================================================

/// When a component starts its work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingStrategy {
    /// Start as soon as the component is mounted
    #[default]
    Eager,
    /// Start the first time the component's wrapper becomes visible
    Lazy,
}

impl LoadingStrategy {
    pub fn from_load_on_visible(load_on_visible: bool) -> Self {
        if load_on_visible {
            LoadingStrategy::Lazy
        } else {
            LoadingStrategy::Eager
        }
    }

    pub fn is_lazy(self) -> bool {
        self == LoadingStrategy::Lazy
    }
}

// ============================================================================
// Observed wrapper
// ============================================================================

/// Wrapper node the visibility observer watches
///
/// Gets a small non-zero footprint so it can intersect the viewport even with
/// no content. `style` overrides the footprint, `attrs` are passed through.
pub fn observed_wrapper(
    config: &VeilConfig,
    style: &Style,
    attrs: &IndexMap<String, String>,
    handle: &ElementRef,
) -> ViewNode {
    let min_size = config.observed_min_size();
    let style = Style::new()
        .prop("display", "inline-block")
        .prop("min-height", min_size.clone())
        .prop("min-width", min_size)
        .merge(style);

    div()
        .attrs(attrs)
        .attr(OBSERVED_ATTR, "")
        .style(style)
        .with_ref(handle)
}
