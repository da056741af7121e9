//! Inline element styling
//!
//! `Style` is an ordered map of CSS properties. Later writes win, so composing
//! a base style, user overrides and forced values is a chain of merges.
//!
//! # Example
//!
//! ```ignore
//! use veil_core::style::style;
//!
//! let wrapper = style()
//!     .prop("position", "relative")
//!     .prop("overflow", "hidden")
//!     .merge(&user_style)
//!     .prop("padding-bottom", percent(0.2));
//! ```

use indexmap::IndexMap;

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Style {
    props: IndexMap<String, String>,
}

impl Style {
    /// Create a new empty style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any previous value
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.props.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.props.get(name).map(String::as_str)
    }

    pub fn opacity(self, opacity: f32) -> Self {
        self.prop("opacity", opacity.to_string())
    }

    pub fn z_index(self, z: i32) -> Self {
        self.prop("z-index", z.to_string())
    }

    /// Merge another style on top of this one
    ///
    /// Properties set in `other` override; new properties are appended.
    pub fn merge(mut self, other: &Style) -> Style {
        for (name, value) in &other.props {
            self.props.insert(name.clone(), value.clone());
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Serialize as an inline `style` attribute
    pub fn to_css(&self) -> String {
        self.props
            .iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Create a new style
pub fn style() -> Style {
    Style::new()
}

/// Format a ratio as a CSS percentage (`0.2` becomes `"20%"`)
///
/// Rounded to four decimals so float noise like `20.000000000000004` never
/// reaches the output.
pub fn percent(ratio: f64) -> String {
    let pct = (ratio * 100.0 * 10_000.0).round() / 10_000.0;
    format!("{pct}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_and_appends() {
        let base = style().prop("position", "relative").prop("overflow", "hidden");
        let user = style().prop("overflow", "visible").prop("margin", "4px");
        let merged = base.merge(&user);

        assert_eq!(merged.get("position"), Some("relative"));
        assert_eq!(merged.get("overflow"), Some("visible"));
        assert_eq!(merged.get("margin"), Some("4px"));
        assert_eq!(
            merged.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["position", "overflow", "margin"]
        );
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(percent(0.5), "50%");
        assert_eq!(percent(1.0 / 5.0), "20%");
        assert_eq!(percent(0.5625), "56.25%");
        assert_eq!(percent(2.0 / 3.0), "66.6667%");
    }

    #[test]
    fn test_typed_helpers() {
        let s = style().opacity(0.1).z_index(2);
        assert_eq!(s.get("opacity"), Some("0.1"));
        assert_eq!(s.get("z-index"), Some("2"));
        assert_eq!(s.to_css(), "opacity: 0.1; z-index: 2;");
    }
}
