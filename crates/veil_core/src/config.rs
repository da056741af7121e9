//! Tunables shared by the Veil components
//!
//! Defaults reproduce the stock look: a light grey box sized at 1:2 until the
//! image reports its real proportions, a heavily blurred placeholder, and a one
//! second opacity fade that starts five frames after the full image decoded.
//!
//! ```ignore
//! let config = VeilConfig::from_toml_str(r#"
//!     ready_frame_delay = 3
//!     default_background = "black"
//! "#)?;
//! let image = img("hero.jpg").with_config(Rc::new(config));
//! ```

use serde::Deserialize;

use crate::error::{Result, VeilError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VeilConfig {
    /// Frames to wait after the main image decoded before fading it in
    pub ready_frame_delay: u32,
    /// Height over width used until an aspect ratio is known
    pub default_aspect_ratio: f64,
    /// Background colour of the image wrapper
    pub default_background: String,
    /// Opacity of the main image while it is still fading in
    pub loading_opacity: f32,
    /// Opacity of the placeholder before the main image is ready
    pub placeholder_opacity: f32,
    /// Blur radius applied to the placeholder, in pixels
    pub placeholder_blur_px: f32,
    /// CSS transition used for the fade
    pub fade_transition: String,
    /// Minimum width and height of observed wrappers, in pixels
    pub observed_min_size_px: u32,
}

impl Default for VeilConfig {
    fn default() -> Self {
        Self {
            ready_frame_delay: 5,
            default_aspect_ratio: 0.5,
            default_background: "#f6f6f6".to_string(),
            loading_opacity: 0.1,
            placeholder_opacity: 0.99,
            placeholder_blur_px: 50.0,
            fade_transition: "opacity 1s linear".to_string(),
            observed_min_size_px: 1,
        }
    }
}

impl VeilConfig {
    /// Parse and validate a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| VeilError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.default_aspect_ratio.is_finite() && self.default_aspect_ratio > 0.0) {
            return Err(VeilError::Config(format!(
                "default_aspect_ratio must be a positive number, got {}",
                self.default_aspect_ratio
            )));
        }
        for (name, value) in [
            ("loading_opacity", self.loading_opacity),
            ("placeholder_opacity", self.placeholder_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(VeilError::Config(format!(
                    "{name} must be within 0..=1, got {value}"
                )));
            }
        }
        if self.placeholder_blur_px < 0.0 {
            return Err(VeilError::Config(format!(
                "placeholder_blur_px must not be negative, got {}",
                self.placeholder_blur_px
            )));
        }
        Ok(())
    }

    /// Minimum wrapper size as a CSS length
    pub fn observed_min_size(&self) -> String {
        format!("{}px", self.observed_min_size_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VeilConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ready_frame_delay, 5);
        assert_eq!(config.default_background, "#f6f6f6");
        assert_eq!(config.observed_min_size(), "1px");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = VeilConfig::from_toml_str(
            r#"
            ready_frame_delay = 2
            default_background = "black"
            "#,
        )
        .unwrap();
        assert_eq!(config.ready_frame_delay, 2);
        assert_eq!(config.default_background, "black");
        assert_eq!(config.default_aspect_ratio, 0.5);
        assert_eq!(config.fade_transition, "opacity 1s linear");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = VeilConfig::from_toml_str("default_aspect_ratio = 0.0").unwrap_err();
        assert!(matches!(err, VeilError::Config(_)));

        let err = VeilConfig::from_toml_str("loading_opacity = 1.5").unwrap_err();
        assert!(err.to_string().contains("loading_opacity"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(VeilConfig::from_toml_str("fade = true").is_err());
    }
}
