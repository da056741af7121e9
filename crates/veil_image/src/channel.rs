//! Image channels
//!
//! A progressive image runs two channels, the placeholder and the main image.
//! Each moves `NotRequested -> Requested -> Loaded` on its own; the two never
//! wait for each other.

use veil_platform::DecodedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Placeholder,
    Main,
}

impl ChannelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Placeholder => "placeholder",
            ChannelKind::Main => "main",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ChannelState {
    #[default]
    NotRequested,
    Requested,
    Loaded {
        /// Natural height over width, `None` for a degenerate image
        aspect_ratio: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageChannel {
    kind: ChannelKind,
    state: ChannelState,
}

impl ImageChannel {
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            state: ChannelState::NotRequested,
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Move to `Requested`; false if the channel was already requested
    pub fn request(&mut self) -> bool {
        if self.state != ChannelState::NotRequested {
            return false;
        }
        self.state = ChannelState::Requested;
        true
    }

    /// Record a finished decode and return the usable aspect ratio
    pub fn complete(&mut self, decoded: DecodedImage) -> Option<f64> {
        let aspect_ratio = decoded.aspect_ratio().filter(|r| usable_ratio(*r));
        self.state = ChannelState::Loaded { aspect_ratio };
        tracing::debug!(
            channel = self.kind.as_str(),
            width = decoded.natural_width,
            height = decoded.natural_height,
            "image channel loaded"
        );
        aspect_ratio
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ChannelState::Loaded { .. })
    }
}

/// Whether a ratio can size a box
pub fn usable_ratio(ratio: f64) -> bool {
    ratio.is_finite() && ratio > 0.0
}
