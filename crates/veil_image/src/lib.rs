//! Veil image support
//!
//! - [`ImageChannel`] - per-channel load state of a progressive image
//! - [`BytesImageDecoder`] - native [`veil_platform::ImageDecoder`] backed by the `image` crate
//! - [`ImageSource`] - classification of `src` strings
//!
//! # Example
//!
//! ```ignore
//! use veil_image::BytesImageDecoder;
//! use veil_platform::ImageRequest;
//!
//! let decoder = BytesImageDecoder::new(event_loop.tasks());
//! decoder.decode(ImageRequest::new("assets/hero.jpg"), Box::new(|decoded| {
//!     println!("aspect ratio {:?}", decoded.aspect_ratio());
//! }));
//! ```

pub mod channel;
pub mod decoder;
pub mod error;
pub mod loader;
pub mod source;

pub use channel::{usable_ratio, ChannelKind, ChannelState, ImageChannel};
pub use decoder::BytesImageDecoder;
pub use error::{ImageError, Result};
pub use source::ImageSource;
