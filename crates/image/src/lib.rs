//! Pixel buffers for the finder pipeline.
//!
//! Camera frames arrive in whatever format the device negotiated. This crate
//! turns them into RGB for encoding, into packed `u32` for display, and into
//! the JPEG data-URIs the detection service expects.

mod datauri;
pub use datauri::*;

mod display;
pub use display::*;

mod error;
pub use error::*;

mod image;
pub use image::*;

mod jpeg;
pub use jpeg::*;

mod pixelformat;
pub use pixelformat::*;

mod rgb;
pub use rgb::*;
