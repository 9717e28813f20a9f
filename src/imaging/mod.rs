//! Image plumbing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` |
//! | **Encode** | PNG via `image::codecs::png` |
//! | **Resize** | `image::imageops::resize` (bilinear) |
//! | **Blur** | `imageproc::filter::separable_filter_equal` |
//! | **Edges** | `imageproc::edges::canny` |
//!
//! The module is split into:
//! - **Buffer**: [`PixelBuffer`], the raster every filter consumes and produces
//! - **Parameters**: kernel sizes and edge thresholds (unit testable)
//! - **Backend**: [`ImagingBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod buffer;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImagingBackend};
pub use buffer::{BufferError, Channels, PixelBuffer};
pub use params::{EdgeThresholds, KernelSize};
pub use rust_backend::RustBackend;
