//! Imaging backend trait and its error type.
//!
//! The [`ImagingBackend`] trait is the capability seam between filter logic
//! and whichever imaging library does the heavy lifting. It covers five
//! operations: decode, encode, resize, Gaussian convolution and hysteresis
//! edge thresholding.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on `image` and
//! `imageproc`. Tests use the recording [`tests::MockBackend`].

use super::buffer::PixelBuffer;
use super::params::{EdgeThresholds, KernelSize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for imaging backends.
///
/// Every backend must implement all five operations so filters and the
/// upload workflow stay backend-agnostic.
pub trait ImagingBackend: Sync {
    /// Decode encoded file bytes (any supported format) into an RGB buffer.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, BackendError>;

    /// Encode a buffer as 8-bit PNG.
    fn encode_png(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, BackendError>;

    /// Resize to exact dimensions, ignoring aspect ratio.
    fn resize(
        &self,
        buffer: &PixelBuffer,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, BackendError>;

    /// Gaussian blur with a square kernel of the given size.
    fn gaussian_blur(
        &self,
        buffer: &PixelBuffer,
        kernel: KernelSize,
    ) -> Result<PixelBuffer, BackendError>;

    /// Hysteresis edge detection on a luma buffer; returns a luma buffer of 0/255.
    fn threshold_edges(
        &self,
        luma: &PixelBuffer,
        thresholds: EdgeThresholds,
    ) -> Result<PixelBuffer, BackendError>;
}
