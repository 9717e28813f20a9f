//! Pure Rust imaging backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::load_from_memory` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Resize | `image::imageops::resize` with `Triangle` (bilinear) filter |
//! | Gaussian blur | `imageproc::filter::separable_filter_equal` with a size-derived kernel |
//! | Edge thresholding | `imageproc::edges::canny` |

use super::backend::{BackendError, ImagingBackend};
use super::buffer::{Channels, PixelBuffer};
use super::params::{EdgeThresholds, KernelSize};
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder};

/// Backend using the `image` + `imageproc` crates.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImagingBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, BackendError> {
        let img = image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(PixelBuffer::from_rgb_image(img.to_rgb8()))
    }

    fn encode_png(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, BackendError> {
        let color = match buffer.channels() {
            Channels::Gray => ExtendedColorType::L8,
            Channels::Rgb => ExtendedColorType::Rgb8,
        };
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(buffer.samples(), buffer.width(), buffer.height(), color)
            .map_err(|e| BackendError::Encode(e.to_string()))?;
        Ok(out)
    }

    fn resize(
        &self,
        buffer: &PixelBuffer,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Cannot resize to {width}x{height}"
            )));
        }
        let resized = image::imageops::resize(
            &buffer.to_rgb_image(),
            width,
            height,
            FilterType::Triangle,
        );
        Ok(PixelBuffer::from_rgb_image(resized))
    }

    fn gaussian_blur(
        &self,
        buffer: &PixelBuffer,
        kernel: KernelSize,
    ) -> Result<PixelBuffer, BackendError> {
        let weights = kernel.weights();
        let blurred = imageproc::filter::separable_filter_equal(&buffer.to_rgb_image(), &weights);
        Ok(PixelBuffer::from_rgb_image(blurred))
    }

    fn threshold_edges(
        &self,
        luma: &PixelBuffer,
        thresholds: EdgeThresholds,
    ) -> Result<PixelBuffer, BackendError> {
        if thresholds.low > thresholds.high {
            return Err(BackendError::ProcessingFailed(format!(
                "Edge thresholds out of order: low {} > high {}",
                thresholds.low, thresholds.high
            )));
        }
        let edges =
            imageproc::edges::canny(&luma.to_gray_image(), thresholds.low, thresholds.high);
        Ok(PixelBuffer::from_gray_image(edges))
    }
}
