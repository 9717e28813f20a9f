//! Neighbourhood filters delegated to the imaging backend.

use super::FilterFailure;
use crate::imaging::{EdgeThresholds, ImagingBackend, KernelSize, PixelBuffer};

/// Gaussian blur; `intensity` is rounded up to an odd kernel size (default 15).
pub fn blur<B: ImagingBackend + ?Sized>(
    input: &PixelBuffer,
    intensity: Option<u32>,
    backend: &B,
) -> Result<PixelBuffer, FilterFailure> {
    let kernel = intensity
        .map(KernelSize::from_intensity)
        .unwrap_or_default();
    let out = backend.gaussian_blur(&input.to_rgb(), kernel)?;
    Ok(out.to_rgb())
}

/// Edge map of the luma channel, replicated to RGB (white edges on black).
pub fn edges<B: ImagingBackend + ?Sized>(
    input: &PixelBuffer,
    backend: &B,
) -> Result<PixelBuffer, FilterFailure> {
    let edges = backend.threshold_edges(&input.to_luma(), EdgeThresholds::default())?;
    Ok(edges.to_rgb())
}
