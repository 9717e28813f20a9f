//! In-memory raster type shared by the backend and every filter.
//!
//! A [`PixelBuffer`] is row-major, 8 bits per sample, with either one (luma)
//! or three (RGB) interleaved channels. The sample length always equals
//! `width * height * channels`; the constructor is the only way in, so the
//! invariant cannot be broken from outside the module.

use image::{GrayImage, RgbImage};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BufferError {
    #[error("sample count {actual} does not match {width}x{height}x{channels} = {expected}")]
    LengthMismatch {
        width: u32,
        height: u32,
        channels: u8,
        expected: usize,
        actual: usize,
    },
}

/// Number of interleaved channels per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Gray,
    Rgb,
}

impl Channels {
    pub fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: Channels,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw samples, checking the length invariant.
    pub fn new(
        width: u32,
        height: u32,
        channels: Channels,
        samples: Vec<u8>,
    ) -> Result<Self, BufferError> {
        let expected = width as usize * height as usize * channels.count();
        if samples.len() != expected {
            return Err(BufferError::LengthMismatch {
                width,
                height,
                channels: channels.count() as u8,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// A buffer where every pixel is the given RGB colour.
    pub fn filled_rgb(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let samples = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            channels: Channels::Rgb,
            samples,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// True when the buffer holds no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Sample values of the pixel at `(x, y)`; one or three entries.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let n = self.channels.count();
        let start = (y as usize * self.width as usize + x as usize) * n;
        &self.samples[start..start + n]
    }

    /// Copy as a 3-channel buffer, replicating luma for grayscale input.
    pub fn to_rgb(&self) -> PixelBuffer {
        match self.channels {
            Channels::Rgb => self.clone(),
            Channels::Gray => {
                let samples = self.samples.iter().flat_map(|&v| [v, v, v]).collect();
                PixelBuffer {
                    width: self.width,
                    height: self.height,
                    channels: Channels::Rgb,
                    samples,
                }
            }
        }
    }

    /// Single-channel BT.601 luma of this buffer.
    pub fn to_luma(&self) -> PixelBuffer {
        match self.channels {
            Channels::Gray => self.clone(),
            Channels::Rgb => {
                let samples = self
                    .samples
                    .chunks_exact(3)
                    .map(|px| luma(px[0], px[1], px[2]))
                    .collect();
                PixelBuffer {
                    width: self.width,
                    height: self.height,
                    channels: Channels::Gray,
                    samples,
                }
            }
        }
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    pub fn from_rgb_image(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            channels: Channels::Rgb,
            samples: img.into_raw(),
        }
    }

    pub fn from_gray_image(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            channels: Channels::Gray,
            samples: img.into_raw(),
        }
    }

    /// View as an `image` crate RGB image (grayscale is expanded first).
    pub fn to_rgb_image(&self) -> RgbImage {
        let rgb = self.to_rgb();
        // Length is guaranteed by the constructor invariant.
        RgbImage::from_raw(rgb.width, rgb.height, rgb.samples)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }

    /// View as an `image` crate luma image (RGB is converted first).
    pub fn to_gray_image(&self) -> GrayImage {
        let gray = self.to_luma();
        GrayImage::from_raw(gray.width, gray.height, gray.samples)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }
}

/// BT.601 luma with integer rounding, matching the usual `RGB2GRAY` weights.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((weighted + 500) / 1000) as u8
}
