//! Noise-driven filters and the injectable random source they draw from.

use super::color::{clamp_u8, sepia_pixel};
use crate::imaging::PixelBuffer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Standard deviation of the vintage grain, in 8-bit sample units.
pub const VINTAGE_NOISE_STD_DEV: f32 = 25.0;

/// Source of standard-normal samples (mean 0, standard deviation 1).
///
/// Filters scale the samples themselves, so a test double can return fixed
/// values without knowing about any particular filter.
pub trait NoiseSource {
    fn standard_normal(&mut self) -> f32;
}

/// Gaussian noise backed by any `rand` generator.
pub struct GaussianNoise<R: Rng> {
    rng: R,
}

impl<R: Rng> GaussianNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl GaussianNoise<StdRng> {
    /// Reproducible noise for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Fresh noise seeded from the OS.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> NoiseSource for GaussianNoise<R> {
    fn standard_normal(&mut self) -> f32 {
        self.rng.sample(StandardNormal)
    }
}

/// Sepia followed by per-channel Gaussian grain.
///
/// Runs sequentially so a seeded source always yields the same image.
pub fn vintage(input: &PixelBuffer, noise: &mut dyn NoiseSource) -> PixelBuffer {
    let mut out = input.to_rgb();
    for px in out.samples_mut().chunks_exact_mut(3) {
        let toned = sepia_pixel(px).map(|v| v.clamp(0.0, 255.0));
        for (sample, base) in px.iter_mut().zip(toned) {
            *sample = clamp_u8(base + noise.standard_normal() * VINTAGE_NOISE_STD_DEV);
        }
    }
    out
}
