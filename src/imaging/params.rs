//! Parameter types for backend operations.
//!
//! These describe *what* to ask the backend for; the backend decides how.
//!
//! - [`KernelSize`]: odd Gaussian window side length, derived from a user intensity.
//! - [`EdgeThresholds`]: low/high hysteresis thresholds for the edge detector.

/// Side length of a square Gaussian kernel. Always odd and at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelSize(u32);

impl KernelSize {
    /// Largest kernel the backend is ever asked for.
    pub const MAX: KernelSize = KernelSize(1001);

    /// Round an intensity up to the next odd size (0 and 1 both give 1),
    /// saturating at [`KernelSize::MAX`].
    pub fn from_intensity(intensity: u32) -> Self {
        match intensity {
            0 => Self(1),
            n if n >= Self::MAX.0 => Self::MAX,
            n if n % 2 == 1 => Self(n),
            n => Self(n + 1),
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Standard deviation implied by the kernel size when none is given.
    ///
    /// `sigma = 0.3 * ((k - 1) * 0.5 - 1) + 0.8`
    pub fn sigma(self) -> f32 {
        0.3 * ((self.0 as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }

    /// Normalised 1-D Gaussian weights of length `value()`.
    pub fn weights(self) -> Vec<f32> {
        let k = self.0 as usize;
        if k == 1 {
            return vec![1.0];
        }
        let sigma = self.sigma();
        let center = (k / 2) as f32;
        let raw: Vec<f32> = (0..k)
            .map(|i| {
                let d = i as f32 - center;
                (-(d * d) / (2.0 * sigma * sigma)).exp()
            })
            .collect();
        let sum: f32 = raw.iter().sum();
        raw.into_iter().map(|w| w / sum).collect()
    }
}

impl Default for KernelSize {
    fn default() -> Self {
        Self(15)
    }
}

/// Hysteresis thresholds for edge detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeThresholds {
    pub low: f32,
    pub high: f32,
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self {
            low: 100.0,
            high: 200.0,
        }
    }
}
