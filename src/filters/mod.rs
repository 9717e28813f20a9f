//! Pixel filters.
//!
//! Every filter is a pure function from a [`PixelBuffer`] (plus an optional
//! intensity) to a new 3-channel [`PixelBuffer`]. Inputs are never mutated,
//! so filters compose freely in the [`pipeline`](crate::pipeline).
//!
//! | Kind | Module | Transform |
//! |---|---|---|
//! | `bw` | [`color`] | BT.601 luma replicated to all channels |
//! | `sepia` | [`color`] | fixed 3×3 colour matrix, clamped |
//! | `negative` | [`color`] | `255 - v` |
//! | `bright` | [`color`] | `v * 1.5 + 50`, clamped |
//! | `blur` | [`spatial`] | Gaussian, kernel = intensity rounded up to odd |
//! | `edges` | [`spatial`] | hysteresis edge detector (100/200) on luma |
//! | `vintage` | [`noise`] | sepia + Gaussian noise (σ = 25) |
//!
//! Filter names arrive as strings from the form. They are parsed once into
//! [`FilterKind`] at the boundary; an unrecognised name is an
//! [`UnknownFilterError`] rather than a silent no-op.

pub mod color;
pub mod noise;
pub mod spatial;

use crate::imaging::{BackendError, ImagingBackend, PixelBuffer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use noise::{GaussianNoise, NoiseSource};

#[derive(Error, Debug)]
pub enum FilterFailure {
    #[error("image is empty or absent")]
    InvalidImage,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown filter '{name}' at position {index}")]
pub struct UnknownFilterError {
    pub name: String,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Bw,
    Sepia,
    Blur,
    Negative,
    Edges,
    Bright,
    Vintage,
}

impl FilterKind {
    /// All kinds in the order the form lists them.
    pub const ALL: [FilterKind; 7] = [
        FilterKind::Bw,
        FilterKind::Sepia,
        FilterKind::Blur,
        FilterKind::Negative,
        FilterKind::Edges,
        FilterKind::Bright,
        FilterKind::Vintage,
    ];

    /// Form/wire name.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Bw => "bw",
            FilterKind::Sepia => "sepia",
            FilterKind::Blur => "blur",
            FilterKind::Negative => "negative",
            FilterKind::Edges => "edges",
            FilterKind::Bright => "bright",
            FilterKind::Vintage => "vintage",
        }
    }

    /// Human-readable label shown on the page.
    pub fn display_name(self) -> &'static str {
        match self {
            FilterKind::Bw => "Black & White",
            FilterKind::Sepia => "Sepia",
            FilterKind::Blur => "Blur",
            FilterKind::Negative => "Negative",
            FilterKind::Edges => "Edge Detection",
            FilterKind::Bright => "Brightness",
            FilterKind::Vintage => "Vintage",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKind::ALL
            .into_iter()
            .find(|k| k.name() == s.trim())
            .ok_or_else(|| s.to_string())
    }
}

/// One requested filter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    /// Only `blur` reads this; `None` means the default kernel.
    pub intensity: Option<u32>,
}

impl FilterSpec {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            intensity: None,
        }
    }

    pub fn with_intensity(kind: FilterKind, intensity: u32) -> Self {
        Self {
            kind,
            intensity: Some(intensity),
        }
    }

    /// Parse form names in order, sharing one intensity across all steps.
    pub fn parse_list<S: AsRef<str>>(
        names: &[S],
        intensity: Option<u32>,
    ) -> Result<Vec<FilterSpec>, UnknownFilterError> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                name.as_ref()
                    .parse::<FilterKind>()
                    .map(|kind| FilterSpec { kind, intensity })
                    .map_err(|name| UnknownFilterError { name, index })
            })
            .collect()
    }
}

/// Run a single filter step.
pub fn apply_filter<B: ImagingBackend + ?Sized>(
    spec: &FilterSpec,
    input: &PixelBuffer,
    backend: &B,
    noise: &mut dyn NoiseSource,
) -> Result<PixelBuffer, FilterFailure> {
    if input.is_empty() {
        return Err(FilterFailure::InvalidImage);
    }
    let output = match spec.kind {
        FilterKind::Bw => color::bw(input),
        FilterKind::Sepia => color::sepia(input),
        FilterKind::Negative => color::negative(input),
        FilterKind::Bright => color::bright(input),
        FilterKind::Blur => spatial::blur(input, spec.intensity, backend)?,
        FilterKind::Edges => spatial::edges(input, backend)?,
        FilterKind::Vintage => noise::vintage(input, noise),
    };
    Ok(output)
}
