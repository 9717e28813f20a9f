//! Ordered filter composition.
//!
//! [`FilterPipeline::apply`] feeds each filter the previous filter's output.
//! The first failure stops the run and is reported with the kind and
//! position of the failing step; nothing at or after that step is applied.

use crate::filters::{FilterFailure, FilterKind, FilterSpec, NoiseSource, apply_filter};
use crate::imaging::{ImagingBackend, PixelBuffer};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
#[error("filter '{kind}' at position {index} failed: {source}")]
pub struct PipelineError {
    pub kind: FilterKind,
    pub index: usize,
    #[source]
    pub source: FilterFailure,
}

pub struct FilterPipeline<'a, B: ImagingBackend + ?Sized> {
    backend: &'a B,
    noise: &'a mut dyn NoiseSource,
}

impl<'a, B: ImagingBackend + ?Sized> FilterPipeline<'a, B> {
    pub fn new(backend: &'a B, noise: &'a mut dyn NoiseSource) -> Self {
        Self { backend, noise }
    }

    /// Apply `specs` in order. An empty list returns an identical copy of `input`.
    pub fn apply(
        &mut self,
        input: &PixelBuffer,
        specs: &[FilterSpec],
    ) -> Result<PixelBuffer, PipelineError> {
        let mut current = input.clone();
        for (index, spec) in specs.iter().enumerate() {
            debug!(filter = %spec.kind, index, "applying filter");
            current = apply_filter(spec, &current, self.backend, &mut *self.noise).map_err(
                |source| PipelineError {
                    kind: spec.kind,
                    index,
                    source,
                },
            )?;
        }
        Ok(current)
    }
}
