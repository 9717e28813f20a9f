//! # snapfilter
//!
//! A tiny web form for photo filters. Upload an image, tick one or more
//! filters, and get the original and filtered versions back as PNGs.
//!
//! # Architecture
//!
//! ```text
//! upload → decode → resize to canvas → filter pipeline → encode → store → page
//! ```
//!
//! The interesting part is the filter library: a [`PixelBuffer`](imaging::PixelBuffer)
//! type, one pure function per filter, and a [`FilterPipeline`](pipeline::FilterPipeline)
//! that chains them in order. Everything around it (HTTP, storage, templates)
//! is thin glue.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | `PixelBuffer`, the `ImagingBackend` trait and its `image`/`imageproc` implementation |
//! | [`filters`] | The seven filters and the string → `FilterKind` boundary |
//! | [`pipeline`] | Ordered composition with first-failure short-circuit |
//! | [`store`] | Flat upload directory with a retention sweep |
//! | [`process`] | One upload end to end, independent of HTTP |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`render`] | Maud templates for the form and result pages |
//! | [`server`] | Axum routes and the blocking-pool handoff |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Imaging Behind a Trait
//!
//! Decode, encode, resize, Gaussian blur and edge detection go through
//! [`ImagingBackend`](imaging::ImagingBackend). Production code uses
//! [`RustBackend`](imaging::RustBackend); unit tests swap in a recording mock
//! so pipeline and workflow logic can be checked without real images.
//!
//! ## Injectable Noise
//!
//! The vintage filter draws from a [`NoiseSource`](filters::NoiseSource).
//! The server seeds it from the OS per request; tests and `snapfilter apply
//! --seed` get reproducible output.
//!
//! ## Unknown Filters Are Errors
//!
//! Filter names from the form are parsed into [`FilterKind`](filters::FilterKind)
//! before any work starts. A misspelled name is reported back to the user
//! instead of being skipped.

pub mod config;
pub mod filters;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod render;
pub mod server;
pub mod store;
