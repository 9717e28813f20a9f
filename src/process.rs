//! Upload processing.
//!
//! The whole life of one upload, independent of HTTP:
//!
//! ```text
//! bytes → decode → resize to canvas → save original
//!       → filter pipeline → encode → save filtered → retention sweep
//! ```
//!
//! Every step is attempted once. The first failure aborts the upload with a
//! [`ProcessError`] describing which stage went wrong; the sweep is
//! best-effort and never fails the upload.

use crate::config::AppConfig;
use crate::filters::{FilterKind, FilterSpec, NoiseSource, UnknownFilterError};
use crate::imaging::{BackendError, ImagingBackend, PixelBuffer};
use crate::pipeline::{FilterPipeline, PipelineError};
use crate::store::{StoreError, UploadStore, asset_names};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("No image was uploaded")]
    MissingFile,
    #[error(transparent)]
    UnknownFilter(#[from] UnknownFilterError),
    #[error("Intensity must be a whole number from 1 to {max}, got '{raw}'")]
    InvalidIntensity { raw: String, max: u32 },
    #[error("Could not read the uploaded image: {0}")]
    Decode(#[source] BackendError),
    #[error("Filter failed: {0}")]
    Filter(#[from] PipelineError),
    #[error("Processing stopped unexpectedly: {0}")]
    Aborted(String),
    #[error("Could not encode the result: {0}")]
    Encode(#[source] BackendError),
    #[error("Could not save the result: {0}")]
    StoreWrite(#[from] StoreError),
}

/// Settings the workflow needs from [`AppConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSettings {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub default_intensity: u32,
    pub max_intensity: u32,
}

impl ProcessSettings {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            canvas_width: config.canvas.width,
            canvas_height: config.canvas.height,
            default_intensity: config.filters.default_intensity,
            max_intensity: config.filters.max_intensity,
        }
    }
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

/// A file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Result of a successful upload, as shown on the result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedUpload {
    pub original: String,
    pub filtered: String,
    pub filters: Vec<FilterKind>,
    pub width: u32,
    pub height: u32,
}

impl ProcessedUpload {
    /// Display names of the applied filters, joined for the page heading.
    pub fn filter_label(&self) -> String {
        if self.filters.is_empty() {
            return "None".to_string();
        }
        self.filters
            .iter()
            .map(|k| k.display_name())
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

/// Turn the raw form fields into filter steps.
///
/// A blank intensity falls back to `settings.default_intensity`; zero,
/// negative, non-numeric or values above `settings.max_intensity` are
/// rejected.
pub fn parse_filter_form<S: AsRef<str>>(
    names: &[S],
    intensity: Option<&str>,
    settings: &ProcessSettings,
) -> Result<Vec<FilterSpec>, ProcessError> {
    let intensity = match intensity.map(str::trim).filter(|s| !s.is_empty()) {
        None => settings.default_intensity,
        Some(raw) => match raw.parse::<u32>() {
            Ok(v) if (1..=settings.max_intensity).contains(&v) => v,
            _ => {
                return Err(ProcessError::InvalidIntensity {
                    raw: raw.to_string(),
                    max: settings.max_intensity,
                });
            }
        },
    };
    Ok(FilterSpec::parse_list(names, Some(intensity))?)
}

pub fn process_upload<B: ImagingBackend + ?Sized>(
    backend: &B,
    store: &UploadStore,
    settings: &ProcessSettings,
    upload: &Upload,
    specs: &[FilterSpec],
    noise: &mut dyn NoiseSource,
) -> Result<ProcessedUpload, ProcessError> {
    if upload.filename.trim().is_empty() {
        return Err(ProcessError::MissingFile);
    }
    let names = asset_names(&upload.filename);

    let decoded = backend.decode(&upload.bytes).map_err(ProcessError::Decode)?;
    debug!(
        file = %upload.filename,
        width = decoded.width(),
        height = decoded.height(),
        "decoded upload"
    );
    let canvas = backend
        .resize(&decoded, settings.canvas_width, settings.canvas_height)
        .map_err(ProcessError::Decode)?;
    save(backend, store, &names.original, &canvas)?;

    let filtered = FilterPipeline::new(backend, noise).apply(&canvas, specs)?;
    save(backend, store, &names.filtered, &filtered)?;

    let report = store.sweep(&[&names.original, &names.filtered]);
    if !report.removed.is_empty() {
        debug!(removed = report.removed.len(), "retention sweep");
    }

    let filters: Vec<FilterKind> = specs.iter().map(|s| s.kind).collect();
    info!(
        original = %names.original,
        filtered = %names.filtered,
        filters = ?filters,
        "processed upload"
    );
    Ok(ProcessedUpload {
        original: names.original,
        filtered: names.filtered,
        filters,
        width: filtered.width(),
        height: filtered.height(),
    })
}

fn save<B: ImagingBackend + ?Sized>(
    backend: &B,
    store: &UploadStore,
    filename: &str,
    buffer: &PixelBuffer,
) -> Result<(), ProcessError> {
    debug!(
        file = filename,
        width = buffer.width(),
        height = buffer.height(),
        channels = buffer.channels().count(),
        "saving"
    );
    let png = backend.encode_png(buffer).map_err(ProcessError::Encode)?;
    store.write(filename, &png)?;
    Ok(())
}
