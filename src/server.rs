//! HTTP front end.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | upload form plus the last result |
//! | `POST /` | multipart upload (`image`, repeated `filter`, `intensity`) |
//! | `GET /uploads/:filename` | a stored PNG, 404 if missing or the name is unsafe |
//!
//! Decoding and filtering are CPU-bound, so uploads run on tokio's blocking
//! pool. Every failure a client can cause comes back as a 400 page that
//! re-renders the form with a readable message.

use crate::config::AppConfig;
use crate::filters::{FilterKind, GaussianNoise};
use crate::imaging::RustBackend;
use crate::process::{ProcessError, ProcessSettings, ProcessedUpload, Upload, process_upload};
use crate::render::{self, FormState};
use crate::store::{StoreError, UploadStore};
use axum::Router;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::task::JoinError;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Shared state for all handlers.
pub struct AppState {
    config: AppConfig,
    settings: ProcessSettings,
    store: UploadStore,
    backend: RustBackend,
    last: Mutex<Option<ProcessedUpload>>,
}

impl AppState {
    /// Opens (and creates if needed) the upload directory named in `config`.
    pub fn new(config: AppConfig) -> Result<Self, StoreError> {
        let store = UploadStore::open(config.store.clone())?;
        Ok(Self {
            settings: ProcessSettings::from_app_config(&config),
            config,
            store,
            backend: RustBackend::new(),
            last: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn last_result(&self) -> Option<ProcessedUpload> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember(&self, result: ProcessedUpload) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
    }

    fn blank_form(&self) -> FormState {
        FormState {
            selected: Vec::new(),
            intensity: self.settings.default_intensity,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.max_upload_bytes;
    Router::new()
        .route("/", get(index).post(upload))
        .route("/uploads/:filename", get(asset))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until the process is stopped.
pub async fn serve(config: AppConfig) -> Result<(), ServerError> {
    let bind = config.server.bind.clone();
    let state = Arc::new(AppState::new(config)?);
    info!(
        bind = %bind,
        upload_dir = %state.store.dir().display(),
        max_assets = state.store.max_assets(),
        "listening on http://{bind}"
    );
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let last = state.last_result();
    Html(render::index_page(&state.blank_form(), last.as_ref()).into_string())
}

/// Raw multipart fields, before any validation.
#[derive(Default)]
struct UploadForm {
    image: Option<Upload>,
    filters: Vec<String>,
    intensity: Option<String>,
}

impl UploadForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, MultipartError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("image") => {
                    let filename = field.file_name().unwrap_or_default().to_owned();
                    let bytes = field.bytes().await?;
                    form.image = Some(Upload {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
                Some("filter") => form.filters.push(field.text().await?),
                Some("intensity") => form.intensity = Some(field.text().await?),
                _ => {}
            }
        }
        Ok(form)
    }

    /// Form state to re-render; unknown names and bad numbers are dropped.
    fn echo(&self, default_intensity: u32) -> FormState {
        FormState {
            selected: self
                .filters
                .iter()
                .filter_map(|f| f.parse::<FilterKind>().ok())
                .collect(),
            intensity: self
                .intensity
                .as_deref()
                .and_then(|s| s.trim().parse().ok())
                .filter(|&v| v > 0)
                .unwrap_or(default_intensity),
        }
    }
}

async fn upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let form = match UploadForm::read(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!(error = %e, "malformed upload");
            let page = render::error_page(&state.blank_form(), &e.body_text());
            return (e.status(), Html(page.into_string())).into_response();
        }
    };
    let echo = form.echo(state.settings.default_intensity);

    match run_upload(Arc::clone(&state), form).await {
        Ok(result) => {
            let page = render::index_page(&echo, Some(&result));
            state.remember(result);
            Html(page.into_string()).into_response()
        }
        Err(e) => {
            warn!(error = %e, "upload rejected");
            let page = render::error_page(&echo, &e.to_string());
            (StatusCode::BAD_REQUEST, Html(page.into_string())).into_response()
        }
    }
}

async fn run_upload(
    state: Arc<AppState>,
    form: UploadForm,
) -> Result<ProcessedUpload, ProcessError> {
    let specs = crate::process::parse_filter_form(
        &form.filters,
        form.intensity.as_deref(),
        &state.settings,
    )?;
    let upload = form.image.ok_or(ProcessError::MissingFile)?;

    let joined = tokio::task::spawn_blocking(move || {
        let mut noise = GaussianNoise::from_entropy();
        process_upload(
            &state.backend,
            &state.store,
            &state.settings,
            &upload,
            &specs,
            &mut noise,
        )
    })
    .await;

    joined.unwrap_or_else(|e| Err(join_failure(e)))
}

/// A processing task that panicked or was cancelled.
fn join_failure(e: JoinError) -> ProcessError {
    warn!(error = %e, "processing task did not complete");
    ProcessError::Aborted(e.to_string())
}

async fn asset(State(state): State<Arc<AppState>>, Path(filename): Path<String>) -> Response {
    // Only PNGs are ever written; anything else in the directory is not ours.
    if !filename.ends_with(".png") {
        warn!(file = %filename, "asset not served: not a png");
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }
    match state.store.read(&filename) {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(e) => {
            warn!(file = %filename, error = %e, "asset not served");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}
