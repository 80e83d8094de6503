//! HTTP server for Finsight (requires the `server` feature).
//!
//! Routes:
//! - `POST /advice/summary`: multipart `files` + `api_key`, returns `{summary, conversation}`
//! - `POST /advice/followup`: JSON `{question, api_key, conversation?}`,
//!   returns `{reply, conversation}`
//! - `POST /analyze/`: multipart `files` + `api_key`, returns `{expenses, total, empty}`
//! - `GET /advice/`, `GET /analyze/`: liveness messages
//! - `GET /health`: `{"status": "ok"}`
//!
//! The server keeps no session state; clients carry the conversation.

mod error;
mod handlers;

pub use error::{status_for, ApiError, ErrorBody};

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request};
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::advisor::Advisor;
use crate::config::Config;
use crate::documents::{AutoExtractor, TextExtractor, MAX_DOCUMENT_BYTES};
use crate::error::{FinsightError, Result};
use crate::providers::Credentials;

/// Upper bound on a whole upload request.
const MAX_BODY_BYTES: usize = 4 * MAX_DOCUMENT_BYTES as usize;

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<Advisor>,
    pub extractor: Arc<dyn TextExtractor>,
    /// Used when a request carries no API key of its own
    pub default_credentials: Option<Credentials>,
    /// Per-file upload limit
    pub max_document_bytes: u64,
}

impl AppState {
    pub fn new(advisor: Arc<Advisor>) -> Self {
        Self {
            advisor,
            extractor: Arc::new(AutoExtractor),
            default_credentials: None,
            max_document_bytes: MAX_DOCUMENT_BYTES,
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_default_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.default_credentials = credentials;
        self
    }

    pub fn with_max_document_bytes(mut self, max_document_bytes: u64) -> Self {
        self.max_document_bytes = max_document_bytes;
        self
    }

    /// Credentials for one request: the supplied key, else the configured default.
    fn credentials(&self, supplied: Option<String>) -> Result<Credentials> {
        match supplied.map(Credentials::new).filter(|c| !c.is_empty()) {
            Some(credentials) => Ok(credentials),
            None => self
                .default_credentials
                .clone()
                .ok_or_else(|| FinsightError::MissingInput("Missing files or API key".to_string())),
        }
    }
}

/// Tag every request with a `request_id` span and response header.
async fn request_id(req: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    let span = info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path()
    );

    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/advice/", get(handlers::advice_status))
        .route("/advice/summary", post(handlers::summary))
        .route("/advice/followup", post(handlers::followup))
        .route(
            "/analyze/",
            get(handlers::analyze_status).post(handlers::analyze),
        )
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the HTTP API until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    config.validate()?;

    let advisor = Arc::new(Advisor::from_config(config)?);
    let state = AppState::new(advisor).with_default_credentials(config.credentials());
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    info!(addr = %addr, "Finsight server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down server");
        })
        .await?;
    Ok(())
}
