//! Mapping of [`FinsightError`] onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use crate::error::{ErrorKind, FinsightError};

/// JSON error body: `{errorKind, message, raw?}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// A handler error rendered as an [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError(pub FinsightError);

impl<E> From<E> for ApiError
where
    E: Into<FinsightError>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

/// HTTP status reported for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::MissingInput => StatusCode::BAD_REQUEST,
        ErrorKind::AuthError => StatusCode::UNAUTHORIZED,
        ErrorKind::RateLimitError => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::NoJsonFound | ErrorKind::InvalidJson | ErrorKind::DocumentError => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::TransportError | ErrorKind::UpstreamError => StatusCode::BAD_GATEWAY,
        ErrorKind::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::ConfigurationError | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);

        if status.is_server_error() {
            error!(error_kind = %kind, error = %self.0, "request failed");
        } else {
            warn!(error_kind = %kind, error = %self.0, "request rejected");
        }

        let body = ErrorBody {
            error_kind: kind,
            message: self.0.to_string(),
            raw: self.0.raw_reply().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}
