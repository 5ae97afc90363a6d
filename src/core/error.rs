//! Typed error handling for the query pipeline
//!
//! Exactly two validation error kinds exist, matching the two halves of the
//! pipeline:
//!
//! - [`QueryBuilderError`]: raised by the paginate/sort/filter/eager-load
//!   stages for any malformed or out-of-whitelist parameter.
//! - [`RepresentationBuilderError`]: raised by field/embed selection for
//!   unknown field or relation names.
//!
//! Both carry the exact offending parameter as a `key=value` string and map
//! uniformly at the HTTP boundary to status 400 with the body
//! `{"error": {"message": ..., "invalid_params": ...}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Validation error raised by the query-builder stages
///
/// `invalid_params` always carries the offending parameter verbatim as
/// `key=value` (e.g. `page=abc`, `sort=isbn`).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct QueryBuilderError {
    pub message: String,
    pub invalid_params: String,
}

impl QueryBuilderError {
    pub fn new(invalid_params: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            invalid_params: invalid_params.into(),
        }
    }
}

/// Validation error raised by the representation builders (field/embed
/// selection)
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RepresentationBuilderError {
    pub message: String,
    pub invalid_params: String,
}

impl RepresentationBuilderError {
    pub fn new(invalid_params: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            invalid_params: invalid_params.into(),
        }
    }
}

/// Umbrella error for a pipeline run
///
/// The two validation variants surface as HTTP 400. `InvalidAction` and
/// `Source` are not client mistakes and map to 500.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Query(#[from] QueryBuilderError),

    #[error(transparent)]
    Representation(#[from] RepresentationBuilderError),

    /// A caller asked the orchestrator to run an action outside the known set
    #[error("{0} not permitted.")]
    InvalidAction(String),

    /// The backing data source failed; fatal for the current request
    #[error("data source error: {0}")]
    Source(#[from] anyhow::Error),
}

/// Error response body surfaced to the HTTP layer
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_params: Option<String>,
}

impl PipelineError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::Query(_) => StatusCode::BAD_REQUEST,
            PipelineError::Representation(_) => StatusCode::BAD_REQUEST,
            PipelineError::InvalidAction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::Source(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The offending parameter, when the error is a validation error
    pub fn invalid_params(&self) -> Option<&str> {
        match self {
            PipelineError::Query(e) => Some(&e.invalid_params),
            PipelineError::Representation(e) => Some(&e.invalid_params),
            _ => None,
        }
    }

    /// Convert to the boundary response body
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: ErrorDetail {
                message: self.to_string(),
                invalid_params: self.invalid_params().map(str::to_string),
            },
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_body());
        (status, body).into_response()
    }
}
