//! Error types and error handling for the application
//!
//! Request-time failures are represented by [`AppError`], which implements
//! `IntoResponse` so handlers can return it directly with `?`.

use crate::gemini::UpstreamError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned when the proposal text is blank
pub const PROPOSAL_REQUIRED: &str = "Proposal text required";

/// Message returned when the generation call fails
pub const LLM_REQUEST_FAILED: &str = "LLM request failed";

/// Request-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Client input failed validation
    #[error("{0}")]
    Validation(String),

    /// The text-generation call failed; `details` is already sanitized
    #[error("LLM request failed: {details}")]
    Upstream {
        /// Human-readable failure detail
        details: String,
    },
}

impl AppError {
    /// Wrap an upstream failure, scrubbing `secret` from its detail
    pub fn upstream(error: &UpstreamError, secret: &str) -> Self {
        AppError::Upstream {
            details: error.redacted(secret),
        }
    }
}

/// JSON body for failed requests
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    /// Short error description
    pub error: String,
    /// Optional detail message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    details: None,
                },
            ),
            AppError::Upstream { details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: LLM_REQUEST_FAILED.to_string(),
                    details: Some(details),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
