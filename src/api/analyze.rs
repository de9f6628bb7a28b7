//! Proposal analysis endpoint
//!
//! Flow: request body -> lenient decode -> validation -> prompt rendering ->
//! one generation call -> JSON response. Nothing is retried or cached.

use crate::error::{AppError, PROPOSAL_REQUIRED};
use crate::gemini::output_to_text;
use crate::state::SharedState;
use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{error, info};

/// Review request
///
/// Missing or null fields and undecodable bodies decode to empty strings;
/// other non-string values are kept in their JSON text form. Validation
/// happens afterwards.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Proposal title, may be empty
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    /// Proposal text, must not be blank
    #[serde(default, deserialize_with = "lenient_string")]
    pub proposal: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl AnalysisRequest {
    /// Decode a raw request body, never failing
    ///
    /// The body is parsed regardless of its declared content type; anything
    /// other than a JSON object yields an empty request.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Reject requests whose proposal is empty after trimming
    pub fn validate(&self) -> Result<(), AppError> {
        if self.proposal.trim().is_empty() {
            return Err(AppError::Validation(PROPOSAL_REQUIRED.to_string()));
        }
        Ok(())
    }
}

/// Successful review
#[derive(Serialize, Deserialize, Debug)]
pub struct AnalysisResponse {
    /// Generated review text
    pub analysis: String,
}

/// POST /analyze - review a research proposal
pub async fn analyze(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<AnalysisResponse>, AppError> {
    let request = AnalysisRequest::from_body(&body);
    request.validate()?;

    info!(
        title_len = request.title.len(),
        proposal_len = request.proposal.len(),
        "Analysis request received"
    );

    let prompt = state.prompt.render(&request.title, &request.proposal);
    let start = Instant::now();

    let output = state
        .generator
        .generate(&prompt, state.temperature)
        .await
        .map_err(|e| {
            let err = AppError::upstream(&e, state.redact_secret());
            error!(
                model = %state.model_name,
                duration_ms = start.elapsed().as_millis(),
                error = %err,
                "Generation call failed"
            );
            err
        })?;

    let analysis = output_to_text(output);
    info!(
        model = %state.model_name,
        duration_ms = start.elapsed().as_millis(),
        response_len = analysis.len(),
        "Analysis generated"
    );

    Ok(Json(AnalysisResponse { analysis }))
}
