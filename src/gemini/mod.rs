//! Text generation
//!
//! The review handler only sees the [`TextGenerator`] trait. The production
//! implementation is [`GeminiClient`], which calls the Gemini REST API;
//! tests substitute their own generators.

pub mod client;
pub mod types;

pub use client::GeminiClient;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Raw model output
///
/// Usually a JSON string. Non-text outputs are carried as structured JSON
/// and flattened with [`output_to_text`].
pub type GeneratedOutput = Value;

/// Failures of the text-generation call
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Request could not be sent or the response could not be read
    #[error("Failed to reach Gemini API: {0}")]
    Transport(String),

    /// Provider rejected the request with HTTP 429
    #[error("Gemini API rate limit exceeded (HTTP 429): {0}")]
    RateLimited(String),

    /// Provider returned any other non-success status
    #[error("Gemini API returned error status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the provider
        body: String,
    },

    /// Response body was not the expected JSON
    #[error("Failed to parse JSON response from Gemini API: {0}")]
    Malformed(String),

    /// Provider refused to answer the prompt
    #[error("Gemini API blocked the prompt: {0}")]
    Blocked(String),

    /// Response carried no candidates
    #[error("Gemini API response contains no candidates")]
    NoCandidates,

    /// First candidate carried no content parts
    #[error("Gemini API response candidate contains no parts (finish reason: {0})")]
    NoParts(String),
}

impl UpstreamError {
    /// Human-readable detail with every occurrence of `secret` scrubbed
    pub fn redacted(&self, secret: &str) -> String {
        let message = self.to_string();
        if secret.is_empty() {
            message
        } else {
            message.replace(secret, "[REDACTED]")
        }
    }
}

/// A single-shot text-generation call
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt` at the given sampling temperature
    async fn generate(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> Result<GeneratedOutput, UpstreamError>;
}

/// Coerce model output to the text returned to clients
///
/// Strings pass through untouched; any other value is rendered as compact JSON.
pub fn output_to_text(output: GeneratedOutput) -> String {
    match output {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
