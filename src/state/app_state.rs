//! Application state
//! Built once at startup from configuration; never mutated afterwards

use crate::config::ModelConfig;
use crate::gemini::TextGenerator;
use crate::prompt::PromptTemplate;
use std::sync::Arc;

/// State handle passed to axum handlers
pub type SharedState = Arc<AppState>;

/// Everything a request needs, shared read-only across requests
pub struct AppState {
    /// Text-generation backend
    pub generator: Arc<dyn TextGenerator>,
    /// Review prompt template
    pub prompt: PromptTemplate,
    /// Configured model name, reported by the health check
    pub model_name: String,
    /// Sampling temperature for every generation call
    pub temperature: f32,
    /// Secret scrubbed from any error detail sent to clients
    redact_secret: String,
}

impl AppState {
    /// Create state for the given model configuration and generator
    pub fn new(model: &ModelConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            prompt: PromptTemplate::review(),
            model_name: model.model_name.clone(),
            temperature: model.temperature,
            redact_secret: model.api_key.clone(),
        }
    }

    /// Wrap in an `Arc` for use as router state
    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }

    /// Secret that must never appear in responses
    pub fn redact_secret(&self) -> &str {
        &self.redact_secret
    }
}
