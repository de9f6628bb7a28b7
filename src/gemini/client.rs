//! Gemini API client
//!
//! Direct HTTP client for the Gemini `generateContent` endpoint.

use crate::config::ModelConfig;
use crate::gemini::types::{GeminiApiRequest, GeminiApiResponse, Part};
use crate::gemini::{GeneratedOutput, TextGenerator, UpstreamError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini-backed [`TextGenerator`]
///
/// Holds a shared `reqwest::Client` (connection pooling) and is safe to use
/// from concurrent requests.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client with its own connection pool and request timeout
    pub fn new(config: &ModelConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_http_client(http, config))
    }

    fn with_http_client(http: reqwest::Client, config: &ModelConfig) -> Self {
        Self {
            http,
            model: config.model_name.clone(),
            api_key: config.api_key.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> Result<GeneratedOutput, UpstreamError> {
        let url = self.endpoint();
        let request_body = GeminiApiRequest::single_prompt(prompt, temperature);

        tracing::debug!(
            url = %url,
            model = %self.model,
            temperature = temperature,
            prompt_len = prompt.len(),
            "Calling Gemini API"
        );

        // The key travels in a header so transport errors never echo it.
        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());

            tracing::error!(
                status_code = status_code,
                error_body = %error_body,
                "Gemini API returned error status"
            );

            if status_code == 429 {
                return Err(UpstreamError::RateLimited(error_body));
            }
            return Err(UpstreamError::Status {
                status: status_code,
                body: error_body,
            });
        }

        let response_body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.without_url().to_string()))?;

        let parsed: GeminiApiResponse = serde_json::from_str(&response_body).map_err(|e| {
            UpstreamError::Malformed(format!("{} - Response body: {}", e, response_body))
        })?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_ref())
        {
            return Err(UpstreamError::Blocked(reason.clone()));
        }

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or(UpstreamError::NoCandidates)?;

        let parts = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default();
        if parts.is_empty() {
            return Err(UpstreamError::NoParts(
                candidate
                    .finish_reason
                    .unwrap_or_else(|| "unknown".to_string()),
            ));
        }

        let output = collect_output(parts);
        tracing::debug!(
            text_output = output.is_string(),
            "Successfully received response from Gemini API"
        );
        Ok(output)
    }
}

/// Join all text parts; fall back to the first part's raw JSON when none are text
fn collect_output(parts: Vec<Part>) -> GeneratedOutput {
    let texts: Vec<&str> = parts.iter().filter_map(|p| p.text.as_deref()).collect();
    if !texts.is_empty() {
        return Value::String(texts.concat());
    }
    parts
        .into_iter()
        .next()
        .map(|part| Value::Object(part.other))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MODEL;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use serial_test::serial;

    const PATH: &str = "/models/gemini-2.5-flash:generateContent";

    fn test_config(base_url: &str) -> ModelConfig {
        ModelConfig {
            model_name: DEFAULT_MODEL.to_string(),
            api_key: "test-key".to_string(),
            temperature: 0.2,
            api_base_url: base_url.to_string(),
            timeout_secs: 5,
        }
    }

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::new(&test_config(base_url)).unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header(API_KEY_HEADER, "test-key")
            .match_header("content-type", "application/json")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({ "generationConfig": { "temperature": 0.5 } })),
                Matcher::Regex("test prompt".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{
                    "candidates": [{
                        "content": {
                            "parts": [{ "text": "This is a test response" }],
                            "role": "model"
                        },
                        "finishReason": "STOP"
                    }]
                }"#,
            )
            .create_async()
            .await;

        let result = test_client(&server.url())
            .generate("test prompt", 0.5)
            .await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), json!("This is a test response"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_joins_text_parts() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(
                r#"{"candidates": [{"content": {"parts": [
                    {"text": "SUMMARY\n"}, {"text": "Solid work."}
                ]}}]}"#,
            )
            .create_async()
            .await;

        let result = test_client(&server.url()).generate("p", 0.2).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), json!("SUMMARY\nSolid work."));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_non_text_part_is_structured() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(
                r#"{"candidates": [{"content": {"parts": [
                    {"functionCall": {"name": "review", "args": {}}}
                ]}}]}"#,
            )
            .create_async()
            .await;

        let result = test_client(&server.url()).generate("p", 0.2).await;

        mock.assert_async().await;
        let output = result.unwrap();
        assert!(!output.is_string());
        assert_eq!(output["functionCall"]["name"], "review");
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_empty_candidates() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let result = test_client(&server.url()).generate("p", 0.2).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(UpstreamError::NoCandidates)));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_candidate_without_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#)
            .create_async()
            .await;

        let result = test_client(&server.url()).generate("p", 0.2).await;

        mock.assert_async().await;
        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.contains("no parts"));
        assert!(error_msg.contains("SAFETY"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_blocked_prompt() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
            .create_async()
            .await;

        let result = test_client(&server.url()).generate("p", 0.2).await;

        mock.assert_async().await;
        let error_msg = result.unwrap_err().to_string();
        assert!(
            error_msg.contains("blocked the prompt"),
            "Error message should contain 'blocked the prompt', got: {}",
            error_msg
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_rate_limit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .with_status(429)
            .with_body(r#"{"error": "Rate limit exceeded"}"#)
            .create_async()
            .await;

        let result = test_client(&server.url()).generate("p", 0.2).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(UpstreamError::RateLimited(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_error_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .with_status(403)
            .with_body(r#"{"error": {"message": "API key not valid"}}"#)
            .create_async()
            .await;

        let result = test_client(&server.url()).generate("p", 0.2).await;

        mock.assert_async().await;
        match result {
            Err(UpstreamError::Status { status, body }) => {
                assert_eq!(status, 403);
                assert!(body.contains("API key not valid"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_invalid_json() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body("This is not JSON")
            .create_async()
            .await;

        let result = test_client(&server.url()).generate("p", 0.2).await;

        mock.assert_async().await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse JSON"));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_key() {
        // Nothing listens on port 1, so the connection is refused.
        let client = test_client("http://127.0.0.1:1");
        let result = client.generate("p", 0.2).await;

        let error = result.unwrap_err();
        assert!(matches!(error, UpstreamError::Transport(_)));
        assert!(!error.to_string().contains("test-key"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = test_client("http://localhost:9999/v1beta/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
