//! Hosted LLM access. The model runtime is an opaque collaborator: the
//! flows hand it a prompt and get back free-form text. Model selection,
//! rate limits, and retries belong to the endpoint, not to this crate.

use serde::{Deserialize, Serialize};

use crate::config;
use crate::flows::GenerationError;

/// Single point of access for model inference. Flows depend on this trait,
/// never on a concrete client.
pub trait LlmClient {
    fn generate(&self, prompt: &str, system: &str) -> Result<String, GenerationError>;
}

/// Ollama HTTP client for hosted LLM inference.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient pointing at the given endpoint.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Endpoint and model from the environment, 2-minute timeout.
    pub fn from_env() -> Self {
        Self::new(&config::llm_base_url(), &config::llm_model(), 120)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl LlmClient for OllamaClient {
    fn generate(&self, prompt: &str, system: &str) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "LLM generate");

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                GenerationError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                GenerationError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                GenerationError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Mock LLM client for testing — returns a configurable response or error.
pub struct MockLlmClient {
    response: Result<String, String>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
        }
    }

    /// A client whose every call fails, for error-path tests.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
        }
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _prompt: &str, _system: &str) -> Result<String, GenerationError> {
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(GenerationError::HttpClient(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockLlmClient::new("test response");
        let result = client.generate("prompt", "system").unwrap();
        assert_eq!(result, "test response");
    }

    #[test]
    fn failing_mock_returns_error() {
        let client = MockLlmClient::failing("boom");
        let err = client.generate("prompt", "system").unwrap_err();
        assert!(matches!(err, GenerationError::HttpClient(_)));
    }

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3:8b", 60);
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn from_env_uses_default_endpoint() {
        let client = OllamaClient::from_env();
        assert!(
            client.base_url().contains("localhost") || client.base_url().contains("127.0.0.1")
        );
    }
}
