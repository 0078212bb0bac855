//! Ollama Local LLM Provider
//!
//! LLM provider for locally-running Ollama models via `/api/generate`.
//! The output cap is passed as `num_predict`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{LlmProvider, LlmResponse, ProviderConfig, TokenUsage, status_error};
use crate::constants::llm::{DEFAULT_OLLAMA_MODEL, OLLAMA_API_BASE};
use crate::types::{ErrorCategory, LlmError, Result, SchemaGenError};

/// Ollama Local LLM Provider
pub struct OllamaProvider {
    api_base: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_base = config
            .api_base
            .unwrap_or_else(|| OLLAMA_API_BASE.to_string());

        // SSRF prevention
        let api_base = Self::validate_endpoint(&api_base)?;

        let model = config
            .model
            .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SchemaGenError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            model,
            temperature: config.temperature,
            client,
        })
    }

    /// Only allows http/https schemes and warns for non-localhost endpoints.
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            SchemaGenError::Config(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SchemaGenError::Config(format!(
                "Ollama endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        let mut result = url.to_string();
        if result.ends_with('/') {
            result.pop();
        }
        Ok(result)
    }

    fn build_request(&self, prompt: &str, max_tokens: usize) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: max_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(&self, prompt: &str, max_tokens: usize) -> Result<LlmResponse> {
        info!(
            "Generating with Ollama (model: {}, max_tokens: {})",
            self.model, max_tokens
        );

        let start_time = Instant::now();
        let request = self.build_request(prompt, max_tokens);
        let url = format!("{}/api/generate", self.api_base);

        debug!("Sending request to Ollama API");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let category = if e.is_connect() || e.is_timeout() {
                    ErrorCategory::Network
                } else {
                    ErrorCategory::Unknown
                };
                LlmError::with_provider(
                    category,
                    format!(
                        "Ollama request to {} failed: {}. Is Ollama running? Start with: ollama serve",
                        self.api_base, e
                    ),
                    "ollama",
                )
            })?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            return Err(status_error(response, "ollama").await);
        }

        let response_body: OllamaResponse = response.json().await.map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::BadRequest,
                format!("Failed to parse Ollama response: {}", e),
                "ollama",
            )
        })?;

        let usage = TokenUsage::from_ollama(
            response_body.prompt_eval_count.unwrap_or(0),
            response_body.eval_count.unwrap_or(0),
        );

        debug!(
            "Received {} chars from Ollama in {}ms",
            response_body.response.len(),
            elapsed.as_millis()
        );

        Ok(LlmResponse {
            content: response_body.response,
            usage,
        })
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig {
            provider: "ollama".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let provider = OllamaProvider::new(config()).expect("Failed to create provider");
        assert_eq!(provider.api_base, OLLAMA_API_BASE);
        assert_eq!(provider.model, DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let result = OllamaProvider::new(ProviderConfig {
            api_base: Some("file:///etc/passwd".to_string()),
            ..config()
        });
        assert!(matches!(result, Err(SchemaGenError::Config(_))));
    }

    #[test]
    fn test_request_passes_output_cap() {
        let provider = OllamaProvider::new(config()).unwrap();
        let json = serde_json::to_value(provider.build_request("p", 512)).unwrap();
        assert_eq!(json["options"]["num_predict"], 512);
        assert_eq!(json["stream"], false);
    }
}
