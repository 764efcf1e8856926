//! OpenAI-compatible chat-completions provider.
//!
//! Talks to any endpoint implementing `POST {base_url}/chat/completions`
//! (OpenAI itself, Groq's `/openai/v1` surface, and so on). Handles bearer
//! authentication, retries with exponential backoff on 429 / 5xx, JSON
//! response formats and token usage reporting.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::llms::base_llm::{BaseLLM, CallOptions, LLMError, LLMMessage, LLMResponse};
use crate::types::usage_metrics::UsageMetrics;

/// Default OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 120.0;

/// OpenAI-compatible completion implementation.
///
/// # Example
///
/// ```ignore
/// let provider = OpenAICompletion::new("groq", "llama-3.3-70b-versatile", Some(key), Some(url));
/// let response = provider.acall(&messages, &CallOptions::default()).await?;
/// ```
#[derive(Debug)]
pub struct OpenAICompletion {
    /// Provider label used in logs and errors.
    pub provider: String,
    /// Model name sent in the request body.
    pub model: String,
    /// Bearer token.
    pub api_key: Option<String>,
    /// API base URL (without trailing `/chat/completions`).
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Maximum tokens in response.
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds.
    pub timeout: f64,
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each subsequent one.
    pub retry_delay: Duration,
    client: reqwest::Client,
}

impl OpenAICompletion {
    /// Create a new provider.
    ///
    /// * `provider` - Provider label (e.g. "groq").
    /// * `model` - Model name without provider prefix.
    /// * `api_key` - Bearer key; calls fail with `MissingApiKey` when absent.
    /// * `base_url` - Custom base URL (defaults to OpenAI's).
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            temperature: None,
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
            client: reqwest::Client::new(),
        }
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the timeout in seconds.
    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build the request body for the Chat Completions API.
    pub fn build_request_body(&self, messages: &[LLMMessage], options: &CallOptions) -> Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(temp) = options.temperature.or(self.temperature) {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(ref format) = options.response_format {
            body["response_format"] = format.clone();
        }

        body
    }

    /// Parse a Chat Completions API response.
    pub fn parse_completion_response(&self, response: &Value) -> Result<LLMResponse, LLMError> {
        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| LLMError::MalformedResponse("no choices[0].message".to_string()))?;

        let content = message
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let usage = response
            .get("usage")
            .map(UsageMetrics::from_completion_usage)
            .unwrap_or_else(|| UsageMetrics {
                successful_requests: 1,
                ..Default::default()
            });

        log::debug!(
            "{} token usage: prompt={}, completion={}, total={}",
            self.provider,
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens,
        );

        Ok(LLMResponse { content, usage })
    }
}

#[async_trait]
impl BaseLLM for OpenAICompletion {
    fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        &self.provider
    }

    async fn acall(
        &self,
        messages: &[LLMMessage],
        options: &CallOptions,
    ) -> Result<LLMResponse, LLMError> {
        log::debug!(
            "OpenAICompletion.acall: provider={}, model={}, messages={}",
            self.provider,
            self.model,
            messages.len(),
        );

        let api_key = self.api_key.as_deref().ok_or_else(|| LLMError::MissingApiKey {
            provider: self.provider.clone(),
            env_var: crate::llm::api_key_env_var(&self.provider),
        })?;

        let timeout =
            Duration::try_from_secs_f64(self.timeout).map_err(|_| LLMError::InvalidTimeout(self.timeout))?;
        let body = self.build_request_body(messages, options);
        let endpoint = self.endpoint();

        let mut last_error = String::from("no attempt made");
        let mut retry_delay = self.retry_delay;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                log::warn!(
                    "{} API retry attempt {} after {:?}",
                    self.provider,
                    attempt,
                    retry_delay
                );
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let response = match self
                .client
                .post(&endpoint)
                .timeout(timeout)
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                last_error = format!("Rate limited by {} API (429)", self.provider);
                continue;
            }

            if status.is_server_error() {
                last_error = format!("{} API server error: {}", self.provider, status);
                continue;
            }

            let response_text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            if status.is_client_error() {
                return Err(LLMError::Api {
                    provider: self.provider.clone(),
                    status: status.as_u16(),
                    body: response_text,
                });
            }

            let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
                let preview: String = response_text.chars().take(500).collect();
                LLMError::MalformedResponse(format!("{} - Body: {}", e, preview))
            })?;

            return self.parse_completion_response(&response_json);
        }

        Err(LLMError::RetriesExhausted {
            provider: self.provider.clone(),
            attempts: self.max_retries + 1,
            last_error,
        })
    }
}
