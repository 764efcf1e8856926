//! Top-level LLM configuration.
//!
//! [`LLM`] holds the model routing configuration (`provider/model` string,
//! key, base URL, sampling settings) and builds the concrete provider
//! behind a [`BaseLLM`] trait object. Provider-level code lives in
//! [`crate::llms`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::llms::base_llm::{BaseLLM, LLMError};
use crate::llms::providers::openai::{OpenAICompletion, OPENAI_BASE_URL};

/// Model used by every crew unless configured otherwise.
pub const DEFAULT_MODEL: &str = "groq/llama-3.3-70b-versatile";

/// Groq's OpenAI-compatible endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Providers this crate can route to.
pub const SUPPORTED_PROVIDERS: &[&str] = &["groq", "openai"];

/// Environment variable holding the API key for `provider`.
pub fn api_key_env_var(provider: &str) -> &'static str {
    match provider {
        "groq" => "GROQ_API_KEY",
        "openai" => "OPENAI_API_KEY",
        _ => "LLM_API_KEY",
    }
}

fn default_base_url(provider: &str) -> &'static str {
    match provider {
        "groq" => GROQ_BASE_URL,
        _ => OPENAI_BASE_URL,
    }
}

/// Language model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLM {
    /// Model identifier, optionally prefixed with the provider
    /// (e.g. "groq/llama-3.3-70b-versatile", "openai/gpt-4o-mini").
    pub model: String,
    /// API key for authentication.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL override.
    pub base_url: Option<String>,
    /// Temperature parameter for generation.
    pub temperature: Option<f64>,
    /// Timeout for API calls in seconds.
    pub timeout: Option<f64>,
    /// Retries on 429 / 5xx.
    pub max_retries: Option<u32>,
}

impl LLM {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            base_url: None,
            temperature: None,
            timeout: None,
            max_retries: None,
        }
    }

    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Split the model string into `(provider, model)`.
    ///
    /// Bare model names (no `/`) are routed to OpenAI.
    pub fn provider_and_model(&self) -> Result<(String, String), LLMError> {
        let raw = self.model.trim();
        let (provider, model) = match raw.split_once('/') {
            Some((provider, model)) => (provider.to_lowercase(), model.to_string()),
            None => ("openai".to_string(), raw.to_string()),
        };

        if model.is_empty() || provider.is_empty() {
            return Err(LLMError::InvalidModel(self.model.clone()));
        }
        if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
            return Err(LLMError::UnsupportedProvider(provider));
        }
        Ok((provider, model))
    }

    /// Build the provider for this configuration.
    pub fn build(&self) -> Result<Arc<dyn BaseLLM>, LLMError> {
        let (provider, model) = self.provider_and_model()?;
        let base_url = self
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(&provider).to_string());

        log::debug!("Creating LLM instance: provider={}, model={}", provider, model);

        let mut completion = OpenAICompletion::new(provider, model, self.api_key.clone(), Some(base_url));
        if let Some(temperature) = self.temperature {
            completion = completion.with_temperature(temperature);
        }
        if let Some(timeout) = self.timeout {
            completion = completion.with_timeout(timeout);
        }
        if let Some(max_retries) = self.max_retries {
            completion = completion.with_max_retries(max_retries);
        }
        Ok(Arc::new(completion))
    }
}

impl Default for LLM {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}
