//! Base LLM trait and the message types shared by all providers.
//!
//! Agents only ever talk to a `dyn BaseLLM`. Concrete providers live in
//! [`crate::llms::providers`]; tests substitute a scripted implementation.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::usage_metrics::UsageMetrics;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Role of a message sender in a chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LLMMessage {
    pub role: Role,
    pub content: String,
}

impl LLMMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Call options / response
// ---------------------------------------------------------------------------

/// Per-call overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallOptions {
    /// Provider `response_format`, e.g. `{"type": "json_object"}`.
    pub response_format: Option<Value>,
    /// Overrides the provider's configured temperature.
    pub temperature: Option<f64>,
}

impl CallOptions {
    /// Ask the provider for a JSON object answer.
    pub fn json_object() -> Self {
        Self {
            response_format: Some(serde_json::json!({"type": "json_object"})),
            temperature: None,
        }
    }
}

/// Text returned by a completion plus its token usage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LLMResponse {
    pub content: String,
    pub usage: UsageMetrics,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by LLM providers.
#[derive(Debug, Error)]
pub enum LLMError {
    /// No API key was configured for the provider.
    #[error("{provider} API key not set. Set {env_var} or pass api_key explicitly.")]
    MissingApiKey {
        provider: String,
        env_var: &'static str,
    },

    /// The model string names a provider this crate cannot route to.
    #[error("Unsupported LLM provider '{0}'")]
    UnsupportedProvider(String),

    /// The model string is malformed.
    #[error("Invalid model identifier '{0}'")]
    InvalidModel(String),

    /// The request timeout is negative or not finite.
    #[error("Invalid LLM timeout: {0} seconds")]
    InvalidTimeout(f64),

    /// Transport-level failure.
    #[error("HTTP error calling LLM: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request (4xx other than 429).
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    /// Retries were exhausted on 429 / 5xx responses.
    #[error("{provider} API call failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        provider: String,
        attempts: u32,
        last_error: String,
    },

    /// The response body did not have the expected shape.
    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),
}

// ---------------------------------------------------------------------------
// BaseLLM trait
// ---------------------------------------------------------------------------

/// Interface every LLM implementation follows.
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Model identifier sent to the provider (without provider prefix).
    fn model(&self) -> &str;

    /// Provider name (e.g. "groq", "openai").
    fn provider(&self) -> &str;

    /// Run one chat completion.
    async fn acall(
        &self,
        messages: &[LLMMessage],
        options: &CallOptions,
    ) -> Result<LLMResponse, LLMError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serializes_lowercase_role() {
        let msg = LLMMessage::system("be brief");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"role": "system", "content": "be brief"}));
    }

    #[test]
    fn test_json_object_options() {
        let opts = CallOptions::json_object();
        assert_eq!(opts.response_format.unwrap()["type"], "json_object");
        assert!(opts.temperature.is_none());
    }
}
