//! Token usage accounting for LLM calls.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token counters for one LLM call or an aggregate of many.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Total number of tokens used.
    pub total_tokens: u64,
    /// Number of tokens used in prompts.
    pub prompt_tokens: u64,
    /// Number of cached prompt tokens used.
    pub cached_prompt_tokens: u64,
    /// Number of tokens used in completions.
    pub completion_tokens: u64,
    /// Number of successful requests made.
    pub successful_requests: u64,
}

impl UsageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `usage` object of a chat-completions response.
    ///
    /// Missing counters are treated as zero. `total_tokens` falls back to
    /// prompt + completion when the provider omits it.
    pub fn from_completion_usage(usage: &Value) -> Self {
        let field = |name: &str| usage.get(name).and_then(Value::as_u64).unwrap_or(0);
        let prompt_tokens = field("prompt_tokens");
        let completion_tokens = field("completion_tokens");
        let total_tokens = match field("total_tokens") {
            0 => prompt_tokens + completion_tokens,
            n => n,
        };
        let cached_prompt_tokens = usage
            .get("prompt_tokens_details")
            .and_then(|d| d.get("cached_tokens"))
            .and_then(Value::as_u64)
            .unwrap_or(0);

        Self {
            total_tokens,
            prompt_tokens,
            cached_prompt_tokens,
            completion_tokens,
            successful_requests: 1,
        }
    }

    /// Add usage metrics from another `UsageMetrics`.
    pub fn add_usage_metrics(&mut self, other: &UsageMetrics) {
        self.total_tokens += other.total_tokens;
        self.prompt_tokens += other.prompt_tokens;
        self.cached_prompt_tokens += other.cached_prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.successful_requests += other.successful_requests;
    }
}

impl AddAssign for UsageMetrics {
    fn add_assign(&mut self, rhs: Self) {
        self.add_usage_metrics(&rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_completion_usage_fills_total() {
        let usage = serde_json::json!({"prompt_tokens": 12, "completion_tokens": 30});
        let metrics = UsageMetrics::from_completion_usage(&usage);
        assert_eq!(metrics.total_tokens, 42);
        assert_eq!(metrics.successful_requests, 1);
    }

    #[test]
    fn test_add_assign_accumulates() {
        let mut total = UsageMetrics::new();
        total += UsageMetrics {
            total_tokens: 10,
            prompt_tokens: 4,
            completion_tokens: 6,
            successful_requests: 1,
            ..Default::default()
        };
        total += UsageMetrics {
            total_tokens: 5,
            prompt_tokens: 2,
            cached_prompt_tokens: 1,
            completion_tokens: 3,
            successful_requests: 1,
        };
        assert_eq!(total.total_tokens, 15);
        assert_eq!(total.cached_prompt_tokens, 1);
        assert_eq!(total.successful_requests, 2);
    }
}
