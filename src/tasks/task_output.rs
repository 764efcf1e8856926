//! Task output representation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::output_format::OutputFormat;
use crate::llms::base_llm::LLMMessage;
use crate::types::usage_metrics::UsageMetrics;

/// Result of one executed task.
///
/// * `raw` - last answer returned by the agent
/// * `pydantic` - validated structured answer, when the task had a schema
///   and the agent produced a conforming answer
/// * `messages` - the full conversation, including correction rounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Task name from the configuration.
    pub name: String,
    /// Description after interpolation.
    pub description: String,
    /// Expected output of the task.
    pub expected_output: String,
    /// First ten words of the description.
    pub summary: String,
    /// Raw output of the task.
    pub raw: String,
    /// Structured output of the task.
    pub pydantic: Option<serde_json::Value>,
    /// Role of the agent that executed the task.
    pub agent: String,
    /// Output format of the task.
    pub output_format: OutputFormat,
    /// Messages of the task.
    #[serde(default)]
    pub messages: Vec<LLMMessage>,
    /// Tokens spent on this task.
    #[serde(default)]
    pub token_usage: UsageMetrics,
}

impl TaskOutput {
    /// Generate a summary from the description (first 10 words + "...").
    pub fn generate_summary(description: &str) -> String {
        let excerpt: String = description
            .split_whitespace()
            .take(10)
            .collect::<Vec<&str>>()
            .join(" ");
        format!("{}...", excerpt)
    }
}

impl fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pydantic {
            Some(ref structured) => write!(f, "{}", structured),
            None => write!(f, "{}", self.raw),
        }
    }
}
