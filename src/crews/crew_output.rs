//! Crew output representation.
//!
//! The result of a crew execution: raw output, structured output, the
//! individual task outputs and token usage, all taken from or aggregated
//! over the tasks.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tasks::task_output::TaskOutput;
use crate::types::usage_metrics::UsageMetrics;

/// Result of a crew.
///
/// * `raw` - raw output of the final task
/// * `pydantic` - structured output of the final task, if any
/// * `tasks_output` - output of each task in execution order
/// * `token_usage` - tokens summed over all tasks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrewOutput {
    pub raw: String,
    pub pydantic: Option<serde_json::Value>,
    pub tasks_output: Vec<TaskOutput>,
    pub token_usage: UsageMetrics,
}

impl CrewOutput {
    /// Deserialize the structured output into `T`.
    ///
    /// Returns `Ok(None)` when the final task produced no structured output.
    pub fn structured<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.pydantic
            .clone()
            .map(serde_json::from_value)
            .transpose()
    }
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pydantic {
            Some(ref structured) => write!(f, "{}", structured),
            None => write!(f, "{}", self.raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_absent() {
        let output = CrewOutput {
            raw: "plain".to_string(),
            ..Default::default()
        };
        let parsed: Option<serde_json::Value> = output.structured().unwrap();
        assert!(parsed.is_none());
        assert_eq!(output.to_string(), "plain");
    }

    #[test]
    fn test_structured_prefers_model_output() {
        let output = CrewOutput {
            raw: "{}".to_string(),
            pydantic: Some(serde_json::json!({"phrase": "Hola"})),
            ..Default::default()
        };
        let parsed: serde_json::Value = output.structured().unwrap().unwrap();
        assert_eq!(parsed["phrase"], "Hola");
        assert_eq!(output.to_string(), r#"{"phrase":"Hola"}"#);
    }
}
