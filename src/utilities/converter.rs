//! Output converter for turning raw LLM text into structured values.
//!
//! Structured task outputs are plain serde types implementing
//! [`StructuredOutput`]. A task carries a type-erased [`OutputSchema`] so it
//! can validate answers without being generic itself.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Error raised when the converter fails to parse or validate an answer.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConverterError {
    pub message: String,
}

impl ConverterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A serde model usable as a task's structured output.
pub trait StructuredOutput: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Schema name shown to the model.
    const NAME: &'static str;

    /// JSON schema describing the expected answer.
    fn json_schema() -> Value;

    /// Constraints serde cannot express (ranges, lengths).
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Type-erased output schema attached to a task.
#[derive(Clone)]
pub struct OutputSchema {
    pub name: &'static str,
    pub schema: Value,
    convert: fn(&Value) -> Result<Value, ConverterError>,
}

impl fmt::Debug for OutputSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSchema")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl OutputSchema {
    /// Schema for the structured output type `T`.
    pub fn of<T: StructuredOutput>() -> Self {
        Self {
            name: T::NAME,
            schema: T::json_schema(),
            convert: convert_value::<T>,
        }
    }

    /// Parse and validate a raw model answer.
    pub fn convert(&self, raw: &str) -> Result<Value, ConverterError> {
        let value = extract_json(raw)?;
        (self.convert)(&value)
    }
}

fn convert_value<T: StructuredOutput>(value: &Value) -> Result<Value, ConverterError> {
    let model: T = serde_json::from_value(value.clone())
        .map_err(|e| ConverterError::new(format!("{} does not match schema: {}", T::NAME, e)))?;
    model
        .validate()
        .map_err(|e| ConverterError::new(format!("{} failed validation: {}", T::NAME, e)))?;
    serde_json::to_value(model).map_err(|e| ConverterError::new(e.to_string()))
}

/// Strip a surrounding Markdown code fence (```json ... ```), if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse the answer as JSON, falling back to the outermost `{...}` span.
pub fn extract_json(raw: &str) -> Result<Value, ConverterError> {
    let candidate = strip_code_fence(raw);
    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        if value.is_object() {
            return Ok(value);
        }
    }
    handle_partial_json(candidate)
}

/// Attempt to extract and parse a JSON object embedded in prose.
pub fn handle_partial_json(result: &str) -> Result<Value, ConverterError> {
    if let (Some(start), Some(end)) = (result.find('{'), result.rfind('}')) {
        if start < end {
            if let Ok(parsed) = serde_json::from_str::<Value>(&result[start..=end]) {
                return Ok(parsed);
            }
        }
    }
    Err(ConverterError::new("No valid JSON found in result"))
}
