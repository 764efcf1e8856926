//! Task: a unit of work assigned to one agent.

use std::collections::HashMap;

use chrono::Utc;
use md5::{Digest, Md5};
use uuid::Uuid;

use crate::agent::Agent;
use crate::tasks::output_format::OutputFormat;
use crate::tasks::task_output::TaskOutput;
use crate::utilities::converter::{OutputSchema, StructuredOutput};
use crate::utilities::errors::CrewError;
use crate::utilities::prompts;
use crate::utilities::string_utils::interpolate_only;

/// Represents a task to be executed.
///
/// Each task has a description, an expected output and the name of the
/// agent responsible for execution. Tasks with an output schema ask the
/// model for JSON and validate it.
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: Uuid,
    /// Key of the task in `tasks.yaml`.
    pub name: String,
    /// Descriptive text detailing the task's purpose and execution.
    pub description: String,
    /// Clear definition of expected task outcome.
    pub expected_output: String,
    /// Name of the agent responsible for execution.
    pub agent: String,
    /// Structured output schema.
    pub output: Option<OutputSchema>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent: agent.into(),
            output: None,
        }
    }

    /// Require the answer to deserialize into `T`.
    pub fn with_output<T: StructuredOutput>(mut self) -> Self {
        self.output = Some(OutputSchema::of::<T>());
        self
    }

    /// MD5 of the description and expected output, used in the crew key.
    pub fn key(&self) -> String {
        let source = format!("{}|{}", self.description, self.expected_output);
        let mut hasher = Md5::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Prompt sent to the agent.
    pub fn prompt(&self) -> String {
        prompts::task_prompt(
            &self.description,
            &self.expected_output,
            self.output.as_ref().map(|s| &s.schema),
        )
    }

    /// Interpolate kickoff inputs into the description and expected output.
    pub fn interpolate_inputs(&mut self, inputs: &HashMap<String, String>) -> Result<(), CrewError> {
        self.description = interpolate_only(&self.description, inputs)?;
        self.expected_output = interpolate_only(&self.expected_output, inputs)?;
        Ok(())
    }

    /// Run the task through `agent`.
    pub async fn execute(&mut self, agent: &Agent, context: Option<&str>) -> Result<TaskOutput, CrewError> {
        let started = Utc::now();

        let outcome = agent
            .execute_task(&self.prompt(), context, self.output.as_ref())
            .await?;

        log::debug!(
            "Task '{}' took {}ms",
            self.name,
            (Utc::now() - started).num_milliseconds()
        );

        let output_format = match (&self.output, &outcome.structured) {
            (Some(_), Some(_)) => OutputFormat::Structured,
            _ => OutputFormat::Raw,
        };

        Ok(TaskOutput {
            name: self.name.clone(),
            summary: TaskOutput::generate_summary(&self.description),
            description: self.description.clone(),
            expected_output: self.expected_output.clone(),
            raw: outcome.raw,
            pydantic: outcome.structured,
            agent: agent.role.clone(),
            output_format,
            messages: outcome.messages,
            token_usage: outcome.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_stable_for_same_text() {
        let a = Task::new("a", "Describe", "Text", "writer");
        let b = Task::new("b", "Describe", "Text", "editor");
        assert_eq!(a.key(), b.key());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_interpolate_inputs_reports_missing_variable() {
        let mut task = Task::new("t", "Use {words}", "{format}", "writer");
        let inputs = HashMap::from([("words".to_string(), "sol".to_string())]);
        let err = task.interpolate_inputs(&inputs).unwrap_err();
        assert!(matches!(err, CrewError::MissingInput { variable } if variable == "format"));
    }

    #[test]
    fn test_prompt_without_schema_has_no_format() {
        let task = Task::new("t", "d", "e", "a");
        assert!(task.output.is_none());
        assert!(!task.prompt().contains("following format"));
    }
}
