//! Error types for crew orchestration.

use thiserror::Error;

use crate::llms::base_llm::LLMError;

/// Errors raised while building or running a crew.
#[derive(Debug, Error)]
pub enum CrewError {
    /// A `{variable}` placeholder had no value in the kickoff inputs.
    #[error("Template variable '{variable}' not found in inputs dictionary")]
    MissingInput { variable: String },

    /// The YAML definitions could not be parsed.
    #[error("Invalid crew configuration: {0}")]
    Config(String),

    /// A config lookup named an agent or task that is not defined.
    #[error("{kind} '{name}' is not defined in the crew configuration")]
    Undefined { kind: &'static str, name: String },

    /// A task references an agent that is not part of the crew.
    #[error("Task '{task}' is assigned to agent '{agent}', which is not part of the crew")]
    UnknownAgent { task: String, agent: String },

    /// The crew was built without tasks.
    #[error("A crew needs at least one task")]
    NoTasks,

    /// Every task produced an empty answer.
    #[error("No valid task outputs available to create crew output.")]
    EmptyOutput,

    /// The final task gave no answer matching its output schema.
    #[error("Task '{task}' did not produce a valid {schema}")]
    InvalidOutput { task: String, schema: &'static str },

    /// The underlying LLM call failed.
    #[error(transparent)]
    Llm(#[from] LLMError),
}

impl From<serde_yaml::Error> for CrewError {
    fn from(err: serde_yaml::Error) -> Self {
        CrewError::Config(err.to_string())
    }
}
