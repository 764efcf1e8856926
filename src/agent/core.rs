//! Agent: a role-played persona bound to an LLM.

use std::collections::HashMap;
use std::sync::Arc;

use crate::llms::base_llm::{BaseLLM, CallOptions, LLMMessage};
use crate::types::usage_metrics::UsageMetrics;
use crate::utilities::converter::OutputSchema;
use crate::utilities::errors::CrewError;
use crate::utilities::prompts;
use crate::utilities::string_utils::interpolate_only;

/// Default number of answers an agent may give for one task before the
/// task settles for its raw output.
pub const DEFAULT_MAX_ITER: u32 = 3;

/// What the agent produced for a task.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// Last raw answer.
    pub raw: String,
    /// Validated structured answer, when a schema was requested and met.
    pub structured: Option<serde_json::Value>,
    /// Conversation exchanged with the LLM.
    pub messages: Vec<LLMMessage>,
    /// Tokens spent across every attempt.
    pub usage: UsageMetrics,
}

/// An agent in a crew.
///
/// `name` is the key used in `agents.yaml`; tasks refer to agents by it.
#[derive(Debug, Clone)]
pub struct Agent {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub llm: Arc<dyn BaseLLM>,
    /// Maximum answers per task (first answer plus correction rounds).
    pub max_iter: u32,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        llm: Arc<dyn BaseLLM>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            llm,
            max_iter: DEFAULT_MAX_ITER,
        }
    }

    /// Interpolate kickoff inputs into role, goal and backstory.
    pub fn interpolate_inputs(&mut self, inputs: &HashMap<String, String>) -> Result<(), CrewError> {
        self.role = interpolate_only(&self.role, inputs)?;
        self.goal = interpolate_only(&self.goal, inputs)?;
        self.backstory = interpolate_only(&self.backstory, inputs)?;
        Ok(())
    }

    /// Execute a task prompt.
    ///
    /// Without a schema the first answer is returned. With a schema each
    /// answer is converted; a non-conforming answer is sent back with the
    /// validation error until `max_iter` answers have been given.
    pub async fn execute_task(
        &self,
        task_prompt: &str,
        context: Option<&str>,
        schema: Option<&OutputSchema>,
    ) -> Result<AgentOutcome, CrewError> {
        log::debug!("Agent '{}' executing task", self.role);

        let mut messages = vec![
            LLMMessage::system(prompts::role_playing(&self.role, &self.goal, &self.backstory)),
            LLMMessage::user(prompts::with_context(task_prompt, context)),
        ];
        let options = match schema {
            Some(_) => CallOptions::json_object(),
            None => CallOptions::default(),
        };

        let mut usage = UsageMetrics::new();
        let mut raw = String::new();

        for attempt in 1..=self.max_iter.max(1) {
            let response = self.llm.acall(&messages, &options).await?;
            usage += response.usage;
            raw = response.content;
            messages.push(LLMMessage::assistant(raw.clone()));

            let Some(schema) = schema else {
                break;
            };

            match schema.convert(&raw) {
                Ok(structured) => {
                    return Ok(AgentOutcome {
                        raw,
                        structured: Some(structured),
                        messages,
                        usage,
                    });
                }
                Err(err) => {
                    log::warn!(
                        "Agent '{}' answer {} did not match {}: {}",
                        self.role,
                        attempt,
                        schema.name,
                        err
                    );
                    if attempt < self.max_iter {
                        messages.push(LLMMessage::user(prompts::format_correction(
                            &err.message,
                            &schema.schema,
                        )));
                    }
                }
            }
        }

        Ok(AgentOutcome {
            raw,
            structured: None,
            messages,
            usage,
        })
    }
}

impl std::fmt::Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Agent(role={}, goal={}, backstory={})", self.role, self.goal, self.backstory)
    }
}
