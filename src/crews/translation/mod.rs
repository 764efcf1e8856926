//! Translation crew: suggests three translations of a single word.

pub mod schemas;

use std::collections::HashMap;
use std::sync::Arc;

use crate::agent::Agent;
use crate::crew::Crew;
use crate::llms::base_llm::BaseLLM;
use crate::process::Process;
use crate::project::CrewBase;
use crate::task::Task;
use crate::telemetry::traceable;
use crate::utilities::converter::StructuredOutput;
use crate::utilities::errors::CrewError;
use crate::vocab::languages::language_name;

pub use schemas::{TranslationSuggestion, TranslationSuggestionsOutput};

const AGENTS_YAML: &str = include_str!("config/agents.yaml");
const TASKS_YAML: &str = include_str!("config/tasks.yaml");
const TASK_NAME: &str = "translation_suggestions_task";

#[derive(Debug, Clone)]
pub struct TranslationCrew {
    base: CrewBase,
}

impl TranslationCrew {
    pub fn new() -> Result<Self, CrewError> {
        Ok(Self {
            base: CrewBase::from_yaml(AGENTS_YAML, TASKS_YAML)?,
        })
    }

    pub fn translation_expert(&self, llm: Arc<dyn BaseLLM>) -> Result<Agent, CrewError> {
        self.base.agent("translation_expert", llm)
    }

    pub fn translation_suggestions_task(&self) -> Result<Task, CrewError> {
        Ok(self
            .base
            .task(TASK_NAME)?
            .with_output::<TranslationSuggestionsOutput>())
    }

    pub fn crew(&self, llm: Arc<dyn BaseLLM>) -> Result<Crew, CrewError> {
        Crew::new(
            "translation",
            vec![self.translation_expert(llm)?],
            vec![self.translation_suggestions_task()?],
            Process::Sequential,
        )
    }
}

/// Word to translate and the language pair, as ISO codes.
#[derive(Debug, Clone, Default)]
pub struct TranslationRequest {
    pub word: String,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

fn describe(label: &str, code: Option<&str>) -> Option<String> {
    code.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| format!("{}: {} ({})", label, language_name(c), c))
}

pub fn translation_inputs(request: &TranslationRequest) -> HashMap<String, String> {
    let source = describe("Source language", request.source_language.as_deref())
        .unwrap_or_else(|| "(No source language specified - detect it from the word)".to_string());
    let target = describe("Target language", request.target_language.as_deref())
        .unwrap_or_else(|| "(No target language specified - translate into English)".to_string());

    HashMap::from([
        ("word".to_string(), request.word.trim().to_string()),
        ("source_language".to_string(), source),
        ("target_language".to_string(), target),
    ])
}

/// Suggest translations in a traced session, highest confidence first.
pub async fn suggest_translations(
    llm: Arc<dyn BaseLLM>,
    request: &TranslationRequest,
    project: Option<&str>,
) -> Result<TranslationSuggestionsOutput, CrewError> {
    traceable("suggest_translations", project, run_translation_crew(llm, request)).await
}

async fn run_translation_crew(
    llm: Arc<dyn BaseLLM>,
    request: &TranslationRequest,
) -> Result<TranslationSuggestionsOutput, CrewError> {
    let crew = TranslationCrew::new()?.crew(llm)?;
    let result = crew.kickoff_async(&translation_inputs(request)).await?;

    let invalid = || CrewError::InvalidOutput {
        task: TASK_NAME.to_string(),
        schema: TranslationSuggestionsOutput::NAME,
    };
    result
        .structured::<TranslationSuggestionsOutput>()
        .map_err(|_| invalid())?
        .map(TranslationSuggestionsOutput::sorted)
        .ok_or_else(invalid)
}
