//! Random phrase crew: one agent writes a practice phrase from the user's
//! vocabulary words, in the language they are learning.

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
use crate::utilities::errors::CrewError;
use crate::vocab::languages::language_name;

pub use schemas::PhraseOutput;

const AGENTS_YAML: &str = include_str!("config/agents.yaml");
const TASKS_YAML: &str = include_str!("config/tasks.yaml");

/// Crew definition backed by the embedded YAML config.
#[derive(Debug, Clone)]
pub struct RandomPhraseCrew {
    base: CrewBase,
}

impl RandomPhraseCrew {
    pub fn new() -> Result<Self, CrewError> {
        Ok(Self {
            base: CrewBase::from_yaml(AGENTS_YAML, TASKS_YAML)?,
        })
    }

    pub fn phrase_creator(&self, llm: Arc<dyn BaseLLM>) -> Result<Agent, CrewError> {
        self.base.agent("phrase_creator", llm)
    }

    pub fn phrase_generation_task(&self) -> Result<Task, CrewError> {
        Ok(self
            .base
            .task("phrase_generation_task")?
            .with_output::<PhraseOutput>())
    }

    pub fn crew(&self, llm: Arc<dyn BaseLLM>) -> Result<Crew, CrewError> {
        Crew::new(
            "random_phrase",
            vec![self.phrase_creator(llm)?],
            vec![self.phrase_generation_task()?],
            Process::Sequential,
        )
    }
}

/// What the phrase is built from.
#[derive(Debug, Clone, Default)]
pub struct PhraseRequest {
    pub words: Vec<String>,
    pub user_context: String,
    pub native_language: Option<String>,
    pub target_language: Option<String>,
}

fn specified(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|c| !c.is_empty())
}

pub fn format_native_language(code: Option<&str>) -> String {
    match specified(code) {
        Some(code) => format!("Native language: {} ({})", language_name(code), code),
        None => "(No native language specified)".to_string(),
    }
}

pub fn format_target_language(code: Option<&str>) -> String {
    match specified(code) {
        Some(code) => format!(
            "Target language: {} ({}) - Generate the phrase in this language!",
            language_name(code),
            code
        ),
        None => "(No target language specified - generate in English)".to_string(),
    }
}

/// Kickoff inputs for the phrase task template.
pub fn phrase_inputs(request: &PhraseRequest) -> HashMap<String, String> {
    HashMap::from([
        ("words".to_string(), request.words.join(", ")),
        ("user_context".to_string(), request.user_context.clone()),
        (
            "native_language".to_string(),
            format_native_language(request.native_language.as_deref()),
        ),
        (
            "target_language".to_string(),
            format_target_language(request.target_language.as_deref()),
        ),
    ])
}

/// Generate a phrase in its own traced session.
///
/// When the model never returns a valid [`PhraseOutput`], its raw answer is
/// used as the phrase and the requested words are reported as used.
pub async fn generate_random_phrase(
    llm: Arc<dyn BaseLLM>,
    request: &PhraseRequest,
    project: Option<&str>,
) -> Result<PhraseOutput, CrewError> {
    traceable("generate_random_phrase", project, run_phrase_crew(llm, request)).await
}

async fn run_phrase_crew(llm: Arc<dyn BaseLLM>, request: &PhraseRequest) -> Result<PhraseOutput, CrewError> {
    let crew = RandomPhraseCrew::new()?.crew(llm)?;
    let result = crew.kickoff_async(&phrase_inputs(request)).await?;

    let fallback = |reason: String| {
        log::warn!("Phrase crew gave no usable structured output ({}), using raw answer", reason);
        PhraseOutput {
            phrase: result.raw.clone(),
            words: request.words.clone(),
        }
    };

    Ok(match result.structured::<PhraseOutput>() {
        Ok(Some(output)) => output,
        Ok(None) => fallback("schema not met".to_string()),
        Err(err) => fallback(err.to_string()),
    })
}
