//! Project module: YAML-configured crews.
//!
//! A crew project ships an `agents.yaml` and a `tasks.yaml`. [`CrewBase`]
//! parses both, keeping declaration order, and hands out configured
//! [`Agent`]s and [`Task`]s by their keys.

use std::sync::Arc;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::agent::{Agent, DEFAULT_MAX_ITER};
use crate::llms::base_llm::BaseLLM;
use crate::task::Task;
use crate::utilities::errors::CrewError;

/// Agent entry in `agents.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    #[serde(default)]
    pub max_iter: Option<u32>,
}

/// Task entry in `tasks.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    pub description: String,
    pub expected_output: String,
    /// Key of the agent in `agents.yaml`.
    pub agent: String,
}

/// Parsed crew project configuration.
#[derive(Debug, Clone, Default)]
pub struct CrewBase {
    /// Agent configs in declaration order.
    pub agents_config: Vec<(String, AgentConfig)>,
    /// Task configs in declaration order.
    pub tasks_config: Vec<(String, TaskConfig)>,
}

impl CrewBase {
    /// Parse the two YAML documents.
    ///
    /// Every task must name an agent defined in `agents_yaml`.
    pub fn from_yaml(agents_yaml: &str, tasks_yaml: &str) -> Result<Self, CrewError> {
        let agents_config: Vec<(String, AgentConfig)> = parse_keyed(agents_yaml, "agents")?;
        let tasks_config: Vec<(String, TaskConfig)> = parse_keyed(tasks_yaml, "tasks")?;

        for (name, task) in &tasks_config {
            if !agents_config.iter().any(|(key, _)| key == &task.agent) {
                return Err(CrewError::UnknownAgent {
                    task: name.clone(),
                    agent: task.agent.clone(),
                });
            }
        }

        Ok(Self {
            agents_config,
            tasks_config,
        })
    }

    /// Build the agent configured under `name`.
    pub fn agent(&self, name: &str, llm: Arc<dyn BaseLLM>) -> Result<Agent, CrewError> {
        let config = lookup(&self.agents_config, name, "Agent")?;
        let mut agent = Agent::new(
            name,
            config.role.trim(),
            config.goal.trim(),
            config.backstory.trim(),
            llm,
        );
        agent.max_iter = config.max_iter.unwrap_or(DEFAULT_MAX_ITER);
        Ok(agent)
    }

    /// Build the task configured under `name`.
    pub fn task(&self, name: &str) -> Result<Task, CrewError> {
        let config = lookup(&self.tasks_config, name, "Task")?;
        Ok(Task::new(
            name,
            config.description.trim(),
            config.expected_output.trim(),
            config.agent.as_str(),
        ))
    }

    /// Agent keys in declaration order.
    pub fn agent_names(&self) -> impl Iterator<Item = &str> {
        self.agents_config.iter().map(|(name, _)| name.as_str())
    }

    /// Task keys in declaration order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks_config.iter().map(|(name, _)| name.as_str())
    }
}

fn lookup<'a, T>(entries: &'a [(String, T)], name: &str, kind: &'static str) -> Result<&'a T, CrewError> {
    entries
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, config)| config)
        .ok_or_else(|| CrewError::Undefined {
            kind,
            name: name.to_string(),
        })
}

/// Parse a top-level mapping of `key: entry`, preserving key order.
fn parse_keyed<T: for<'de> Deserialize<'de>>(yaml: &str, what: &str) -> Result<Vec<(String, T)>, CrewError> {
    let mapping: Mapping = serde_yaml::from_str(yaml)?;
    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let Value::String(key) = key else {
            return Err(CrewError::Config(format!("{} keys must be strings", what)));
        };
        let entry: T = serde_yaml::from_value(value)
            .map_err(|e| CrewError::Config(format!("{} '{}': {}", what, key, e)))?;
        entries.push((key, entry));
    }
    Ok(entries)
}
