//! Crew: agents plus the tasks they work through.

use std::collections::HashMap;

use md5::{Digest, Md5};
use uuid::Uuid;

use crate::agent::Agent;
use crate::crews::crew_output::CrewOutput;
use crate::process::Process;
use crate::task::Task;
use crate::tasks::task_output::TaskOutput;
use crate::types::usage_metrics::UsageMetrics;
use crate::utilities::errors::CrewError;

/// A group of agents and the tasks they should perform.
///
/// A crew is a template: [`Crew::kickoff_async`] interpolates the inputs into
/// fresh copies of its agents and tasks, so one crew can be kicked off any
/// number of times.
#[derive(Debug, Clone)]
pub struct Crew {
    /// Optional name for the crew.
    pub name: String,
    /// Unique identifier for the crew instance.
    pub id: Uuid,
    /// Agents keyed by their configuration name.
    pub agents: HashMap<String, Agent>,
    /// Tasks in execution order.
    pub tasks: Vec<Task>,
    /// The process flow that the crew will follow.
    pub process: Process,
}

impl Crew {
    /// Create a crew, checking that every task's agent is part of it.
    pub fn new(
        name: impl Into<String>,
        agents: Vec<Agent>,
        tasks: Vec<Task>,
        process: Process,
    ) -> Result<Self, CrewError> {
        if tasks.is_empty() {
            return Err(CrewError::NoTasks);
        }

        let agents: HashMap<String, Agent> = agents
            .into_iter()
            .map(|agent| (agent.name.clone(), agent))
            .collect();

        if let Some(task) = tasks.iter().find(|t| !agents.contains_key(&t.agent)) {
            return Err(CrewError::UnknownAgent {
                task: task.name.clone(),
                agent: task.agent.clone(),
            });
        }

        Ok(Self {
            name: name.into(),
            id: Uuid::new_v4(),
            agents,
            tasks,
            process,
        })
    }

    /// MD5 over agent roles and task keys.
    pub fn key(&self) -> String {
        let mut roles: Vec<&str> = self.agents.values().map(|a| a.role.as_str()).collect();
        roles.sort_unstable();
        let mut source: Vec<String> = roles.into_iter().map(String::from).collect();
        source.extend(self.tasks.iter().map(Task::key));

        let mut hasher = Md5::new();
        hasher.update(source.join("|").as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Execute the crew's workflow.
    ///
    /// `inputs` are interpolated into every agent and task; a placeholder
    /// without a value fails the kickoff before any LLM call.
    pub async fn kickoff_async(&self, inputs: &HashMap<String, String>) -> Result<CrewOutput, CrewError> {
        let mut agents = self.agents.clone();
        for agent in agents.values_mut() {
            agent.interpolate_inputs(inputs)?;
        }
        let mut tasks = self.tasks.clone();
        for task in &mut tasks {
            task.interpolate_inputs(inputs)?;
        }

        log::info!("Crew '{}' kickoff: key={}, {}", self.name, self.key(), self);

        let task_outputs = match self.process {
            Process::Sequential => Self::run_sequential_process(&agents, &mut tasks).await?,
        };

        let output = self.create_crew_output(task_outputs)?;
        log::info!(
            "Crew '{}' finished: {} requests, {} tokens (prompt={}, completion={})",
            self.name,
            output.token_usage.successful_requests,
            output.token_usage.total_tokens,
            output.token_usage.prompt_tokens,
            output.token_usage.completion_tokens
        );
        Ok(output)
    }

    async fn run_sequential_process(
        agents: &HashMap<String, Agent>,
        tasks: &mut [Task],
    ) -> Result<Vec<TaskOutput>, CrewError> {
        let mut task_outputs: Vec<TaskOutput> = Vec::with_capacity(tasks.len());

        for task in tasks.iter_mut() {
            let agent = agents.get(&task.agent).ok_or_else(|| CrewError::UnknownAgent {
                task: task.name.clone(),
                agent: task.agent.clone(),
            })?;

            let context = if task_outputs.is_empty() {
                None
            } else {
                Some(
                    task_outputs
                        .iter()
                        .map(|o| o.raw.clone())
                        .collect::<Vec<String>>()
                        .join("\n\n---\n\n"),
                )
            };

            log::debug!("{} working on task '{}'", agent, task.name);
            let output = task.execute(agent, context.as_deref()).await?;
            log::debug!(
                "Task '{}' finished by '{}' ({})",
                output.name,
                output.agent,
                output.output_format
            );
            task_outputs.push(output);
        }

        Ok(task_outputs)
    }

    fn create_crew_output(&self, task_outputs: Vec<TaskOutput>) -> Result<CrewOutput, CrewError> {
        let final_output = task_outputs
            .iter()
            .rev()
            .find(|t| !t.raw.trim().is_empty())
            .ok_or(CrewError::EmptyOutput)?;

        let mut token_usage = UsageMetrics::new();
        for output in &task_outputs {
            token_usage += output.token_usage;
        }

        Ok(CrewOutput {
            raw: final_output.raw.clone(),
            pydantic: final_output.pydantic.clone(),
            token_usage,
            tasks_output: task_outputs,
        })
    }
}

impl std::fmt::Display for Crew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Crew(id={}, process={}, number_of_agents={}, number_of_tasks={})",
            self.id,
            self.process,
            self.agents.len(),
            self.tasks.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::providers::scripted::ScriptedLLM;
    use std::sync::Arc;

    fn two_step_crew(llm: Arc<ScriptedLLM>) -> Crew {
        let writer = Agent::new("writer", "Writer", "Write", "Prolific.", llm.clone());
        let editor = Agent::new("editor", "Editor", "Edit", "Picky.", llm);
        Crew::new(
            "pipeline",
            vec![writer, editor],
            vec![
                Task::new("draft", "Draft about {topic}", "A draft", "writer"),
                Task::new("polish", "Polish the draft", "A polished text", "editor"),
            ],
            Process::Sequential,
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_unknown_agent() {
        let llm = Arc::new(ScriptedLLM::new(Vec::<String>::new()));
        let writer = Agent::new("writer", "Writer", "Write", "Prolific.", llm);
        let err = Crew::new(
            "c",
            vec![writer],
            vec![Task::new("t", "d", "e", "ghost")],
            Process::Sequential,
        )
        .unwrap_err();
        assert!(matches!(err, CrewError::UnknownAgent { agent, .. } if agent == "ghost"));
    }

    #[test]
    fn test_new_rejects_empty_tasks() {
        let err = Crew::new("c", Vec::new(), Vec::new(), Process::Sequential).unwrap_err();
        assert!(matches!(err, CrewError::NoTasks));
    }

    #[tokio::test]
    async fn test_sequential_kickoff_passes_context() {
        let llm = Arc::new(ScriptedLLM::new(["rough draft", "final text"]));
        let crew = two_step_crew(llm.clone());
        let inputs = HashMap::from([("topic".to_string(), "cats".to_string())]);

        let output = crew.kickoff_async(&inputs).await.unwrap();

        assert_eq!(output.raw, "final text");
        assert_eq!(output.tasks_output.len(), 2);
        assert_eq!(output.tasks_output[0].description, "Draft about cats");
        assert_eq!(output.token_usage.successful_requests, 2);
        assert_eq!(output.token_usage.total_tokens, 20);

        let calls = llm.calls.lock();
        assert!(calls[0].0[1].content.contains("Draft about cats"));
        assert!(calls[1].0[1].content.contains("rough draft"));
        assert!(calls[1].0[0].content.starts_with("You are Editor."));
    }

    #[tokio::test]
    async fn test_kickoff_missing_input_makes_no_calls() {
        let llm = Arc::new(ScriptedLLM::new(["unused"]));
        let crew = two_step_crew(llm.clone());
        let err = crew.kickoff_async(&HashMap::new()).await.unwrap_err();
        assert!(matches!(err, CrewError::MissingInput { .. }));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_kickoff_leaves_template_untouched() {
        let llm = Arc::new(ScriptedLLM::new(["a", "b"]));
        let crew = two_step_crew(llm);
        let inputs = HashMap::from([("topic".to_string(), "dogs".to_string())]);
        crew.kickoff_async(&inputs).await.unwrap();
        assert_eq!(crew.tasks[0].description, "Draft about {topic}");
    }

    #[tokio::test]
    async fn test_empty_answers_fail() {
        let llm = Arc::new(ScriptedLLM::new(["", "  "]));
        let crew = two_step_crew(llm);
        let inputs = HashMap::from([("topic".to_string(), "x".to_string())]);
        let err = crew.kickoff_async(&inputs).await.unwrap_err();
        assert!(matches!(err, CrewError::EmptyOutput));
    }
}
