//! # lexicrew
//!
//! Backend for a vocabulary practice app. Users, profiles and word pairs
//! live in Supabase; practice phrases and translation suggestions come from
//! small YAML-configured LLM crews.
//!
//! The crate has two halves:
//!
//! - an orchestration slice ([`agent`], [`task`], [`crew`], [`project`])
//!   running agents on any [`BaseLLM`], with structured output validated
//!   against serde models;
//! - the HTTP service ([`server`]) over a [`vocab::VocabStore`], backed in
//!   production by [`supabase::SupabaseClient`].

pub mod agent;
pub mod crew;
pub mod crews;
pub mod llm;
pub mod llms;
pub mod process;
pub mod project;
pub mod server;
pub mod supabase;
pub mod task;
pub mod tasks;
pub mod telemetry;
pub mod types;
pub mod utilities;
pub mod vocab;

#[cfg(test)]
pub(crate) mod http_stub;

pub use agent::Agent;
pub use crew::Crew;
pub use crews::crew_output::CrewOutput;
pub use llm::LLM;
pub use llms::base_llm::BaseLLM;
pub use process::Process;
pub use task::Task;
pub use tasks::task_output::TaskOutput;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
