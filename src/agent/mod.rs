//! Agent module.

pub mod core;

pub use self::core::{Agent, AgentOutcome, DEFAULT_MAX_ITER};
