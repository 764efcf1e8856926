//! LLM infrastructure.
//!
//! - [`base_llm`] - The trait all LLM implementations follow, plus message types
//! - [`providers`] - Provider implementations

pub mod base_llm;
pub mod providers;

pub use base_llm::{BaseLLM, CallOptions, LLMError, LLMMessage, LLMResponse, Role};
