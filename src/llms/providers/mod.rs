//! LLM provider implementations.
//!
//! Each provider implements the [`BaseLLM`](crate::llms::base_llm::BaseLLM)
//! trait and handles authentication, request formatting and error handling
//! specific to that provider.
//!
//! | Provider | Module |
//! |----------|--------|
//! | OpenAI-compatible (OpenAI, Groq) | [`openai`] |

pub mod openai;

#[cfg(test)]
pub mod scripted;
