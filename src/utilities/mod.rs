//! Shared utilities: settings, errors, prompts and output conversion.

pub mod config;
pub mod converter;
pub mod errors;
pub mod prompts;
pub mod string_utils;
