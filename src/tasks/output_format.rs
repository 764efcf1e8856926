//! Task output format definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Output format of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Output validated against a structured schema.
    Structured,
    /// Output as raw unprocessed string.
    #[default]
    Raw,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Structured => write!(f, "structured"),
            OutputFormat::Raw => write!(f, "raw"),
        }
    }
}
