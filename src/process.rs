//! Process types for crew execution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a crew works through its tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// Tasks are executed one after another in order, each seeing the
    /// outputs of the tasks before it.
    #[default]
    Sequential,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Process::Sequential => write!(f, "sequential"),
        }
    }
}
