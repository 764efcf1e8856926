use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::utilities::converter::StructuredOutput;

/// Schema for the phrase generation output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseOutput {
    /// The generated phrase using the provided words.
    pub phrase: String,
    /// Words that were actually used in the generated phrase.
    pub words: Vec<String>,
}

impl StructuredOutput for PhraseOutput {
    const NAME: &'static str = "PhraseOutput";

    fn json_schema() -> Value {
        json!({
            "title": "PhraseOutput",
            "type": "object",
            "properties": {
                "phrase": {
                    "type": "string",
                    "description": "The generated phrase using the provided words"
                },
                "words": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "List of words that were actually used in the generated phrase"
                }
            },
            "required": ["phrase", "words"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.phrase.trim().is_empty() {
            return Err("phrase must not be empty".to_string());
        }
        Ok(())
    }
}
