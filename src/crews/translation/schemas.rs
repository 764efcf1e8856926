use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::utilities::converter::StructuredOutput;

/// Number of suggestions the model must return.
pub const SUGGESTION_COUNT: usize = 3;

/// A single translation suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationSuggestion {
    /// The translated word in the target language.
    pub translation: String,
    /// How accurate this translation is, from 0.0 to 1.0.
    pub confidence: f64,
    /// When or where this translation is most appropriate.
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationSuggestionsOutput {
    pub suggestions: Vec<TranslationSuggestion>,
}

impl TranslationSuggestionsOutput {
    /// Suggestions ordered by confidence, highest first.
    pub fn sorted(mut self) -> Self {
        self.suggestions
            .sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        self
    }
}

impl StructuredOutput for TranslationSuggestionsOutput {
    const NAME: &'static str = "TranslationSuggestionsOutput";

    fn json_schema() -> Value {
        json!({
            "title": "TranslationSuggestionsOutput",
            "type": "object",
            "properties": {
                "suggestions": {
                    "type": "array",
                    "description": "List of 3 translation suggestions, ordered by confidence (highest first)",
                    "minItems": SUGGESTION_COUNT,
                    "maxItems": SUGGESTION_COUNT,
                    "items": {
                        "type": "object",
                        "properties": {
                            "translation": {
                                "type": "string",
                                "description": "The translated word in the target language"
                            },
                            "confidence": {
                                "type": "number",
                                "minimum": 0.0,
                                "maximum": 1.0,
                                "description": "Confidence score from 0.0 to 1.0 indicating how accurate this translation is"
                            },
                            "context": {
                                "type": "string",
                                "description": "Brief explanation of when/where this translation is most appropriate"
                            }
                        },
                        "required": ["translation", "confidence", "context"]
                    }
                }
            },
            "required": ["suggestions"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.suggestions.len() != SUGGESTION_COUNT {
            return Err(format!(
                "expected exactly {} suggestions, got {}",
                SUGGESTION_COUNT,
                self.suggestions.len()
            ));
        }
        for (i, s) in self.suggestions.iter().enumerate() {
            if !(0.0..=1.0).contains(&s.confidence) {
                return Err(format!(
                    "suggestions[{}].confidence must be between 0.0 and 1.0, got {}",
                    i, s.confidence
                ));
            }
            if s.translation.trim().is_empty() {
                return Err(format!("suggestions[{}].translation must not be empty", i));
            }
        }
        Ok(())
    }
}
