//! Rows of the `profiles` and `word_pairs` tables and the request bodies
//! that change them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::vocab::languages::is_valid_language_code;

/// Longest accepted source or target word.
pub const MAX_WORD_CHARS: usize = 200;
/// Longest accepted profile context.
pub const MAX_CONTEXT_CHARS: usize = 2000;
/// Correct answers needed before a pair can be mastered.
pub const MASTERY_MIN_CORRECT: u32 = 5;
/// Accuracy, in percent, needed before a pair can be mastered.
pub const MASTERY_MIN_ACCURACY: u32 = 80;

/// A request body that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// The user a bearer token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated user and the token that proved it.
///
/// The token is forwarded on every backend query so row-level security
/// sees the user.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: AuthUser,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub native_language: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
}

/// Body of `PUT /api/profile`.
///
/// An absent field is left unchanged; an explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub context: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub native_language: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub target_language: Option<Option<String>>,
}

/// Marks a field that appeared in the body, `null` included.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ProfileUpdate {
    /// Trim the fields and check them. An empty language clears it.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let context = self.context.map(|c| c.map(|c| c.trim().to_string()));
        if let Some(Some(ref c)) = context {
            if c.chars().count() > MAX_CONTEXT_CHARS {
                return Err(ValidationError(format!(
                    "'context' must be at most {} characters",
                    MAX_CONTEXT_CHARS
                )));
            }
        }
        Ok(Self {
            context,
            native_language: self
                .native_language
                .map(|code| language_field("native_language", code))
                .transpose()?,
            target_language: self
                .target_language
                .map(|code| language_field("target_language", code))
                .transpose()?,
        })
    }

    /// Apply the update to a stored profile.
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(ref context) = self.context {
            profile.context = context.clone();
        }
        if let Some(ref code) = self.native_language {
            profile.native_language = code.clone();
        }
        if let Some(ref code) = self.target_language {
            profile.target_language = code.clone();
        }
    }
}

fn language_field(field: &str, code: Option<String>) -> Result<Option<String>, ValidationError> {
    match code.map(|c| c.trim().to_string()) {
        Some(c) if c.is_empty() => Ok(None),
        Some(c) if !is_valid_language_code(&c) => Err(ValidationError(format!(
            "'{}' must be a language code such as 'en' or 'pt-BR'",
            field
        ))),
        other => Ok(other),
    }
}

/// A row of `word_pairs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub id: Uuid,
    pub user_id: Uuid,
    pub source_word: String,
    pub target_word: String,
    #[serde(default)]
    pub times_practiced: u32,
    #[serde(default)]
    pub times_correct: u32,
    #[serde(default)]
    pub times_wrong: u32,
    #[serde(default)]
    pub mastered: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WordPair {
    /// Percentage of correct answers, 0 when never practiced.
    pub fn accuracy(&self) -> u32 {
        match self.times_practiced {
            0 => 0,
            // At most 100 since times_correct <= times_practiced.
            n => (u64::from(self.times_correct) * 100 / u64::from(n)) as u32,
        }
    }

    /// Count one practice answer.
    ///
    /// Sets `mastered` once the pair has enough correct answers at a high
    /// enough accuracy. Never clears it.
    pub fn record_practice(&mut self, correct: bool) {
        self.times_practiced += 1;
        if correct {
            self.times_correct += 1;
        } else {
            self.times_wrong += 1;
        }
        if self.times_correct >= MASTERY_MIN_CORRECT && self.accuracy() >= MASTERY_MIN_ACCURACY {
            self.mastered = true;
        }
        self.updated_at = Utc::now();
    }

    /// Counters written back after practice.
    pub fn practice_stats(&self) -> PracticeStats {
        PracticeStats {
            times_practiced: self.times_practiced,
            times_correct: self.times_correct,
            times_wrong: self.times_wrong,
            mastered: self.mastered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeStats {
    pub times_practiced: u32,
    pub times_correct: u32,
    pub times_wrong: u32,
    pub mastered: bool,
}

/// Body of `POST /api/word-pairs/:id/practice`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PracticeAnswer {
    pub correct: bool,
}

/// Body of `POST /api/word-pairs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWordPair {
    pub source_word: String,
    pub target_word: String,
}

impl NewWordPair {
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            source_word: word_field("source_word", &self.source_word)?,
            target_word: word_field("target_word", &self.target_word)?,
        })
    }
}

/// Body of `PATCH /api/word-pairs/:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPairUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastered: Option<bool>,
}

impl WordPairUpdate {
    pub fn validated(self) -> Result<Self, ValidationError> {
        if self.source_word.is_none() && self.target_word.is_none() && self.mastered.is_none() {
            return Err(ValidationError(
                "Request body must include at least one of 'source_word', 'target_word', 'mastered'"
                    .to_string(),
            ));
        }
        Ok(Self {
            source_word: self
                .source_word
                .map(|w| word_field("source_word", &w))
                .transpose()?,
            target_word: self
                .target_word
                .map(|w| word_field("target_word", &w))
                .transpose()?,
            mastered: self.mastered,
        })
    }

    /// Apply the update to a row.
    pub fn apply_to(&self, pair: &mut WordPair) {
        if let Some(ref w) = self.source_word {
            pair.source_word = w.clone();
        }
        if let Some(ref w) = self.target_word {
            pair.target_word = w.clone();
        }
        if let Some(m) = self.mastered {
            pair.mastered = m;
        }
        pair.updated_at = Utc::now();
    }
}

fn word_field(field: &str, word: &str) -> Result<String, ValidationError> {
    let word = word.trim();
    if word.is_empty() {
        return Err(ValidationError(format!("'{}' must not be empty", field)));
    }
    if word.chars().count() > MAX_WORD_CHARS {
        return Err(ValidationError(format!(
            "'{}' must be at most {} characters",
            field, MAX_WORD_CHARS
        )));
    }
    Ok(word.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> WordPair {
        let now = Utc::now();
        WordPair {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            source_word: "cat".to_string(),
            target_word: "gato".to_string(),
            times_practiced: 0,
            times_correct: 0,
            times_wrong: 0,
            mastered: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_mastery_needs_five_correct() {
        let mut p = pair();
        for _ in 0..4 {
            p.record_practice(true);
        }
        assert!(!p.mastered);
        p.record_practice(true);
        assert!(p.mastered);
        assert_eq!(p.times_practiced, 5);
        assert_eq!(p.accuracy(), 100);
    }

    #[test]
    fn test_mastery_needs_accuracy() {
        let mut p = pair();
        p.record_practice(false);
        p.record_practice(false);
        for _ in 0..5 {
            p.record_practice(true);
        }
        // 5 of 7 correct is 71%
        assert!(!p.mastered);
        p.record_practice(true);
        p.record_practice(true);
        p.record_practice(true);
        // 8 of 10 correct
        assert!(p.mastered);
        assert_eq!(p.times_wrong, 2);
    }

    #[test]
    fn test_accuracy_on_large_counters() {
        let mut p = pair();
        p.times_practiced = u32::MAX;
        p.times_correct = u32::MAX - 1;
        assert_eq!(p.accuracy(), 99);
        p.times_correct = u32::MAX;
        assert_eq!(p.accuracy(), 100);
    }

    #[test]
    fn test_practice_never_clears_mastered() {
        let mut p = pair();
        p.mastered = true;
        p.record_practice(false);
        assert!(p.mastered);
    }

    #[test]
    fn test_new_word_pair_validation() {
        let ok = NewWordPair {
            source_word: "  cat ".to_string(),
            target_word: "gato".to_string(),
        }
        .validated()
        .unwrap();
        assert_eq!(ok.source_word, "cat");

        let err = NewWordPair {
            source_word: " ".to_string(),
            target_word: "gato".to_string(),
        }
        .validated()
        .unwrap_err();
        assert_eq!(err.0, "'source_word' must not be empty");

        let err = NewWordPair {
            source_word: "a".repeat(201),
            target_word: "gato".to_string(),
        }
        .validated()
        .unwrap_err();
        assert!(err.0.contains("at most 200"));
    }

    #[test]
    fn test_empty_update_is_rejected() {
        assert!(WordPairUpdate::default().validated().is_err());
        let update = WordPairUpdate {
            mastered: Some(false),
            ..Default::default()
        }
        .validated()
        .unwrap();
        let mut p = pair();
        p.mastered = true;
        update.apply_to(&mut p);
        assert!(!p.mastered);
    }

    #[test]
    fn test_profile_update_validation() {
        let ok = ProfileUpdate {
            context: Some(Some(" I cook ".to_string())),
            native_language: Some(Some("en".to_string())),
            target_language: Some(Some("pt-BR".to_string())),
        }
        .validated()
        .unwrap();
        assert_eq!(ok.context, Some(Some("I cook".to_string())));

        let err = ProfileUpdate {
            target_language: Some(Some("Portuguese".to_string())),
            ..Default::default()
        }
        .validated()
        .unwrap_err();
        assert!(err.0.contains("target_language"));

        let err = ProfileUpdate {
            context: Some(Some("x".repeat(2001))),
            ..Default::default()
        }
        .validated()
        .unwrap_err();
        assert!(err.0.contains("context"));
    }

    #[test]
    fn test_profile_update_null_clears_field() {
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"context": null, "target_language": " "}"#).unwrap();
        let update = update.validated().unwrap();
        assert_eq!(update.context, Some(None));
        assert_eq!(update.native_language, None);
        assert_eq!(update.target_language, Some(None));

        let mut profile = Profile {
            id: Uuid::new_v4(),
            context: Some("Chef".to_string()),
            native_language: Some("de".to_string()),
            target_language: Some("fr".to_string()),
        };
        update.apply_to(&mut profile);
        assert_eq!(profile.context, None);
        assert_eq!(profile.native_language.as_deref(), Some("de"));
        assert_eq!(profile.target_language, None);

        // Cleared fields go to the backend as nulls; absent ones are left out.
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, serde_json::json!({"context": null, "target_language": null}));
    }
}
