//! Persistence seam for profiles and word pairs.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::vocab::models::{
    AuthUser, NewWordPair, PracticeStats, Profile, ProfileUpdate, Session, ValidationError,
    WordPair, WordPairUpdate,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected the bearer token.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend could not be reached or answered with an error.
    #[error("{0}")]
    Backend(String),

    /// The row kept changing underneath a conditional write.
    #[error("{0}")]
    Conflict(String),
}

/// Reads of a word pair before [`VocabStore::record_practice`] gives up.
pub const PRACTICE_ATTEMPTS: u32 = 8;

/// Where users, profiles and word pairs live.
///
/// Every data call takes the caller's [`Session`]; implementations must
/// only ever see or change that user's rows.
#[async_trait]
pub trait VocabStore: Send + Sync {
    /// Resolve a bearer token to its user.
    async fn authenticate(&self, token: &str) -> Result<AuthUser, StoreError>;

    /// The user's profile row, if one exists.
    async fn profile(&self, session: &Session) -> Result<Option<Profile>, StoreError>;

    async fn upsert_profile(&self, session: &Session, update: &ProfileUpdate) -> Result<Profile, StoreError>;

    /// Word pairs, newest first, optionally filtered on `mastered`.
    async fn list_word_pairs(&self, session: &Session, mastered: Option<bool>) -> Result<Vec<WordPair>, StoreError>;

    async fn get_word_pair(&self, session: &Session, id: Uuid) -> Result<WordPair, StoreError>;

    async fn create_word_pair(&self, session: &Session, pair: &NewWordPair) -> Result<WordPair, StoreError>;

    async fn update_word_pair(
        &self,
        session: &Session,
        id: Uuid,
        update: &WordPairUpdate,
    ) -> Result<WordPair, StoreError>;

    async fn delete_word_pair(&self, session: &Session, id: Uuid) -> Result<(), StoreError>;

    /// Write practice counters back, but only while the row still has
    /// `seen_practiced` practices.
    ///
    /// `Ok(None)` means another answer was saved first.
    async fn save_practice(
        &self,
        session: &Session,
        id: Uuid,
        seen_practiced: u32,
        stats: &PracticeStats,
    ) -> Result<Option<WordPair>, StoreError>;

    /// Count one practice answer for a pair and return the updated row.
    ///
    /// Re-reads the row and tries again when a concurrent answer wins the
    /// write, so no answer is lost.
    async fn record_practice(&self, session: &Session, id: Uuid, correct: bool) -> Result<WordPair, StoreError> {
        for attempt in 1..=PRACTICE_ATTEMPTS {
            let mut pair = self.get_word_pair(session, id).await?;
            let seen = pair.times_practiced;
            pair.record_practice(correct);
            if let Some(saved) = self.save_practice(session, id, seen, &pair.practice_stats()).await? {
                log::debug!(
                    "Practice on {}: correct={}, accuracy={}%, mastered={}",
                    id,
                    correct,
                    saved.accuracy(),
                    saved.mastered
                );
                return Ok(saved);
            }
            log::debug!("Practice on {} lost a race (attempt {})", id, attempt);
        }
        Err(StoreError::Conflict(format!(
            "Word pair {} is being practiced concurrently, try again",
            id
        )))
    }
}
