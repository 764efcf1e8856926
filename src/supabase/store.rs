//! [`VocabStore`] backed by the `profiles` and `word_pairs` tables.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::supabase::client::{SupabaseClient, SupabaseError};
use crate::vocab::models::{
    AuthUser, NewWordPair, PracticeStats, Profile, ProfileUpdate, Session, WordPair, WordPairUpdate,
};
use crate::vocab::store::{StoreError, VocabStore};

pub const PROFILES_TABLE: &str = "profiles";
pub const WORD_PAIRS_TABLE: &str = "word_pairs";

const PROFILE_COLUMNS: &str = "id,context,native_language,target_language";

impl From<SupabaseError> for StoreError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Auth(message) => StoreError::Unauthorized(message),
            SupabaseError::NotFound => StoreError::NotFound("Row".to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

fn word_pair_error(err: SupabaseError) -> StoreError {
    match err {
        SupabaseError::NotFound => StoreError::NotFound("Word pair".to_string()),
        other => other.into(),
    }
}

#[derive(Debug, Deserialize)]
struct DeletedRow {
    #[allow(dead_code)]
    id: Uuid,
}

#[async_trait]
impl VocabStore for SupabaseClient {
    async fn authenticate(&self, token: &str) -> Result<AuthUser, StoreError> {
        Ok(self.get_user(token).await?)
    }

    async fn profile(&self, session: &Session) -> Result<Option<Profile>, StoreError> {
        let result = self
            .from(PROFILES_TABLE)
            .auth(&session.token)
            .select(PROFILE_COLUMNS)
            .eq("id", session.user.id)
            .single()
            .get::<Profile>()
            .await;
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(SupabaseError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn upsert_profile(&self, session: &Session, update: &ProfileUpdate) -> Result<Profile, StoreError> {
        let mut body = serde_json::to_value(update).map_err(|e| StoreError::Backend(e.to_string()))?;
        body["id"] = json!(session.user.id);
        let profile = self
            .from(PROFILES_TABLE)
            .auth(&session.token)
            .select(PROFILE_COLUMNS)
            .single()
            .upsert(&body, "id")
            .await?;
        Ok(profile)
    }

    async fn list_word_pairs(&self, session: &Session, mastered: Option<bool>) -> Result<Vec<WordPair>, StoreError> {
        let mut query = self
            .from(WORD_PAIRS_TABLE)
            .auth(&session.token)
            .select("*")
            .eq("user_id", session.user.id);
        if let Some(mastered) = mastered {
            query = query.eq("mastered", mastered);
        }
        Ok(query.order("created_at", false).get().await?)
    }

    async fn get_word_pair(&self, session: &Session, id: Uuid) -> Result<WordPair, StoreError> {
        self.from(WORD_PAIRS_TABLE)
            .auth(&session.token)
            .select("*")
            .eq("id", id)
            .eq("user_id", session.user.id)
            .single()
            .get()
            .await
            .map_err(word_pair_error)
    }

    async fn create_word_pair(&self, session: &Session, pair: &NewWordPair) -> Result<WordPair, StoreError> {
        let body = json!({
            "user_id": session.user.id,
            "source_word": pair.source_word,
            "target_word": pair.target_word,
        });
        Ok(self
            .from(WORD_PAIRS_TABLE)
            .auth(&session.token)
            .single()
            .insert(&body)
            .await?)
    }

    async fn update_word_pair(
        &self,
        session: &Session,
        id: Uuid,
        update: &WordPairUpdate,
    ) -> Result<WordPair, StoreError> {
        let mut body = serde_json::to_value(update).map_err(|e| StoreError::Backend(e.to_string()))?;
        body["updated_at"] = json!(chrono::Utc::now());
        self.from(WORD_PAIRS_TABLE)
            .auth(&session.token)
            .eq("id", id)
            .eq("user_id", session.user.id)
            .single()
            .update(&body)
            .await
            .map_err(word_pair_error)
    }

    async fn delete_word_pair(&self, session: &Session, id: Uuid) -> Result<(), StoreError> {
        let deleted: Vec<DeletedRow> = self
            .from(WORD_PAIRS_TABLE)
            .auth(&session.token)
            .select("id")
            .eq("id", id)
            .eq("user_id", session.user.id)
            .delete()
            .await?;
        if deleted.is_empty() {
            return Err(StoreError::NotFound("Word pair".to_string()));
        }
        Ok(())
    }

    async fn save_practice(
        &self,
        session: &Session,
        id: Uuid,
        seen_practiced: u32,
        stats: &PracticeStats,
    ) -> Result<Option<WordPair>, StoreError> {
        let mut body = serde_json::to_value(stats).map_err(|e| StoreError::Backend(e.to_string()))?;
        body["updated_at"] = json!(chrono::Utc::now());
        let result = self
            .from(WORD_PAIRS_TABLE)
            .auth(&session.token)
            .eq("id", id)
            .eq("user_id", session.user.id)
            .eq("times_practiced", seen_practiced)
            .single()
            .update(&body)
            .await;
        match result {
            Ok(pair) => Ok(Some(pair)),
            // Either the row is gone or another answer moved the counter;
            // the caller's re-read tells the two apart.
            Err(SupabaseError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
