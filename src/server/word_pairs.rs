//! `/api/word-pairs` handlers.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::server::auth::RequireAuth;
use crate::server::error::ApiError;
use crate::server::routes::AppState;
use crate::vocab::{NewWordPair, PracticeAnswer, WordPair, WordPairUpdate};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub mastered: Option<bool>,
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request(format!("Invalid word pair id '{}'", id)))
}

/// GET /api/word-pairs?mastered=
pub async fn list_word_pairs(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<WordPair>>, ApiError> {
    let Query(params) = params?;
    let pairs = state.store.list_word_pairs(&session, params.mastered).await?;
    Ok(Json(pairs))
}

/// POST /api/word-pairs
pub async fn create_word_pair(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    body: Result<Json<NewWordPair>, JsonRejection>,
) -> Result<(StatusCode, Json<WordPair>), ApiError> {
    let Json(pair) = body?;
    let pair = pair.validated()?;
    let created = state.store.create_word_pair(&session, &pair).await?;
    log::info!("User {} added word pair {}", session.user.id, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/word-pairs/:id
pub async fn get_word_pair(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WordPair>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.get_word_pair(&session, id).await?))
}

/// PATCH /api/word-pairs/:id
pub async fn update_word_pair(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<WordPairUpdate>, JsonRejection>,
) -> Result<Json<WordPair>, ApiError> {
    let id = parse_id(&id)?;
    let Json(update) = body?;
    let update = update.validated()?;
    Ok(Json(state.store.update_word_pair(&session, id, &update).await?))
}

/// DELETE /api/word-pairs/:id
pub async fn delete_word_pair(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.store.delete_word_pair(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/word-pairs/:id/practice
///
/// Request: `{"correct": true}`. Returns the pair with updated counters.
pub async fn practice_word_pair(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PracticeAnswer>, JsonRejection>,
) -> Result<Json<WordPair>, ApiError> {
    let id = parse_id(&id)?;
    let Json(answer) = body?;
    Ok(Json(state.store.record_practice(&session, id, answer.correct).await?))
}
