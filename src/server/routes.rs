//! Router, shared state and the crew endpoints.
//!
//! # Routes
//!
//! - `GET  /health`                       Liveness probe
//! - `POST /api/random-phrase`            Practice phrase from vocabulary words
//! - `POST /api/translation-suggestions`  Three translations of one word
//! - `GET|PUT /api/profile`               The caller's profile
//! - `/api/word-pairs[...]`               Word pair CRUD and practice

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::crews::random_phrase::{generate_random_phrase, PhraseOutput, PhraseRequest};
use crate::crews::translation::{suggest_translations, TranslationRequest};
use crate::llms::base_llm::BaseLLM;
use crate::server::auth::RequireAuth;
use crate::server::error::ApiError;
use crate::server::{profile, word_pairs};
use crate::vocab::languages::is_valid_language_code;
use crate::vocab::models::MAX_WORD_CHARS;
use crate::vocab::{Profile, Session, VocabStore};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VocabStore>,
    /// LLM every crew runs on.
    pub llm: Arc<dyn BaseLLM>,
    /// Project name attached to traced crew sessions.
    pub project_name: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: Arc<dyn VocabStore>, llm: Arc<dyn BaseLLM>) -> Self {
        Self {
            store,
            llm,
            project_name: None,
        }
    }

    pub fn with_project_name(mut self, name: Option<String>) -> Self {
        self.project_name = name.map(Arc::from);
        self
    }

    /// The caller's profile, or `None` when it is missing or cannot be read.
    async fn profile_or_default(&self, session: &Session) -> Option<Profile> {
        match self.store.profile(session).await {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!("Error fetching user profile: {}", e);
                None
            }
        }
    }
}

/// CORS policy for the browser frontend.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/random-phrase", post(random_phrase_handler))
        .route("/api/translation-suggestions", post(translation_suggestions_handler))
        .route(
            "/api/profile",
            get(profile::get_profile).put(profile::put_profile),
        )
        .route(
            "/api/word-pairs",
            get(word_pairs::list_word_pairs).post(word_pairs::create_word_pair),
        )
        .route(
            "/api/word-pairs/:id",
            get(word_pairs::get_word_pair)
                .patch(word_pairs::update_word_pair)
                .delete(word_pairs::delete_word_pair),
        )
        .route("/api/word-pairs/:id/practice", post(word_pairs::practice_word_pair))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// GET /health, liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

const WORDS_REQUIRED: &str = "Request body must include 'words' array";
const WORDS_NON_EMPTY: &str = "'words' must be a non-empty array";

/// Pull the `words` list out of a raw request body.
fn parse_words(body: &[u8]) -> Result<Vec<String>, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::bad_request(WORDS_REQUIRED))?;
    let words = value
        .get("words")
        .ok_or_else(|| ApiError::bad_request(WORDS_REQUIRED))?
        .as_array()
        .filter(|w| !w.is_empty())
        .ok_or_else(|| ApiError::bad_request(WORDS_NON_EMPTY))?;

    words
        .iter()
        .map(|w| w.as_str().map(String::from))
        .collect::<Option<Vec<String>>>()
        .ok_or_else(|| ApiError::bad_request(WORDS_NON_EMPTY))
}

/// POST /api/random-phrase
///
/// Request:  `{"words": ["word1", "word2", ...]}`
/// Response: `{"phrase": "...", "words": [...]}` with the words actually used.
async fn random_phrase_handler(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PhraseOutput>, ApiError> {
    let words = parse_words(&body)?;
    let profile = state.profile_or_default(&session).await.unwrap_or_default();

    let request = PhraseRequest {
        words,
        user_context: profile.context.unwrap_or_default(),
        native_language: profile.native_language,
        target_language: profile.target_language,
    };

    let output = generate_random_phrase(state.llm.clone(), &request, state.project_name.as_deref())
        .await
        .map_err(|e| ApiError::Internal(format!("An error occurred: {}", e)))?;
    Ok(Json(output))
}

#[derive(Debug, Deserialize)]
struct TranslationBody {
    word: String,
    #[serde(default)]
    source_language: Option<String>,
    #[serde(default)]
    target_language: Option<String>,
}

fn language_param(name: &str, code: Option<String>) -> Result<Option<String>, ApiError> {
    match code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()) {
        Some(c) if !is_valid_language_code(&c) => Err(ApiError::bad_request(format!(
            "'{}' must be a language code such as 'en' or 'pt-BR'",
            name
        ))),
        other => Ok(other),
    }
}

/// POST /api/translation-suggestions
///
/// Request:  `{"word": "...", "source_language"?: "en", "target_language"?: "es"}`
/// Response: `{"word": "...", "suggestions": [{"translation", "confidence", "context"}, ...]}`
///
/// Missing languages default to the profile's native and target language.
async fn translation_suggestions_handler(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    body: Result<Json<TranslationBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let word = body.word.trim().to_string();
    if word.is_empty() {
        return Err(ApiError::bad_request("'word' must be a non-empty string"));
    }
    if word.chars().count() > MAX_WORD_CHARS {
        return Err(ApiError::bad_request(format!(
            "'word' must be at most {} characters",
            MAX_WORD_CHARS
        )));
    }
    let mut source_language = language_param("source_language", body.source_language)?;
    let mut target_language = language_param("target_language", body.target_language)?;

    if source_language.is_none() || target_language.is_none() {
        if let Some(profile) = state.profile_or_default(&session).await {
            source_language = source_language.or(profile.native_language);
            target_language = target_language.or(profile.target_language);
        }
    }

    let request = TranslationRequest {
        word: word.clone(),
        source_language,
        target_language,
    };
    let output = suggest_translations(state.llm.clone(), &request, state.project_name.as_deref())
        .await
        .map_err(|e| ApiError::Internal(format!("An error occurred: {}", e)))?;

    Ok(Json(json!({
        "word": word,
        "suggestions": output.suggestions,
    })))
}
