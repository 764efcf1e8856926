//! `/api/profile` handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::server::auth::RequireAuth;
use crate::server::error::ApiError;
use crate::server::routes::AppState;
use crate::vocab::{Profile, ProfileUpdate};

/// GET /api/profile
pub async fn get_profile(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Profile>, ApiError> {
    state
        .store
        .profile(&session)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))
}

/// PUT /api/profile
///
/// Creates the row on first use. Absent fields keep their stored value and
/// `null` clears one.
pub async fn put_profile(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    let Json(update) = body?;
    let update = update.validated()?;
    let profile = state.store.upsert_profile(&session, &update).await?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use crate::server::testing::{send, TestApp};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_profile_lifecycle() {
        let app = TestApp::new(Vec::<String>::new());
        let auth = Some("Bearer alice");

        let (status, json) = send(app.router(), "GET", "/api/profile", auth, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Profile not found");

        let (status, json) = send(
            app.router(),
            "PUT",
            "/api/profile",
            auth,
            Some(json!({"context": "Chef", "target_language": "fr"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], app.alice.id.to_string());
        assert_eq!(json["target_language"], "fr");

        let (_, json) = send(
            app.router(),
            "PUT",
            "/api/profile",
            auth,
            Some(json!({"native_language": "de"})),
        )
        .await;
        assert_eq!(json["context"], "Chef");
        assert_eq!(json["native_language"], "de");

        let (status, json) = send(app.router(), "GET", "/api/profile", auth, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["target_language"], "fr");

        let (status, _) = send(app.router(), "GET", "/api/profile", Some("Bearer bob"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_fields_can_be_cleared() {
        let app = TestApp::new(Vec::<String>::new());
        let auth = Some("Bearer alice");
        send(
            app.router(),
            "PUT",
            "/api/profile",
            auth,
            Some(json!({"context": "Chef", "native_language": "de", "target_language": "fr"})),
        )
        .await;

        let (status, json) = send(
            app.router(),
            "PUT",
            "/api/profile",
            auth,
            Some(json!({"context": null, "target_language": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["context"].is_null());
        assert!(json["target_language"].is_null());
        assert_eq!(json["native_language"], "de");
    }

    #[tokio::test]
    async fn test_profile_validation() {
        let app = TestApp::new(Vec::<String>::new());
        let (status, json) = send(
            app.router(),
            "PUT",
            "/api/profile",
            Some("Bearer alice"),
            Some(json!({"native_language": "English"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("native_language"));
    }
}
