//! Bearer-token authentication for `/api` routes.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::server::error::ApiError;
use crate::server::routes::AppState;
use crate::vocab::Session;

/// Extractor that verifies the caller's token with the store.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Session);

/// Token part of an `Authorization` header value.
///
/// `Bearer <token>` yields `<token>`; a value without a space is taken as
/// the token itself.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = if header.contains(' ') {
        header.split(' ').nth(1).unwrap_or_default()
    } else {
        header
    };
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|v| v.to_str().unwrap_or_default())
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::unauthorized("Authorization header is required"))?;

        let token = bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Invalid authorization header format"))?;

        let user = state.store.authenticate(token).await.map_err(|e| {
            log::debug!("Token rejected: {}", e);
            ApiError::unauthorized(format!("Authentication failed: {}", e))
        })?;

        tracing::debug!(user_id = %user.id, "authenticated");
        Ok(RequireAuth(Session {
            user,
            token: token.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("abc"), Some("abc"));
        assert_eq!(bearer_token("Token abc extra"), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer  abc"), None);
    }
}
