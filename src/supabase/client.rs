//! Minimal Supabase client: GoTrue user lookup and a PostgREST query
//! builder.
//!
//! Every request carries the project's anon key as `apikey`. Table queries
//! made with [`QueryBuilder::auth`] also carry the user's bearer token, so
//! row-level security policies apply to them.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::vocab::models::AuthUser;

/// Request timeout for backend calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

#[derive(Debug, Error)]
pub enum SupabaseError {
    /// GoTrue rejected the token.
    #[error("{0}")]
    Auth(String),

    /// `single()` matched no row.
    #[error("no matching row")]
    NotFound,

    /// Non-2xx from PostgREST.
    #[error("{status}: {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Client for one Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    url: String,
    anon_key: String,
    http: reqwest::Client,
}

impl SupabaseClient {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, SupabaseError> {
        let http = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            http,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn auth_endpoint(&self) -> String {
        format!("{}/auth/v1/user", self.url)
    }

    fn rest_endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    /// Verify `token` and return its user.
    pub async fn get_user(&self, token: &str) -> Result<AuthUser, SupabaseError> {
        let response = self
            .http
            .get(self.auth_endpoint())
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            log::debug!("GoTrue rejected token: {} {}", status, text);
            return Err(SupabaseError::Auth(error_message(&text, status)));
        }
        serde_json::from_str(&text).map_err(|e| SupabaseError::Decode(e.to_string()))
    }

    /// Start a query on `table`.
    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder {
            client: self,
            table: table.to_string(),
            token: None,
            params: Vec::new(),
            single: false,
        }
    }
}

/// A PostgREST request under construction.
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    client: &'a SupabaseClient,
    table: String,
    token: Option<String>,
    params: Vec<(String, String)>,
    single: bool,
}

impl<'a> QueryBuilder<'a> {
    /// Run the query as the user owning `token`.
    pub fn auth(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    /// Filter `column = value`.
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_string(), format!("{}.{}", column, direction)));
        self
    }

    /// Expect exactly one row; zero rows is [`SupabaseError::NotFound`].
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.params
    }

    pub async fn get<T: DeserializeOwned>(self) -> Result<T, SupabaseError> {
        let request = self.request(Method::GET);
        self.send(request).await
    }

    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(self, body: &B) -> Result<T, SupabaseError> {
        let request = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(body);
        self.send(request).await
    }

    /// Insert or merge on the `on_conflict` columns.
    pub async fn upsert<B: Serialize + ?Sized, T: DeserializeOwned>(
        mut self,
        body: &B,
        on_conflict: &str,
    ) -> Result<T, SupabaseError> {
        self.params
            .push(("on_conflict".to_string(), on_conflict.to_string()));
        let request = self
            .request(Method::POST)
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .json(body);
        self.send(request).await
    }

    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(self, body: &B) -> Result<T, SupabaseError> {
        let request = self
            .request(Method::PATCH)
            .header("Prefer", "return=representation")
            .json(body);
        self.send(request).await
    }

    /// Delete the matched rows and return them.
    pub async fn delete<T: DeserializeOwned>(self) -> Result<T, SupabaseError> {
        let request = self
            .request(Method::DELETE)
            .header("Prefer", "return=representation");
        self.send(request).await
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let mut request = self
            .client
            .http
            .request(method, self.client.rest_endpoint(&self.table))
            .header("apikey", &self.client.anon_key)
            .query(&self.params);
        request = match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request.bearer_auth(&self.client.anon_key),
        };
        if self.single {
            request = request.header("Accept", SINGLE_OBJECT);
        }
        request
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SupabaseError> {
        log::debug!("PostgREST {} {:?}", self.table, self.params);
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // PostgREST answers 406 when a single-object request matches no rows.
            if self.single && status == StatusCode::NOT_ACCEPTABLE {
                return Err(SupabaseError::NotFound);
            }
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: error_message(&text, status),
            });
        }

        serde_json::from_str(&text).map_err(|e| SupabaseError::Decode(e.to_string()))
    }
}

/// Best human-readable message in a GoTrue or PostgREST error body.
fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(String::from))
        })
        .unwrap_or_else(|| match body.trim() {
            "" => status.to_string(),
            text => text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_stub::StubServer;
    use serde_json::json;

    fn client() -> SupabaseClient {
        SupabaseClient::new("http://127.0.0.1:54321/", "anon").unwrap()
    }

    #[test]
    fn test_endpoints() {
        let c = client();
        assert_eq!(c.url(), "http://127.0.0.1:54321");
        assert_eq!(c.auth_endpoint(), "http://127.0.0.1:54321/auth/v1/user");
        assert_eq!(c.rest_endpoint("word_pairs"), "http://127.0.0.1:54321/rest/v1/word_pairs");
    }

    #[test]
    fn test_query_params() {
        let c = client();
        let query = c
            .from("word_pairs")
            .auth("tok")
            .select("*")
            .eq("mastered", true)
            .order("created_at", false);
        let params: Vec<(&str, &str)> = query
            .query_params()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            params,
            [("select", "*"), ("mastered", "eq.true"), ("order", "created_at.desc")]
        );
    }

    #[test]
    fn test_single_sets_accept_header() {
        let c = client();
        let request = c
            .from("profiles")
            .auth("user-token")
            .eq("id", "abc")
            .single()
            .request(Method::GET)
            .build()
            .unwrap();
        assert_eq!(request.headers()["Accept"], SINGLE_OBJECT);
        assert_eq!(request.headers()["apikey"], "anon");
        assert_eq!(request.headers()["Authorization"], "Bearer user-token");
        assert_eq!(request.url().query(), Some("id=eq.abc"));
    }

    #[test]
    fn test_error_message() {
        let status = StatusCode::UNAUTHORIZED;
        assert_eq!(error_message(r#"{"msg": "invalid JWT"}"#, status), "invalid JWT");
        assert_eq!(
            error_message(r#"{"code": "42501", "message": "permission denied"}"#, status),
            "permission denied"
        );
        assert_eq!(error_message("gateway down", status), "gateway down");
        assert_eq!(error_message("", status), "401 Unauthorized");
    }

    #[tokio::test]
    async fn test_get_user() {
        let id = uuid::Uuid::new_v4();
        let stub = StubServer::start([(200, json!({"id": id, "email": "a@example.com"}).to_string())]).await;
        let user = SupabaseClient::new(&stub.url, "anon")
            .unwrap()
            .get_user("user-token")
            .await
            .unwrap();
        assert_eq!(user.id, id);

        let request = &stub.requests()[0];
        assert_eq!(request.path, "/auth/v1/user");
        assert_eq!(request.header("apikey"), Some("anon"));
        assert_eq!(request.header("authorization"), Some("Bearer user-token"));
    }

    #[tokio::test]
    async fn test_get_user_rejected() {
        let stub = StubServer::start([(401, r#"{"msg": "invalid JWT"}"#)]).await;
        let err = SupabaseClient::new(&stub.url, "anon")
            .unwrap()
            .get_user("expired")
            .await
            .unwrap_err();
        assert!(matches!(err, SupabaseError::Auth(m) if m == "invalid JWT"));
    }

    #[tokio::test]
    async fn test_insert_returns_representation() {
        let stub = StubServer::start([(201, r#"{"id": 7}"#)]).await;
        let c = SupabaseClient::new(&stub.url, "anon").unwrap();
        let row: Value = c
            .from("word_pairs")
            .auth("tok")
            .single()
            .insert(&json!({"source_word": "dog"}))
            .await
            .unwrap();
        assert_eq!(row["id"], 7);

        let request = &stub.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/rest/v1/word_pairs");
        assert_eq!(request.header("prefer"), Some("return=representation"));
        assert_eq!(request.header("accept"), Some(SINGLE_OBJECT));
        assert_eq!(request.header("authorization"), Some("Bearer tok"));
        let body: Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body, json!({"source_word": "dog"}));
    }

    #[tokio::test]
    async fn test_upsert_merges_on_conflict_column() {
        let stub = StubServer::start([(201, r#"{"id": "u1"}"#)]).await;
        let c = SupabaseClient::new(&stub.url, "anon").unwrap();
        let _: Value = c
            .from("profiles")
            .auth("tok")
            .select("id,context")
            .single()
            .upsert(&json!({"id": "u1", "context": null}), "id")
            .await
            .unwrap();

        let request = &stub.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.header("prefer"),
            Some("return=representation,resolution=merge-duplicates")
        );
        assert_eq!(request.param("on_conflict"), Some("id"));
        assert_eq!(request.param("select"), Some("id,context"));
    }

    #[tokio::test]
    async fn test_update_and_delete_filters() {
        let stub = StubServer::start([(200, r#"[{"id": 3}]"#)]).await;
        let c = SupabaseClient::new(&stub.url, "anon").unwrap();
        let _: Value = c
            .from("word_pairs")
            .auth("tok")
            .eq("id", 3)
            .eq("times_practiced", 2)
            .update(&json!({"times_practiced": 3}))
            .await
            .unwrap();
        let deleted: Vec<Value> = c
            .from("word_pairs")
            .auth("tok")
            .select("id")
            .eq("id", 3)
            .delete()
            .await
            .unwrap();
        assert_eq!(deleted.len(), 1);

        let requests = stub.requests();
        assert_eq!(requests[0].method, Method::PATCH);
        assert_eq!(requests[0].header("prefer"), Some("return=representation"));
        assert_ne!(requests[0].header("accept"), Some(SINGLE_OBJECT));
        assert_eq!(
            requests[0].query,
            [
                ("id".to_string(), "eq.3".to_string()),
                ("times_practiced".to_string(), "eq.2".to_string())
            ]
        );
        assert_eq!(requests[1].method, Method::DELETE);
        assert_eq!(requests[1].header("prefer"), Some("return=representation"));
        assert_eq!(requests[1].param("select"), Some("id"));
    }

    #[tokio::test]
    async fn test_single_without_rows_is_not_found() {
        let stub = StubServer::start([(
            406,
            r#"{"code": "PGRST116", "message": "JSON object requested, multiple (or no) rows returned"}"#,
        )])
        .await;
        let c = SupabaseClient::new(&stub.url, "anon").unwrap();

        let err = c.from("profiles").single().get::<Value>().await.unwrap_err();
        assert!(matches!(err, SupabaseError::NotFound));
        assert_eq!(stub.requests()[0].header("authorization"), Some("Bearer anon"));

        let err = c.from("profiles").get::<Value>().await.unwrap_err();
        match err {
            SupabaseError::Api { status, message } => {
                assert_eq!(status, 406);
                assert!(message.starts_with("JSON object requested"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
