//! Scripted HTTP server on `127.0.0.1:0` for client tests.
//!
//! Answers every request with the next scripted reply (the last one repeats)
//! and records what it received.

use std::collections::VecDeque;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use parking_lot::Mutex;

/// One request as the stub saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    /// Decoded query pairs, in order.
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Default)]
struct Script {
    replies: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

async fn reply(
    State(script): State<Script>,
    method: Method,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    script.requests.lock().push(Recorded {
        method,
        path: uri.path().to_string(),
        query,
        headers,
        body,
    });
    let mut replies = script.replies.lock();
    let (status, body) = if replies.len() > 1 {
        replies.pop_front().unwrap()
    } else {
        replies.front().cloned().unwrap_or((StatusCode::OK, "{}".to_string()))
    };
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

pub struct StubServer {
    pub url: String,
    script: Script,
}

impl StubServer {
    pub async fn start<S: Into<String>>(replies: impl IntoIterator<Item = (u16, S)>) -> Self {
        let script = Script::default();
        script.replies.lock().extend(
            replies
                .into_iter()
                .map(|(status, body)| (StatusCode::from_u16(status).unwrap(), body.into())),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(reply).with_state(script.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("http://{}", addr),
            script,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.script.requests.lock().clone()
    }

    pub fn hits(&self) -> usize {
        self.script.requests.lock().len()
    }
}
