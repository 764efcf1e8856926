//! HTTP server for the vocabulary app.
//!
//! Every `/api` route authenticates the caller through [`auth::RequireAuth`]
//! and answers errors as `{"error": "<message>"}`.

pub mod auth;
pub mod error;
pub mod profile;
pub mod routes;
pub mod word_pairs;

pub use error::ApiError;
pub use routes::{app_router, cors_layer, AppState};
