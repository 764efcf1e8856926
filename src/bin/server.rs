//! lexicrew HTTP server binary.
//!
//! # Environment Variables
//!
//! - `PORT`: HTTP port (default: 8000)
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY`: Supabase project
//! - `LEXICREW_LLM`: `provider/model` for the crews (default: groq/llama-3.3-70b-versatile)
//! - `GROQ_API_KEY` / `OPENAI_API_KEY`: key for that provider
//! - `CORS_ORIGINS`: comma separated allowed origins
//! - `PHOENIX_PROJECT_NAME`: project name on traced sessions
//! - `PHOENIX_COLLECTOR_ENDPOINT`: OTLP/HTTP collector for traced sessions (optional)
//! - `RUST_LOG`: Tracing filter (default: "info,lexicrew=debug")
//!
//! # Usage
//!
//! ```bash
//! GROQ_API_KEY=... SUPABASE_ANON_KEY=... cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use lexicrew::server::{app_router, AppState};
use lexicrew::supabase::SupabaseClient;
use lexicrew::telemetry::init_tracing;
use lexicrew::utilities::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("invalid configuration")?;
    let telemetry = init_tracing(&settings.log_filter, settings.collector().as_ref());

    let llm = settings.llm().build().context("failed to configure the LLM")?;
    if settings.llm_api_key.is_none() {
        tracing::warn!(
            "No API key set for {}; crew endpoints will fail until one is configured",
            settings.llm_model
        );
    }

    let supabase = SupabaseClient::new(&settings.supabase_url, &settings.supabase_anon_key)
        .context("failed to create the Supabase client")?;

    let state = AppState::new(Arc::new(supabase), llm).with_project_name(settings.project_name.clone());
    let app = app_router(state, &settings.cors_origins);

    let bind_addr = format!("0.0.0.0:{}", settings.port);
    tracing::info!("lexicrew {} starting on {}", lexicrew::VERSION, bind_addr);
    tracing::info!("  Supabase: {}", settings.supabase_url);
    tracing::info!("  LLM:      {}", settings.llm_model);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    tracing::info!("Server stopped");
    tokio::task::spawn_blocking(move || telemetry.shutdown())
        .await
        .context("trace flush failed")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
