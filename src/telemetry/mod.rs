//! Tracing setup and traced crew sessions.
//!
//! Library code logs through the `log` facade; [`init_tracing`] installs a
//! `tracing-subscriber` formatter that also captures those records. When a
//! [`Collector`] is configured, spans are also exported over OTLP/HTTP, so
//! traced sessions show up in Phoenix.

use std::future::Future;

use opentelemetry::trace::{TraceError, TracerProvider as _};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{runtime, Resource};
use tracing::Instrument;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,lexicrew=debug";

/// `service.name` of exported spans.
pub const SERVICE_NAME: &str = "lexicrew";

/// OTLP collector receiving traced sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collector {
    /// Collector base URL, e.g. `http://localhost:6006`.
    pub endpoint: String,
    /// Phoenix project the spans are filed under.
    pub project: Option<String>,
}

/// OTLP/HTTP traces URL for a collector base URL.
pub fn traces_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if endpoint.ends_with("/v1/traces") {
        endpoint.to_string()
    } else {
        format!("{}/v1/traces", endpoint)
    }
}

fn otlp_provider(collector: &Collector) -> Result<TracerProvider, TraceError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(traces_endpoint(&collector.endpoint))
        .build()?;

    let mut attributes = vec![KeyValue::new("service.name", SERVICE_NAME)];
    if let Some(ref project) = collector.project {
        attributes.push(KeyValue::new("openinference.project.name", project.clone()));
    }

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(attributes))
        .build())
}

/// Keeps the span exporter alive. Call [`TracingGuard::shutdown`] before
/// exiting so buffered spans are flushed.
#[must_use]
#[derive(Debug)]
pub struct TracingGuard {
    provider: Option<TracerProvider>,
}

impl TracingGuard {
    /// Whether spans are being exported to a collector.
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }

    /// Flush and stop the exporter. Blocks; call it off the async workers.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!("Failed to flush traces: {}", e);
            }
        }
    }
}

/// Install the global subscriber, exporting to `collector` when given.
///
/// Safe to call more than once; later calls are ignored. Must run inside a
/// Tokio runtime when a collector is given.
pub fn init_tracing(filter: &str, collector: Option<&Collector>) -> TracingGuard {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (provider, export_error) = match collector.map(otlp_provider) {
        Some(Ok(provider)) => (Some(provider), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(SERVICE_NAME)));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(otel_layer)
        .try_init()
        .is_ok();

    if let Some(e) = export_error {
        tracing::warn!("Trace export disabled: {}", e);
    }

    match (provider, collector) {
        (Some(provider), Some(collector)) if installed => {
            tracing::info!("Exporting traces to {}", traces_endpoint(&collector.endpoint));
            TracingGuard {
                provider: Some(provider),
            }
        }
        _ => TracingGuard { provider: None },
    }
}

/// Run `fut` inside a new agent session span.
///
/// Each call gets its own `session.id`, so every crew run can be followed
/// on its own in the collected traces.
pub async fn traceable<F, T>(name: &'static str, project: Option<&str>, fut: F) -> T
where
    F: Future<Output = T>,
{
    let session_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "traceable",
        otel.name = name,
        openinference.span.kind = "agent",
        session.id = %session_id,
        project.name = project.unwrap_or_default(),
    );
    log::debug!("Starting session {} for {}", session_id, name);
    fut.instrument(span).await
}
