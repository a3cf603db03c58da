use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::{SpanExporterBuilder, WithExportConfig};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Config, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

pub use opentelemetry_sdk::trace::TracerProvider as TelemetryProvider;

#[derive(Deserialize, Clone)]
pub struct TelemetrySettings {
    pub service_name: String,
    pub otlp_endpoint: Option<String>,
    pub otlp_api_key: Option<Secret<String>>,
    pub dataset_name: Option<String>,
}

/// Compose multiple layers into a tracing subscriber.
///
/// Logs are written as bunyan-formatted JSON to `sink`; spans are also handed to the
/// OpenTelemetry layer backed by `trace_provider`.
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
    trace_provider: &TracerProvider,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name.clone(), sink);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
        .with(tracing_opentelemetry::layer().with_tracer(trace_provider.tracer(name)))
}

/// Register a subscriber as global default to process span data.
///
/// Safe to call more than once: only the first registration wins.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    let _ = LogTracer::init();
    global::set_text_map_propagator(TraceContextPropagator::new());

    let _ = set_global_default(subscriber);
}

/// Build the tracer provider for this process.
///
/// Without an OTLP endpoint the provider records spans but exports nothing.
pub fn init_tracer(
    trace_config: &TelemetrySettings,
) -> Result<TracerProvider, opentelemetry::trace::TraceError> {
    let resource_config = Config::default().with_resource(Resource::new(vec![KeyValue::new(
        opentelemetry_semantic_conventions::resource::SERVICE_NAME,
        trace_config.service_name.clone(),
    )]));

    let Some(endpoint) = trace_config.otlp_endpoint.as_ref() else {
        return Ok(TracerProvider::builder()
            .with_config(resource_config)
            .build());
    };

    let span_exporter = opentelemetry_otlp::new_exporter()
        .http()
        .with_endpoint(endpoint.clone())
        .with_http_client(reqwest::Client::default())
        .with_headers(exporter_headers(trace_config))
        .with_timeout(std::time::Duration::from_secs(2));

    let exporter = SpanExporterBuilder::Http(span_exporter).build_span_exporter()?;

    Ok(TracerProvider::builder()
        .with_config(resource_config)
        .with_batch_exporter(exporter, runtime::Tokio)
        .build())
}

/// Push buffered spans out before the Lambda sandbox is frozen.
///
/// `force_flush` blocks until the batch task has exported, so on a multi-threaded
/// runtime the current worker hands its other tasks off first.
pub fn flush(tracer_provider: &TracerProvider) {
    let on_worker_thread = Handle::try_current()
        .map(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread)
        .unwrap_or(false);

    let results = if on_worker_thread {
        tokio::task::block_in_place(|| tracer_provider.force_flush())
    } else {
        tracer_provider.force_flush()
    };

    for result in results {
        if let Err(e) = result {
            tracing::warn!(error.message = %e, "Failed to flush spans");
        }
    }
}

fn exporter_headers(trace_config: &TelemetrySettings) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    if let Some(dataset) = &trace_config.dataset_name {
        headers.insert("x-honeycomb-dataset".to_string(), dataset.clone());
    }
    if let Some(api_key) = &trace_config.otlp_api_key {
        headers.insert(
            "x-honeycomb-team".to_string(),
            api_key.expose_secret().to_string(),
        );
    }
    headers
}
