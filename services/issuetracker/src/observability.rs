//! Observability wiring for the issue tracker.
//!
//! # Purpose
//! Sets up the `tracing` subscriber, W3C trace-context propagation, optional
//! OTLP span export, and the Prometheus recorder behind the `/metrics`
//! listener.
//!
//! # Metrics
//! - `issuetracker_requests_total{op,outcome}`: issue API calls by operation
//!   (`create`, `list`, `update`, `delete`) and outcome.
//! - `issuetracker_issues_total`: issues held by the in-memory store.
//!
//! # Notes
//! Every installer is guarded by a `OnceLock`, so tests and the binary can call
//! [`init_observability`] repeatedly. Spans leave the process only when
//! `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Resource attribute name and the env vars consulted for it, first hit wins.
const RESOURCE_ENV: &[(&str, &[&str])] = &[
    (
        "service.instance.id",
        &["ISSUES_SERVICE_INSTANCE_ID", "HOSTNAME"],
    ),
    ("deployment.environment", &["DEPLOYMENT_ENVIRONMENT"]),
];

static TRACING: OnceLock<()> = OnceLock::new();
static PROPAGATOR: OnceLock<()> = OnceLock::new();
static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install tracing, propagation and the metrics recorder; returns the handle
/// rendered by the metrics listener.
pub fn init_observability(service_name: &str) -> PrometheusHandle {
    install_propagator();
    TRACING.get_or_init(|| init_tracing(service_name));
    install_metrics_recorder()
}

fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());
    let installed = match build_tracer_provider(service_name) {
        Some(provider) => {
            let tracer = provider.tracer(service_name.to_string());
            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()
        }
        None => registry.try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn install_propagator() {
    PROPAGATOR.get_or_init(|| global::set_text_map_propagator(TraceContextPropagator::new()));
}

fn build_tracer_provider(service_name: &str) -> Option<SdkTracerProvider> {
    std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .ok()?;
    let resource = Resource::builder_empty()
        .with_attributes(resource_attributes(service_name))
        .build();
    Some(
        SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .build(),
    )
}

fn resource_attributes(service_name: &str) -> Vec<KeyValue> {
    let mut attrs = vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ];
    for (attribute, vars) in RESOURCE_ENV {
        if let Some(value) = vars.iter().find_map(|var| std::env::var(var).ok()) {
            attrs.push(KeyValue::new(*attribute, value));
        }
    }
    attrs
}

/// Parent context carried by the `traceparent`/`tracestate` request headers.
pub fn trace_context_from_headers(headers: &HeaderMap) -> opentelemetry::Context {
    install_propagator();
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderCarrier(headers)))
}

struct HeaderCarrier<'a>(&'a HeaderMap);

impl Extractor for HeaderCarrier<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

fn install_metrics_recorder() -> PrometheusHandle {
    RECORDER
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::debug!("global metrics recorder already installed");
            }
            describe_issue_metrics();
            handle
        })
        .clone()
}

fn describe_issue_metrics() {
    metrics::describe_counter!(
        "issuetracker_requests_total",
        "Issue API requests by operation and outcome"
    );
    metrics::describe_gauge!(
        "issuetracker_issues_total",
        "Issues held by the in-memory store"
    );
}

pub async fn serve_metrics(handle: PrometheusHandle, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "metrics listening");
    serve_metrics_with_listener(handle, listener, std::future::pending()).await
}

async fn serve_metrics_with_listener<F>(
    handle: PrometheusHandle,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, metrics_router(handle).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
}

fn metrics_router(handle: PrometheusHandle) -> axum::Router {
    axum::Router::new()
        .route("/metrics", axum::routing::get(render_metrics))
        .with_state(handle)
}

async fn render_metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    ([(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], handle.render())
}
