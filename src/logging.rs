use crate::app_env::{self, OtelEndpoints};
use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, global};
use opentelemetry_http::HeaderExtractor;
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::Tracer;
use opentelemetry_sdk::{Resource, runtime};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing::{Span, debug, debug_span, field};
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer, OpenTelemetrySpanExt};
use tracing_subscriber::filter::FromEnvError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, prelude::*, registry};

/// The name of the service as it should appear in OpenTelemetry collectors
const SERVICE_NAME: &str = "task-manager";

/// Struct containing OpenTelemetry primitives which export data to a tracing server
pub struct OtelExporters {
    pub tracer: Tracer,
    pub meter: SdkMeterProvider,
}

/// Attaches a tracing middleware layer to the given router. Each request gets a span
/// parented to any trace context the caller propagated in its headers.
pub fn attach_tracing_http<T>(router: Router<T>) -> Router<T>
where
    T: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new().layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let req_span = debug_span!(
                        "request",
                        method = &request.method().as_str(),
                        path = request.uri().path(),
                        response_status = field::Empty,
                    );

                    req_span.set_parent(global::get_text_map_propagator(|propagator| {
                        propagator.extract(&HeaderExtractor(request.headers()))
                    }));

                    req_span
                })
                .on_response(
                    |response: &Response<Body>, _latency: Duration, span: &Span| {
                        span.record("response_status", field::display(response.status()));
                        debug!("request processing complete");
                    },
                ),
        ),
    )
}

/// Instantiates OpenTelemetry exporters which run in the background and send tracing/metrics
/// data to the configured gRPC endpoints
pub fn init_exporters(endpoints: &OtelEndpoints) -> Result<OtelExporters, anyhow::Error> {
    let span_export = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoints.spans.as_str())
        .build()
        .context("building the span exporter")?;
    let meter_export = MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoints.metrics.as_str())
        .build()
        .context("building the metric exporter")?;

    let metrics_reader = PeriodicReader::builder(meter_export, runtime::Tokio).build();

    let trace_provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(span_export, runtime::Tokio)
        .with_resource(Resource::new([KeyValue::new("service.name", SERVICE_NAME)]))
        .build()
        .tracer(SERVICE_NAME);
    let meter_provider = SdkMeterProvider::builder()
        .with_reader(metrics_reader)
        .with_resource(Resource::new([KeyValue::new("service.name", SERVICE_NAME)]))
        .build();

    Ok(OtelExporters {
        tracer: trace_provider,
        meter: meter_provider,
    })
}

/// Constructs a filter which uses [app_env::LOG_LEVEL] to configure per-module logging. Filters
/// to the "info" level by default.
pub fn init_env_filter() -> Result<EnvFilter, FromEnvError> {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(app_env::LOG_LEVEL)
        .from_env()
}

/// Sets up the global logging and tracing sinks. All spans and metrics at the "debug" level and above
/// go to OpenTelemetry when [otel_exporters] is provided. [env_filter] only applies to the JSON
/// logger printing to stdout.
pub fn setup_logging_and_tracing(
    env_filter: EnvFilter,
    otel_exporters: Option<OtelExporters>,
) -> Result<(), TryInitError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    if let Some(exporters) = otel_exporters {
        registry()
            .with(LevelFilter::DEBUG)
            .with(OpenTelemetryLayer::new(exporters.tracer))
            .with(MetricsLayer::new(exporters.meter))
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_filter(env_filter),
            )
            .try_init()
    } else {
        registry()
            .with(LevelFilter::DEBUG)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_filter(env_filter),
            )
            .try_init()
    }
}
