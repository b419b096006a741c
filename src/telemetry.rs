//! OpenTelemetry pipeline initialization.
//!
//! Sets up tracing-subscriber plus, when an OTLP endpoint is configured,
//! a batch span pipeline behind an [`OtelExporter`]. Without an endpoint
//! the library degrades silently: fmt logging only and a [`NoopExporter`]
//! that span sources can still be wired to.

use std::sync::Arc;

use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_semantic_conventions::attribute::SERVICE_VERSION;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::export::otel::OtelExporter;
use crate::export::{NoopExporter, SpanExporter};

/// Configuration for telemetry initialization.
pub struct TelemetryConfig {
    /// Optional OTLP endpoint (e.g. "http://localhost:4317").
    /// When `None`, spans are not exported anywhere.
    pub endpoint: Option<String>,
    /// The service name reported in telemetry signals.
    pub service_name: String,
    /// The service version reported in the resource.
    pub service_version: String,
    /// Source names the runtime will export; `None` exports all.
    pub source_allowlist: Option<Vec<String>>,
}

impl From<&Config> for TelemetryConfig {
    fn from(config: &Config) -> Self {
        TelemetryConfig {
            endpoint: config.otel_endpoint.clone(),
            service_name: config.service_name.clone(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            source_allowlist: config.source_allowlist.clone(),
        }
    }
}

/// Guard that shuts down the OTel pipeline on drop.
///
/// Must be held for the lifetime of the application; dropping it flushes
/// and shuts down the span pipeline. Also hands out the process-wide
/// exporter that span sources are constructed with.
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    exporter: Arc<dyn SpanExporter>,
}

impl TelemetryGuard {
    /// The exporter to wire [`crate::SpanSource`] instances to.
    pub fn exporter(&self) -> Arc<dyn SpanExporter> {
        self.exporter.clone()
    }

    /// Force-flush the span pipeline.
    ///
    /// Useful in tests to ensure data is exported before querying backends.
    pub fn force_flush(&self) {
        if let Some(ref provider) = self.tracer_provider {
            let _ = provider.force_flush();
        }
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            let _ = provider.shutdown();
        }
    }
}

/// Initialize logging and the span export pipeline.
///
/// Returns a guard that must be held for the lifetime of the application.
///
/// # Errors
///
/// Returns an error if the OTLP exporter fails to build or the tracing
/// subscriber cannot be initialized (e.g. if one was already set).
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(endpoint) = config.endpoint {
        use opentelemetry_otlp::WithExportConfig as _;

        let resource = opentelemetry_sdk::Resource::builder()
            .with_service_name(config.service_name)
            .with_attribute(KeyValue::new(SERVICE_VERSION, config.service_version))
            .build();

        let span_exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&endpoint)
            .build()
            .map_err(|e| Error::Telemetry(format!("failed to create OTLP span exporter: {e}")))?;

        let tracer_provider = SdkTracerProvider::builder()
            .with_batch_exporter(span_exporter)
            .with_resource(resource)
            .build();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()
            .map_err(|e| Error::Telemetry(format!("failed to init tracing subscriber: {e}")))?;

        let exporter: Arc<dyn SpanExporter> = Arc::new(OtelExporter::new(
            tracer_provider.clone(),
            config.source_allowlist,
        ));

        Ok(TelemetryGuard {
            tracer_provider: Some(tracer_provider),
            exporter,
        })
    } else {
        // No OTLP endpoint — fmt logging only, spans go nowhere.
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| Error::Telemetry(format!("failed to init tracing subscriber: {e}")))?;

        Ok(TelemetryGuard {
            tracer_provider: None,
            exporter: Arc::new(NoopExporter),
        })
    }
}
