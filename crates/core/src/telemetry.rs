// Telemetry Module
//
// Console logging through tracing-subscriber plus optional OpenTelemetry span export
// over OTLP, shared by the worker and the client binaries.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
    Resource,
};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Configuration for logging and tracing
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name for traces
    pub service_name: String,
    /// Service version
    pub service_version: Option<String>,
    /// OTLP endpoint (e.g., "http://localhost:4317")
    pub otlp_endpoint: Option<String>,
    /// Environment (e.g., "development", "production")
    pub environment: Option<String>,
    /// Whether to enable console logging
    pub enable_console: bool,
    /// Log filter (e.g., "info", "debug", "hello_engine=debug")
    pub log_filter: Option<String>,
    /// Filter used when `log_filter` is unset or invalid
    pub default_filter: String,
    /// Write console logs to stderr instead of stdout
    pub log_to_stderr: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "hello".to_string(),
            service_version: None,
            otlp_endpoint: None,
            environment: None,
            enable_console: true,
            log_filter: None,
            default_filter: "info".to_string(),
            log_to_stderr: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `OTEL_SERVICE_NAME`: Service name (default: "hello")
    /// - `OTEL_SERVICE_VERSION`: Service version
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g., "http://localhost:4317")
    /// - `OTEL_ENVIRONMENT`: Deployment environment
    /// - `RUST_LOG` or `LOG_LEVEL`: Log filter
    pub fn from_env() -> Self {
        Self {
            service_name: std::env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "hello".to_string()),
            service_version: std::env::var("OTEL_SERVICE_VERSION").ok(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .ok()
                .filter(|v| !v.is_empty()),
            environment: std::env::var("OTEL_ENVIRONMENT").ok(),
            enable_console: true,
            log_filter: std::env::var("RUST_LOG")
                .ok()
                .or_else(|| std::env::var("LOG_LEVEL").ok()),
            ..Self::default()
        }
    }

    /// Override the service name when `OTEL_SERVICE_NAME` is not set
    pub fn with_default_service_name(mut self, name: &str) -> Self {
        if std::env::var("OTEL_SERVICE_NAME").is_err() {
            self.service_name = name.to_string();
        }
        self
    }

    /// Set the filter used when no `RUST_LOG`/`LOG_LEVEL` is given
    pub fn with_default_filter(mut self, filter: &str) -> Self {
        self.default_filter = filter.to_string();
        self
    }

    /// Send console logs to stderr, keeping stdout for user-facing output
    pub fn with_stderr(mut self) -> Self {
        self.log_to_stderr = true;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        self.log_filter
            .as_ref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new(&self.default_filter))
    }
}

/// Guard that shuts down the tracer provider when dropped
pub struct TelemetryGuard {
    _provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self._provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shutdown tracer provider: {:?}", e);
            }
        }
    }
}

/// Initialize logging and tracing with the given configuration
///
/// Returns a guard that will shut down the tracer provider when dropped.
/// Keep this guard alive for the lifetime of your application.
pub fn init_telemetry(config: TelemetryConfig) -> TelemetryGuard {
    let mut resource_attrs = vec![KeyValue::new("service.name", config.service_name.clone())];

    if let Some(version) = &config.service_version {
        resource_attrs.push(KeyValue::new("service.version", version.clone()));
    }

    if let Some(env) = &config.environment {
        resource_attrs.push(KeyValue::new("deployment.environment", env.clone()));
    }

    let resource = Resource::builder().with_attributes(resource_attrs).build();

    let filter = config.env_filter();

    let console_layer = if config.enable_console {
        let layer = tracing_subscriber::fmt::layer().with_target(true);
        let layer = if config.log_to_stderr {
            layer.with_writer(std::io::stderr).with_filter(filter).boxed()
        } else {
            layer.with_filter(filter).boxed()
        };
        Some(layer)
    } else {
        None
    };

    let (tracer_provider, otel_layer, otel_status) = if let Some(endpoint) = &config.otlp_endpoint {
        match build_otlp_tracer(endpoint, resource, &config.service_name) {
            Ok((provider, tracer)) => {
                let layer = tracing_opentelemetry::layer().with_tracer(tracer);
                (Some(provider), Some(layer), Some(Ok(endpoint.clone())))
            }
            Err(e) => (None, None, Some(Err(e))),
        }
    } else {
        (None, None, None)
    };

    // try_init so tests and repeated calls don't panic on an installed subscriber
    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(otel_layer)
        .try_init();

    match otel_status {
        Some(Ok(endpoint)) => {
            tracing::info!(endpoint = %endpoint, "OpenTelemetry tracing enabled");
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Failed to initialize OTLP tracer, continuing without tracing");
        }
        None => {
            tracing::debug!("OpenTelemetry tracing disabled: OTEL_EXPORTER_OTLP_ENDPOINT not set");
        }
    }

    TelemetryGuard {
        _provider: tracer_provider,
    }
}

fn build_otlp_tracer(
    endpoint: &str,
    resource: Resource,
    service_name: &str,
) -> Result<(SdkTracerProvider, opentelemetry_sdk::trace::Tracer), String> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| e.to_string())?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .build();

    let tracer = provider.tracer(service_name.to_string());

    Ok((provider, tracer))
}
