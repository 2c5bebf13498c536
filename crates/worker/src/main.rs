use anyhow::{Context, Result};
use hello_core::telemetry::{init_telemetry, TelemetryConfig};
use hello_core::{load_dotenv, EngineConfig};
use hello_worker::HelloWorker;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Read .env before telemetry so RUST_LOG and OTEL_* from the file apply
    load_dotenv();

    // Configure via environment variables:
    // - OTEL_SERVICE_NAME: Service name (default: "hello-worker")
    // - OTEL_EXPORTER_OTLP_ENDPOINT: OTLP endpoint (e.g., "http://localhost:4317")
    // - RUST_LOG or LOG_LEVEL: Log filter
    let mut telemetry_config = TelemetryConfig::from_env()
        .with_default_service_name("hello-worker")
        .with_default_filter("hello_worker=info,hello_engine=info,tower_http=info");
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());

    // Keep the guard alive for the lifetime of the application
    let _telemetry_guard = init_telemetry(telemetry_config);

    tracing::info!("hello-worker starting...");

    let config = EngineConfig::from_env().context("Failed to load engine configuration")?;
    let worker = HelloWorker::new(&config);

    let addr = config.listen_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!(
        %addr,
        namespace = %config.namespace,
        task_queue = %config.task_queue,
        "HTTP server listening"
    );

    worker
        .serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await
        .context("Server error")?;

    tracing::info!("Worker shutdown complete");
    Ok(())
}
