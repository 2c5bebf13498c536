// Hello worker - executor wiring and HTTP serving

use std::future::Future;

use axum::{routing::get, Json, Router};
use hello_core::EngineConfig;
use hello_engine::{ExecutionStore, InMemoryExecutionStore, WorkflowExecutor};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::api::{self, ApiAuth, AppState};
use crate::workflows::{DelayWorkflow, HelloWorkflow, ScheduleWorkflow};

/// Register every hello workflow type on an executor
pub fn register_workflows<S: ExecutionStore>(executor: &WorkflowExecutor<S>) {
    executor.register::<HelloWorkflow>();
    executor.register::<ScheduleWorkflow>();
    executor.register::<DelayWorkflow>();
}

/// Worker process: the executor serving the configured task queue plus its HTTP front
pub struct HelloWorker {
    config: EngineConfig,
    executor: WorkflowExecutor<InMemoryExecutionStore>,
}

impl HelloWorker {
    pub fn new(config: &EngineConfig) -> Self {
        let executor = WorkflowExecutor::new(InMemoryExecutionStore::new());
        register_workflows(&executor);
        executor.serve_task_queue(config.task_queue.clone());

        tracing::info!(
            namespace = %config.namespace,
            task_queue = %config.task_queue,
            "Hello worker ready"
        );

        Self {
            config: config.clone(),
            executor,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn executor(&self) -> &WorkflowExecutor<InMemoryExecutionStore> {
        &self.executor
    }

    /// Full router: `/health` plus the authenticated `/v1` API
    pub fn router(&self) -> Router {
        let state = AppState::new(
            self.executor.clone(),
            ApiAuth {
                api_key: self.config.api_key.clone(),
                namespace: self.config.namespace.clone(),
            },
        );

        Router::new()
            .route("/health", get(health))
            .merge(api::routes(state))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve HTTP on `listener` until `shutdown` resolves.
    ///
    /// The executor is shut down as soon as the signal arrives so in-flight
    /// `/result` long-polls answer instead of holding the graceful drain open.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let executor = self.executor.clone();
        let signal = async move {
            shutdown.await;
            tracing::info!("Stopping workflow executor");
            executor.shutdown().await;
        };

        axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
