// Workflow and schedule HTTP routes
// Decision: Every /v1 route checks the bearer key and namespace header through an
// extractor, so a handler cannot forget it.

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use hello_core::wire::{
    ErrorResponse, ListSchedulesQuery, NoteRequest, ReasonRequest, ResultResponse, SignalRequest,
    NAMESPACE_HEADER,
};
use hello_core::{
    CreateScheduleRequest, EngineError, ScheduleDescription, SchedulePage, StartWorkflowRequest,
    WorkflowDescription, WorkflowRun,
};
use hello_engine::{ExecutorError, InMemoryExecutionStore, WorkflowEvent, WorkflowExecutor, WorkflowSignal};
use std::sync::Arc;

/// App state for the API routes
#[derive(Clone)]
pub struct AppState {
    pub executor: WorkflowExecutor<InMemoryExecutionStore>,
    pub auth: Arc<ApiAuth>,
}

/// Credentials every `/v1` request must present
#[derive(Debug)]
pub struct ApiAuth {
    pub api_key: String,
    pub namespace: String,
}

impl AppState {
    pub fn new(executor: WorkflowExecutor<InMemoryExecutionStore>, auth: ApiAuth) -> Self {
        Self {
            executor,
            auth: Arc::new(auth),
        }
    }
}

/// Create workflow and schedule routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/workflows", post(start_workflow))
        .route("/v1/workflows/:workflow_id", get(describe_workflow))
        .route("/v1/workflows/:workflow_id/result", get(workflow_result))
        .route("/v1/workflows/:workflow_id/history", get(workflow_history))
        .route(
            "/v1/workflows/:workflow_id/signals/:signal_name",
            post(signal_workflow),
        )
        .route("/v1/workflows/:workflow_id/cancel", post(cancel_workflow))
        .route(
            "/v1/workflows/:workflow_id/terminate",
            post(terminate_workflow),
        )
        .route("/v1/schedules", post(create_schedule).get(list_schedules))
        .route(
            "/v1/schedules/:schedule_id",
            get(describe_schedule).delete(delete_schedule),
        )
        .route("/v1/schedules/:schedule_id/pause", post(pause_schedule))
        .route("/v1/schedules/:schedule_id/unpause", post(unpause_schedule))
        .route("/v1/schedules/:schedule_id/trigger", post(trigger_schedule))
        .with_state(state)
}

// ============================================
// Errors and Auth
// ============================================

/// Engine error rendered as `{error, code, ...}` with a matching status
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl From<ExecutorError> for ApiError {
    fn from(err: ExecutorError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, %status, "request rejected");
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

/// Proof that the request carried the right API key and namespace
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

#[axum::async_trait]
impl FromRequestParts<AppState> for Authorized {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        if token != Some(state.auth.api_key.as_str()) {
            return Err(EngineError::Unauthorized("invalid or missing API key".to_string()).into());
        }

        let namespace = parts
            .headers
            .get(NAMESPACE_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if namespace != state.auth.namespace {
            return Err(EngineError::NotFound(format!("namespace '{}'", namespace)).into());
        }

        Ok(Authorized)
    }
}

// ============================================
// Workflows
// ============================================

/// POST /v1/workflows - Start a workflow execution
async fn start_workflow(
    State(state): State<AppState>,
    _auth: Authorized,
    Json(req): Json<StartWorkflowRequest>,
) -> Result<(StatusCode, Json<WorkflowRun>), ApiError> {
    let run = state.executor.start_workflow(req).await?;
    Ok((StatusCode::CREATED, Json(run)))
}

/// GET /v1/workflows/:workflow_id - Latest run snapshot
async fn describe_workflow(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(workflow_id): Path<String>,
) -> Result<Json<WorkflowDescription>, ApiError> {
    Ok(Json(state.executor.describe(&workflow_id).await?))
}

/// GET /v1/workflows/:workflow_id/result - Wait for the latest run to close
async fn workflow_result(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(workflow_id): Path<String>,
) -> Result<Json<ResultResponse>, ApiError> {
    let result = state.executor.await_result(&workflow_id).await?;
    Ok(Json(ResultResponse { result }))
}

/// GET /v1/workflows/:workflow_id/history - Event history of the latest run
async fn workflow_history(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(workflow_id): Path<String>,
) -> Result<Json<Vec<WorkflowEvent>>, ApiError> {
    Ok(Json(state.executor.history(&workflow_id).await?))
}

/// POST /v1/workflows/:workflow_id/signals/:signal_name - Deliver a signal
async fn signal_workflow(
    State(state): State<AppState>,
    _auth: Authorized,
    Path((workflow_id, signal_name)): Path<(String, String)>,
    Json(req): Json<SignalRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .executor
        .signal(&workflow_id, WorkflowSignal::new(signal_name, req.payload))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/workflows/:workflow_id/cancel - Request cancellation
async fn cancel_workflow(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(workflow_id): Path<String>,
    Json(req): Json<ReasonRequest>,
) -> Result<StatusCode, ApiError> {
    let reason = req.reason.unwrap_or_else(|| "canceled by request".to_string());
    state.executor.cancel(&workflow_id, &reason).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/workflows/:workflow_id/terminate - Terminate immediately
async fn terminate_workflow(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(workflow_id): Path<String>,
    Json(req): Json<ReasonRequest>,
) -> Result<StatusCode, ApiError> {
    let reason = req
        .reason
        .unwrap_or_else(|| "terminated by request".to_string());
    state.executor.terminate(&workflow_id, &reason).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================
// Schedules
// ============================================

/// POST /v1/schedules - Create a schedule
async fn create_schedule(
    State(state): State<AppState>,
    _auth: Authorized,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleDescription>), ApiError> {
    let schedule = state.executor.create_schedule(req).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// GET /v1/schedules - One page of schedules
async fn list_schedules(
    State(state): State<AppState>,
    _auth: Authorized,
    Query(query): Query<ListSchedulesQuery>,
) -> Result<Json<SchedulePage>, ApiError> {
    let page = state
        .executor
        .list_schedules(query.page_token, query.page_size)
        .await?;
    Ok(Json(page))
}

/// GET /v1/schedules/:schedule_id - Describe a schedule
async fn describe_schedule(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(schedule_id): Path<String>,
) -> Result<Json<ScheduleDescription>, ApiError> {
    Ok(Json(state.executor.describe_schedule(&schedule_id).await?))
}

/// DELETE /v1/schedules/:schedule_id - Delete a schedule
async fn delete_schedule(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(schedule_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.executor.delete_schedule(&schedule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/schedules/:schedule_id/pause - Stop firing
async fn pause_schedule(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(schedule_id): Path<String>,
    Json(req): Json<NoteRequest>,
) -> Result<StatusCode, ApiError> {
    state.executor.pause_schedule(&schedule_id, req.note).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/schedules/:schedule_id/unpause - Resume firing
async fn unpause_schedule(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(schedule_id): Path<String>,
    Json(req): Json<NoteRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .executor
        .unpause_schedule(&schedule_id, req.note)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/schedules/:schedule_id/trigger - Fire once now
async fn trigger_schedule(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(schedule_id): Path<String>,
) -> Result<Json<Option<WorkflowRun>>, ApiError> {
    Ok(Json(state.executor.trigger_schedule(&schedule_id).await?))
}
