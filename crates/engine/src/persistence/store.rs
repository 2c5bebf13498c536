//! ExecutionStore trait definition

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hello_core::{
    ExecutionStatus, ScheduleAction, ScheduleActionResult, ScheduleState, WorkflowDescription,
};
use serde::{Deserialize, Serialize};

use crate::workflow::WorkflowEvent;

/// Number of recent schedule firings kept per schedule
pub const RECENT_ACTIONS_LIMIT: usize = 10;

/// Error type for store operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// No run with this ID (or no run ever started for this workflow ID)
    #[error("workflow execution not found: {0}")]
    ExecutionNotFound(String),

    /// The latest run for this workflow ID is still running
    #[error("workflow execution already running: {0}")]
    ExecutionAlreadyRunning(String),

    /// Schedule not found
    #[error("schedule not found: {0}")]
    ScheduleNotFound(String),

    /// Schedule ID already taken
    #[error("schedule already exists: {0}")]
    ScheduleAlreadyExists(String),
}

/// One run of a workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub workflow_id: String,
    pub run_id: String,
    pub workflow_type: String,
    pub task_queue: String,
    pub input: serde_json::Value,
    pub status: ExecutionStatus,
    pub start_time: DateTime<Utc>,
    pub close_time: Option<DateTime<Utc>>,

    /// Result on completion
    pub result: Option<serde_json::Value>,

    /// Cause when closed in any non-completed state
    pub failure: Option<String>,
}

impl ExecutionRecord {
    /// A new running execution
    pub fn running(
        workflow_id: impl Into<String>,
        run_id: impl Into<String>,
        workflow_type: impl Into<String>,
        task_queue: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            run_id: run_id.into(),
            workflow_type: workflow_type.into(),
            task_queue: task_queue.into(),
            input,
            status: ExecutionStatus::Running,
            start_time: Utc::now(),
            close_time: None,
            result: None,
            failure: None,
        }
    }

    /// Snapshot handed to clients
    pub fn describe(&self) -> WorkflowDescription {
        WorkflowDescription {
            workflow_id: self.workflow_id.clone(),
            run_id: self.run_id.clone(),
            workflow_type: self.workflow_type.clone(),
            task_queue: self.task_queue.clone(),
            status: self.status,
            start_time: self.start_time,
            close_time: self.close_time,
        }
    }
}

/// A stored schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub schedule_id: String,
    pub cron_expression: String,
    pub action: ScheduleAction,
    pub paused: bool,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub action_count: u64,

    /// Most recent firings, oldest first
    pub recent_actions: Vec<ScheduleActionResult>,
}

impl ScheduleRecord {
    pub fn state(&self) -> ScheduleState {
        ScheduleState::from_paused(self.paused)
    }
}

/// Store for executions, their histories and schedules
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait ExecutionStore: Send + Sync + 'static {
    // =========================================================================
    // Execution Operations
    // =========================================================================

    /// Record a new run and make it the latest for its workflow ID
    ///
    /// Fails with `ExecutionAlreadyRunning` if the current latest run is still running.
    async fn create_execution(&self, record: ExecutionRecord) -> Result<(), StoreError>;

    /// Latest run for a workflow ID
    async fn latest_execution(&self, workflow_id: &str) -> Result<ExecutionRecord, StoreError>;

    /// Run by run ID
    async fn get_execution(&self, run_id: &str) -> Result<ExecutionRecord, StoreError>;

    /// Move a running execution into a terminal state
    ///
    /// Returns `false` (and changes nothing) if the run was already closed.
    async fn close_execution(
        &self,
        run_id: &str,
        status: ExecutionStatus,
        result: Option<serde_json::Value>,
        failure: Option<String>,
    ) -> Result<bool, StoreError>;

    /// Append events to a run's history, returning the new history length
    async fn append_events(
        &self,
        run_id: &str,
        events: Vec<WorkflowEvent>,
    ) -> Result<usize, StoreError>;

    /// Load a run's history
    async fn load_events(&self, run_id: &str) -> Result<Vec<(usize, WorkflowEvent)>, StoreError>;

    // =========================================================================
    // Schedule Operations
    // =========================================================================

    /// Store a new schedule
    async fn create_schedule(&self, record: ScheduleRecord) -> Result<(), StoreError>;

    /// Get a schedule
    async fn get_schedule(&self, schedule_id: &str) -> Result<ScheduleRecord, StoreError>;

    /// Set the paused flag and note
    async fn set_schedule_paused(
        &self,
        schedule_id: &str,
        paused: bool,
        note: Option<String>,
    ) -> Result<(), StoreError>;

    /// Record one firing, keeping the last [`RECENT_ACTIONS_LIMIT`]
    async fn record_schedule_action(
        &self,
        schedule_id: &str,
        action: ScheduleActionResult,
    ) -> Result<(), StoreError>;

    /// Remove a schedule
    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), StoreError>;

    /// One page of schedules in ID order, plus the total count
    async fn list_schedules(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<ScheduleRecord>, usize), StoreError>;
}
