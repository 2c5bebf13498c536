// Engine contract
// Decision: Use trait-based abstraction for the orchestration backend
// This keeps the dispatcher, typed client and schedule manager agnostic to the
// transport (HTTP front or in-process executor).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_WORKFLOW_RUN_TIMEOUT, DEFAULT_WORKFLOW_TIMEOUT};

/// Status of a workflow execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    TimedOut,
    Canceled,
    Terminated,
}

impl ExecutionStatus {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
            Self::TimedOut => write!(f, "TimedOut"),
            Self::Canceled => write!(f, "Canceled"),
            Self::Terminated => write!(f, "Terminated"),
        }
    }
}

/// Options for starting a workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartWorkflowOptions {
    /// Workflow (execution) ID chosen by the caller
    pub id: String,

    /// Task queue the execution is routed to
    pub task_queue: String,

    /// Limit for the whole execution
    #[serde(with = "duration_serde")]
    pub execution_timeout: Duration,

    /// Limit for a single run
    #[serde(with = "duration_serde")]
    pub run_timeout: Duration,
}

impl StartWorkflowOptions {
    /// Options with the default 24h timeouts
    pub fn new(id: impl Into<String>, task_queue: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            task_queue: task_queue.into(),
            execution_timeout: DEFAULT_WORKFLOW_TIMEOUT,
            run_timeout: DEFAULT_WORKFLOW_RUN_TIMEOUT,
        }
    }

    /// Set the execution timeout
    pub fn with_execution_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = timeout;
        self
    }

    /// Set the run timeout
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Limit the run is held to: the earlier of the two timeouts, a zero one
    /// counting as unset (its default)
    pub fn effective_timeout(&self) -> Duration {
        let or_default = |timeout: Duration, default: Duration| {
            if timeout.is_zero() {
                default
            } else {
                timeout
            }
        };
        or_default(self.execution_timeout, DEFAULT_WORKFLOW_TIMEOUT)
            .min(or_default(self.run_timeout, DEFAULT_WORKFLOW_RUN_TIMEOUT))
    }
}

/// Request to start a workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartWorkflowRequest {
    pub workflow_type: String,
    pub input: serde_json::Value,
    pub options: StartWorkflowOptions,
}

/// Identity of a started run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub workflow_id: String,
    pub run_id: String,
}

/// Snapshot of a workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDescription {
    pub workflow_id: String,
    pub run_id: String,
    pub workflow_type: String,
    pub task_queue: String,
    pub status: ExecutionStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub close_time: Option<DateTime<Utc>>,
}

/// Workflow a schedule starts on every firing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleAction {
    /// Base workflow ID; each firing appends its fire time
    pub workflow_id: String,
    pub workflow_type: String,
    pub task_queue: String,
    pub input: serde_json::Value,
}

/// Request to create a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub schedule_id: String,
    pub cron_expression: String,
    pub action: ScheduleAction,
    #[serde(default)]
    pub paused: bool,
}

/// Whether a schedule is firing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleState {
    Active,
    Paused,
}

impl ScheduleState {
    pub fn from_paused(paused: bool) -> Self {
        if paused {
            Self::Paused
        } else {
            Self::Active
        }
    }
}

impl std::fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Paused => write!(f, "Paused"),
        }
    }
}

/// One workflow started by a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleActionResult {
    pub scheduled_at: DateTime<Utc>,
    pub workflow_id: String,
    pub run_id: String,
}

/// Full view of a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDescription {
    pub schedule_id: String,
    pub state: ScheduleState,
    #[serde(default)]
    pub note: Option<String>,
    pub cron_expression: String,
    pub workflow_id: String,
    pub workflow_type: String,
    pub task_queue: String,
    #[serde(default)]
    pub action_count: u64,
    #[serde(default)]
    pub recent_actions: Vec<ScheduleActionResult>,
    #[serde(default)]
    pub next_action_times: Vec<DateTime<Utc>>,
}

/// Summary row returned by schedule listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleListEntry {
    pub schedule_id: String,
    pub state: ScheduleState,
    pub workflow_type: String,
}

/// One page of schedules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePage {
    pub entries: Vec<ScheduleListEntry>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Errors surfaced by the orchestration backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Backend unreachable or timed out
    #[error("connection error: {0}")]
    Connection(String),

    /// Execution, schedule or namespace does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Identity collision on start or create
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Cron expression rejected
    #[error("invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },

    /// Awaited execution closed without completing
    #[error("workflow execution {status}: {cause}")]
    TerminalState {
        status: ExecutionStatus,
        cause: String,
    },

    /// Malformed request (unknown workflow type, undecodable input, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Credentials rejected
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Stable wire code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidCron { .. } => "invalid_cron",
            Self::TerminalState { .. } => "terminal_state",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Unauthorized(_) => "unauthorized",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<crate::cron::CronError> for EngineError {
    fn from(err: crate::cron::CronError) -> Self {
        Self::InvalidCron {
            expression: err.expression,
            reason: err.reason,
        }
    }
}

/// Operations offered by the orchestration backend
///
/// All operations are remote calls from the caller's point of view; errors
/// are the backend's, propagated as-is.
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    /// Start a workflow execution
    async fn start_workflow(&self, request: StartWorkflowRequest)
        -> Result<WorkflowRun, EngineError>;

    /// Deliver a signal to the latest run of a workflow
    async fn signal_workflow(
        &self,
        workflow_id: &str,
        signal_name: &str,
        payload: serde_json::Value,
    ) -> Result<(), EngineError>;

    /// Block until the latest run closes; return its result on completion
    async fn await_result(&self, workflow_id: &str) -> Result<serde_json::Value, EngineError>;

    /// Non-blocking snapshot of the latest run
    async fn describe_workflow(&self, workflow_id: &str)
        -> Result<WorkflowDescription, EngineError>;

    /// Create a schedule
    async fn create_schedule(
        &self,
        request: CreateScheduleRequest,
    ) -> Result<ScheduleDescription, EngineError>;

    /// Fetch one page of schedules
    async fn list_schedules(
        &self,
        page_token: Option<String>,
        page_size: usize,
    ) -> Result<SchedulePage, EngineError>;

    /// Stop a schedule from firing
    async fn pause_schedule(&self, schedule_id: &str, note: Option<String>)
        -> Result<(), EngineError>;

    /// Let a paused schedule fire again
    async fn unpause_schedule(
        &self,
        schedule_id: &str,
        note: Option<String>,
    ) -> Result<(), EngineError>;

    /// Remove a schedule
    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), EngineError>;

    /// Describe a schedule
    async fn describe_schedule(&self, schedule_id: &str)
        -> Result<ScheduleDescription, EngineError>;
}

/// Serde support for Duration (as milliseconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
