// Workflow, signal and timeout constants shared by worker and client

use std::time::Duration;

use chrono::Utc;

/// Workflow type of the signal-gated (or auto-start) hello workflow
pub const WORKFLOW_NAME: &str = "HelloWorkflow";

/// Workflow type started by schedule triggers
pub const SCHEDULE_WORKFLOW_NAME: &str = "ScheduleWorkflow";

/// Workflow type of the delay-then-signal workflow
pub const DELAY_WORKFLOW_NAME: &str = "DelayWorkflow";

/// Prefix for generated workflow IDs
pub const WORKFLOW_ID_PREFIX: &str = "hello-workflow-";

/// Name used when the caller supplies none
pub const DEFAULT_WORKFLOW_NAME: &str = "Temporal User";

/// The only signal the hello workflows consume
pub const SIGNAL_UPDATE_NAME: &str = "update-name";

/// Default timeout for a whole workflow execution
pub const DEFAULT_WORKFLOW_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Default timeout for a single workflow run
pub const DEFAULT_WORKFLOW_RUN_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Default timeout for client operations (the result long-poll is exempt)
pub const DEFAULT_CONTEXT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest delay the CLI accepts; the delay must end before the default execution timeout
pub const MAX_DELAY_MINUTES: i64 = (DEFAULT_WORKFLOW_TIMEOUT.as_secs() / 60) as i64 - 1;

/// Workflow ID for an ad-hoc start at the given Unix timestamp
pub fn workflow_id_at(unix_ts: i64) -> String {
    format!("{}{}", WORKFLOW_ID_PREFIX, unix_ts)
}

/// Workflow ID for a delay workflow started at the given Unix timestamp.
///
/// Single dash after the prefix (`hello-workflow-delay-<ts>`), never
/// `hello-workflow--delay-<ts>`; status and signal commands take this ID as printed.
pub fn delay_workflow_id_at(unix_ts: i64) -> String {
    format!("{}delay-{}", WORKFLOW_ID_PREFIX, unix_ts)
}

/// Workflow ID derived from the current Unix time
pub fn new_workflow_id() -> String {
    workflow_id_at(Utc::now().timestamp())
}

/// Delay workflow ID derived from the current Unix time
pub fn new_delay_workflow_id() -> String {
    delay_workflow_id_at(Utc::now().timestamp())
}
