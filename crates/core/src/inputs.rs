// Workflow input payloads
//
// Decision: One explicit input struct per workflow type instead of inspecting the
// shape of the argument at runtime.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_WORKFLOW_NAME;

/// Input accepted by `HelloWorkflow`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowInput {
    /// Name to greet (empty falls back to the default)
    pub name: String,

    /// Complete immediately instead of waiting for a signal
    #[serde(default)]
    pub auto_start: bool,
}

impl WorkflowInput {
    /// Input for a manual start that waits for the `update-name` signal
    pub fn manual(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auto_start: false,
        }
    }

    /// Input for an unattended start that completes right away
    pub fn auto_start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auto_start: true,
        }
    }
}

impl Default for WorkflowInput {
    fn default() -> Self {
        Self::manual(DEFAULT_WORKFLOW_NAME)
    }
}

/// Input accepted by `ScheduleWorkflow`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWorkflowInput {
    pub name: String,
}

impl Default for ScheduleWorkflowInput {
    fn default() -> Self {
        Self {
            name: DEFAULT_WORKFLOW_NAME.to_string(),
        }
    }
}

/// Input accepted by `DelayWorkflow`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayWorkflowInput {
    /// Minutes to sleep before waiting for the signal (non-positive means 1)
    pub delay_minutes: i64,

    pub name: String,
}

impl DelayWorkflowInput {
    /// Delay actually applied by the workflow
    pub fn effective_minutes(&self) -> u64 {
        if self.delay_minutes <= 0 {
            1
        } else {
            self.delay_minutes as u64
        }
    }

    /// Sleep applied before the signal wait; saturates instead of overflowing
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.effective_minutes().saturating_mul(60))
    }
}

/// Build the greeting every hello workflow variant completes with
pub fn greeting(name: &str) -> String {
    let name = if name.is_empty() {
        DEFAULT_WORKFLOW_NAME
    } else {
        name
    };
    format!("Hello, {} from Temporal Worker on AWS!", name)
}
