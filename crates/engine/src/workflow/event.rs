//! Workflow events recorded per run

use serde::{Deserialize, Serialize};

use super::{SignalOutcome, WorkflowError, WorkflowSignal};

/// Events appended to a run's history
///
/// The history is append-only and kept for inspection and debugging; the
/// engine never replays it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    // =========================================================================
    // Workflow Lifecycle Events
    // =========================================================================
    /// Workflow was started with the given input
    WorkflowStarted {
        workflow_type: String,
        task_queue: String,
        input: serde_json::Value,
    },

    /// Workflow completed successfully
    WorkflowCompleted { result: serde_json::Value },

    /// Workflow failed with an error
    WorkflowFailed { error: WorkflowError },

    /// Workflow was canceled by request
    WorkflowCanceled { reason: String },

    /// Execution or run timeout elapsed
    WorkflowTimedOut { timeout_ms: u64 },

    /// Workflow was terminated without running any workflow code
    WorkflowTerminated { reason: String },

    // =========================================================================
    // Timer Events
    // =========================================================================
    /// Timer was started
    TimerStarted {
        timer_id: String,

        /// Duration in milliseconds
        duration_ms: u64,
    },

    /// Timer fired (duration elapsed)
    TimerFired { timer_id: String },

    // =========================================================================
    // Signal Events
    // =========================================================================
    /// Workflow suspended waiting for a signal
    SignalWaitStarted {
        signal_name: String,
        timeout_ms: Option<u64>,
    },

    /// External signal arrived (buffered until consumed)
    SignalReceived { signal: WorkflowSignal },

    /// A signal wait was resolved
    SignalWaitResolved {
        signal_name: String,
        #[serde(flatten)]
        outcome: SignalOutcome,
    },
}

impl WorkflowEvent {
    /// Check if this is a terminal workflow event
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::WorkflowCompleted { .. }
                | Self::WorkflowFailed { .. }
                | Self::WorkflowCanceled { .. }
                | Self::WorkflowTimedOut { .. }
                | Self::WorkflowTerminated { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workflow_event_serialization() {
        let event = WorkflowEvent::WorkflowStarted {
            workflow_type: "HelloWorkflow".to_string(),
            task_queue: "hello".to_string(),
            input: json!({"name": "Ada"}),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"workflow_started\""));

        let parsed: WorkflowEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }

    #[test]
    fn test_wait_resolved_serialization() {
        let event = WorkflowEvent::SignalWaitResolved {
            signal_name: "update-name".to_string(),
            outcome: SignalOutcome::Canceled,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "signal_wait_resolved");
        assert_eq!(json["outcome"], "canceled");
    }

    #[test]
    fn test_is_terminal() {
        assert!(WorkflowEvent::WorkflowCompleted { result: json!({}) }.is_terminal());
        assert!(WorkflowEvent::WorkflowFailed {
            error: WorkflowError::new("error")
        }
        .is_terminal());
        assert!(WorkflowEvent::WorkflowCanceled {
            reason: "canceled".to_string()
        }
        .is_terminal());
        assert!(WorkflowEvent::WorkflowTimedOut { timeout_ms: 1 }.is_terminal());
        assert!(WorkflowEvent::WorkflowTerminated {
            reason: "admin".to_string()
        }
        .is_terminal());

        assert!(!WorkflowEvent::TimerFired {
            timer_id: "delay".to_string()
        }
        .is_terminal());
    }
}
