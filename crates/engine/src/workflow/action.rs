//! Workflow actions

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::WorkflowError;

/// Actions a workflow can request
///
/// These are the commands a workflow issues in response to callbacks.
/// Each action is recorded as a [`WorkflowEvent`](super::WorkflowEvent) when carried out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowAction {
    /// Start a timer that fires after the specified duration
    StartTimer {
        /// Unique identifier for this timer within the workflow
        timer_id: String,

        /// Duration to wait before firing
        #[serde(with = "duration_serde")]
        duration: Duration,
    },

    /// Suspend until a signal with this name arrives (or the wait is resolved otherwise)
    AwaitSignal {
        /// Name of the signal to consume
        signal_name: String,

        /// Resolve the wait as timed out after this long
        #[serde(with = "option_duration_serde")]
        timeout: Option<Duration>,
    },

    /// Complete the workflow successfully with a result
    CompleteWorkflow {
        /// Result value (JSON)
        result: serde_json::Value,
    },

    /// Fail the workflow with an error
    FailWorkflow {
        /// Error details
        error: WorkflowError,
    },

    /// No action (used when event handling doesn't trigger new work)
    None,
}

impl WorkflowAction {
    /// Create a complete workflow action
    pub fn complete(result: serde_json::Value) -> Self {
        Self::CompleteWorkflow { result }
    }

    /// Create a fail workflow action
    pub fn fail(error: WorkflowError) -> Self {
        Self::FailWorkflow { error }
    }

    /// Create a timer action
    pub fn timer(timer_id: impl Into<String>, duration: Duration) -> Self {
        Self::StartTimer {
            timer_id: timer_id.into(),
            duration,
        }
    }

    /// Wait for a signal with no timeout of its own
    pub fn await_signal(signal_name: impl Into<String>) -> Self {
        Self::AwaitSignal {
            signal_name: signal_name.into(),
            timeout: None,
        }
    }

    /// Wait for a signal, giving up after `timeout`
    pub fn await_signal_with_timeout(signal_name: impl Into<String>, timeout: Duration) -> Self {
        Self::AwaitSignal {
            signal_name: signal_name.into(),
            timeout: Some(timeout),
        }
    }

    /// Whether this action closes the workflow
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::CompleteWorkflow { .. } | Self::FailWorkflow { .. }
        )
    }
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

/// Serde support for Option<Duration>
mod option_duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => (d.as_millis() as u64).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis: Option<u64> = Option::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
