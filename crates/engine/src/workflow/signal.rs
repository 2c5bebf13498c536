//! Workflow signals for external communication

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External signal delivered to a running workflow
///
/// Signals are buffered per run in arrival order and handed to the workflow
/// when it waits on a matching name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowSignal {
    /// Signal name
    pub signal_type: String,

    /// Signal payload (JSON)
    pub payload: serde_json::Value,

    /// When the signal was sent
    pub sent_at: DateTime<Utc>,
}

impl WorkflowSignal {
    /// Create a new signal
    pub fn new(signal_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            signal_type: signal_type.into(),
            payload,
            sent_at: Utc::now(),
        }
    }

    /// Payload as a string, if it is one
    pub fn payload_str(&self) -> Option<&str> {
        self.payload.as_str()
    }
}

/// What resolved a signal wait
///
/// Exactly one outcome is delivered per wait; the first arrival wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SignalOutcome {
    /// A matching signal arrived
    Received(WorkflowSignal),

    /// The wait's own timeout, or the execution timeout, elapsed first
    TimedOut,

    /// The execution was canceled while waiting
    Canceled,
}

impl SignalOutcome {
    /// The delivered signal, if any
    pub fn signal(&self) -> Option<&WorkflowSignal> {
        match self {
            Self::Received(signal) => Some(signal),
            Self::TimedOut | Self::Canceled => None,
        }
    }
}
