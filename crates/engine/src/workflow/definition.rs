//! Workflow trait definition

use serde::{de::DeserializeOwned, Serialize};

use super::{SignalOutcome, WorkflowAction};

/// Error type for workflow failures
#[derive(Debug, Clone, Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct WorkflowError {
    /// Error message
    pub message: String,

    /// Error code for programmatic handling
    pub code: Option<String>,
}

impl WorkflowError {
    /// Create a new workflow error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Set the error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl std::fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WorkflowError {}

/// A workflow is a state machine driven by engine callbacks
///
/// Workflows define:
/// - How to start execution (`on_start`)
/// - How to handle timers (`on_timer_fired`)
/// - How to handle the resolution of a signal wait (`on_signal`)
///
/// Each callback returns the actions the engine should carry out next. The
/// engine runs at most one callback per instance at a time.
///
/// # Example
///
/// ```ignore
/// use hello_engine::prelude::*;
///
/// struct Countdown {
///     remaining: u32,
///     done: bool,
/// }
///
/// impl Workflow for Countdown {
///     const TYPE: &'static str = "Countdown";
///     type Input = u32;
///     type Output = String;
///
///     fn new(input: Self::Input) -> Self {
///         Self { remaining: input, done: false }
///     }
///
///     fn on_start(&mut self) -> Vec<WorkflowAction> {
///         vec![WorkflowAction::timer("tick", Duration::from_secs(1))]
///     }
///
///     // ... implement other methods
/// }
/// ```
pub trait Workflow: Send + Sync + 'static {
    /// Unique type identifier for this workflow
    ///
    /// This is the name clients pass when starting an execution.
    const TYPE: &'static str;

    /// Input type for starting the workflow
    type Input: Serialize + DeserializeOwned + Send + Clone;

    /// Output type when workflow completes successfully
    type Output: Serialize + DeserializeOwned + Send;

    /// Create a new workflow instance from input
    fn new(input: Self::Input) -> Self;

    /// Called once when the execution starts
    ///
    /// Return a list of actions to schedule initial work.
    fn on_start(&mut self) -> Vec<WorkflowAction>;

    /// Called when a timer fires
    fn on_timer_fired(&mut self, timer_id: &str) -> Vec<WorkflowAction> {
        let _ = timer_id;
        vec![]
    }

    /// Called exactly once per `AwaitSignal` with whatever resolved the wait
    fn on_signal(&mut self, outcome: &SignalOutcome) -> Vec<WorkflowAction> {
        let _ = outcome;
        vec![]
    }

    /// Check if workflow has reached a terminal state
    fn is_completed(&self) -> bool;

    /// Get the workflow result (if completed successfully)
    fn result(&self) -> Option<Self::Output>;

    /// Get the workflow error (if failed)
    fn error(&self) -> Option<WorkflowError> {
        None
    }
}
