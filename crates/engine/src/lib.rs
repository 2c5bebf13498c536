//! # Hello Engine
//!
//! In-process orchestration backend for the hello workflows.
//!
//! ## Features
//!
//! - **State-machine workflows**: workflows return actions from callbacks; the
//!   executor carries them out
//! - **Timers and signal waits**: durable-style suspension on the tokio runtime,
//!   with per-wait and per-execution timeouts
//! - **Cron schedules**: pause, unpause, paging and overlap skipping
//! - **Event history**: every run keeps an append-only event log for inspection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WorkflowExecutor                        │
//! │  (drives workflow state machines, timers, signals, cron)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ExecutionStore                          │
//! │  (in memory: runs, event histories, schedules)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use hello_engine::prelude::*;
//!
//! struct Greeter {
//!     name: String,
//!     done: bool,
//! }
//!
//! impl Workflow for Greeter {
//!     const TYPE: &'static str = "Greeter";
//!     type Input = String;
//!     type Output = String;
//!
//!     fn new(name: Self::Input) -> Self {
//!         Self { name, done: false }
//!     }
//!
//!     fn on_start(&mut self) -> Vec<WorkflowAction> {
//!         vec![WorkflowAction::await_signal("go")]
//!     }
//!
//!     // ... implement other trait methods
//! }
//! ```

pub mod engine;
pub mod persistence;
pub mod workflow;

/// Prelude for common imports
pub mod prelude {
    pub use crate::engine::{ExecutorConfig, ExecutorError, WorkflowExecutor, WorkflowRegistry};
    pub use crate::persistence::{ExecutionStore, InMemoryExecutionStore, StoreError};
    pub use crate::workflow::{
        SignalOutcome, Workflow, WorkflowAction, WorkflowError, WorkflowEvent, WorkflowSignal,
    };
}

// Re-export key types at crate root
pub use engine::{ExecutorConfig, ExecutorError, WorkflowExecutor, WorkflowRegistry};
pub use persistence::{ExecutionStore, InMemoryExecutionStore, StoreError};
pub use workflow::{
    SignalOutcome, Workflow, WorkflowAction, WorkflowError, WorkflowEvent, WorkflowSignal,
};
