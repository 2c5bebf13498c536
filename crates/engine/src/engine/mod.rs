//! Workflow execution engine
//!
//! The engine module provides the `WorkflowExecutor` which drives workflow
//! state machines, runs cron schedules and implements `WorkflowEngine` for
//! in-process callers.

mod executor;
mod registry;
mod scheduler;
mod service;

pub use executor::{ExecutorConfig, ExecutorError, WorkflowExecutor};
pub use registry::{AnyWorkflow, RegistryError, WorkflowFactory, WorkflowRegistry};
