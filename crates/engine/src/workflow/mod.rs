//! Workflow abstractions and types
//!
//! This module contains the core workflow primitives:
//! - [`Workflow`] trait for defining workflow state machines
//! - [`WorkflowAction`] enum for workflow commands
//! - [`WorkflowEvent`] enum for the per-run history
//! - [`WorkflowSignal`] and [`SignalOutcome`] for external communication

mod action;
mod definition;
mod event;
mod signal;

pub use action::WorkflowAction;
pub use definition::{Workflow, WorkflowError};
pub use event::WorkflowEvent;
pub use signal::{SignalOutcome, WorkflowSignal};
