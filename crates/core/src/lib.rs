// Hello Workflow Core
//
// Shared building blocks for the hello workflow worker and its client.
//
// Key design decisions:
// - The engine contract (WorkflowEngine) is a trait so the client can run against
//   the HTTP transport or the in-process executor without changes
// - Workflow inputs are explicit typed structs, constructed at the call boundary
// - The greeting is computed in exactly one place and reused by every variant
// - Configuration is an explicit value built once from the environment

pub mod config;
pub mod constants;
pub mod cron;
pub mod engine;
pub mod inputs;
pub mod wire;

// Telemetry (console logging + optional OTLP export)
pub mod telemetry;

// Re-exports for convenience
pub use config::{load_dotenv, ConfigError, EngineConfig};
pub use constants::*;
pub use engine::{
    CreateScheduleRequest, EngineError, ExecutionStatus, ScheduleAction, ScheduleActionResult,
    ScheduleDescription, ScheduleListEntry, SchedulePage, ScheduleState, StartWorkflowOptions,
    StartWorkflowRequest, WorkflowDescription, WorkflowEngine, WorkflowRun,
};
pub use inputs::{greeting, DelayWorkflowInput, ScheduleWorkflowInput, WorkflowInput};
pub use wire::{ErrorResponse, NAMESPACE_HEADER};
