// Hello Worker
//
// Hosts the hello workflows on the in-process engine and exposes the engine
// over HTTP for the client.
//
// Key design decisions:
// - One greeting state machine; the three workflow types only pick its suspension policy
// - Executor and HTTP front share one process so signals and results need no broker
// - Auth is a bearer API key plus namespace header, both taken from EngineConfig

pub mod api;
pub mod worker;
pub mod workflows;

// Re-export main types
pub use worker::{register_workflows, HelloWorker};
pub use workflows::{
    DelayWorkflow, GreetingMachine, GreetingState, HelloWorkflow, ScheduleWorkflow,
    SuspensionPolicy,
};
