// Hello workflow client
//
// Key design decisions:
// - Commands depend only on the WorkflowEngine trait; the binary plugs in the
//   HTTP transport, tests can plug in the in-process executor
// - Configuration is loaded once in main and passed down
// - Every failure surfaces as a CliError and exit status 1

pub mod client;
pub mod commands;
pub mod error;
pub mod http;
pub mod output;
pub mod schedules;

pub use client::WorkflowClient;
pub use commands::{execute, Cli, Command, Outcome, ScheduleCommand};
pub use error::CliError;
pub use http::HttpEngine;
pub use output::OutputFormat;
pub use schedules::ScheduleManager;
