// Command surface and dispatch
// Decision: Commands return a serializable Outcome instead of printing, so the
// same result renders as text, JSON or YAML and tests can assert on values.

pub mod schedule;
pub mod workflow;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use hello_core::{
    EngineConfig, ExecutionStatus, ScheduleDescription, ScheduleListEntry, WorkflowEngine,
};
use serde::Serialize;

use crate::client::WorkflowClient;
use crate::error::CliError;
use crate::output::{field, table_header, table_row, OutputFormat};
use crate::schedules::ScheduleManager;

/// Binary name used in printed hints
pub const BIN_NAME: &str = "hello-client";

#[derive(Parser, Debug)]
#[command(name = "hello-client")]
#[command(about = "Start, signal and schedule hello workflows")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, short, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a workflow that waits for an update-name signal
    Start,

    /// Send the update-name signal to a workflow
    Signal {
        workflow_id: String,

        /// Replacement name; an empty string keeps the current one
        new_name: String,
    },

    /// Wait for a workflow to finish and print its result
    Get { workflow_id: String },

    /// Print the current status of a workflow
    Status { workflow_id: String },

    /// Start a workflow that sleeps before waiting for a signal
    Delay {
        /// Minutes to sleep (must be positive)
        #[arg(allow_negative_numbers = true)]
        minutes: i64,

        /// Name to greet
        name: Option<String>,
    },

    /// Manage schedules
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleCommand {
    /// Create a cron schedule for the greeting workflow
    Create {
        schedule_id: String,

        /// Cron expression, 5 or 6 fields (e.g. "0 9 * * *")
        cron: String,

        /// Base workflow ID for started runs (generated when omitted)
        workflow_id: Option<String>,
    },

    /// List all schedules
    List,

    /// Stop a schedule from firing
    Pause {
        schedule_id: String,

        #[arg(long)]
        note: Option<String>,
    },

    /// Let a paused schedule fire again
    Resume {
        schedule_id: String,

        #[arg(long)]
        note: Option<String>,
    },

    /// Delete a schedule
    Delete { schedule_id: String },

    /// Show a schedule's state and bound workflow
    Describe { schedule_id: String },
}

/// What a command did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Started {
        workflow_id: String,
        run_id: String,
        workflow_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        delay_minutes: Option<i64>,
    },
    Signaled {
        workflow_id: String,
        signal_name: String,
    },
    Result {
        workflow_id: String,
        result: serde_json::Value,
    },
    Status {
        workflow_id: String,
        run_id: String,
        status: ExecutionStatus,
    },
    Schedule {
        schedule: ScheduleDescription,
    },
    Schedules {
        schedules: Vec<ScheduleListEntry>,
    },
    ScheduleUpdated {
        schedule_id: String,
        action: String,
    },
}

impl Outcome {
    pub fn render(&self, format: OutputFormat) -> Result<String, CliError> {
        format.render(self, || self.to_text())
    }

    /// Human-readable rendering
    pub fn to_text(&self) -> String {
        match self {
            Outcome::Started {
                workflow_id,
                run_id,
                workflow_type,
                delay_minutes,
            } => {
                let mut out = String::new();
                out.push_str(&field("Workflow ID", workflow_id));
                out.push_str(&field("Run ID", run_id));
                out.push_str(&field("Type", workflow_type));
                if let Some(minutes) = delay_minutes {
                    out.push_str(&field("Delay", &format!("{} min", minutes)));
                }
                out.push_str("\nNext steps:\n");
                out.push_str(&format!("  {} status {}\n", BIN_NAME, workflow_id));
                out.push_str(&format!("  {} signal {} <new-name>\n", BIN_NAME, workflow_id));
                out.push_str(&format!("  {} get {}\n", BIN_NAME, workflow_id));
                out
            }
            Outcome::Signaled {
                workflow_id,
                signal_name,
            } => format!("Sent '{}' to {}\n", signal_name, workflow_id),
            Outcome::Result { result, .. } => match result {
                serde_json::Value::String(s) => format!("{}\n", s),
                other => format!("{}\n", other),
            },
            Outcome::Status {
                workflow_id,
                run_id,
                status,
            } => {
                let mut out = String::new();
                out.push_str(&field("Workflow ID", workflow_id));
                out.push_str(&field("Run ID", run_id));
                out.push_str(&field("Status", &status.to_string()));
                out.push('\n');
                out.push_str(&status_hint(workflow_id, *status));
                out
            }
            Outcome::Schedule { schedule } => schedule_text(schedule),
            Outcome::Schedules { schedules } => {
                if schedules.is_empty() {
                    return "No schedules found.\n".to_string();
                }
                let mut out = table_header(&[("SCHEDULE ID", 36), ("STATE", 8), ("WORKFLOW", 20)]);
                for entry in schedules {
                    let state = entry.state.to_string();
                    out.push_str(&table_row(&[
                        (&entry.schedule_id, 36),
                        (&state, 8),
                        (&entry.workflow_type, 20),
                    ]));
                }
                out
            }
            Outcome::ScheduleUpdated {
                schedule_id,
                action,
            } => format!("Schedule {} {}\n", schedule_id, action),
        }
    }
}

fn status_hint(workflow_id: &str, status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Running => format!(
            "Still running. Send a name with: {} signal {} <new-name>\n",
            BIN_NAME, workflow_id
        ),
        ExecutionStatus::Completed => {
            format!("Finished. Print the greeting with: {} get {}\n", BIN_NAME, workflow_id)
        }
        _ => "Closed without a greeting.\n".to_string(),
    }
}

fn schedule_text(schedule: &ScheduleDescription) -> String {
    let mut out = String::new();
    out.push_str(&field("Schedule ID", &schedule.schedule_id));
    out.push_str(&field("State", &schedule.state.to_string()));
    out.push_str(&field("Cron", &schedule.cron_expression));
    out.push_str(&field("Workflow ID", &schedule.workflow_id));
    out.push_str(&field("Workflow", &schedule.workflow_type));
    out.push_str(&field("Task queue", &schedule.task_queue));
    if let Some(note) = &schedule.note {
        out.push_str(&field("Note", note));
    }
    out.push_str(&field("Actions", &schedule.action_count.to_string()));
    for (i, at) in schedule.next_action_times.iter().enumerate() {
        let at = at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
        if i == 0 {
            out.push_str(&field("Next runs", &at));
        } else {
            out.push_str(&format!("{:<14} {}\n", "", at));
        }
    }
    out
}

/// Run one command against `engine`
pub async fn execute(
    command: Command,
    engine: Arc<dyn WorkflowEngine>,
    config: &EngineConfig,
) -> Result<Outcome, CliError> {
    match command {
        Command::Start => {
            workflow::start(&WorkflowClient::new(engine, config.task_queue.clone())).await
        }
        Command::Signal {
            workflow_id,
            new_name,
        } => {
            let client = WorkflowClient::new(engine, config.task_queue.clone());
            workflow::signal(&client, &workflow_id, &new_name).await
        }
        Command::Get { workflow_id } => {
            let client = WorkflowClient::new(engine, config.task_queue.clone());
            workflow::get(&client, &workflow_id).await
        }
        Command::Status { workflow_id } => {
            let client = WorkflowClient::new(engine, config.task_queue.clone());
            workflow::status(&client, &workflow_id).await
        }
        Command::Delay { minutes, name } => {
            let client = WorkflowClient::new(engine, config.task_queue.clone());
            workflow::delay(&client, minutes, name).await
        }
        Command::Schedule { command } => {
            let manager = ScheduleManager::new(engine, config.task_queue.clone());
            schedule::run(command, &manager).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_delay_with_negative_minutes() {
        let cli = Cli::try_parse_from(["hello-client", "delay", "-3"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Delay {
                minutes: -3,
                name: None
            }
        );
    }

    #[test]
    fn test_parse_schedule_pause_with_note() {
        let cli = Cli::try_parse_from([
            "hello-client",
            "schedule",
            "pause",
            "nightly",
            "--note",
            "maintenance",
            "-o",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(
            cli.command,
            Command::Schedule {
                command: ScheduleCommand::Pause {
                    schedule_id: "nightly".to_string(),
                    note: Some("maintenance".to_string()),
                }
            }
        );
    }

    #[test]
    fn test_parse_signal_accepts_empty_name() {
        let cli = Cli::try_parse_from(["hello-client", "signal", "wf-1", ""]).unwrap();
        assert_eq!(
            cli.command,
            Command::Signal {
                workflow_id: "wf-1".to_string(),
                new_name: String::new()
            }
        );
    }

    #[test]
    fn test_missing_argument_is_an_error() {
        let err = Cli::try_parse_from(["hello-client", "get"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_status_text_has_hint() {
        let outcome = Outcome::Status {
            workflow_id: "hello-workflow-1".to_string(),
            run_id: "run-1".to_string(),
            status: ExecutionStatus::Running,
        };
        let text = outcome.to_text();
        assert!(text.contains("Status:        Running"));
        assert!(text.contains("hello-client signal hello-workflow-1 <new-name>"));
    }

    #[test]
    fn test_outcome_json_is_tagged() {
        let outcome = Outcome::Signaled {
            workflow_id: "wf-1".to_string(),
            signal_name: "update-name".to_string(),
        };
        let json = outcome.render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["outcome"], "signaled");
        assert_eq!(value["signal_name"], "update-name");
    }
}
