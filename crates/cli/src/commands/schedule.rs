// Schedule commands

use futures::TryStreamExt;

use super::{Outcome, ScheduleCommand};
use crate::error::CliError;
use crate::schedules::ScheduleManager;

pub async fn run(command: ScheduleCommand, manager: &ScheduleManager) -> Result<Outcome, CliError> {
    match command {
        ScheduleCommand::Create {
            schedule_id,
            cron,
            workflow_id,
        } => {
            let schedule = manager.create(&schedule_id, &cron, workflow_id).await?;
            Ok(Outcome::Schedule { schedule })
        }
        ScheduleCommand::List => {
            let schedules: Vec<_> = manager.list().try_collect().await?;
            Ok(Outcome::Schedules { schedules })
        }
        ScheduleCommand::Pause { schedule_id, note } => {
            manager.pause(&schedule_id, note).await?;
            Ok(updated(schedule_id, "paused"))
        }
        ScheduleCommand::Resume { schedule_id, note } => {
            manager.resume(&schedule_id, note).await?;
            Ok(updated(schedule_id, "resumed"))
        }
        ScheduleCommand::Delete { schedule_id } => {
            manager.delete(&schedule_id).await?;
            Ok(updated(schedule_id, "deleted"))
        }
        ScheduleCommand::Describe { schedule_id } => {
            let schedule = manager.describe(&schedule_id).await?;
            Ok(Outcome::Schedule { schedule })
        }
    }
}

fn updated(schedule_id: String, action: &str) -> Outcome {
    Outcome::ScheduleUpdated {
        schedule_id,
        action: action.to_string(),
    }
}
