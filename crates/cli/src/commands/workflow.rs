// Workflow commands: start, delay, signal, get, status

use chrono::Utc;
use hello_core::{
    delay_workflow_id_at, workflow_id_at, DelayWorkflowInput, WorkflowInput,
    DEFAULT_WORKFLOW_NAME, DELAY_WORKFLOW_NAME, MAX_DELAY_MINUTES, SIGNAL_UPDATE_NAME, WORKFLOW_NAME,
};

use super::Outcome;
use crate::client::WorkflowClient;
use crate::error::CliError;

/// Start the signal-gated workflow with the default name
pub async fn start(client: &WorkflowClient) -> Result<Outcome, CliError> {
    let workflow_id = workflow_id_at(Utc::now().timestamp());
    let run = client
        .start(WORKFLOW_NAME, &WorkflowInput::default(), workflow_id)
        .await?;

    Ok(Outcome::Started {
        workflow_id: run.workflow_id,
        run_id: run.run_id,
        workflow_type: WORKFLOW_NAME.to_string(),
        delay_minutes: None,
    })
}

/// Start the delay-then-signal workflow
pub async fn delay(
    client: &WorkflowClient,
    minutes: i64,
    name: Option<String>,
) -> Result<Outcome, CliError> {
    if !(1..=MAX_DELAY_MINUTES).contains(&minutes) {
        return Err(CliError::Validation(format!(
            "delay minutes must be between 1 and {}, got {}",
            MAX_DELAY_MINUTES, minutes
        )));
    }

    let input = DelayWorkflowInput {
        delay_minutes: minutes,
        name: name.unwrap_or_else(|| DEFAULT_WORKFLOW_NAME.to_string()),
    };
    let workflow_id = delay_workflow_id_at(Utc::now().timestamp());
    let run = client.start(DELAY_WORKFLOW_NAME, &input, workflow_id).await?;

    Ok(Outcome::Started {
        workflow_id: run.workflow_id,
        run_id: run.run_id,
        workflow_type: DELAY_WORKFLOW_NAME.to_string(),
        delay_minutes: Some(minutes),
    })
}

pub async fn signal(
    client: &WorkflowClient,
    workflow_id: &str,
    new_name: &str,
) -> Result<Outcome, CliError> {
    client
        .signal(
            workflow_id,
            SIGNAL_UPDATE_NAME,
            serde_json::Value::String(new_name.to_string()),
        )
        .await?;

    Ok(Outcome::Signaled {
        workflow_id: workflow_id.to_string(),
        signal_name: SIGNAL_UPDATE_NAME.to_string(),
    })
}

/// Block until the workflow closes
pub async fn get(client: &WorkflowClient, workflow_id: &str) -> Result<Outcome, CliError> {
    let result: serde_json::Value = client.await_result(workflow_id).await?;
    Ok(Outcome::Result {
        workflow_id: workflow_id.to_string(),
        result,
    })
}

pub async fn status(client: &WorkflowClient, workflow_id: &str) -> Result<Outcome, CliError> {
    let description = client.describe_status(workflow_id).await?;
    Ok(Outcome::Status {
        workflow_id: description.workflow_id,
        run_id: description.run_id,
        status: description.status,
    })
}
