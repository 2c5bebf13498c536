// Typed workflow client over the engine contract

use std::sync::Arc;

use hello_core::{
    EngineError, StartWorkflowOptions, StartWorkflowRequest, WorkflowDescription, WorkflowEngine,
    WorkflowRun,
};
use serde::{de::DeserializeOwned, Serialize};

/// Starts, signals and observes workflow executions on one task queue
#[derive(Clone)]
pub struct WorkflowClient {
    engine: Arc<dyn WorkflowEngine>,
    task_queue: String,
}

impl WorkflowClient {
    pub fn new(engine: Arc<dyn WorkflowEngine>, task_queue: impl Into<String>) -> Self {
        Self {
            engine,
            task_queue: task_queue.into(),
        }
    }

    pub fn task_queue(&self) -> &str {
        &self.task_queue
    }

    /// Start `workflow_type` with the default 24h timeouts
    pub async fn start<I: Serialize>(
        &self,
        workflow_type: &str,
        input: &I,
        workflow_id: impl Into<String>,
    ) -> Result<WorkflowRun, EngineError> {
        let options = StartWorkflowOptions::new(workflow_id, self.task_queue.clone());
        self.start_with_options(workflow_type, input, options).await
    }

    pub async fn start_with_options<I: Serialize>(
        &self,
        workflow_type: &str,
        input: &I,
        options: StartWorkflowOptions,
    ) -> Result<WorkflowRun, EngineError> {
        let input = serde_json::to_value(input)
            .map_err(|e| EngineError::InvalidArgument(format!("unencodable input: {}", e)))?;

        let run = self
            .engine
            .start_workflow(StartWorkflowRequest {
                workflow_type: workflow_type.to_string(),
                input,
                options,
            })
            .await?;

        tracing::debug!(
            workflow_id = %run.workflow_id,
            run_id = %run.run_id,
            workflow_type,
            "Started workflow"
        );
        Ok(run)
    }

    pub async fn signal(
        &self,
        workflow_id: &str,
        signal_name: &str,
        payload: serde_json::Value,
    ) -> Result<(), EngineError> {
        self.engine
            .signal_workflow(workflow_id, signal_name, payload)
            .await
    }

    /// Wait for the latest run to close and decode its result
    pub async fn await_result<T: DeserializeOwned>(&self, workflow_id: &str) -> Result<T, EngineError> {
        let value = self.engine.await_result(workflow_id).await?;
        serde_json::from_value(value)
            .map_err(|e| EngineError::Internal(format!("unexpected workflow result: {}", e)))
    }

    pub async fn describe_status(&self, workflow_id: &str) -> Result<WorkflowDescription, EngineError> {
        self.engine.describe_workflow(workflow_id).await
    }
}
