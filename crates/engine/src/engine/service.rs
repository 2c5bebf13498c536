//! `WorkflowEngine` implementation for the in-process executor

use async_trait::async_trait;
use hello_core::{
    CreateScheduleRequest, EngineError, ScheduleDescription, SchedulePage, StartWorkflowRequest,
    WorkflowDescription, WorkflowEngine, WorkflowRun,
};
use serde_json::Value;

use crate::persistence::{ExecutionStore, StoreError};
use crate::workflow::WorkflowSignal;

use super::executor::{ExecutorError, WorkflowExecutor};

impl From<ExecutorError> for EngineError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::Store(StoreError::ExecutionNotFound(id)) => {
                EngineError::NotFound(format!("workflow execution {}", id))
            }
            ExecutorError::Store(StoreError::ExecutionAlreadyRunning(id)) => {
                EngineError::AlreadyExists(format!("workflow execution {} is already running", id))
            }
            ExecutorError::Store(StoreError::ScheduleNotFound(id)) => {
                EngineError::NotFound(format!("schedule {}", id))
            }
            ExecutorError::Store(StoreError::ScheduleAlreadyExists(id)) => {
                EngineError::AlreadyExists(format!("schedule {}", id))
            }
            ExecutorError::Registry(e) => EngineError::InvalidArgument(e.to_string()),
            ExecutorError::InvalidCron(e) => e.into(),
            ExecutorError::WorkflowClosed { status, cause, .. } => {
                EngineError::TerminalState { status, cause }
            }
            ExecutorError::InvalidArgument(message) => EngineError::InvalidArgument(message),
            ExecutorError::ShuttingDown => {
                EngineError::Connection("workflow executor is shutting down".to_string())
            }
            other => EngineError::Internal(other.to_string()),
        }
    }
}

#[async_trait]
impl<S: ExecutionStore> WorkflowEngine for WorkflowExecutor<S> {
    async fn start_workflow(&self, request: StartWorkflowRequest) -> Result<WorkflowRun, EngineError> {
        Ok(WorkflowExecutor::start_workflow(self, request).await?)
    }

    async fn signal_workflow(
        &self,
        workflow_id: &str,
        signal_name: &str,
        payload: Value,
    ) -> Result<(), EngineError> {
        Ok(self
            .signal(workflow_id, WorkflowSignal::new(signal_name, payload))
            .await?)
    }

    async fn await_result(&self, workflow_id: &str) -> Result<Value, EngineError> {
        Ok(WorkflowExecutor::await_result(self, workflow_id).await?)
    }

    async fn describe_workflow(&self, workflow_id: &str) -> Result<WorkflowDescription, EngineError> {
        Ok(self.describe(workflow_id).await?)
    }

    async fn create_schedule(
        &self,
        request: CreateScheduleRequest,
    ) -> Result<ScheduleDescription, EngineError> {
        Ok(WorkflowExecutor::create_schedule(self, request).await?)
    }

    async fn list_schedules(
        &self,
        page_token: Option<String>,
        page_size: usize,
    ) -> Result<SchedulePage, EngineError> {
        Ok(WorkflowExecutor::list_schedules(self, page_token, page_size).await?)
    }

    async fn pause_schedule(&self, schedule_id: &str, note: Option<String>) -> Result<(), EngineError> {
        Ok(WorkflowExecutor::pause_schedule(self, schedule_id, note).await?)
    }

    async fn unpause_schedule(
        &self,
        schedule_id: &str,
        note: Option<String>,
    ) -> Result<(), EngineError> {
        Ok(WorkflowExecutor::unpause_schedule(self, schedule_id, note).await?)
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), EngineError> {
        Ok(WorkflowExecutor::delete_schedule(self, schedule_id).await?)
    }

    async fn describe_schedule(&self, schedule_id: &str) -> Result<ScheduleDescription, EngineError> {
        Ok(WorkflowExecutor::describe_schedule(self, schedule_id).await?)
    }
}
