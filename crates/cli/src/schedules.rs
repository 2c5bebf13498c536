// Schedule lifecycle manager
// Decision: Listing is a lazy stream that pulls the next page only when the
// previous one is drained, so callers never see page tokens.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use hello_core::cron::validate_cron;
use hello_core::{
    new_workflow_id, CreateScheduleRequest, EngineError, ScheduleAction, ScheduleDescription,
    ScheduleListEntry, ScheduleWorkflowInput, WorkflowEngine, SCHEDULE_WORKFLOW_NAME,
};

/// Page size requested while draining `list`
pub const LIST_PAGE_SIZE: usize = 100;

/// Creates and manages cron schedules bound to the immediate workflow
#[derive(Clone)]
pub struct ScheduleManager {
    engine: Arc<dyn WorkflowEngine>,
    task_queue: String,
    page_size: usize,
}

impl ScheduleManager {
    pub fn new(engine: Arc<dyn WorkflowEngine>, task_queue: impl Into<String>) -> Self {
        Self {
            engine,
            task_queue: task_queue.into(),
            page_size: LIST_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Create a schedule; the cron expression is checked before any remote call
    pub async fn create(
        &self,
        schedule_id: &str,
        cron_expression: &str,
        workflow_id: Option<String>,
    ) -> Result<ScheduleDescription, EngineError> {
        validate_cron(cron_expression)?;
        if schedule_id.trim().is_empty() {
            return Err(EngineError::InvalidArgument(
                "schedule ID must not be empty".to_string(),
            ));
        }

        let input = serde_json::to_value(ScheduleWorkflowInput::default())
            .map_err(|e| EngineError::Internal(e.to_string()))?;
        let request = CreateScheduleRequest {
            schedule_id: schedule_id.to_string(),
            cron_expression: cron_expression.to_string(),
            action: ScheduleAction {
                workflow_id: workflow_id.unwrap_or_else(new_workflow_id),
                workflow_type: SCHEDULE_WORKFLOW_NAME.to_string(),
                task_queue: self.task_queue.clone(),
                input,
            },
            paused: false,
        };

        let schedule = self.engine.create_schedule(request).await?;
        tracing::debug!(schedule_id, workflow_id = %schedule.workflow_id, "Created schedule");
        Ok(schedule)
    }

    /// Every schedule, fetched page by page as the stream is polled
    pub fn list(&self) -> BoxStream<'static, Result<ScheduleListEntry, EngineError>> {
        let engine = self.engine.clone();
        let page_size = self.page_size;

        // None = exhausted, Some(token) = next page to fetch
        stream::try_unfold(Some(None::<String>), move |cursor| {
            let engine = engine.clone();
            async move {
                let Some(token) = cursor else {
                    return Ok(None);
                };
                engine.list_schedules(token, page_size).await.map(|page| {
                    let next = page.next_page_token.map(Some);
                    Some((page.entries, next))
                })
            }
        })
        .map_ok(|entries| stream::iter(entries.into_iter().map(Ok::<_, EngineError>)))
        .try_flatten()
        .boxed()
    }

    /// Stop firing; pausing a paused schedule is not an error
    pub async fn pause(&self, schedule_id: &str, note: Option<String>) -> Result<(), EngineError> {
        self.engine.pause_schedule(schedule_id, note).await
    }

    /// Fire again; resuming an active schedule is not an error
    pub async fn resume(&self, schedule_id: &str, note: Option<String>) -> Result<(), EngineError> {
        self.engine.unpause_schedule(schedule_id, note).await
    }

    pub async fn delete(&self, schedule_id: &str) -> Result<(), EngineError> {
        self.engine.delete_schedule(schedule_id).await
    }

    pub async fn describe(&self, schedule_id: &str) -> Result<ScheduleDescription, EngineError> {
        self.engine.describe_schedule(schedule_id).await
    }
}
