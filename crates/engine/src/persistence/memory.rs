//! In-memory implementation of ExecutionStore

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use hello_core::{ExecutionStatus, ScheduleActionResult};
use parking_lot::RwLock;

use super::store::*;
use crate::workflow::WorkflowEvent;

/// Internal run state
struct RunState {
    record: ExecutionRecord,
    events: Vec<WorkflowEvent>,
}

/// In-memory implementation of ExecutionStore
///
/// Everything is lost when the process exits.
///
/// # Example
///
/// ```
/// use hello_engine::InMemoryExecutionStore;
///
/// let store = InMemoryExecutionStore::new();
/// assert_eq!(store.execution_count(), 0);
/// ```
pub struct InMemoryExecutionStore {
    runs: RwLock<HashMap<String, RunState>>,
    latest: RwLock<HashMap<String, String>>,
    schedules: RwLock<BTreeMap<String, ScheduleRecord>>,
}

impl InMemoryExecutionStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            runs: RwLock::new(HashMap::new()),
            latest: RwLock::new(HashMap::new()),
            schedules: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of runs ever recorded
    pub fn execution_count(&self) -> usize {
        self.runs.read().len()
    }

    /// Number of runs still running
    pub fn running_count(&self) -> usize {
        self.runs
            .read()
            .values()
            .filter(|r| r.record.status == ExecutionStatus::Running)
            .count()
    }

    /// Number of schedules
    pub fn schedule_count(&self) -> usize {
        self.schedules.read().len()
    }
}

impl Default for InMemoryExecutionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn create_execution(&self, record: ExecutionRecord) -> Result<(), StoreError> {
        // Both locks held so two starts on one workflow ID can't both pass the check
        let mut runs = self.runs.write();
        let mut latest = self.latest.write();

        if let Some(run_id) = latest.get(&record.workflow_id) {
            if let Some(current) = runs.get(run_id) {
                if current.record.status == ExecutionStatus::Running {
                    return Err(StoreError::ExecutionAlreadyRunning(
                        record.workflow_id.clone(),
                    ));
                }
            }
        }

        latest.insert(record.workflow_id.clone(), record.run_id.clone());
        runs.insert(
            record.run_id.clone(),
            RunState {
                record,
                events: vec![],
            },
        );
        Ok(())
    }

    async fn latest_execution(&self, workflow_id: &str) -> Result<ExecutionRecord, StoreError> {
        // Same lock order as create_execution: runs before latest
        let runs = self.runs.read();
        let latest = self.latest.read();
        let run_id = latest
            .get(workflow_id)
            .ok_or_else(|| StoreError::ExecutionNotFound(workflow_id.to_string()))?;

        runs.get(run_id)
            .map(|r| r.record.clone())
            .ok_or_else(|| StoreError::ExecutionNotFound(workflow_id.to_string()))
    }

    async fn get_execution(&self, run_id: &str) -> Result<ExecutionRecord, StoreError> {
        self.runs
            .read()
            .get(run_id)
            .map(|r| r.record.clone())
            .ok_or_else(|| StoreError::ExecutionNotFound(run_id.to_string()))
    }

    async fn close_execution(
        &self,
        run_id: &str,
        status: ExecutionStatus,
        result: Option<serde_json::Value>,
        failure: Option<String>,
    ) -> Result<bool, StoreError> {
        let mut runs = self.runs.write();
        let run = runs
            .get_mut(run_id)
            .ok_or_else(|| StoreError::ExecutionNotFound(run_id.to_string()))?;

        if run.record.status.is_terminal() {
            return Ok(false);
        }

        run.record.status = status;
        run.record.close_time = Some(Utc::now());
        run.record.result = result;
        run.record.failure = failure;
        Ok(true)
    }

    async fn append_events(
        &self,
        run_id: &str,
        events: Vec<WorkflowEvent>,
    ) -> Result<usize, StoreError> {
        let mut runs = self.runs.write();
        let run = runs
            .get_mut(run_id)
            .ok_or_else(|| StoreError::ExecutionNotFound(run_id.to_string()))?;

        run.events.extend(events);
        Ok(run.events.len())
    }

    async fn load_events(&self, run_id: &str) -> Result<Vec<(usize, WorkflowEvent)>, StoreError> {
        let runs = self.runs.read();
        let run = runs
            .get(run_id)
            .ok_or_else(|| StoreError::ExecutionNotFound(run_id.to_string()))?;

        Ok(run.events.iter().cloned().enumerate().collect())
    }

    async fn create_schedule(&self, record: ScheduleRecord) -> Result<(), StoreError> {
        let mut schedules = self.schedules.write();
        if schedules.contains_key(&record.schedule_id) {
            return Err(StoreError::ScheduleAlreadyExists(record.schedule_id));
        }
        schedules.insert(record.schedule_id.clone(), record);
        Ok(())
    }

    async fn get_schedule(&self, schedule_id: &str) -> Result<ScheduleRecord, StoreError> {
        self.schedules
            .read()
            .get(schedule_id)
            .cloned()
            .ok_or_else(|| StoreError::ScheduleNotFound(schedule_id.to_string()))
    }

    async fn set_schedule_paused(
        &self,
        schedule_id: &str,
        paused: bool,
        note: Option<String>,
    ) -> Result<(), StoreError> {
        let mut schedules = self.schedules.write();
        let schedule = schedules
            .get_mut(schedule_id)
            .ok_or_else(|| StoreError::ScheduleNotFound(schedule_id.to_string()))?;

        schedule.paused = paused;
        schedule.note = note;
        Ok(())
    }

    async fn record_schedule_action(
        &self,
        schedule_id: &str,
        action: ScheduleActionResult,
    ) -> Result<(), StoreError> {
        let mut schedules = self.schedules.write();
        let schedule = schedules
            .get_mut(schedule_id)
            .ok_or_else(|| StoreError::ScheduleNotFound(schedule_id.to_string()))?;

        schedule.action_count += 1;
        schedule.recent_actions.push(action);
        if schedule.recent_actions.len() > RECENT_ACTIONS_LIMIT {
            let excess = schedule.recent_actions.len() - RECENT_ACTIONS_LIMIT;
            schedule.recent_actions.drain(..excess);
        }
        Ok(())
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), StoreError> {
        self.schedules
            .write()
            .remove(schedule_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::ScheduleNotFound(schedule_id.to_string()))
    }

    async fn list_schedules(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<ScheduleRecord>, usize), StoreError> {
        let schedules = self.schedules.read();
        let page = schedules.values().skip(offset).take(limit).cloned().collect();
        Ok((page, schedules.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hello_core::ScheduleAction;
    use serde_json::json;

    fn record(workflow_id: &str, run_id: &str) -> ExecutionRecord {
        ExecutionRecord::running(workflow_id, run_id, "HelloWorkflow", "hello", json!({}))
    }

    fn schedule(id: &str) -> ScheduleRecord {
        ScheduleRecord {
            schedule_id: id.to_string(),
            cron_expression: "* * * * *".to_string(),
            action: ScheduleAction {
                workflow_id: "hello-workflow-1".to_string(),
                workflow_type: "ScheduleWorkflow".to_string(),
                task_queue: "hello".to_string(),
                input: json!({"name": "x"}),
            },
            paused: false,
            note: None,
            created_at: Utc::now(),
            action_count: 0,
            recent_actions: vec![],
        }
    }

    #[tokio::test]
    async fn test_running_id_cannot_be_reused() {
        let store = InMemoryExecutionStore::new();
        store.create_execution(record("wf", "run-1")).await.unwrap();

        let err = store.create_execution(record("wf", "run-2")).await.unwrap_err();
        assert_eq!(err, StoreError::ExecutionAlreadyRunning("wf".to_string()));
    }

    #[tokio::test]
    async fn test_closed_id_can_be_reused() {
        let store = InMemoryExecutionStore::new();
        store.create_execution(record("wf", "run-1")).await.unwrap();
        store
            .close_execution("run-1", ExecutionStatus::Completed, Some(json!("ok")), None)
            .await
            .unwrap();

        store.create_execution(record("wf", "run-2")).await.unwrap();
        let latest = store.latest_execution("wf").await.unwrap();
        assert_eq!(latest.run_id, "run-2");
        assert_eq!(latest.status, ExecutionStatus::Running);
        assert_eq!(store.execution_count(), 2);
        assert_eq!(store.running_count(), 1);
    }

    #[tokio::test]
    async fn test_close_is_final() {
        let store = InMemoryExecutionStore::new();
        store.create_execution(record("wf", "run-1")).await.unwrap();

        let closed = store
            .close_execution("run-1", ExecutionStatus::Canceled, None, Some("bye".into()))
            .await
            .unwrap();
        assert!(closed);

        let closed_again = store
            .close_execution("run-1", ExecutionStatus::Completed, Some(json!("late")), None)
            .await
            .unwrap();
        assert!(!closed_again);

        let run = store.get_execution("run-1").await.unwrap();
        assert_eq!(run.status, ExecutionStatus::Canceled);
        assert_eq!(run.result, None);
        assert!(run.close_time.is_some());
    }

    #[tokio::test]
    async fn test_unknown_execution() {
        let store = InMemoryExecutionStore::new();
        assert!(matches!(
            store.latest_execution("missing").await,
            Err(StoreError::ExecutionNotFound(_))
        ));
        assert!(matches!(
            store.append_events("missing", vec![]).await,
            Err(StoreError::ExecutionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_events_are_appended_in_order() {
        let store = InMemoryExecutionStore::new();
        store.create_execution(record("wf", "run-1")).await.unwrap();

        let len = store
            .append_events(
                "run-1",
                vec![
                    WorkflowEvent::TimerStarted {
                        timer_id: "delay".into(),
                        duration_ms: 60_000,
                    },
                    WorkflowEvent::TimerFired {
                        timer_id: "delay".into(),
                    },
                ],
            )
            .await
            .unwrap();
        assert_eq!(len, 2);

        let events = store.load_events("run-1").await.unwrap();
        assert_eq!(events[0].0, 0);
        assert!(matches!(events[1].1, WorkflowEvent::TimerFired { .. }));
    }

    #[tokio::test]
    async fn test_schedule_crud() {
        let store = InMemoryExecutionStore::new();
        store.create_schedule(schedule("daily")).await.unwrap();
        assert_eq!(
            store.create_schedule(schedule("daily")).await.unwrap_err(),
            StoreError::ScheduleAlreadyExists("daily".to_string())
        );

        store
            .set_schedule_paused("daily", true, Some("maintenance".into()))
            .await
            .unwrap();
        let stored = store.get_schedule("daily").await.unwrap();
        assert!(stored.paused);
        assert_eq!(stored.note.as_deref(), Some("maintenance"));

        store.delete_schedule("daily").await.unwrap();
        assert!(matches!(
            store.get_schedule("daily").await,
            Err(StoreError::ScheduleNotFound(_))
        ));
        assert!(matches!(
            store.delete_schedule("daily").await,
            Err(StoreError::ScheduleNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_recent_actions_are_capped() {
        let store = InMemoryExecutionStore::new();
        store.create_schedule(schedule("s")).await.unwrap();

        for i in 0..(RECENT_ACTIONS_LIMIT + 3) {
            store
                .record_schedule_action(
                    "s",
                    ScheduleActionResult {
                        scheduled_at: Utc::now(),
                        workflow_id: format!("wf-{i}"),
                        run_id: format!("run-{i}"),
                    },
                )
                .await
                .unwrap();
        }

        let stored = store.get_schedule("s").await.unwrap();
        assert_eq!(stored.action_count, (RECENT_ACTIONS_LIMIT + 3) as u64);
        assert_eq!(stored.recent_actions.len(), RECENT_ACTIONS_LIMIT);
        assert_eq!(stored.recent_actions[0].workflow_id, "wf-3");
    }

    #[tokio::test]
    async fn test_list_schedules_pages_in_id_order() {
        let store = InMemoryExecutionStore::new();
        for id in ["c", "a", "b"] {
            store.create_schedule(schedule(id)).await.unwrap();
        }

        let (page, total) = store.list_schedules(0, 2).await.unwrap();
        assert_eq!(total, 3);
        let ids: Vec<_> = page.iter().map(|s| s.schedule_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let (page, _) = store.list_schedules(2, 2).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].schedule_id, "c");
    }
}
