//! Cron schedules
//!
//! Each schedule owns one loop task that sleeps until the next fire time and
//! starts the schedule's workflow. Firings are skipped while the schedule is
//! paused or while the previous firing's run is still open.

use std::time::Duration;

use chrono::{DateTime, Utc};
use hello_core::cron::{next_fire_after, parse_cron, upcoming};
use hello_core::{
    CreateScheduleRequest, ExecutionStatus, ScheduleActionResult, ScheduleDescription,
    ScheduleListEntry, SchedulePage, StartWorkflowOptions, StartWorkflowRequest, WorkflowRun,
};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::persistence::{ExecutionStore, ScheduleRecord, StoreError};

use super::executor::{ExecutorError, WorkflowExecutor};

/// Timestamp suffix appended to the base workflow ID of every firing
const FIRING_ID_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

impl<S: ExecutionStore> WorkflowExecutor<S> {
    /// Create a schedule and start its firing loop
    #[instrument(skip(self, request), fields(schedule_id = %request.schedule_id))]
    pub async fn create_schedule(
        &self,
        request: CreateScheduleRequest,
    ) -> Result<ScheduleDescription, ExecutorError> {
        if request.schedule_id.trim().is_empty() {
            return Err(ExecutorError::InvalidArgument(
                "schedule ID must not be empty".to_string(),
            ));
        }

        let cron = parse_cron(&request.cron_expression)?;

        // Reject unknown workflow types and undecodable inputs now rather than at first firing
        self.registry
            .read()
            .create(&request.action.workflow_type, request.action.input.clone())?;

        let record = ScheduleRecord {
            schedule_id: request.schedule_id.clone(),
            cron_expression: request.cron_expression.clone(),
            action: request.action,
            paused: request.paused,
            note: None,
            created_at: Utc::now(),
            action_count: 0,
            recent_actions: Vec::new(),
        };
        self.store.create_schedule(record).await?;

        let handle = self.spawn_schedule_loop(request.schedule_id.clone(), cron);
        self.schedule_loops
            .lock()
            .insert(request.schedule_id.clone(), handle);

        info!(cron = %request.cron_expression, paused = request.paused, "created schedule");

        self.describe_schedule(&request.schedule_id).await
    }

    /// One page of schedules in ID order
    ///
    /// The page token is the offset returned by the previous page. A
    /// `page_size` of 0 uses the configured default.
    pub async fn list_schedules(
        &self,
        page_token: Option<String>,
        page_size: usize,
    ) -> Result<SchedulePage, ExecutorError> {
        let offset = match page_token.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(token) => token.parse::<usize>().map_err(|_| {
                ExecutorError::InvalidArgument(format!("invalid page token: {}", token))
            })?,
        };
        let limit = if page_size == 0 {
            self.config.default_page_size
        } else {
            page_size
        };

        let (records, total) = self.store.list_schedules(offset, limit).await?;
        let next = offset + records.len();
        let next_page_token = (!records.is_empty() && next < total).then(|| next.to_string());

        Ok(SchedulePage {
            entries: records
                .into_iter()
                .map(|record| ScheduleListEntry {
                    state: record.state(),
                    workflow_type: record.action.workflow_type,
                    schedule_id: record.schedule_id,
                })
                .collect(),
            next_page_token,
        })
    }

    /// Stop firing until unpaused
    #[instrument(skip(self))]
    pub async fn pause_schedule(
        &self,
        schedule_id: &str,
        note: Option<String>,
    ) -> Result<(), ExecutorError> {
        self.store
            .set_schedule_paused(schedule_id, true, note)
            .await?;
        info!("schedule paused");
        Ok(())
    }

    /// Resume firing
    #[instrument(skip(self))]
    pub async fn unpause_schedule(
        &self,
        schedule_id: &str,
        note: Option<String>,
    ) -> Result<(), ExecutorError> {
        self.store
            .set_schedule_paused(schedule_id, false, note)
            .await?;
        info!("schedule unpaused");
        Ok(())
    }

    /// Delete a schedule; runs it already started are left alone
    #[instrument(skip(self))]
    pub async fn delete_schedule(&self, schedule_id: &str) -> Result<(), ExecutorError> {
        self.store.delete_schedule(schedule_id).await?;
        if let Some(handle) = self.schedule_loops.lock().remove(schedule_id) {
            handle.abort();
        }
        info!("schedule deleted");
        Ok(())
    }

    /// Current state of a schedule
    pub async fn describe_schedule(
        &self,
        schedule_id: &str,
    ) -> Result<ScheduleDescription, ExecutorError> {
        let record = self.store.get_schedule(schedule_id).await?;

        let next_action_times = if record.paused {
            Vec::new()
        } else {
            parse_cron(&record.cron_expression)
                .map(|cron| upcoming(&cron, self.config.upcoming_fire_times))
                .unwrap_or_default()
        };

        Ok(ScheduleDescription {
            state: record.state(),
            schedule_id: record.schedule_id,
            note: record.note,
            cron_expression: record.cron_expression,
            workflow_id: record.action.workflow_id,
            workflow_type: record.action.workflow_type,
            task_queue: record.action.task_queue,
            action_count: record.action_count,
            recent_actions: record.recent_actions,
            next_action_times,
        })
    }

    /// Fire a schedule now, outside its cron cadence
    ///
    /// Fires even while paused. Returns `None` when the previous run is still open.
    #[instrument(skip(self))]
    pub async fn trigger_schedule(
        &self,
        schedule_id: &str,
    ) -> Result<Option<WorkflowRun>, ExecutorError> {
        self.fire_schedule(schedule_id, Utc::now(), true).await
    }

    // =========================================================================
    // Firing
    // =========================================================================

    async fn fire_schedule(
        &self,
        schedule_id: &str,
        fire_time: DateTime<Utc>,
        manual: bool,
    ) -> Result<Option<WorkflowRun>, ExecutorError> {
        let record = self.store.get_schedule(schedule_id).await?;

        if record.paused && !manual {
            debug!(%schedule_id, "schedule paused, skipping firing");
            return Ok(None);
        }

        if let Some(previous) = record.recent_actions.last() {
            if let Ok(run) = self.store.latest_execution(&previous.workflow_id).await {
                if run.run_id == previous.run_id && run.status == ExecutionStatus::Running {
                    info!(%schedule_id, workflow_id = %previous.workflow_id, "previous run still open, skipping firing");
                    return Ok(None);
                }
            }
        }

        let workflow_id = format!(
            "{}-{}",
            record.action.workflow_id,
            fire_time.format(FIRING_ID_FORMAT)
        );
        let request = StartWorkflowRequest {
            workflow_type: record.action.workflow_type.clone(),
            input: record.action.input.clone(),
            options: StartWorkflowOptions::new(&workflow_id, &record.action.task_queue),
        };
        let run = self.start_workflow(request).await?;

        self.store
            .record_schedule_action(
                schedule_id,
                ScheduleActionResult {
                    scheduled_at: fire_time,
                    workflow_id: run.workflow_id.clone(),
                    run_id: run.run_id.clone(),
                },
            )
            .await?;

        info!(%schedule_id, workflow_id = %run.workflow_id, "schedule fired");
        Ok(Some(run))
    }

    fn spawn_schedule_loop(&self, schedule_id: String, cron: cron::Schedule) -> JoinHandle<()> {
        let executor = self.clone();
        tokio::spawn(async move { executor.run_schedule_loop(schedule_id, cron).await })
    }

    /// Fire the schedule at each cron time until it is deleted.
    ///
    /// Wall time is read once; later fire times are reached with tokio's clock
    /// measured from that anchor, so a paused runtime clock pauses the loop too.
    async fn run_schedule_loop(self, schedule_id: String, cron: cron::Schedule) {
        let anchor_wall = Utc::now();
        let anchor = Instant::now();
        let mut last_fire: Option<DateTime<Utc>> = None;

        loop {
            let elapsed = chrono::Duration::from_std(anchor.elapsed())
                .unwrap_or_else(|_| chrono::Duration::zero());
            let now = anchor_wall + elapsed;
            let after = match last_fire {
                Some(last) if last > now => last,
                _ => now,
            };
            let Some(next) = next_fire_after(&cron, after) else {
                info!(%schedule_id, "schedule has no further fire times");
                return;
            };

            let offset = (next - anchor_wall).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep_until(anchor + offset).await;
            last_fire = Some(next);

            match self.fire_schedule(&schedule_id, next, false).await {
                Ok(_) => {}
                Err(ExecutorError::Store(StoreError::ScheduleNotFound(_))) => {
                    debug!(%schedule_id, "schedule deleted, stopping loop");
                    return;
                }
                Err(e) => {
                    warn!(%schedule_id, error = %e, "scheduled workflow start failed");
                }
            }
        }
    }
}
