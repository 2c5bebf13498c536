//! Workflow executor
//!
//! The `WorkflowExecutor` is responsible for:
//! - Starting executions and running their first turn
//! - Delivering timers, signals and wait timeouts to live instances
//! - Enforcing execution and run timeouts
//! - Cancel, terminate and await-result

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hello_core::cron::CronError;
use hello_core::{
    ExecutionStatus, StartWorkflowOptions, StartWorkflowRequest, WorkflowDescription, WorkflowRun,
};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::persistence::{ExecutionRecord, ExecutionStore, StoreError};
use crate::workflow::{SignalOutcome, Workflow, WorkflowAction, WorkflowEvent, WorkflowSignal};

use super::registry::{AnyWorkflow, RegistryError, WorkflowRegistry};

/// Configuration for the workflow executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum events per run (for safety)
    pub max_events_per_run: usize,

    /// Page size used when a schedule listing asks for 0
    pub default_page_size: usize,

    /// Number of upcoming fire times reported for an active schedule
    pub upcoming_fire_times: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_events_per_run: 10000,
            default_page_size: 100,
            upcoming_fire_times: 3,
        }
    }
}

/// Errors from executor operations
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// Store error
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Registry error
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Cron expression rejected
    #[error(transparent)]
    InvalidCron(#[from] CronError),

    /// Awaited execution closed without completing
    #[error("workflow {workflow_id} closed as {status}: {cause}")]
    WorkflowClosed {
        workflow_id: String,
        status: ExecutionStatus,
        cause: String,
    },

    /// Malformed request
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Too many events
    #[error("run {0} has too many events ({1} > {2})")]
    TooManyEvents(String, usize, usize),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Executor stopped while the caller was waiting
    #[error("workflow executor is shutting down")]
    ShuttingDown,
}

/// A signal wait the instance is suspended on
#[derive(Debug)]
struct PendingWait {
    signal_name: String,
    wait_id: u64,
}

/// Live state of one run
struct InstanceSlot {
    workflow_id: String,
    task_queue: String,
    workflow: Box<dyn AnyWorkflow>,

    /// `on_start` has run (only happens once the task queue is served)
    started: bool,
    closed: bool,
    waiting: Option<PendingWait>,

    /// Signals received but not yet consumed, oldest first
    buffered: VecDeque<WorkflowSignal>,

    /// Timers and timeouts to abort on close
    tasks: Vec<JoinHandle<()>>,
}

impl InstanceSlot {
    /// Oldest buffered signal matching the pending wait
    fn take_ready_signal(&mut self) -> Option<WorkflowSignal> {
        let wait = self.waiting.as_ref()?;
        let position = self
            .buffered
            .iter()
            .position(|s| s.signal_type == wait.signal_name)?;
        self.buffered.remove(position)
    }
}

type SlotHandle = Arc<tokio::sync::Mutex<InstanceSlot>>;

/// Workflow executor
///
/// The executor drives workflow state machines by feeding them callbacks and
/// carrying out the actions they return. Each run gets its own async mutex,
/// so one instance advances one turn at a time while many instances progress
/// concurrently. Cloning is cheap and shares all state.
///
/// # Example
///
/// ```ignore
/// use hello_engine::prelude::*;
///
/// let executor = WorkflowExecutor::new(InMemoryExecutionStore::new());
/// executor.register::<MyWorkflow>();
/// executor.serve_task_queue("my-queue");
///
/// let run = executor.start::<MyWorkflow>("my-id", "my-queue", input).await?;
/// let result = executor.await_result(&run.workflow_id).await?;
/// ```
pub struct WorkflowExecutor<S: ExecutionStore> {
    pub(super) store: Arc<S>,
    pub(super) registry: Arc<RwLock<WorkflowRegistry>>,
    task_queues: Arc<RwLock<HashSet<String>>>,
    instances: Arc<Mutex<HashMap<String, SlotHandle>>>,
    watchers: Arc<Mutex<HashMap<String, watch::Sender<ExecutionStatus>>>>,
    pub(super) schedule_loops: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
    next_wait_id: Arc<AtomicU64>,
    /// Flips to true once `shutdown` starts; wakes pending `await_result` calls
    stopping: Arc<watch::Sender<bool>>,
    pub(super) config: ExecutorConfig,
}

impl<S: ExecutionStore> Clone for WorkflowExecutor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            registry: Arc::clone(&self.registry),
            task_queues: Arc::clone(&self.task_queues),
            instances: Arc::clone(&self.instances),
            watchers: Arc::clone(&self.watchers),
            schedule_loops: Arc::clone(&self.schedule_loops),
            next_wait_id: Arc::clone(&self.next_wait_id),
            stopping: Arc::clone(&self.stopping),
            config: self.config.clone(),
        }
    }
}

impl<S: ExecutionStore> WorkflowExecutor<S> {
    /// Create a new executor with the given store
    pub fn new(store: S) -> Self {
        Self::with_config(store, ExecutorConfig::default())
    }

    /// Create a new executor with custom config
    pub fn with_config(store: S, config: ExecutorConfig) -> Self {
        Self {
            store: Arc::new(store),
            registry: Arc::new(RwLock::new(WorkflowRegistry::new())),
            task_queues: Arc::new(RwLock::new(HashSet::new())),
            instances: Arc::new(Mutex::new(HashMap::new())),
            watchers: Arc::new(Mutex::new(HashMap::new())),
            schedule_loops: Arc::new(Mutex::new(HashMap::new())),
            next_wait_id: Arc::new(AtomicU64::new(1)),
            stopping: Arc::new(watch::channel(false).0),
            config,
        }
    }

    /// Register a workflow type
    pub fn register<W: Workflow>(&self) {
        self.registry.write().register::<W>();
        info!(workflow_type = W::TYPE, "registered workflow type");
    }

    /// Start making progress on executions routed to `task_queue`
    ///
    /// Executions already waiting on the queue start their first turn now.
    pub fn serve_task_queue(&self, task_queue: impl Into<String>) {
        let task_queue = task_queue.into();
        info!(%task_queue, "serving task queue");
        self.task_queues.write().insert(task_queue);

        let waiting: Vec<String> = self.instances.lock().keys().cloned().collect();
        for run_id in waiting {
            self.spawn_begin(run_id);
        }
    }

    /// Whether a worker is serving `task_queue`
    pub fn serves(&self, task_queue: &str) -> bool {
        self.task_queues.read().contains(task_queue)
    }

    /// Get a reference to the store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start a typed workflow with the default timeouts
    pub async fn start<W: Workflow>(
        &self,
        workflow_id: &str,
        task_queue: &str,
        input: W::Input,
    ) -> Result<WorkflowRun, ExecutorError> {
        let request = StartWorkflowRequest {
            workflow_type: W::TYPE.to_string(),
            input: serde_json::to_value(&input)?,
            options: StartWorkflowOptions::new(workflow_id, task_queue),
        };
        self.start_workflow(request).await
    }

    /// Start a new workflow execution
    ///
    /// Records the run, arms the execution timeout and, if the task queue is
    /// served, runs `on_start` before returning.
    #[instrument(skip(self, request), fields(workflow_id = %request.options.id, workflow_type = %request.workflow_type))]
    pub async fn start_workflow(
        &self,
        request: StartWorkflowRequest,
    ) -> Result<WorkflowRun, ExecutorError> {
        let StartWorkflowRequest {
            workflow_type,
            input,
            options,
        } = request;

        if options.id.trim().is_empty() {
            return Err(ExecutorError::InvalidArgument(
                "workflow ID must not be empty".to_string(),
            ));
        }

        let workflow = self.registry.read().create(&workflow_type, input.clone())?;
        let run_id = Uuid::now_v7().to_string();

        self.store
            .create_execution(ExecutionRecord::running(
                &options.id,
                &run_id,
                &workflow_type,
                &options.task_queue,
                input.clone(),
            ))
            .await?;

        let (status_tx, _) = watch::channel(ExecutionStatus::Running);
        self.watchers.lock().insert(run_id.clone(), status_tx);

        let timeout = options.effective_timeout();
        let slot = InstanceSlot {
            workflow_id: options.id.clone(),
            task_queue: options.task_queue.clone(),
            workflow,
            started: false,
            closed: false,
            waiting: None,
            buffered: VecDeque::new(),
            tasks: vec![self.spawn_execution_timeout(run_id.clone(), timeout)],
        };
        self.instances
            .lock()
            .insert(run_id.clone(), Arc::new(tokio::sync::Mutex::new(slot)));

        self.record(
            &run_id,
            vec![WorkflowEvent::WorkflowStarted {
                workflow_type,
                task_queue: options.task_queue.clone(),
                input,
            }],
        )
        .await?;

        info!(%run_id, task_queue = %options.task_queue, "started workflow execution");

        self.begin(&run_id).await?;

        Ok(WorkflowRun {
            workflow_id: options.id,
            run_id,
        })
    }

    /// Send a signal to the latest run of a workflow
    ///
    /// Signals to a closed run are dropped with a warning.
    #[instrument(skip(self, signal), fields(signal_type = %signal.signal_type))]
    pub async fn signal(
        &self,
        workflow_id: &str,
        signal: WorkflowSignal,
    ) -> Result<(), ExecutorError> {
        let record = self.store.latest_execution(workflow_id).await?;

        if record.status.is_terminal() {
            warn!(status = %record.status, "signal ignored: workflow execution already closed");
            return Ok(());
        }

        let Some(handle) = self.slot(&record.run_id) else {
            warn!("signal ignored: workflow execution already closed");
            return Ok(());
        };
        let mut slot = handle.lock().await;
        if slot.closed {
            warn!("signal ignored: workflow execution already closed");
            return Ok(());
        }

        self.record(
            &record.run_id,
            vec![WorkflowEvent::SignalReceived {
                signal: signal.clone(),
            }],
        )
        .await?;
        slot.buffered.push_back(signal);
        info!(run_id = %record.run_id, "signal received");

        if !slot.started {
            debug!("execution not started yet, signal stays buffered");
            return Ok(());
        }

        self.drive(&record.run_id, &mut slot, vec![]).await
    }

    /// Request cancellation of the latest run
    ///
    /// A pending signal wait resolves as `Canceled`, then the run closes as `Canceled`.
    #[instrument(skip(self))]
    pub async fn cancel(&self, workflow_id: &str, reason: &str) -> Result<(), ExecutorError> {
        let record = self.store.latest_execution(workflow_id).await?;
        let Some(handle) = self.slot(&record.run_id) else {
            debug!(status = %record.status, "cancel ignored: workflow execution already closed");
            return Ok(());
        };
        let mut slot = handle.lock().await;
        if slot.closed {
            return Ok(());
        }

        self.interrupt_wait(&record.run_id, &mut slot, SignalOutcome::Canceled)
            .await?;
        self.close(
            &record.run_id,
            &mut slot,
            ExecutionStatus::Canceled,
            None,
            Some(reason.to_string()),
            WorkflowEvent::WorkflowCanceled {
                reason: reason.to_string(),
            },
        )
        .await
    }

    /// Close the latest run as `Terminated` without running any workflow code
    #[instrument(skip(self))]
    pub async fn terminate(&self, workflow_id: &str, reason: &str) -> Result<(), ExecutorError> {
        let record = self.store.latest_execution(workflow_id).await?;
        let Some(handle) = self.slot(&record.run_id) else {
            debug!(status = %record.status, "terminate ignored: workflow execution already closed");
            return Ok(());
        };
        let mut slot = handle.lock().await;

        self.close(
            &record.run_id,
            &mut slot,
            ExecutionStatus::Terminated,
            None,
            Some(reason.to_string()),
            WorkflowEvent::WorkflowTerminated {
                reason: reason.to_string(),
            },
        )
        .await
    }

    /// Wait until the latest run closes
    ///
    /// Returns the result on `Completed` and `WorkflowClosed` otherwise.
    /// A wait still pending when the executor shuts down ends with `ShuttingDown`.
    #[instrument(skip(self))]
    pub async fn await_result(&self, workflow_id: &str) -> Result<Value, ExecutorError> {
        let record = self.store.latest_execution(workflow_id).await?;

        if !record.status.is_terminal() {
            let receiver = self
                .watchers
                .lock()
                .get(&record.run_id)
                .map(|tx| tx.subscribe());
            if let Some(mut receiver) = receiver {
                let mut stopping = self.stopping.subscribe();
                let closed = async {
                    // Err only means the run closed and dropped its sender; the store has the outcome
                    let _ = receiver.wait_for(|status| status.is_terminal()).await;
                };
                let interrupted = async {
                    let _ = stopping.wait_for(|stopping| *stopping).await;
                };
                tokio::select! {
                    _ = closed => {}
                    _ = interrupted => {
                        debug!(run_id = %record.run_id, "result wait interrupted by shutdown");
                        return Err(ExecutorError::ShuttingDown);
                    }
                }
            }
        }

        let record = self.store.get_execution(&record.run_id).await?;
        match record.status {
            ExecutionStatus::Completed => Ok(record.result.unwrap_or(Value::Null)),
            status => Err(ExecutorError::WorkflowClosed {
                workflow_id: workflow_id.to_string(),
                status,
                cause: record
                    .failure
                    .unwrap_or_else(|| format!("workflow execution is {}", status)),
            }),
        }
    }

    /// Snapshot of the latest run
    pub async fn describe(&self, workflow_id: &str) -> Result<WorkflowDescription, ExecutorError> {
        Ok(self.store.latest_execution(workflow_id).await?.describe())
    }

    /// Event history of the latest run
    pub async fn history(&self, workflow_id: &str) -> Result<Vec<WorkflowEvent>, ExecutorError> {
        let record = self.store.latest_execution(workflow_id).await?;
        let events = self.store.load_events(&record.run_id).await?;
        Ok(events.into_iter().map(|(_, event)| event).collect())
    }

    /// Stop schedule loops and pending timers, and release pending result waits
    pub async fn shutdown(&self) {
        self.stopping.send_replace(true);

        let loops: Vec<(String, JoinHandle<()>)> = self.schedule_loops.lock().drain().collect();
        for (schedule_id, handle) in loops {
            debug!(%schedule_id, "stopping schedule loop");
            handle.abort();
        }

        let slots: Vec<SlotHandle> = self.instances.lock().values().cloned().collect();
        for handle in slots {
            let mut slot = handle.lock().await;
            for task in slot.tasks.drain(..) {
                task.abort();
            }
        }

        info!("workflow executor shut down");
    }

    // =========================================================================
    // Internal Methods
    // =========================================================================

    fn slot(&self, run_id: &str) -> Option<SlotHandle> {
        self.instances.lock().get(run_id).cloned()
    }

    /// Run `on_start` once the run's task queue is served
    async fn begin(&self, run_id: &str) -> Result<(), ExecutorError> {
        let Some(handle) = self.slot(run_id) else {
            return Ok(());
        };
        let mut slot = handle.lock().await;

        if slot.started || slot.closed {
            return Ok(());
        }
        if !self.serves(&slot.task_queue) {
            debug!(task_queue = %slot.task_queue, "no worker serving task queue, execution waits");
            return Ok(());
        }

        slot.started = true;
        debug!(workflow_id = %slot.workflow_id, workflow_type = slot.workflow.workflow_type(), "running first workflow turn");
        let actions = slot.workflow.on_start();
        self.drive(run_id, &mut slot, actions).await
    }

    /// Carry out actions, then hand over any buffered signal the instance now waits on
    async fn drive(
        &self,
        run_id: &str,
        slot: &mut InstanceSlot,
        mut actions: Vec<WorkflowAction>,
    ) -> Result<(), ExecutorError> {
        loop {
            for action in actions {
                if slot.closed {
                    break;
                }
                self.apply(run_id, slot, action).await?;
            }

            if slot.closed {
                return Ok(());
            }

            match slot.take_ready_signal() {
                Some(signal) => {
                    actions = self
                        .resolve_wait(run_id, slot, SignalOutcome::Received(signal))
                        .await?;
                }
                None => return Ok(()),
            }
        }
    }

    async fn apply(
        &self,
        run_id: &str,
        slot: &mut InstanceSlot,
        action: WorkflowAction,
    ) -> Result<(), ExecutorError> {
        match action {
            WorkflowAction::StartTimer { timer_id, duration } => {
                debug!(%run_id, %timer_id, ?duration, "starting timer");

                self.record(
                    run_id,
                    vec![WorkflowEvent::TimerStarted {
                        timer_id: timer_id.clone(),
                        duration_ms: duration.as_millis() as u64,
                    }],
                )
                .await?;

                let task = self.spawn_timer(run_id.to_string(), timer_id, duration);
                slot.tasks.push(task);
            }

            WorkflowAction::AwaitSignal {
                signal_name,
                timeout,
            } => {
                if let Some(previous) = &slot.waiting {
                    warn!(%run_id, previous = %previous.signal_name, "replacing pending signal wait");
                }
                debug!(%run_id, %signal_name, ?timeout, "waiting for signal");

                self.record(
                    run_id,
                    vec![WorkflowEvent::SignalWaitStarted {
                        signal_name: signal_name.clone(),
                        timeout_ms: timeout.map(|t| t.as_millis() as u64),
                    }],
                )
                .await?;

                let wait_id = self.next_wait_id.fetch_add(1, Ordering::Relaxed);
                if let Some(timeout) = timeout {
                    let task = self.spawn_wait_timeout(run_id.to_string(), wait_id, timeout);
                    slot.tasks.push(task);
                }
                slot.waiting = Some(PendingWait {
                    signal_name,
                    wait_id,
                });
            }

            WorkflowAction::CompleteWorkflow { result } => {
                info!(%run_id, "completing workflow");
                self.close(
                    run_id,
                    slot,
                    ExecutionStatus::Completed,
                    Some(result.clone()),
                    None,
                    WorkflowEvent::WorkflowCompleted { result },
                )
                .await?;
            }

            WorkflowAction::FailWorkflow { error } => {
                error!(%run_id, error = %error.message, "failing workflow");
                self.close(
                    run_id,
                    slot,
                    ExecutionStatus::Failed,
                    None,
                    Some(error.message.clone()),
                    WorkflowEvent::WorkflowFailed { error },
                )
                .await?;
            }

            WorkflowAction::None => {}
        }

        Ok(())
    }

    /// Resolve the pending wait and let the workflow react
    async fn resolve_wait(
        &self,
        run_id: &str,
        slot: &mut InstanceSlot,
        outcome: SignalOutcome,
    ) -> Result<Vec<WorkflowAction>, ExecutorError> {
        let Some(wait) = slot.waiting.take() else {
            return Ok(vec![]);
        };

        self.record(
            run_id,
            vec![WorkflowEvent::SignalWaitResolved {
                signal_name: wait.signal_name,
                outcome: outcome.clone(),
            }],
        )
        .await?;

        Ok(slot.workflow.on_signal(&outcome))
    }

    /// Resolve the pending wait on the way to a forced close; the workflow's reaction is discarded
    async fn interrupt_wait(
        &self,
        run_id: &str,
        slot: &mut InstanceSlot,
        outcome: SignalOutcome,
    ) -> Result<(), ExecutorError> {
        let discarded = self.resolve_wait(run_id, slot, outcome).await?;
        if !discarded.is_empty() {
            debug!(%run_id, count = discarded.len(), "discarding actions of interrupted workflow");
        }
        Ok(())
    }

    async fn close(
        &self,
        run_id: &str,
        slot: &mut InstanceSlot,
        status: ExecutionStatus,
        result: Option<Value>,
        failure: Option<String>,
        event: WorkflowEvent,
    ) -> Result<(), ExecutorError> {
        if slot.closed {
            return Ok(());
        }

        self.record(run_id, vec![event]).await?;
        let changed = self
            .store
            .close_execution(run_id, status, result, failure)
            .await?;

        slot.closed = true;
        slot.waiting = None;
        if !slot.buffered.is_empty() {
            debug!(%run_id, count = slot.buffered.len(), "discarding unconsumed signals");
            slot.buffered.clear();
        }
        for task in slot.tasks.drain(..) {
            task.abort();
        }

        self.instances.lock().remove(run_id);
        if let Some(status_tx) = self.watchers.lock().remove(run_id) {
            status_tx.send_replace(status);
        }

        if changed {
            info!(workflow_id = %slot.workflow_id, %run_id, %status, "workflow execution closed");
        }
        Ok(())
    }

    async fn record(&self, run_id: &str, events: Vec<WorkflowEvent>) -> Result<(), ExecutorError> {
        let terminal = events.iter().any(WorkflowEvent::is_terminal);
        let len = self.store.append_events(run_id, events).await?;

        if !terminal && len > self.config.max_events_per_run {
            return Err(ExecutorError::TooManyEvents(
                run_id.to_string(),
                len,
                self.config.max_events_per_run,
            ));
        }
        Ok(())
    }

    async fn on_timer_fired(&self, run_id: &str, timer_id: &str) -> Result<(), ExecutorError> {
        let Some(handle) = self.slot(run_id) else {
            debug!(%run_id, %timer_id, "timer fired after close");
            return Ok(());
        };
        let mut slot = handle.lock().await;
        if slot.closed {
            return Ok(());
        }

        self.record(
            run_id,
            vec![WorkflowEvent::TimerFired {
                timer_id: timer_id.to_string(),
            }],
        )
        .await?;
        debug!(%run_id, %timer_id, "timer fired");

        let actions = slot.workflow.on_timer_fired(timer_id);
        self.drive(run_id, &mut slot, actions).await
    }

    async fn on_wait_timeout(&self, run_id: &str, wait_id: u64) -> Result<(), ExecutorError> {
        let Some(handle) = self.slot(run_id) else {
            return Ok(());
        };
        let mut slot = handle.lock().await;

        let current = slot.waiting.as_ref().map(|w| w.wait_id);
        if slot.closed || current != Some(wait_id) {
            return Ok(());
        }

        debug!(%run_id, "signal wait timed out");
        let actions = self
            .resolve_wait(run_id, &mut slot, SignalOutcome::TimedOut)
            .await?;
        self.drive(run_id, &mut slot, actions).await
    }

    async fn on_execution_timeout(
        &self,
        run_id: &str,
        timeout: Duration,
    ) -> Result<(), ExecutorError> {
        let Some(handle) = self.slot(run_id) else {
            return Ok(());
        };
        let mut slot = handle.lock().await;
        if slot.closed {
            return Ok(());
        }

        warn!(%run_id, ?timeout, "workflow execution timed out");
        self.interrupt_wait(run_id, &mut slot, SignalOutcome::TimedOut)
            .await?;
        self.close(
            run_id,
            &mut slot,
            ExecutionStatus::TimedOut,
            None,
            Some(format!("workflow execution timed out after {:?}", timeout)),
            WorkflowEvent::WorkflowTimedOut {
                timeout_ms: timeout.as_millis() as u64,
            },
        )
        .await
    }

    // The spawn helpers stay synchronous so the spawned futures never contain themselves.

    fn spawn_begin(&self, run_id: String) {
        let executor = self.clone();
        tokio::spawn(async move {
            if let Err(e) = executor.begin(&run_id).await {
                error!(%run_id, error = %e, "failed to start workflow execution");
            }
        });
    }

    fn spawn_timer(&self, run_id: String, timer_id: String, duration: Duration) -> JoinHandle<()> {
        let executor = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Err(e) = executor.on_timer_fired(&run_id, &timer_id).await {
                error!(%run_id, %timer_id, error = %e, "failed to deliver timer");
            }
        })
    }

    fn spawn_wait_timeout(&self, run_id: String, wait_id: u64, timeout: Duration) -> JoinHandle<()> {
        let executor = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Err(e) = executor.on_wait_timeout(&run_id, wait_id).await {
                error!(%run_id, error = %e, "failed to time out signal wait");
            }
        })
    }

    fn spawn_execution_timeout(&self, run_id: String, timeout: Duration) -> JoinHandle<()> {
        let executor = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Err(e) = executor.on_execution_timeout(&run_id, timeout).await {
                error!(%run_id, error = %e, "failed to time out workflow execution");
            }
        })
    }
}
