//! Executor integration tests
//!
//! Timer and timeout tests run on a paused clock; tokio advances it whenever
//! every task is idle, so a 24h timeout never fires before a 60s timer.

use std::time::Duration;

use hello_core::{ExecutionStatus, StartWorkflowOptions, StartWorkflowRequest};
use hello_engine::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

const QUEUE: &str = "test-queue";

// ============================================
// Test Workflows
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GateInput {
    /// Sleep this long before waiting
    #[serde(default)]
    delay_secs: u64,
    /// Give up waiting after this long
    #[serde(default)]
    wait_timeout_secs: Option<u64>,
}

/// Waits for "go" and completes with its payload
struct GateWorkflow {
    input: GateInput,
    result: Option<Value>,
}

impl GateWorkflow {
    fn wait(&self) -> WorkflowAction {
        match self.input.wait_timeout_secs {
            Some(secs) => WorkflowAction::await_signal_with_timeout("go", Duration::from_secs(secs)),
            None => WorkflowAction::await_signal("go"),
        }
    }
}

impl Workflow for GateWorkflow {
    const TYPE: &'static str = "GateWorkflow";
    type Input = GateInput;
    type Output = Value;

    fn new(input: Self::Input) -> Self {
        Self {
            input,
            result: None,
        }
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        if self.input.delay_secs > 0 {
            vec![WorkflowAction::timer(
                "delay",
                Duration::from_secs(self.input.delay_secs),
            )]
        } else {
            vec![self.wait()]
        }
    }

    fn on_timer_fired(&mut self, _timer_id: &str) -> Vec<WorkflowAction> {
        vec![self.wait()]
    }

    fn on_signal(&mut self, outcome: &SignalOutcome) -> Vec<WorkflowAction> {
        let result = match outcome {
            SignalOutcome::Received(signal) => signal.payload.clone(),
            SignalOutcome::TimedOut => json!("timed out"),
            SignalOutcome::Canceled => return vec![],
        };
        self.result = Some(result.clone());
        vec![WorkflowAction::complete(result)]
    }

    fn is_completed(&self) -> bool {
        self.result.is_some()
    }

    fn result(&self) -> Option<Self::Output> {
        self.result.clone()
    }
}

/// Fails on its first turn
struct BrokenWorkflow;

impl Workflow for BrokenWorkflow {
    const TYPE: &'static str = "BrokenWorkflow";
    type Input = Value;
    type Output = Value;

    fn new(_input: Self::Input) -> Self {
        Self
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        vec![WorkflowAction::fail(
            WorkflowError::new("boom").with_code("BROKEN"),
        )]
    }

    fn is_completed(&self) -> bool {
        true
    }

    fn result(&self) -> Option<Self::Output> {
        None
    }
}

fn executor() -> WorkflowExecutor<InMemoryExecutionStore> {
    let executor = WorkflowExecutor::new(InMemoryExecutionStore::new());
    executor.register::<GateWorkflow>();
    executor.register::<BrokenWorkflow>();
    executor.serve_task_queue(QUEUE);
    executor
}

fn gate(delay_secs: u64, wait_timeout_secs: Option<u64>) -> GateInput {
    GateInput {
        delay_secs,
        wait_timeout_secs,
    }
}

// ============================================
// Signal-gated Workflows
// ============================================

#[test_log::test(tokio::test(start_paused = true))]
async fn test_signal_completes_waiting_workflow() {
    let executor = executor();
    let run = executor
        .start::<GateWorkflow>("gate-1", QUEUE, gate(0, None))
        .await
        .unwrap();
    assert_eq!(run.workflow_id, "gate-1");

    let description = executor.describe("gate-1").await.unwrap();
    assert_eq!(description.status, ExecutionStatus::Running);

    assert_ok!(
        executor
            .signal("gate-1", WorkflowSignal::new("go", json!("Alice")))
            .await
    );

    let result = executor.await_result("gate-1").await.unwrap();
    assert_eq!(result, json!("Alice"));

    let description = executor.describe("gate-1").await.unwrap();
    assert_eq!(description.status, ExecutionStatus::Completed);
    assert!(description.close_time.is_some());
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_signal_before_wait_is_buffered() {
    let executor = executor();
    executor
        .start::<GateWorkflow>("gate-early", QUEUE, gate(60, None))
        .await
        .unwrap();

    // Arrives while the 60s timer is still pending
    executor
        .signal("gate-early", WorkflowSignal::new("go", json!("early")))
        .await
        .unwrap();
    assert_eq!(
        executor.describe("gate-early").await.unwrap().status,
        ExecutionStatus::Running
    );

    let result = executor.await_result("gate-early").await.unwrap();
    assert_eq!(result, json!("early"));

    let history = executor.history("gate-early").await.unwrap();
    let fired = history
        .iter()
        .position(|e| matches!(e, WorkflowEvent::TimerFired { .. }))
        .unwrap();
    let received = history
        .iter()
        .position(|e| matches!(e, WorkflowEvent::SignalReceived { .. }))
        .unwrap();
    assert!(received < fired);
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_other_signal_names_do_not_resolve_wait() {
    let executor = executor();
    executor
        .start::<GateWorkflow>("gate-names", QUEUE, gate(0, None))
        .await
        .unwrap();

    executor
        .signal("gate-names", WorkflowSignal::new("stop", json!("nope")))
        .await
        .unwrap();
    assert_eq!(
        executor.describe("gate-names").await.unwrap().status,
        ExecutionStatus::Running
    );

    executor
        .signal("gate-names", WorkflowSignal::new("go", json!("yes")))
        .await
        .unwrap();
    assert_eq!(executor.await_result("gate-names").await.unwrap(), json!("yes"));
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_signal_to_closed_run_is_ignored() {
    let executor = executor();
    executor
        .start::<GateWorkflow>("gate-closed", QUEUE, gate(0, None))
        .await
        .unwrap();
    executor
        .signal("gate-closed", WorkflowSignal::new("go", json!("first")))
        .await
        .unwrap();
    executor.await_result("gate-closed").await.unwrap();

    assert_ok!(
        executor
            .signal("gate-closed", WorkflowSignal::new("go", json!("second")))
            .await
    );
    assert_eq!(
        executor.await_result("gate-closed").await.unwrap(),
        json!("first")
    );
}

#[tokio::test]
async fn test_signal_unknown_workflow() {
    let executor = executor();
    let err = executor
        .signal("missing", WorkflowSignal::new("go", json!(null)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExecutorError::Store(StoreError::ExecutionNotFound(_))
    ));
}

// ============================================
// Timeouts
// ============================================

#[test_log::test(tokio::test(start_paused = true))]
async fn test_wait_timeout_resolves_timed_out() {
    let executor = executor();
    executor
        .start::<GateWorkflow>("gate-wait-timeout", QUEUE, gate(0, Some(30)))
        .await
        .unwrap();

    let result = executor.await_result("gate-wait-timeout").await.unwrap();
    assert_eq!(result, json!("timed out"));

    let history = executor.history("gate-wait-timeout").await.unwrap();
    assert!(history.iter().any(|e| matches!(
        e,
        WorkflowEvent::SignalWaitResolved {
            outcome: SignalOutcome::TimedOut,
            ..
        }
    )));
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_execution_timeout_closes_run() {
    let executor = executor();
    let request = StartWorkflowRequest {
        workflow_type: GateWorkflow::TYPE.to_string(),
        input: json!({}),
        options: StartWorkflowOptions::new("gate-exec-timeout", QUEUE)
            .with_execution_timeout(Duration::from_secs(10))
            .with_run_timeout(Duration::from_secs(20)),
    };
    executor.start_workflow(request).await.unwrap();

    let err = executor.await_result("gate-exec-timeout").await.unwrap_err();
    match err {
        ExecutorError::WorkflowClosed { status, .. } => {
            assert_eq!(status, ExecutionStatus::TimedOut)
        }
        other => panic!("unexpected error: {other}"),
    }

    let history = executor.history("gate-exec-timeout").await.unwrap();
    assert!(matches!(
        history.last(),
        Some(WorkflowEvent::WorkflowTimedOut { timeout_ms: 10_000 })
    ));
}

// ============================================
// Lifecycle
// ============================================

#[tokio::test]
async fn test_duplicate_start_rejected_while_running() {
    let executor = executor();
    executor
        .start::<GateWorkflow>("gate-dup", QUEUE, gate(0, None))
        .await
        .unwrap();

    let err = executor
        .start::<GateWorkflow>("gate-dup", QUEUE, gate(0, None))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExecutorError::Store(StoreError::ExecutionAlreadyRunning(_))
    ));

    executor
        .signal("gate-dup", WorkflowSignal::new("go", json!("done")))
        .await
        .unwrap();
    executor.await_result("gate-dup").await.unwrap();

    // Closed runs free the ID
    let second = executor
        .start::<GateWorkflow>("gate-dup", QUEUE, gate(0, None))
        .await
        .unwrap();
    assert_eq!(
        executor.describe("gate-dup").await.unwrap().run_id,
        second.run_id
    );
}

#[tokio::test]
async fn test_unserved_queue_waits_for_worker() {
    let executor = executor();
    executor
        .start::<GateWorkflow>("gate-unserved", "other-queue", gate(0, None))
        .await
        .unwrap();
    executor
        .signal("gate-unserved", WorkflowSignal::new("go", json!("late")))
        .await
        .unwrap();

    let history = executor.history("gate-unserved").await.unwrap();
    assert!(!history
        .iter()
        .any(|e| matches!(e, WorkflowEvent::SignalWaitStarted { .. })));

    executor.serve_task_queue("other-queue");
    let result = executor.await_result("gate-unserved").await.unwrap();
    assert_eq!(result, json!("late"));
}

#[tokio::test]
async fn test_unknown_workflow_type_rejected() {
    let executor = executor();
    let request = StartWorkflowRequest {
        workflow_type: "Nope".to_string(),
        input: json!({}),
        options: StartWorkflowOptions::new("nope-1", QUEUE),
    };
    assert_err!(executor.start_workflow(request).await);
    assert_err!(executor.describe("nope-1").await);
}

#[tokio::test]
async fn test_failed_workflow_reports_cause() {
    let executor = executor();
    executor
        .start::<BrokenWorkflow>("broken-1", QUEUE, json!(null))
        .await
        .unwrap();

    match executor.await_result("broken-1").await.unwrap_err() {
        ExecutorError::WorkflowClosed { status, cause, .. } => {
            assert_eq!(status, ExecutionStatus::Failed);
            assert_eq!(cause, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_cancel_running_workflow() {
    let executor = executor();
    executor
        .start::<GateWorkflow>("gate-cancel", QUEUE, gate(0, None))
        .await
        .unwrap();

    executor.cancel("gate-cancel", "user request").await.unwrap();
    // Idempotent once closed
    executor.cancel("gate-cancel", "again").await.unwrap();

    match executor.await_result("gate-cancel").await.unwrap_err() {
        ExecutorError::WorkflowClosed { status, cause, .. } => {
            assert_eq!(status, ExecutionStatus::Canceled);
            assert_eq!(cause, "user request");
        }
        other => panic!("unexpected error: {other}"),
    }

    let history = executor.history("gate-cancel").await.unwrap();
    assert!(history.iter().any(|e| matches!(
        e,
        WorkflowEvent::SignalWaitResolved {
            outcome: SignalOutcome::Canceled,
            ..
        }
    )));
}

#[tokio::test]
async fn test_terminate_running_workflow() {
    let executor = executor();
    executor
        .start::<GateWorkflow>("gate-terminate", QUEUE, gate(0, None))
        .await
        .unwrap();

    executor.terminate("gate-terminate", "stuck").await.unwrap();
    assert_eq!(
        executor.describe("gate-terminate").await.unwrap().status,
        ExecutionStatus::Terminated
    );
    assert!(matches!(
        executor.terminate("missing", "x").await,
        Err(ExecutorError::Store(StoreError::ExecutionNotFound(_)))
    ));
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_concurrent_waiters_see_same_result() {
    let executor = executor();
    executor
        .start::<GateWorkflow>("gate-waiters", QUEUE, gate(0, None))
        .await
        .unwrap();

    let first = tokio::spawn({
        let executor = executor.clone();
        async move { executor.await_result("gate-waiters").await }
    });
    let second = tokio::spawn({
        let executor = executor.clone();
        async move { executor.await_result("gate-waiters").await }
    });
    tokio::task::yield_now().await;

    executor
        .signal("gate-waiters", WorkflowSignal::new("go", json!(42)))
        .await
        .unwrap();

    assert_eq!(first.await.unwrap().unwrap(), json!(42));
    assert_eq!(second.await.unwrap().unwrap(), json!(42));
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_shutdown_releases_pending_result_wait() {
    let executor = executor();
    executor
        .start::<GateWorkflow>("gate-shutdown", QUEUE, gate(0, None))
        .await
        .unwrap();

    let waiter = tokio::spawn({
        let executor = executor.clone();
        async move { executor.await_result("gate-shutdown").await }
    });
    tokio::task::yield_now().await;
    assert!(!waiter.is_finished());

    executor.shutdown().await;

    let result = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(result, Err(ExecutorError::ShuttingDown)), "got {result:?}");

    // Later waits do not block either
    assert!(matches!(
        executor.await_result("gate-shutdown").await,
        Err(ExecutorError::ShuttingDown)
    ));
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_zero_timeouts_mean_default() {
    let executor = executor();
    let options = StartWorkflowOptions::new("gate-zero", QUEUE)
        .with_execution_timeout(Duration::ZERO)
        .with_run_timeout(Duration::ZERO);
    executor
        .start_workflow(StartWorkflowRequest {
            workflow_type: GateWorkflow::TYPE.to_string(),
            input: serde_json::to_value(gate(0, None)).unwrap(),
            options,
        })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(60 * 60)).await;
    let description = executor.describe("gate-zero").await.unwrap();
    assert_eq!(description.status, ExecutionStatus::Running);

    tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
    let description = executor.describe("gate-zero").await.unwrap();
    assert_eq!(description.status, ExecutionStatus::TimedOut);
}
