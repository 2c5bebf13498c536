//! End-to-end tests: the CLI's commands against a real worker
//!
//! HTTP scenarios bind a worker on an ephemeral port and go through
//! `HttpEngine`; the delay scenario runs in-process under paused time.

use std::sync::Arc;
use std::time::Duration;

use futures::TryStreamExt;
use hello_cli::{execute, CliError, Command, HttpEngine, Outcome, ScheduleCommand, ScheduleManager};
use hello_core::{
    EngineConfig, EngineError, ExecutionStatus, ScheduleState, WorkflowEngine,
    MAX_DELAY_MINUTES, SCHEDULE_WORKFLOW_NAME, WORKFLOW_ID_PREFIX,
};
use hello_engine::{InMemoryExecutionStore, WorkflowExecutor};
use hello_worker::{register_workflows, HelloWorker};
use serde_json::json;
use tokio::net::TcpListener;

const QUEUE: &str = "hello-e2e";

fn config(address: String) -> EngineConfig {
    EngineConfig {
        address,
        namespace: "e2e".to_string(),
        api_key: "e2e-key".to_string(),
        task_queue: QUEUE.to_string(),
    }
}

/// Serve a worker on 127.0.0.1:<ephemeral> for the rest of the test
async fn spawn_worker() -> EngineConfig {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = config(listener.local_addr().unwrap().to_string());
    let worker = Arc::new(HelloWorker::new(&config));
    tokio::spawn(async move { worker.serve(listener, std::future::pending()).await });
    config
}

/// A config whose address nothing listens on
fn dead_config() -> EngineConfig {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    config(format!("127.0.0.1:{port}"))
}

fn http(config: &EngineConfig) -> Arc<dyn WorkflowEngine> {
    Arc::new(HttpEngine::new(config).unwrap())
}

#[test_log::test(tokio::test)]
async fn test_start_signal_get_over_http() {
    let config = spawn_worker().await;
    let engine = http(&config);

    let outcome = execute(Command::Start, engine.clone(), &config).await.unwrap();
    let Outcome::Started { workflow_id, .. } = outcome else {
        panic!("expected Started, got {outcome:?}");
    };
    let ts: i64 = workflow_id
        .strip_prefix(WORKFLOW_ID_PREFIX)
        .unwrap()
        .parse()
        .unwrap();
    assert!(ts > 0);

    let outcome = execute(
        Command::Status {
            workflow_id: workflow_id.clone(),
        },
        engine.clone(),
        &config,
    )
    .await
    .unwrap();
    assert!(matches!(
        outcome,
        Outcome::Status {
            status: ExecutionStatus::Running,
            ..
        }
    ));

    execute(
        Command::Signal {
            workflow_id: workflow_id.clone(),
            new_name: "Ada".to_string(),
        },
        engine.clone(),
        &config,
    )
    .await
    .unwrap();

    let outcome = execute(
        Command::Get {
            workflow_id: workflow_id.clone(),
        },
        engine.clone(),
        &config,
    )
    .await
    .unwrap();
    assert_eq!(
        outcome,
        Outcome::Result {
            workflow_id,
            result: json!("Hello, Ada from Temporal Worker on AWS!"),
        }
    );
    assert_eq!(
        outcome.to_text(),
        "Hello, Ada from Temporal Worker on AWS!\n"
    );
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_delay_then_empty_signal_keeps_name() {
    let executor = WorkflowExecutor::new(InMemoryExecutionStore::new());
    register_workflows(&executor);
    executor.serve_task_queue(QUEUE);
    let engine: Arc<dyn WorkflowEngine> = Arc::new(executor.clone());
    let config = config("in-process".to_string());

    let outcome = execute(
        Command::Delay {
            minutes: 1,
            name: Some("Grace".to_string()),
        },
        engine.clone(),
        &config,
    )
    .await
    .unwrap();
    let Outcome::Started { workflow_id, .. } = outcome else {
        panic!("expected Started, got {outcome:?}");
    };
    assert!(workflow_id.starts_with("hello-workflow-delay-"));

    tokio::time::sleep(Duration::from_secs(59)).await;
    let status = engine.describe_workflow(&workflow_id).await.unwrap();
    assert_eq!(status.status, ExecutionStatus::Running);

    tokio::time::sleep(Duration::from_secs(2)).await;
    execute(
        Command::Signal {
            workflow_id: workflow_id.clone(),
            new_name: String::new(),
        },
        engine.clone(),
        &config,
    )
    .await
    .unwrap();

    let result = engine.await_result(&workflow_id).await.unwrap();
    assert_eq!(result, json!("Hello, Grace from Temporal Worker on AWS!"));

    executor.shutdown().await;
}

#[test_log::test(tokio::test)]
async fn test_schedule_lifecycle_over_http() {
    let config = spawn_worker().await;
    let engine = http(&config);
    let config = &config;
    let schedule =
        move |command| execute(Command::Schedule { command }, engine.clone(), config);

    let outcome = schedule(ScheduleCommand::Create {
        schedule_id: "nightly".to_string(),
        cron: "0 9 * * *".to_string(),
        workflow_id: None,
    })
    .await
    .unwrap();
    let Outcome::Schedule { schedule: created } = outcome else {
        panic!("expected Schedule, got {outcome:?}");
    };
    assert_eq!(created.state, ScheduleState::Active);
    assert_eq!(created.cron_expression, "0 9 * * *");
    assert_eq!(created.workflow_type, SCHEDULE_WORKFLOW_NAME);
    assert_eq!(created.task_queue, QUEUE);
    assert!(created.workflow_id.starts_with(WORKFLOW_ID_PREFIX));

    for _ in 0..2 {
        schedule(ScheduleCommand::Pause {
            schedule_id: "nightly".to_string(),
            note: Some("maintenance".to_string()),
        })
        .await
        .unwrap();
    }
    let outcome = schedule(ScheduleCommand::Describe {
        schedule_id: "nightly".to_string(),
    })
    .await
    .unwrap();
    assert!(matches!(
        outcome,
        Outcome::Schedule { ref schedule } if schedule.state == ScheduleState::Paused
    ));

    for _ in 0..2 {
        schedule(ScheduleCommand::Resume {
            schedule_id: "nightly".to_string(),
            note: None,
        })
        .await
        .unwrap();
    }
    let outcome = schedule(ScheduleCommand::Describe {
        schedule_id: "nightly".to_string(),
    })
    .await
    .unwrap();
    assert!(matches!(
        outcome,
        Outcome::Schedule { ref schedule } if schedule.state == ScheduleState::Active
    ));

    let outcome = schedule(ScheduleCommand::List).await.unwrap();
    let Outcome::Schedules { schedules } = outcome else {
        panic!("expected Schedules, got {outcome:?}");
    };
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0].schedule_id, "nightly");

    schedule(ScheduleCommand::Delete {
        schedule_id: "nightly".to_string(),
    })
    .await
    .unwrap();
    let err = schedule(ScheduleCommand::Describe {
        schedule_id: "nightly".to_string(),
    })
    .await
    .unwrap_err();
    assert!(matches!(err, CliError::Engine(EngineError::NotFound(_))), "got {err:?}");

    let err = schedule(ScheduleCommand::Pause {
        schedule_id: "nightly".to_string(),
        note: None,
    })
    .await
    .unwrap_err();
    assert!(matches!(err, CliError::Engine(EngineError::NotFound(_))), "got {err:?}");
}

#[tokio::test]
async fn test_list_drains_every_page() {
    let config = spawn_worker().await;
    let manager = ScheduleManager::new(http(&config), QUEUE).with_page_size(2);

    for i in 0..5 {
        manager
            .create(&format!("schedule-{i}"), "*/5 * * * *", Some(format!("wf-{i}")))
            .await
            .unwrap();
    }

    let mut ids: Vec<String> = manager
        .list()
        .map_ok(|entry| entry.schedule_id)
        .try_collect()
        .await
        .unwrap();
    ids.sort();
    assert_eq!(
        ids,
        vec!["schedule-0", "schedule-1", "schedule-2", "schedule-3", "schedule-4"]
    );
}

#[tokio::test]
async fn test_local_validation_makes_no_remote_call() {
    // Any remote call against this config would fail with a connection error
    let config = dead_config();
    let engine = http(&config);

    let err = execute(
        Command::Delay {
            minutes: 0,
            name: None,
        },
        engine.clone(),
        &config,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CliError::Validation(_)), "got {err:?}");

    for minutes in [MAX_DELAY_MINUTES + 1, 307_445_734_561_825_861, i64::MAX] {
        let err = execute(
            Command::Delay {
                minutes,
                name: None,
            },
            engine.clone(),
            &config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Validation(_)), "{minutes}: got {err:?}");
    }

    let err = execute(
        Command::Schedule {
            command: ScheduleCommand::Create {
                schedule_id: "bad".to_string(),
                cron: "every day".to_string(),
                workflow_id: None,
            },
        },
        engine.clone(),
        &config,
    )
    .await
    .unwrap_err();
    assert!(
        matches!(err, CliError::Engine(EngineError::InvalidCron { ref expression, .. }) if expression == "every day"),
        "got {err:?}"
    );

    let err = execute(Command::Start, engine, &config).await.unwrap_err();
    assert!(matches!(err, CliError::Engine(EngineError::Connection(_))), "got {err:?}");
}

#[tokio::test]
async fn test_remote_errors_keep_their_kind() {
    let config = spawn_worker().await;
    let engine = HttpEngine::new(&config).unwrap();

    let err = engine
        .signal_workflow("never-started", "update-name", json!("Ada"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)), "got {err:?}");

    let mut wrong_key = config.clone();
    wrong_key.api_key = "nope".to_string();
    let err = HttpEngine::new(&wrong_key)
        .unwrap()
        .describe_workflow("any")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)), "got {err:?}");

    let outcome = execute(Command::Start, Arc::new(engine.clone()), &config)
        .await
        .unwrap();
    let Outcome::Started { workflow_id, .. } = outcome else {
        panic!("expected Started, got {outcome:?}");
    };
    engine
        .cancel_workflow(&workflow_id, Some("changed my mind".to_string()))
        .await
        .unwrap();
    let err = engine.await_result(&workflow_id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::TerminalState {
            status: ExecutionStatus::Canceled,
            cause: "changed my mind".to_string(),
        }
    );
}

#[tokio::test]
async fn test_terminate_over_http() {
    let config = spawn_worker().await;
    let engine = HttpEngine::new(&config).unwrap();

    let outcome = execute(Command::Start, Arc::new(engine.clone()), &config)
        .await
        .unwrap();
    let Outcome::Started { workflow_id, .. } = outcome else {
        panic!("expected Started, got {outcome:?}");
    };
    engine.terminate_workflow(&workflow_id, None).await.unwrap();

    let status = engine.describe_workflow(&workflow_id).await.unwrap();
    assert_eq!(status.status, ExecutionStatus::Terminated);
}

#[test_log::test(tokio::test)]
async fn test_shutdown_answers_pending_result_poll() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = config(listener.local_addr().unwrap().to_string());
    let worker = Arc::new(HelloWorker::new(&config));
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        worker
            .serve(listener, async {
                let _ = stopped.await;
            })
            .await
    });
    let engine = http(&config);

    let outcome = execute(Command::Start, engine.clone(), &config).await.unwrap();
    let Outcome::Started { workflow_id, .. } = outcome else {
        panic!("expected Started, got {outcome:?}");
    };

    // Nobody signals, so the poll would hang until the run times out
    let poll = tokio::spawn({
        let engine = engine.clone();
        async move { engine.await_result(&workflow_id).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!poll.is_finished());

    stop.send(()).unwrap();

    let served = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("worker kept serving after shutdown")
        .unwrap();
    assert!(served.is_ok());

    let result = tokio::time::timeout(Duration::from_secs(5), poll)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(result, Err(EngineError::Connection(_))), "got {result:?}");
}
