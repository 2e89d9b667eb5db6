//! Integration tests for job workers

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::test_client;
use rstest::rstest;
use tokio::sync::mpsc;
use zeebe::worker::HandlerResult;
use zeebe::{Code, Error, TransportError};
use zeebe_transport::testing::{MockGateway, job};
use zeebe_transport::types::ActivatedJob;

/// Handler that reports every job key on `tx` and completes the job
fn reporting_handler(
    tx: mpsc::UnboundedSender<i64>,
) -> impl Fn(ActivatedJob) -> std::future::Ready<HandlerResult> + Send + Sync {
    move |job: ActivatedJob| {
        tx.send(job.key).ok();
        std::future::ready(Ok(Some(format!(r#"{{"handled":{}}}"#, job.key))))
    }
}

#[tokio::test(start_paused = true)]
async fn test_worker_dispatches_and_completes_jobs() {
    let gateway = MockGateway::new();
    gateway
        .push_jobs(vec![job(1, "payment"), job(2, "payment")])
        .await;
    let client = test_client(&gateway);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let worker = client
        .new_worker()
        .job_type("payment")
        .name("billing")
        .handler(reporting_handler(tx))
        .open()
        .unwrap();

    let mut keys = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
    keys.sort();
    assert_eq!(keys, vec![1, 2]);

    worker.close().await.unwrap();

    let calls = gateway.calls().await;
    let first_poll = &calls.activate_jobs[0];
    assert_eq!(first_poll.job_type, "payment");
    assert_eq!(first_poll.worker, "billing");
    assert_eq!(first_poll.max_jobs_to_activate, 32);
    assert_eq!(first_poll.tenant_ids, vec!["<default>".to_string()]);

    let mut completed: Vec<_> = calls
        .complete_job
        .iter()
        .map(|request| (request.job_key, request.variables.clone()))
        .collect();
    completed.sort();
    assert_eq!(
        completed,
        vec![
            (1, Some(r#"{"handled":1}"#.to_string())),
            (2, Some(r#"{"handled":2}"#.to_string())),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_handler_error_fails_the_job() {
    let gateway = MockGateway::new();
    gateway.push_jobs(vec![job(7, "shipping")]).await;
    let client = test_client(&gateway);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let worker = client
        .new_worker()
        .job_type("shipping")
        .handler(move |job: ActivatedJob| {
            let tx = tx.clone();
            async move {
                tx.send(job.key).ok();
                HandlerResult::Err("carrier unreachable".into())
            }
        })
        .open()
        .unwrap();

    assert_eq!(rx.recv().await, Some(7));
    worker.close().await.unwrap();

    let calls = gateway.calls().await;
    assert!(calls.complete_job.is_empty());
    assert_eq!(calls.fail_job.len(), 1);
    assert_eq!(calls.fail_job[0].job_key, 7);
    assert_eq!(calls.fail_job[0].retries, 2);
    assert_eq!(calls.fail_job[0].error_message, "carrier unreachable");
}

#[rstest]
#[case::last_retry(1, 0)]
#[case::no_retries_left(0, 0)]
#[case::negative_minimum(i32::MIN, 0)]
#[tokio::test(start_paused = true)]
async fn test_failed_job_retries_never_go_negative(#[case] retries: i32, #[case] expected: i32) {
    let gateway = MockGateway::new();
    let mut exhausted = job(9, "shipping");
    exhausted.retries = retries;
    gateway.push_jobs(vec![exhausted]).await;
    let client = test_client(&gateway);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let worker = client
        .new_worker()
        .job_type("shipping")
        .handler(move |job: ActivatedJob| {
            let tx = tx.clone();
            async move {
                tx.send(job.key).ok();
                HandlerResult::Err("label printer jammed".into())
            }
        })
        .open()
        .unwrap();

    assert_eq!(rx.recv().await, Some(9));
    worker.close().await.unwrap();

    let calls = gateway.calls().await;
    assert_eq!(calls.fail_job.len(), 1);
    assert_eq!(calls.fail_job[0].retries, expected);
}

#[tokio::test(start_paused = true)]
async fn test_worker_keeps_polling_across_transient_errors() {
    let gateway = MockGateway::new();
    gateway
        .push_activate_jobs(Err(TransportError::status(Code::Unavailable, "restarting")))
        .await;
    gateway
        .push_activate_jobs(Err(TransportError::Connection("reset by peer".into())))
        .await;
    gateway.push_jobs(vec![job(3, "payment")]).await;
    let client = test_client(&gateway);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let start = tokio::time::Instant::now();
    let worker = client
        .new_worker()
        .job_type("payment")
        .handler(reporting_handler(tx))
        .open()
        .unwrap();

    assert_eq!(rx.recv().await, Some(3));
    // Backoff of 100ms then 200ms before the third poll
    assert!(start.elapsed() >= Duration::from_millis(300));

    worker.close().await.unwrap();
    assert!(gateway.calls().await.activate_jobs.len() >= 3);
}

#[tokio::test(start_paused = true)]
async fn test_worker_stops_on_fatal_poll_error() {
    let gateway = MockGateway::new();
    let fatal = TransportError::status(Code::PermissionDenied, "not authorized for tenant");
    gateway.push_activate_jobs(Err(fatal.clone())).await;
    let client = test_client(&gateway);
    let (tx, _rx) = mpsc::unbounded_channel();

    let worker = client
        .new_worker()
        .job_type("payment")
        .handler(reporting_handler(tx))
        .open()
        .unwrap();

    let err = worker.join().await.unwrap_err();
    assert!(matches!(err, Error::Transport(ref e) if *e == fatal));
    assert_eq!(gateway.calls().await.activate_jobs.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_worker_respects_max_jobs_active() {
    let gateway = MockGateway::new();
    let client = test_client(&gateway);
    let (tx, _rx) = mpsc::unbounded_channel();

    let worker = client
        .new_worker()
        .job_type("payment")
        .max_jobs_active(2)
        .poll_interval(Duration::from_millis(50))
        .timeout(Duration::from_secs(30))
        .handler(reporting_handler(tx))
        .open()
        .unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;
    worker.close().await.unwrap();

    let calls = gateway.calls().await;
    assert!(calls.activate_jobs.len() >= 2);
    for request in &calls.activate_jobs {
        assert_eq!(request.max_jobs_to_activate, 2);
        assert_eq!(request.timeout_ms, 30_000);
    }
}

/// How many handlers run at once, and how many have finished
#[derive(Default)]
struct Occupancy {
    active: AtomicUsize,
    peak: AtomicUsize,
    done: AtomicUsize,
}

#[tokio::test(start_paused = true)]
async fn test_worker_bounds_running_handlers_and_drains_on_close() {
    let gateway = MockGateway::new();
    gateway
        .push_jobs((1..=5).map(|key| job(key, "payment")).collect())
        .await;
    let client = test_client(&gateway);
    let occupancy = Arc::new(Occupancy::default());

    let tracked = Arc::clone(&occupancy);
    let worker = client
        .new_worker()
        .job_type("payment")
        .max_jobs_active(2)
        .handler(move |_job: ActivatedJob| {
            let occupancy = Arc::clone(&tracked);
            async move {
                let running = occupancy.active.fetch_add(1, Ordering::SeqCst) + 1;
                occupancy.peak.fetch_max(running, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(5)).await;
                occupancy.active.fetch_sub(1, Ordering::SeqCst);
                occupancy.done.fetch_add(1, Ordering::SeqCst);
                HandlerResult::Ok(None)
            }
        })
        .open()
        .unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(occupancy.active.load(Ordering::SeqCst), 2);
    assert_eq!(occupancy.done.load(Ordering::SeqCst), 0);

    worker.close().await.unwrap();

    assert_eq!(occupancy.peak.load(Ordering::SeqCst), 2);
    assert_eq!(occupancy.done.load(Ordering::SeqCst), 5);
    assert_eq!(occupancy.active.load(Ordering::SeqCst), 0);

    let mut completed: Vec<i64> = gateway
        .calls()
        .await
        .complete_job
        .iter()
        .map(|request| request.job_key)
        .collect();
    completed.sort_unstable();
    assert_eq!(completed, vec![1, 2, 3, 4, 5]);
}

#[tokio::test(start_paused = true)]
async fn test_close_stops_polling() {
    let gateway = MockGateway::new();
    let client = test_client(&gateway);
    let (tx, _rx) = mpsc::unbounded_channel();

    let worker = client
        .new_worker()
        .job_type("payment")
        .handler(reporting_handler(tx))
        .open()
        .unwrap();
    assert_eq!(worker.job_type(), "payment");
    assert_eq!(worker.name(), "default");

    tokio::time::sleep(Duration::from_secs(1)).await;
    worker.close().await.unwrap();

    let polls = gateway.calls().await.activate_jobs.len();
    assert!(polls > 0);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(gateway.calls().await.activate_jobs.len(), polls);
}

#[tokio::test(start_paused = true)]
async fn test_closing_the_client_stops_its_workers() {
    let gateway = MockGateway::new();
    let client = test_client(&gateway);
    let (tx, _rx) = mpsc::unbounded_channel();

    let worker = client
        .new_worker()
        .job_type("payment")
        .handler(reporting_handler(tx))
        .open()
        .unwrap();

    tokio::time::sleep(Duration::from_millis(250)).await;
    client.close();

    assert!(worker.is_closed());
    worker.join().await.unwrap();
}
