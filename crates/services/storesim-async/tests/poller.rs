use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::{Value, json};
use storesim_async::classify::standard_error;
use storesim_async::messages::{self, codes};
use storesim_async::normalize::{JobId, JobStatus};
use storesim_async::persist::{MemoryStore, ReconnectStore, StoreError, persisted_job_id};
use storesim_async::poller::{JobPoller, JobSource, JobWatch, PollOptions, PollState};
use storesim_async::{Locale, StoresimError};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

type Reply = Result<Option<Value>, StoresimError>;

/// Replays canned replies; once exhausted every fetch reports `pending`.
#[derive(Default)]
struct Script {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Instant>>,
}

impl Script {
    fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::default(),
        })
    }

    fn calls(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }

    fn gaps(&self) -> Vec<Duration> {
        self.calls()
            .windows(2)
            .map(|w| w[1].duration_since(w[0]))
            .collect()
    }
}

impl JobSource for Script {
    fn fetch_job<'a>(&'a self, _job_id: JobId, _cancel: &'a CancellationToken) -> BoxFuture<'a, Reply> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(Instant::now());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Some(json!({"status": "pending"}))))
        })
    }
}

/// Never answers; resolves only when cancelled.
#[derive(Default)]
struct Hanging {
    started: Mutex<Vec<JobId>>,
    ended: AtomicUsize,
}

struct Ended<'a>(&'a AtomicUsize);

impl Drop for Ended<'_> {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl JobSource for Hanging {
    fn fetch_job<'a>(&'a self, job_id: JobId, cancel: &'a CancellationToken) -> BoxFuture<'a, Reply> {
        Box::pin(async move {
            let _ended = Ended(&self.ended);
            self.started.lock().unwrap().push(job_id);
            cancel.cancelled().await;
            Err(StoresimError::Cancelled)
        })
    }
}

/// Counts clears on top of a memory store.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    clears: AtomicUsize,
}

impl ReconnectStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear(key)
    }
}

#[derive(Default)]
struct Calls {
    completed: Mutex<Vec<JobId>>,
    failed: Mutex<Vec<(String, Option<String>)>>,
}

fn poller_with(source: Arc<dyn JobSource>, calls: &Arc<Calls>) -> JobPoller {
    let (c, f) = (Arc::clone(calls), Arc::clone(calls));
    JobPoller::new(source)
        .on_completed(move |id| c.completed.lock().unwrap().push(id))
        .on_failed(move |msg, code| {
            f.failed
                .lock()
                .unwrap()
                .push((msg.to_string(), code.map(ToString::to_string)));
        })
}

fn server_error(status: u16) -> StoresimError {
    StoresimError::Api(standard_error(status, None, Locale::En))
}

#[tokio::test(start_paused = true)]
async fn completes_after_running_states() {
    let script = Script::new(vec![
        Ok(Some(json!({"status": "pending"}))),
        Ok(Some(json!({"status": "processing", "progress": 50}))),
        Ok(Some(json!({"status": "completed", "resultId": 42, "progress": 100}))),
    ]);
    let calls = Arc::new(Calls::default());
    let handle = poller_with(script.clone(), &calls).watch(7);

    assert!(handle.state().is_polling);
    assert_eq!(handle.state().status, JobStatus::Pending);

    let state = handle.finished().await;
    assert_eq!(state.status, JobStatus::Completed);
    assert_eq!(state.result_id, Some(42));
    assert_eq!(state.error_code, None);
    assert!(!state.is_polling);
    assert_eq!(state.attempt, 3);

    assert_eq!(*calls.completed.lock().unwrap(), vec![42]);
    assert!(calls.failed.lock().unwrap().is_empty());

    let gaps = script.gaps();
    assert_eq!(gaps.len(), 2);
    assert!(gaps[0] >= Duration::from_millis(1575) && gaps[0] < Duration::from_millis(1580));
    assert!(gaps[1] >= Duration::from_millis(1650) && gaps[1] < Duration::from_millis(1655));
}

#[tokio::test(start_paused = true)]
async fn completed_without_result_is_failure() {
    let script = Script::new(vec![Ok(Some(json!({"status": "completed"})))]);
    let calls = Arc::new(Calls::default());

    let state = poller_with(script, &calls).watch(1).finished().await;

    assert_eq!(state.status, JobStatus::Failed);
    assert_eq!(state.result_id, None);
    assert_eq!(state.error_code.as_deref(), Some(codes::RESULT_ID_MISSING));
    assert_eq!(
        state.error_message.as_deref(),
        messages::lookup(codes::RESULT_ID_MISSING, Locale::En)
    );
    assert!(calls.completed.lock().unwrap().is_empty());
    assert_eq!(
        *calls.failed.lock().unwrap(),
        vec![(
            state.error_message.clone().unwrap(),
            Some(codes::RESULT_ID_MISSING.to_string())
        )]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_job_reports_server_message_and_code() {
    let script = Script::new(vec![Ok(Some(
        json!({"status": "failed", "error_message": "[BACKEND_TIMEOUT] llm stalled"}),
    ))]);
    let calls = Arc::new(Calls::default());

    let state = poller_with(script, &calls).watch(1).finished().await;

    assert_eq!(state.status, JobStatus::Failed);
    assert_eq!(state.error_code.as_deref(), Some(codes::BACKEND_TIMEOUT));
    assert_eq!(state.error_message.as_deref(), Some("[BACKEND_TIMEOUT] llm stalled"));
    assert_eq!(calls.failed.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_job_without_message_gets_default() {
    let script = Script::new(vec![Ok(Some(json!({"status": "failed"})))]);
    let calls = Arc::new(Calls::default());

    let state = poller_with(script, &calls)
        .with_options(PollOptions::default().with_locale(Locale::Ko))
        .watch(1)
        .finished()
        .await;

    assert_eq!(state.error_message.as_deref(), Some(messages::job_failed(Locale::Ko)));
    assert_eq!(state.error_code, None);
}

#[tokio::test(start_paused = true)]
async fn unknown_status_fails_immediately() {
    let script = Script::new(vec![Ok(Some(json!({"status": "exploded"})))]);
    let calls = Arc::new(Calls::default());

    let state = poller_with(script.clone(), &calls).watch(1).finished().await;

    assert_eq!(state.status, JobStatus::Failed);
    assert_eq!(state.error_code.as_deref(), Some(codes::JOB_STATUS_INVALID));
    assert_eq!(script.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn transient_errors_retry_with_longer_delay() {
    let script = Script::new(vec![
        Err(server_error(503)),
        Err(StoresimError::Timeout {
            after: Duration::from_secs(10),
        }),
        Ok(Some(json!({"status": "completed", "result_id": "9"}))),
    ]);
    let calls = Arc::new(Calls::default());

    let state = poller_with(script.clone(), &calls).watch(1).finished().await;

    assert_eq!(state.status, JobStatus::Completed);
    assert_eq!(state.result_id, Some(9));
    assert_eq!(state.attempt, 3);
    for gap in script.gaps() {
        assert!(gap >= Duration::from_secs(10) && gap < Duration::from_millis(10_005));
    }
}

#[tokio::test(start_paused = true)]
async fn transient_errors_exhaust_attempts() {
    let script = Script::new((0..5).map(|_| Err(server_error(500))).collect());
    let calls = Arc::new(Calls::default());

    let state = poller_with(script.clone(), &calls)
        .with_options(PollOptions::default().with_max_attempts(3))
        .watch(1)
        .finished()
        .await;

    assert_eq!(state.error_code.as_deref(), Some(codes::MAX_RETRIES_EXCEEDED));
    assert_eq!(state.attempt, 3);
    assert_eq!(script.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn client_error_is_fatal() {
    let script = Script::new(vec![Err(server_error(404))]);
    let calls = Arc::new(Calls::default());

    let state = poller_with(script.clone(), &calls).watch(1).finished().await;

    assert_eq!(state.status, JobStatus::Failed);
    assert_eq!(state.error_code, None);
    assert_eq!(
        state.error_message.as_deref(),
        Some("The requested resource was not found.")
    );
    assert_eq!(state.attempt, 0);
    assert_eq!(script.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn attempt_budget_stops_before_request() {
    let script = Script::new(vec![]);
    let calls = Arc::new(Calls::default());

    let state = poller_with(script.clone(), &calls)
        .with_options(PollOptions::default().with_max_attempts(3))
        .watch(1)
        .finished()
        .await;

    assert_eq!(state.error_code.as_deref(), Some(codes::MAX_RETRIES_EXCEEDED));
    assert_eq!(script.calls().len(), 3);
    assert_eq!(calls.failed.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn time_budget_stops_before_request() {
    let script = Script::new(vec![]);
    let calls = Arc::new(Calls::default());

    let state = poller_with(script.clone(), &calls)
        .with_options(PollOptions::default().with_timeout(Duration::from_secs(5)))
        .watch(1)
        .finished()
        .await;

    assert_eq!(state.error_code.as_deref(), Some(codes::TIMEOUT));
    assert_eq!(state.status, JobStatus::Failed);
    // requests at 0, 1.575s, 3.225s and 4.95s; the next check lands past 5s
    assert_eq!(script.calls().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn zero_attempt_budget_issues_no_request() {
    let script = Script::new(vec![]);
    let calls = Arc::new(Calls::default());

    let state = poller_with(script.clone(), &calls)
        .with_options(PollOptions::default().with_max_attempts(0))
        .watch(1)
        .finished()
        .await;

    assert_eq!(state.error_code.as_deref(), Some(codes::MAX_RETRIES_EXCEEDED));
    assert!(script.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn callbacks_observe_terminal_state() {
    let script = Script::new(vec![Ok(Some(json!({"status": "completed", "resultId": 5})))]);
    let rx_slot: Arc<OnceLock<watch::Receiver<PollState>>> = Arc::new(OnceLock::new());
    let seen: Arc<Mutex<Option<PollState>>> = Arc::default();

    let (slot, out) = (Arc::clone(&rx_slot), Arc::clone(&seen));
    let handle = JobPoller::new(script)
        .on_completed(move |_| {
            let state = slot.get().map(|rx| rx.borrow().clone());
            *out.lock().unwrap() = state;
        })
        .watch(3);
    rx_slot.set(handle.subscribe()).unwrap();
    handle.finished().await;

    let state = seen.lock().unwrap().clone().unwrap();
    assert_eq!(state.status, JobStatus::Completed);
    assert_eq!(state.result_id, Some(5));
    assert!(!state.is_polling);
}

#[tokio::test(start_paused = true)]
async fn cancel_aborts_in_flight_request_once() {
    let source = Arc::new(Hanging::default());
    let store = Arc::new(CountingStore::default());
    let calls = Arc::new(Calls::default());

    let handle = poller_with(source.clone(), &calls)
        .with_store(store.clone())
        .with_options(PollOptions::default().with_persist_key("sim"))
        .watch(11);

    assert_eq!(persisted_job_id(store.as_ref(), "sim"), Some(11));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*source.started.lock().unwrap(), vec![11]);

    handle.cancel();
    handle.cancel();
    let state = handle.finished().await;

    assert!(!state.is_polling);
    assert_eq!(state.status, JobStatus::Pending);
    assert_eq!(store.clears.load(Ordering::SeqCst), 1);
    assert_eq!(persisted_job_id(store.as_ref(), "sim"), None);
    assert!(calls.completed.lock().unwrap().is_empty());
    assert!(calls.failed.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_cleans_up() {
    let source = Arc::new(Hanging::default());
    let store = Arc::new(CountingStore::default());

    let handle = JobPoller::new(source.clone())
        .with_store(store.clone())
        .with_options(PollOptions::default().with_persist_key("drop"))
        .watch(4);
    let rx = handle.subscribe();
    tokio::time::sleep(Duration::from_millis(10)).await;

    drop(handle);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(!rx.borrow().is_polling);
    assert_eq!(source.ended.load(Ordering::SeqCst), 1);
    assert_eq!(store.clears.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn terminal_state_clears_slot_once() {
    let script = Script::new(vec![Ok(Some(json!({"status": "completed", "resultId": 1})))]);
    let store = Arc::new(CountingStore::default());

    let handle = JobPoller::new(script)
        .with_store(store.clone())
        .with_options(PollOptions::default().with_persist_key("done"))
        .watch(2);
    assert_eq!(persisted_job_id(store.as_ref(), "done"), Some(2));

    let mut rx = handle.subscribe();
    let state = rx.wait_for(|s| !s.is_polling).await.unwrap().clone();
    assert_eq!(state.status, JobStatus::Completed);

    handle.cancel();
    drop(handle);

    assert_eq!(store.clears.load(Ordering::SeqCst), 1);
    assert_eq!(persisted_job_id(store.as_ref(), "done"), None);
}

#[tokio::test(start_paused = true)]
async fn disabled_poller_stays_idle() {
    let script = Script::new(vec![]);
    let handle = JobPoller::new(script.clone())
        .with_options(PollOptions::default().with_enabled(false))
        .watch(1);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(handle.state(), PollState::idle());
    assert!(script.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn job_watch_follows_id_and_enabled() {
    let source = Arc::new(Hanging::default());
    let store = Arc::new(MemoryStore::new());
    let poller = JobPoller::new(source.clone())
        .with_store(store.clone())
        .with_options(PollOptions::default().with_persist_key("watch"));
    let mut watch = JobWatch::new(poller);
    assert!(watch.is_enabled());
    assert!(watch.handle().is_none());

    watch.set_job_id(Some(1));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(watch.state().is_polling);
    assert_eq!(persisted_job_id(store.as_ref(), "watch"), Some(1));

    let first = watch.handle().unwrap().subscribe();
    watch.set_job_id(Some(2));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!first.borrow().is_polling);
    assert_eq!(watch.handle().unwrap().job_id(), 2);
    assert_eq!(watch.job_id(), Some(2));
    assert_eq!(persisted_job_id(store.as_ref(), "watch"), Some(2));
    assert_eq!(*source.started.lock().unwrap(), vec![1, 2]);

    watch.set_job_id(Some(2));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(source.started.lock().unwrap().len(), 2);

    watch.set_enabled(false);
    assert!(!watch.is_enabled());
    assert_eq!(watch.job_id(), Some(2));
    assert!(watch.handle().is_none());
    assert!(!watch.state().is_polling);
    assert_eq!(persisted_job_id(store.as_ref(), "watch"), None);

    watch.set_enabled(true);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(*source.started.lock().unwrap(), vec![1, 2, 2]);

    watch.set_job_id(None);
    assert!(watch.handle().is_none());
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(source.ended.load(Ordering::SeqCst), 3);
}
