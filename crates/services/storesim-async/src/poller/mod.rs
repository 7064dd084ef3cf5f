//! Job status poller.
//!
//! [`JobPoller::watch`] spawns one task per activation. The task fetches the
//! job, publishes a [`PollState`] through a `watch` channel and sleeps between
//! attempts until the job reaches a terminal status, a budget runs out, or the
//! activation is cancelled. Cleanup (cancelling the in-flight request, dropping
//! the pending delay, clearing the reconnect slot) runs exactly once per
//! activation no matter which of these ends it.

mod clock;
mod host;
mod options;
mod source;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use clock::{Clock, TokioClock};
pub use host::JobWatch;
pub use options::{MAX_RETRY_DELAY, PollOptions};
pub use source::JobSource;

use crate::error::{StoresimError, parse_error};
use crate::messages::{self, codes};
use crate::normalize::{JobId, JobStatus, normalize_job_in};
use crate::persist::{ReconnectStore, slot_key};

/// Called once with the result id when a job completes
pub type OnCompleted = Arc<dyn Fn(JobId) + Send + Sync>;
/// Called once with `(message, code)` when a job fails
pub type OnFailed = Arc<dyn Fn(&str, Option<&str>) + Send + Sync>;

/// What hosts see of a poll activation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollState {
    pub status: JobStatus,
    pub progress: Option<f64>,
    pub result_id: Option<JobId>,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
    pub is_polling: bool,
    pub attempt: u32,
}

impl PollState {
    /// Nothing is being polled
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            status: JobStatus::Pending,
            progress: None,
            result_id: None,
            error_message: None,
            error_code: None,
            is_polling: false,
            attempt: 0,
        }
    }

    fn started() -> Self {
        Self {
            is_polling: true,
            ..Self::idle()
        }
    }
}

impl Default for PollState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Shared between a poll task and its handle
struct Activation {
    job_id: JobId,
    token: CancellationToken,
    closed: AtomicBool,
    state: watch::Sender<PollState>,
    store: Option<Arc<dyn ReconnectStore>>,
    slot: Option<String>,
}

impl Activation {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Publishes a non-terminal update unless the activation already ended.
    fn publish(&self, update: impl FnOnce(&mut PollState)) {
        self.state.send_if_modified(|s| {
            if self.is_closed() {
                return false;
            }
            update(s);
            true
        });
    }

    /// Ends the activation. Returns false if it had already ended.
    ///
    /// `last` is applied to the state in the same update that clears
    /// `is_polling`.
    fn close(&self, last: impl FnOnce(&mut PollState)) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.token.cancel();
        if let (Some(store), Some(slot)) = (&self.store, &self.slot) {
            if let Err(e) = store.clear(slot) {
                tracing::warn!(%slot, error = %e, "failed to clear reconnect slot");
            }
        }
        self.state.send_modify(|s| {
            last(s);
            s.is_polling = false;
        });
        true
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activation")
            .field("job_id", &self.job_id)
            .field("closed", &self.is_closed())
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

/// Live view of one poll activation.
///
/// Dropping the handle cancels the activation.
#[derive(Debug)]
pub struct PollHandle {
    activation: Arc<Activation>,
    state: watch::Receiver<PollState>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Job this activation polls
    #[must_use]
    pub fn job_id(&self) -> JobId {
        self.activation.job_id
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published state
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.clone()
    }

    /// Stops polling. Later calls do nothing.
    pub fn cancel(&self) {
        if self.activation.close(|_| {}) {
            tracing::debug!(job_id = self.activation.job_id, "job polling cancelled");
        }
    }

    /// Waits for the activation to end and returns its final state.
    ///
    /// Callbacks have run by the time this returns.
    pub async fn finished(mut self) -> PollState {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(job_id = self.activation.job_id, error = %e, "poll task ended abnormally");
                self.activation.close(|_| {});
            }
        }
        self.state()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.activation.close(|_| {});
    }
}

/// Polls job status until a terminal outcome
#[derive(Clone)]
pub struct JobPoller {
    source: Arc<dyn JobSource>,
    clock: Arc<dyn Clock>,
    store: Option<Arc<dyn ReconnectStore>>,
    options: PollOptions,
    on_completed: Option<OnCompleted>,
    on_failed: Option<OnFailed>,
}

impl fmt::Debug for JobPoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobPoller")
            .field("options", &self.options)
            .field("store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl JobPoller {
    /// Creates a poller with default options and the tokio clock
    #[must_use]
    pub fn new(source: Arc<dyn JobSource>) -> Self {
        Self {
            source,
            clock: Arc::new(TokioClock),
            store: None,
            options: PollOptions::default(),
            on_completed: None,
            on_failed: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: PollOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Store for the reconnect slot named by [`PollOptions::persist_key`]
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ReconnectStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn on_completed(mut self, f: impl Fn(JobId) + Send + Sync + 'static) -> Self {
        self.on_completed = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_failed(mut self, f: impl Fn(&str, Option<&str>) + Send + Sync + 'static) -> Self {
        self.on_failed = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub const fn options(&self) -> &PollOptions {
        &self.options
    }

    /// Starts polling `job_id` on the current tokio runtime.
    ///
    /// With `enabled` off the returned handle is idle and no request is made.
    #[must_use]
    pub fn watch(&self, job_id: JobId) -> PollHandle {
        if self.options.enabled {
            self.start(job_id)
        } else {
            self.idle(job_id)
        }
    }

    fn idle(&self, job_id: JobId) -> PollHandle {
        let (tx, rx) = watch::channel(PollState::idle());
        let activation = Arc::new(Activation {
            job_id,
            token: CancellationToken::new(),
            closed: AtomicBool::new(true),
            state: tx,
            store: None,
            slot: None,
        });
        PollHandle {
            activation,
            state: rx,
            task: None,
        }
    }

    /// Starts an activation regardless of the `enabled` option.
    pub(super) fn start(&self, job_id: JobId) -> PollHandle {
        let (tx, rx) = watch::channel(PollState::started());
        let slot = self
            .options
            .persist_key
            .as_deref()
            .filter(|_| self.store.is_some())
            .map(slot_key);

        let activation = Arc::new(Activation {
            job_id,
            token: CancellationToken::new(),
            closed: AtomicBool::new(false),
            state: tx,
            store: self.store.clone(),
            slot,
        });

        if let (Some(store), Some(slot)) = (&activation.store, &activation.slot) {
            if let Err(e) = store.set(slot, &job_id.to_string()) {
                tracing::warn!(%slot, error = %e, "failed to write reconnect slot");
            }
        }

        tracing::info!(job_id, "job polling started");
        let run = Run {
            activation: Arc::clone(&activation),
            poller: self.clone(),
        };
        let task = tokio::spawn(run.drive());

        PollHandle {
            activation,
            state: rx,
            task: Some(task),
        }
    }
}

/// Body of one activation's task
struct Run {
    activation: Arc<Activation>,
    poller: JobPoller,
}

impl Run {
    async fn drive(self) {
        let act = &self.activation;
        let opts = &self.poller.options;
        let locale = opts.locale;
        let started = self.poller.clock.now();
        let mut attempt: u32 = 0;

        loop {
            if act.token.is_cancelled() {
                return;
            }
            if self.poller.clock.now().duration_since(started) >= opts.timeout {
                self.fail_with_code(codes::TIMEOUT);
                return;
            }
            if attempt >= opts.max_attempts {
                self.fail_with_code(codes::MAX_RETRIES_EXCEEDED);
                return;
            }

            let fetched = tokio::select! {
                biased;
                () = act.token.cancelled() => return,
                r = self.poller.source.fetch_job(act.job_id, &act.token) => r,
            };

            let delay = match fetched {
                Ok(body) => {
                    let job = normalize_job_in(body.as_ref().unwrap_or(&Value::Null), locale);
                    attempt += 1;
                    tracing::debug!(job_id = act.job_id, attempt, status = %job.status, "job polled");

                    match job.status {
                        JobStatus::Completed => {
                            match job.result_id {
                                Some(result_id) => self.complete(result_id, job.progress, attempt),
                                None => self.fail(
                                    messages::message_or(Some(codes::RESULT_ID_MISSING), None, locale),
                                    Some(codes::RESULT_ID_MISSING.to_string()),
                                    attempt,
                                ),
                            }
                            return;
                        }
                        JobStatus::Failed => {
                            let message = job
                                .error_message
                                .filter(|m| !m.trim().is_empty())
                                .unwrap_or_else(|| messages::job_failed(locale).to_string());
                            self.fail(message, job.error_code, attempt);
                            return;
                        }
                        JobStatus::Pending | JobStatus::Processing => {
                            act.publish(|s| {
                                s.status = job.status;
                                s.progress = job.progress;
                                s.attempt = attempt;
                            });
                            opts.next_interval(attempt)
                        }
                    }
                }
                Err(e) if e.is_transient() => {
                    attempt += 1;
                    act.publish(|s| s.attempt = attempt);
                    if attempt >= opts.max_attempts {
                        self.fail_with_code(codes::MAX_RETRIES_EXCEEDED);
                        return;
                    }
                    tracing::trace!(job_id = act.job_id, attempt, error = %e, "transient poll failure, retrying");
                    opts.retry_interval()
                }
                Err(StoresimError::Cancelled) if act.token.is_cancelled() => return,
                Err(e) => {
                    let parsed = parse_error(&e, locale);
                    self.fail(parsed.message, parsed.code, attempt);
                    return;
                }
            };

            tokio::select! {
                biased;
                () = act.token.cancelled() => return,
                () = self.poller.clock.sleep(delay) => {}
            }
        }
    }

    fn complete(&self, result_id: JobId, progress: Option<f64>, attempt: u32) {
        let closed = self.activation.close(|s| {
            s.status = JobStatus::Completed;
            s.progress = progress;
            s.result_id = Some(result_id);
            s.error_message = None;
            s.error_code = None;
            s.attempt = attempt;
        });
        if !closed {
            return;
        }
        tracing::info!(job_id = self.activation.job_id, result_id, "job completed");
        if let Some(cb) = &self.poller.on_completed {
            cb(result_id);
        }
    }

    fn fail(&self, message: String, code: Option<String>, attempt: u32) {
        let (msg, c) = (message.clone(), code.clone());
        let closed = self.activation.close(move |s| {
            s.status = JobStatus::Failed;
            s.result_id = None;
            s.error_message = Some(msg);
            s.error_code = c;
            s.attempt = attempt;
        });
        if !closed {
            return;
        }
        tracing::info!(
            job_id = self.activation.job_id,
            code = code.as_deref().unwrap_or("-"),
            %message,
            "job failed"
        );
        if let Some(cb) = &self.poller.on_failed {
            cb(&message, code.as_deref());
        }
    }

    fn fail_with_code(&self, code: &'static str) {
        let attempt = self.activation.state.borrow().attempt;
        let message = messages::message_or(Some(code), None, self.poller.options.locale);
        self.fail(message, Some(code.to_string()), attempt);
    }
}
