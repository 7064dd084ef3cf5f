use super::{JobPoller, PollHandle, PollState};
use crate::normalize::JobId;

/// Keeps at most one activation alive for a changing job id.
///
/// Changing the job id or disabling the watch ends the current activation;
/// dropping the watch does the same.
#[derive(Debug)]
pub struct JobWatch {
    poller: JobPoller,
    job_id: Option<JobId>,
    enabled: bool,
    current: Option<PollHandle>,
    last: PollState,
}

impl JobWatch {
    /// Creates an idle watch; `enabled` starts out as the poller's option.
    #[must_use]
    pub fn new(poller: JobPoller) -> Self {
        let enabled = poller.options().enabled;
        Self {
            poller,
            job_id: None,
            enabled,
            current: None,
            last: PollState::idle(),
        }
    }

    #[must_use]
    pub const fn job_id(&self) -> Option<JobId> {
        self.job_id
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current activation, if one is running or has just ended
    #[must_use]
    pub const fn handle(&self) -> Option<&PollHandle> {
        self.current.as_ref()
    }

    /// State of the current activation, or the last one that was stopped
    #[must_use]
    pub fn state(&self) -> PollState {
        self.current
            .as_ref()
            .map_or_else(|| self.last.clone(), PollHandle::state)
    }

    /// Points the watch at another job. Setting the same id again does nothing.
    pub fn set_job_id(&mut self, job_id: Option<JobId>) {
        if self.job_id == job_id {
            return;
        }
        self.job_id = job_id;
        self.restart();
    }

    /// Turns polling on or off. Setting the same value again does nothing.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        self.restart();
    }

    /// Ends the current activation without starting another.
    pub fn stop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
            self.last = handle.state();
        }
    }

    fn restart(&mut self) {
        self.stop();
        if let (true, Some(job_id)) = (self.enabled, self.job_id) {
            self.current = Some(self.poller.start(job_id));
        }
    }
}
