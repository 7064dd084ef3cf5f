//! Composed cancellation for a single request.
//!
//! A request can be torn down by two independent sources: the caller's
//! [`CancellationToken`] and an internal deadline. [`AbortSignal::run`] races
//! both against the work itself; whichever completes first decides the outcome
//! and the remaining sources are dropped with it.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Why a guarded future did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abort {
    /// The caller's token fired
    Cancelled,
    /// The internal deadline expired
    TimedOut(Duration),
}

/// First-to-fire combinator over a caller token and a deadline
#[derive(Debug, Clone)]
pub struct AbortSignal {
    caller: Option<CancellationToken>,
    timeout: Duration,
}

impl AbortSignal {
    /// Creates a signal with only a deadline
    #[must_use]
    pub const fn timeout(timeout: Duration) -> Self {
        Self {
            caller: None,
            timeout,
        }
    }

    /// Adds (or replaces) the caller-supplied cancellation source
    #[must_use]
    pub fn with_caller(mut self, token: Option<CancellationToken>) -> Self {
        self.caller = token;
        self
    }

    /// Drives `work` until it completes or either cancellation source fires.
    ///
    /// A caller token that is already cancelled aborts before `work` is polled.
    pub async fn run<F>(self, work: F) -> Result<F::Output, Abort>
    where
        F: Future,
    {
        let timeout = self.timeout;
        let caller = self.caller.unwrap_or_default();

        tokio::select! {
            biased;
            () = caller.cancelled() => Err(Abort::Cancelled),
            () = tokio::time::sleep(timeout) => Err(Abort::TimedOut(timeout)),
            out = work => Ok(out),
        }
    }
}
