use futures::future::BoxFuture;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::Client;
use crate::config::Config;
use crate::error::StoresimError;
use crate::normalize::JobId;

/// Where the poller gets raw job payloads from
pub trait JobSource: Send + Sync {
    /// Fetches `GET /jobs/{job_id}`, abandoning the call when `cancel` fires.
    fn fetch_job<'a>(
        &'a self,
        job_id: JobId,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Option<Value>, StoresimError>>;
}

impl<C: Config> JobSource for Client<C> {
    fn fetch_job<'a>(
        &'a self,
        job_id: JobId,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Option<Value>, StoresimError>> {
        Box::pin(async move {
            self.jobs()
                .with_cancel(cancel.clone())
                .get_raw(job_id)
                .await
        })
    }
}
