use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::{Client, RequestOptions};
use crate::config::Config;
use crate::error::StoresimError;
use crate::normalize::{JobId, NormalizedJob, normalize_job_in};

/// API resource for the `/jobs` endpoints
pub struct Jobs<'c, C: Config> {
    client: &'c Client<C>,
    cancel: Option<CancellationToken>,
}

impl<'c, C: Config> Jobs<'c, C> {
    /// Creates a new Jobs resource
    pub const fn new(client: &'c Client<C>) -> Self {
        Self {
            client,
            cancel: None,
        }
    }

    /// Cancels calls made through this handle when `token` fires
    #[must_use]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fetches a job's status as the server sent it.
    pub async fn get_raw(&self, job_id: JobId) -> Result<Option<Value>, StoresimError> {
        let opts = RequestOptions::new().with_cancel(self.cancel.clone());
        self.client.get(&format!("/jobs/{job_id}"), opts).await
    }

    /// Fetches and normalizes a job's status.
    pub async fn get(&self, job_id: JobId) -> Result<NormalizedJob, StoresimError> {
        let resp = self.get_raw(job_id).await?;
        Ok(normalize_job_in(
            resp.as_ref().unwrap_or(&Value::Null),
            self.client.locale(),
        ))
    }
}

impl<C: Config> Client<C> {
    /// Returns the Jobs API resource
    #[must_use]
    pub const fn jobs(&self) -> Jobs<'_, C> {
        Jobs::new(self)
    }
}
