use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::{Client, RequestOptions};
use crate::config::Config;
use crate::error::StoresimError;
use crate::normalize::extract_job_id;
use crate::types::{JobCreated, SimulationCreate};

/// API resource for the `/simulations` endpoints
pub struct Simulations<'c, C: Config> {
    client: &'c Client<C>,
    cancel: Option<CancellationToken>,
}

impl<'c, C: Config> Simulations<'c, C> {
    /// Creates a new Simulations resource
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

    /// Starts a simulation job (long timeout).
    pub async fn create(&self, payload: &SimulationCreate) -> Result<JobCreated, StoresimError> {
        let opts = RequestOptions::new().with_cancel(self.cancel.clone());
        let resp = self.client.post_long("/simulations", payload, opts).await?;
        let job_id = extract_job_id(resp.as_ref(), self.client.locale())?;
        Ok(JobCreated { job_id })
    }

    /// Fetches a finished simulation. The result is passed through untouched.
    pub async fn get(&self, simulation_id: u64) -> Result<Option<Value>, StoresimError> {
        let opts = RequestOptions::new().with_cancel(self.cancel.clone());
        self.client
            .get(&format!("/simulations/{simulation_id}"), opts)
            .await
    }
}

impl<C: Config> Client<C> {
    /// Returns the Simulations API resource
    #[must_use]
    pub const fn simulations(&self) -> Simulations<'_, C> {
        Simulations::new(self)
    }
}
