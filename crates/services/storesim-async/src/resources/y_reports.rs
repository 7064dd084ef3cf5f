use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::{Client, RequestOptions};
use crate::config::Config;
use crate::error::StoresimError;
use crate::normalize::{NormalizedYReportView, extract_job_id, normalize_y_report_view_in};
use crate::types::{JobCreated, YReportCreate};

/// API resource for the `/y-reports` endpoints
pub struct YReports<'c, C: Config> {
    client: &'c Client<C>,
    cancel: Option<CancellationToken>,
}

impl<'c, C: Config> YReports<'c, C> {
    /// Creates a new Y-Reports resource
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

    fn opts(&self) -> RequestOptions {
        RequestOptions::new().with_cancel(self.cancel.clone())
    }

    /// Starts a comparison report job.
    pub async fn create(&self, payload: &YReportCreate) -> Result<JobCreated, StoresimError> {
        let resp = self.client.post("/y-reports", payload, self.opts()).await?;
        let job_id = extract_job_id(resp.as_ref(), self.client.locale())?;
        Ok(JobCreated { job_id })
    }

    /// Fetches a report's view payload as the server sent it.
    pub async fn view_raw(&self, y_report_id: u64) -> Result<Option<Value>, StoresimError> {
        super::get_with_fallback(
            self.client,
            &format!("/y-reports/{y_report_id}/view"),
            &format!("/y-reports/{y_report_id}"),
            self.opts(),
        )
        .await
    }

    /// Fetches and normalizes a report view.
    pub async fn view(&self, y_report_id: u64) -> Result<NormalizedYReportView, StoresimError> {
        let resp = self.view_raw(y_report_id).await?;
        Ok(normalize_y_report_view_in(
            resp.as_ref().unwrap_or(&Value::Null),
            self.client.locale(),
        ))
    }
}

impl<C: Config> Client<C> {
    /// Returns the Y-Reports API resource
    #[must_use]
    pub const fn y_reports(&self) -> YReports<'_, C> {
        YReports::new(self)
    }
}
