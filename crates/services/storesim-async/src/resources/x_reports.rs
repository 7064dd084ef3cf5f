use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::{Client, RequestOptions};
use crate::config::Config;
use crate::error::StoresimError;
use crate::normalize::{NormalizedXReportView, extract_x_report_id, normalize_x_report_view_in};
use crate::types::{XReportCreate, XReportCreated};

/// API resource for the `/x-reports` endpoints
pub struct XReports<'c, C: Config> {
    client: &'c Client<C>,
    cancel: Option<CancellationToken>,
}

impl<'c, C: Config> XReports<'c, C> {
    /// Creates a new X-Reports resource
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

    /// Generates (or returns the cached) report for a store.
    ///
    /// The backend works inline, so this uses the long timeout and the report
    /// can be viewed as soon as the call returns.
    pub async fn create(&self, payload: &XReportCreate) -> Result<XReportCreated, StoresimError> {
        let resp = self.client.post_long("/x-reports", payload, self.opts()).await?;
        let x_report_id = extract_x_report_id(resp.as_ref(), self.client.locale())?;
        Ok(XReportCreated { x_report_id })
    }

    /// Fetches a report's view payload as the server sent it.
    pub async fn view_raw(&self, x_report_id: u64) -> Result<Option<Value>, StoresimError> {
        super::get_with_fallback(
            self.client,
            &format!("/x-reports/{x_report_id}/view"),
            &format!("/x-reports/{x_report_id}"),
            self.opts(),
        )
        .await
    }

    /// Fetches and normalizes a report view.
    pub async fn view(&self, x_report_id: u64) -> Result<NormalizedXReportView, StoresimError> {
        let resp = self.view_raw(x_report_id).await?;
        Ok(normalize_x_report_view_in(
            resp.as_ref().unwrap_or(&Value::Null),
            self.client.locale(),
        ))
    }
}

impl<C: Config> Client<C> {
    /// Returns the X-Reports API resource
    #[must_use]
    pub const fn x_reports(&self) -> XReports<'_, C> {
        XReports::new(self)
    }
}
