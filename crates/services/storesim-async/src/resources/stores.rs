use tokio_util::sync::CancellationToken;

use crate::client::{Client, RequestOptions};
use crate::config::Config;
use crate::error::StoresimError;
use crate::normalize::{StoresPage, normalize_stores};
use crate::types::StoreQuery;

/// API resource for the `/stores` endpoints
pub struct Stores<'c, C: Config> {
    client: &'c Client<C>,
    cancel: Option<CancellationToken>,
}

impl<'c, C: Config> Stores<'c, C> {
    /// Creates a new Stores resource
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

    /// Searches stores and normalizes the page.
    pub async fn search(&self, query: &StoreQuery) -> Result<StoresPage, StoresimError> {
        let opts = RequestOptions::new()
            .param("q", query.q.as_deref())
            .param("limit", Some(query.limit))
            .param("offset", Some(query.offset))
            .with_cancel(self.cancel.clone());
        let resp = self.client.get("/stores", opts).await?;
        Ok(resp.as_ref().map(normalize_stores).unwrap_or_default())
    }
}

impl<C: Config> Client<C> {
    /// Returns the Stores API resource
    #[must_use]
    pub const fn stores(&self) -> Stores<'_, C> {
        Stores::new(self)
    }
}
