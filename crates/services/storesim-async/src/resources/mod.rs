//! API resources, one per backend collection

mod jobs;
mod simulations;
mod stores;
mod x_reports;
mod y_reports;

pub use jobs::Jobs;
pub use simulations::Simulations;
pub use stores::Stores;
pub use x_reports::XReports;
pub use y_reports::YReports;

use serde_json::Value;

use crate::client::{Client, RequestOptions};
use crate::config::Config;
use crate::error::StoresimError;

/// `GET primary`, retried once as `GET fallback` when the first answers 404.
pub(crate) async fn get_with_fallback<C: Config>(
    client: &Client<C>,
    primary: &str,
    fallback: &str,
    opts: RequestOptions,
) -> Result<Option<Value>, StoresimError> {
    match client.get(primary, opts.clone()).await {
        Err(e) if e.is_not_found() => {
            tracing::trace!(primary, fallback, "view endpoint missing, using fallback");
            client.get(fallback, opts).await
        }
        other => other,
    }
}
