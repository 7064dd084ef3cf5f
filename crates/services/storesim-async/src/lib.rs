//! # `storesim-async`
//!
//! Async client for the storesim analytics API: bounded requests with uniform
//! errors, response normalizers that hide the backend's spelling differences,
//! and a job poller for long-running simulations and reports.
//!
//! ## Quick Start
//!
//! ```no_run
//! use storesim_async::{Client, types::StoreQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new();
//! let page = client.stores().search(&StoreQuery::search("coffee")).await?;
//! for store in page.items {
//!     println!("{} {}", store.id, store.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Polling a job
//!
//! ```no_run
//! use std::sync::Arc;
//! use storesim_async::{Client, poller::{JobPoller, PollOptions}, types::YReportCreate};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(Client::new());
//! let job = client.y_reports().create(&YReportCreate::default()).await?;
//!
//! let handle = JobPoller::new(Arc::<Client<_>>::clone(&client))
//!     .with_options(PollOptions::default())
//!     .on_completed(|result_id| println!("report {result_id} ready"))
//!     .watch(job.job_id);
//! let state = handle.finished().await;
//! println!("{state:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every failure is a [`StoresimError`]. [`parse_error`] turns it (or any
//! other error) into a `{ code, message }` pair for display.

/// Composed caller/deadline cancellation
pub mod cancel;
/// Status, body and bracket-code classification
pub mod classify;
/// HTTP client implementation
pub mod client;
/// Configuration types for the client
pub mod config;
/// Error types
pub mod error;
/// User-facing message catalog
pub mod messages;
/// Response normalizers
pub mod normalize;
/// Reconnect slots for in-flight jobs
pub mod persist;
/// Background job polling
pub mod poller;
/// API resource implementations
pub mod resources;
/// Request payloads
pub mod types;

pub use crate::client::{Client, RequestOptions};
pub use crate::config::{Config, StoresimConfig};
pub use crate::error::{ParsedError, StandardError, StoresimError, parse_error};
pub use crate::messages::Locale;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::normalize::{
        JobId, JobStatus, NormalizedJob, NormalizedStore, NormalizedXReportView,
        NormalizedYReportView, StoresPage,
    };
    pub use crate::poller::{JobPoller, JobWatch, PollHandle, PollOptions, PollState};
    pub use crate::types::*;
    pub use crate::{Client, Locale, StoresimConfig, StoresimError};
}
