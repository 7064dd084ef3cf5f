//! Response normalizers.
//!
//! Each normalizer turns whatever the backend sent into a fixed, fully
//! defaulted shape. None of them fail: invalid input produces the resource's
//! empty record and a single `debug` event.

pub mod alias;
pub mod job;
pub mod store;
pub mod x_report;
pub mod y_report;

pub use job::{
    JobId, JobStatus, NormalizedJob, extract_job_id, extract_x_report_id, normalize_job,
    normalize_job_in,
};
pub use store::{NormalizedStore, StoresPage, normalize_store, normalize_stores};
pub use x_report::{NormalizedXReportView, normalize_x_report_view, normalize_x_report_view_in};
pub use y_report::{NormalizedYReportView, normalize_y_report_view, normalize_y_report_view_in};
