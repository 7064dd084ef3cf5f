use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::alias;
use super::store::json_kind;
use crate::classify;
use crate::error::StoresimError;
use crate::messages::{self, Locale, codes};

/// Result identifier aliases
pub const RESULT_ID: &[&str] = &["resultId", "result_id"];
/// Error message aliases
pub const ERROR_MESSAGE: &[&str] = &["errorMessage", "error_message"];
/// Explicit error code aliases
pub const ERROR_CODE: &[&str] = &["errorCode", "error_code"];
/// Job id aliases in creation responses
pub const JOB_ID: &[&str] = &["jobId", "job_id"];

/// Identifier of a background job
pub type JobId = u64;

/// Lifecycle state of a background job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Parses one of the four known status names.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// `completed` or `failed`
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job status with the fields that belong to it.
///
/// `result_id` is only set for `completed`; `error_message` and `error_code`
/// only for `failed`, where `error_message` is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedJob {
    pub status: JobStatus,
    pub progress: Option<f64>,
    pub result_id: Option<JobId>,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
}

impl NormalizedJob {
    fn failed(message: Option<String>, code: Option<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            progress: None,
            result_id: None,
            error_message: message,
            error_code: code,
        }
    }
}

/// Normalizes a `GET /jobs/{id}` response with English fallback text.
#[must_use]
pub fn normalize_job(resp: &Value) -> NormalizedJob {
    normalize_job_in(resp, Locale::default())
}

/// Normalizes a `GET /jobs/{id}` response.
///
/// Any status outside the known set becomes `failed` with `JOB_STATUS_INVALID`.
#[must_use]
pub fn normalize_job_in(resp: &Value, locale: Locale) -> NormalizedJob {
    if !resp.is_object() {
        tracing::debug!(kind = json_kind(resp), "job response is not an object");
        return NormalizedJob::failed(
            Some(messages::empty_job_response(locale).to_string()),
            Some(codes::EMPTY_RESPONSE.to_string()),
        );
    }

    let (status, valid) = match alias::at(resp, &["status"]) {
        None => (JobStatus::Failed, true),
        Some(raw) => match raw.as_str().and_then(JobStatus::parse) {
            Some(status) => (status, true),
            None => {
                tracing::debug!(status = %raw, "job response has an unrecognized status");
                (JobStatus::Failed, false)
            }
        },
    };

    let progress = alias::finite(alias::at(resp, &["progress"]));

    match status {
        JobStatus::Pending | JobStatus::Processing => NormalizedJob {
            status,
            progress,
            result_id: None,
            error_message: None,
            error_code: None,
        },
        JobStatus::Completed => NormalizedJob {
            status,
            progress,
            result_id: alias::identifier(alias::first(resp, RESULT_ID)),
            error_message: None,
            error_code: None,
        },
        JobStatus::Failed => {
            let message = alias::first(resp, ERROR_MESSAGE)
                .and_then(Value::as_str)
                .filter(|m| !m.trim().is_empty());
            let code = if valid {
                alias::first(resp, ERROR_CODE)
                    .and_then(Value::as_str)
                    .filter(|c| !c.is_empty())
                    .or_else(|| message.and_then(classify::bracket_code))
                    .map(ToString::to_string)
            } else {
                Some(codes::JOB_STATUS_INVALID.to_string())
            };
            let message = message.unwrap_or_else(|| messages::job_failed(locale));
            NormalizedJob {
                progress,
                ..NormalizedJob::failed(Some(message.to_string()), code)
            }
        }
    }
}

/// Job id from a creation response (`jobId` or `job_id`).
pub fn extract_job_id(resp: Option<&Value>, locale: Locale) -> Result<JobId, StoresimError> {
    resp.and_then(|r| alias::identifier(alias::first(r, JOB_ID)))
        .ok_or_else(|| StoresimError::business(codes::JOB_ID_MISSING, locale))
}

/// Report id from an X-Report creation response.
pub fn extract_x_report_id(resp: Option<&Value>, locale: Locale) -> Result<u64, StoresimError> {
    resp.and_then(|r| alias::identifier(alias::at(r, &["id"])))
        .ok_or_else(|| StoresimError::business(codes::XREPORT_ID_MISSING, locale))
}
