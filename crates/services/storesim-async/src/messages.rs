//! User-facing message catalog.
//!
//! Every error code the client or the poller can produce is registered here so
//! that every surface shows the same text for the same failure.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error codes produced or recognised by this crate
pub mod codes {
    /// Creation call returned no job identifier
    pub const JOB_ID_MISSING: &str = "JOB_ID_MISSING";
    /// X-Report creation returned no report identifier
    pub const XREPORT_ID_MISSING: &str = "XREPORT_ID_MISSING";
    /// Job reported `completed` without a result identifier
    pub const RESULT_ID_MISSING: &str = "RESULT_ID_MISSING";
    /// Job reported a status outside the known set
    pub const JOB_STATUS_INVALID: &str = "JOB_STATUS_INVALID";
    /// Job status endpoint returned no usable body
    pub const EMPTY_RESPONSE: &str = "EMPTY_RESPONSE";
    /// Poll budget or request timer expired
    pub const TIMEOUT: &str = "TIMEOUT";
    /// Poll attempt budget exhausted
    pub const MAX_RETRIES_EXCEEDED: &str = "MAX_RETRIES_EXCEEDED";
    /// Backend reported its own timeout
    pub const BACKEND_TIMEOUT: &str = "BACKEND_TIMEOUT";
    /// Request cancelled by its caller
    pub const REQUEST_CANCELLED: &str = "REQUEST_CANCELLED";
    /// Any HTTP 5xx response
    pub const SERVER_5XX: &str = "SERVER_5XX";
    /// Strategy generation produced an unexpected number of entries
    pub const STRATEGY_PARSE_COUNT_MISMATCH: &str = "STRATEGY_PARSE_COUNT_MISMATCH";
}

/// Language of user-facing messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English
    #[default]
    En,
    /// Korean
    Ko,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en_us" | "english" => Ok(Self::En),
            "ko" | "ko-kr" | "ko_kr" | "korean" => Ok(Self::Ko),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

/// Returns the catalog message for a known error code.
#[must_use]
pub fn lookup(code: &str, locale: Locale) -> Option<&'static str> {
    use codes::{
        BACKEND_TIMEOUT, EMPTY_RESPONSE, JOB_ID_MISSING, JOB_STATUS_INVALID, MAX_RETRIES_EXCEEDED,
        REQUEST_CANCELLED, RESULT_ID_MISSING, SERVER_5XX, STRATEGY_PARSE_COUNT_MISMATCH, TIMEOUT,
        XREPORT_ID_MISSING,
    };

    let (en, ko) = match code {
        JOB_ID_MISSING => (
            "No job ID was returned. Please try again.",
            "작업 ID를 받지 못했습니다. 다시 시도해 주세요.",
        ),
        XREPORT_ID_MISSING => (
            "No report ID was returned. Please try again.",
            "X-Report ID를 받지 못했습니다. 다시 시도해 주세요.",
        ),
        RESULT_ID_MISSING => (
            "Failed to retrieve the result. Please try again.",
            "결과를 가져오는데 실패했습니다. 다시 시도해 주세요.",
        ),
        JOB_STATUS_INVALID => (
            "The job status could not be determined. Please try again.",
            "작업 상태를 확인할 수 없습니다. 다시 시도해 주세요.",
        ),
        EMPTY_RESPONSE => (
            "No response was received from the server.",
            "서버에서 응답을 받지 못했습니다.",
        ),
        TIMEOUT | MAX_RETRIES_EXCEEDED | BACKEND_TIMEOUT => (
            "The request timed out. Please try again shortly.",
            "요청 시간이 초과되었습니다. 잠시 후 다시 시도해 주세요.",
        ),
        REQUEST_CANCELLED => ("The request was cancelled.", "요청이 취소되었습니다."),
        SERVER_5XX => (
            "A server error occurred. Please try again shortly.",
            "서버 오류가 발생했습니다. 잠시 후 다시 시도해 주세요.",
        ),
        STRATEGY_PARSE_COUNT_MISMATCH => (
            "Something went wrong while generating strategies. Please try again.",
            "전략 생성 도중 오류가 발생했습니다. 다시 시도해 주세요.",
        ),
        _ => return None,
    };

    Some(match locale {
        Locale::En => en,
        Locale::Ko => ko,
    })
}

/// Catalog message for `code`, else `fallback`, else the generic unknown-error text.
///
/// Never returns an empty string.
#[must_use]
pub fn message_or(code: Option<&str>, fallback: Option<&str>, locale: Locale) -> String {
    code.and_then(|c| lookup(c, locale))
        .or_else(|| fallback.filter(|f| !f.trim().is_empty()))
        .unwrap_or_else(|| unknown_error(locale))
        .to_string()
}

/// Generic text for failures nothing else describes
#[must_use]
pub const fn unknown_error(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "An unknown error occurred.",
        Locale::Ko => "알 수 없는 오류가 발생했습니다.",
    }
}

/// Default text for a job that failed without a message
#[must_use]
pub const fn job_failed(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "The job failed.",
        Locale::Ko => "작업이 실패했습니다.",
    }
}

/// Default text for a status endpoint that returned nothing usable
#[must_use]
pub const fn empty_job_response(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "No response body.",
        Locale::Ko => "응답이 없습니다.",
    }
}

/// Default text for an HTTP failure whose body carries no message
#[must_use]
pub fn status_default(status: u16, locale: Locale) -> String {
    match (status, locale) {
        (500.., Locale::En) => "A server error occurred.".into(),
        (500.., Locale::Ko) => "서버 오류가 발생했습니다.".into(),
        (404, Locale::En) => "The requested resource was not found.".into(),
        (404, Locale::Ko) => "요청한 리소스를 찾을 수 없습니다.".into(),
        (401, Locale::En) => "Authentication is required.".into(),
        (401, Locale::Ko) => "인증이 필요합니다.".into(),
        (403, Locale::En) => "Access was denied.".into(),
        (403, Locale::Ko) => "접근이 거부되었습니다.".into(),
        (s, Locale::En) => format!("An error occurred. ({s})"),
        (s, Locale::Ko) => format!("오류가 발생했습니다. ({s})"),
    }
}
