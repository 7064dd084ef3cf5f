use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::classify;
use crate::messages::{self, Locale, codes};

/// Errors returned by the storesim client
#[derive(Debug, Error)]
pub enum StoresimError {
    /// Transport failure (DNS, refused connection, broken body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request's own deadline expired
    #[error("Request timed out after {after:?}")]
    Timeout {
        /// Deadline that expired
        after: Duration,
    },

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// Non-success HTTP response
    #[error("API error: {0}")]
    Api(StandardError),

    /// Response was well-formed but missing something the operation needs
    #[error("{message}")]
    Business {
        /// Catalog code
        code: &'static str,
        /// Display message
        message: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl StoresimError {
    /// Builds a business-logic error with its catalog message.
    #[must_use]
    pub fn business(code: &'static str, locale: Locale) -> Self {
        Self::Business {
            code,
            message: messages::message_or(Some(code), None, locale),
        }
    }

    /// HTTP status, when the failure came from a response
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => e.status,
            _ => None,
        }
    }

    /// Machine-readable code, when one is known
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api(e) => e.code.as_deref(),
            Self::Business { code, .. } => Some(*code),
            Self::Timeout { .. } => Some(codes::TIMEOUT),
            Self::Cancelled => Some(codes::REQUEST_CANCELLED),
            _ => None,
        }
    }

    /// Failures worth retrying: the request's own timeout or a 5xx response.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Api(e) => e.status.is_some_and(|s| s >= 500),
            _ => false,
        }
    }

    /// True for `404 Not Found`
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Uniform shape of a failed request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardError {
    /// HTTP status
    pub status: Option<u16>,
    /// Machine-readable code (status-derived or bracket-extracted)
    pub code: Option<String>,
    /// Localized display message, never empty
    pub message: String,
    /// Message text as the server sent it
    pub raw_message: Option<String>,
    /// Parsed response body, `Null` when absent or not JSON
    pub raw: Value,
}

impl std::fmt::Display for StandardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, &self.code) {
            (Some(s), Some(c)) => write!(f, "{s} {c} {}", self.message),
            (Some(s), None) => write!(f, "{s} {}", self.message),
            (None, Some(c)) => write!(f, "{c} {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

/// `{ code, message }` pair suitable for a banner or toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedError {
    /// Machine-readable code, if any
    pub code: Option<String>,
    /// Localized display message, never empty
    pub message: String,
    /// Original message text, if any
    pub raw_message: Option<String>,
}

impl ParsedError {
    /// Classifies an explicit code and/or message.
    ///
    /// With no explicit code the message is scanned for a `[CODE]` prefix.
    #[must_use]
    pub fn from_parts(code: Option<&str>, raw_message: Option<&str>, locale: Locale) -> Self {
        let code = code
            .or_else(|| raw_message.and_then(classify::bracket_code))
            .map(ToString::to_string);
        Self {
            message: messages::message_or(code.as_deref(), raw_message, locale),
            code,
            raw_message: raw_message.map(ToString::to_string),
        }
    }
}

/// Normalizes any caught error into a [`ParsedError`].
///
/// Errors produced by this crate keep their status and code; anything else is
/// classified from its display text.
#[must_use]
pub fn parse_error(err: &(dyn std::error::Error + 'static), locale: Locale) -> ParsedError {
    let Some(err) = err.downcast_ref::<StoresimError>() else {
        let text = err.to_string();
        return ParsedError::from_parts(None, Some(&text), locale);
    };

    match err {
        StoresimError::Api(e) => {
            let raw = e.raw_message.as_deref().unwrap_or(&e.message);
            match e.status.and_then(classify::status_code) {
                Some(code) => ParsedError {
                    code: Some(code.to_string()),
                    message: messages::message_or(Some(code), None, locale),
                    raw_message: Some(raw.to_string()),
                },
                None => ParsedError::from_parts(e.code.as_deref(), Some(raw), locale),
            }
        }
        StoresimError::Business { code, message } => {
            ParsedError::from_parts(Some(*code), Some(message), locale)
        }
        other => {
            let text = other.to_string();
            ParsedError::from_parts(other.code(), Some(&text), locale)
        }
    }
}
