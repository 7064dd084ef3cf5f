//! Request payloads and small response shapes

use serde::{Deserialize, Serialize};

use crate::normalize::JobId;

/// Parameters for `GET /stores`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreQuery {
    /// Free-text search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for StoreQuery {
    fn default() -> Self {
        Self {
            q: None,
            limit: 50,
            offset: 0,
        }
    }
}

impl StoreQuery {
    #[must_use]
    pub fn search(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Self::default()
        }
    }
}

/// Body of `POST /x-reports`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct XReportCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
}

/// Body of `POST /simulations`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulationCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_strategy_ids: Vec<String>,
    /// Simulated days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

/// Body of `POST /y-reports`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct YReportCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_strategy_ids: Vec<String>,
}

/// Job started by a creation call
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    pub job_id: JobId,
}

/// X-Report produced synchronously by `POST /x-reports`
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct XReportCreated {
    pub x_report_id: u64,
}
