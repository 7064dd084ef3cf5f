use serde::Serialize;
use serde_json::Value;

use super::alias::{self, DASH};

/// Display name aliases
pub const NAME: &[&str] = &["name", "store_name"];
/// Street address aliases
pub const ADDRESS: &[&str] = &["address", "store_address"];
/// Latitude aliases
pub const LAT: &[&str] = &["lat", "latitude"];
/// Longitude aliases
pub const LNG: &[&str] = &["lng", "longitude", "lon"];
/// Rank percentile aliases
pub const RANK_PERCENT: &[&str] = &["rankPercent", "rank_percent"];

/// Page size assumed when the server does not echo one
pub const DEFAULT_LIMIT: usize = 50;

/// A store search hit, safe to render without null checks
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStore {
    pub id: String,
    pub name: String,
    pub address: String,
    /// Present only together with `lng`
    pub lat: Option<f64>,
    /// Present only together with `lat`
    pub lng: Option<f64>,
    pub geo_valid: bool,
    pub sentiment: Option<f64>,
    pub revenue: Option<f64>,
    pub grade: Option<String>,
    pub rank_percent: Option<f64>,
}

/// One page of store search results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoresPage {
    pub items: Vec<NormalizedStore>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl Default for StoresPage {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

fn count(v: Option<&Value>) -> Option<usize> {
    v.and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

/// Normalizes one raw store entry; `None` when the entry is not an object.
#[must_use]
pub fn normalize_store(item: &Value) -> Option<NormalizedStore> {
    if !item.is_object() {
        return None;
    }

    let lat = alias::numeric(alias::first(item, LAT));
    let lng = alias::numeric(alias::first(item, LNG));
    let (lat, lng) = match (lat, lng) {
        (Some(lat), Some(lng)) => (Some(lat), Some(lng)),
        _ => (None, None),
    };

    Some(NormalizedStore {
        id: alias::at(item, &["id"])
            .map(alias::coerce_string)
            .unwrap_or_default(),
        name: alias::first(item, NAME).map_or_else(|| DASH.to_string(), alias::coerce_string),
        address: alias::first(item, ADDRESS)
            .map(alias::coerce_string)
            .unwrap_or_default(),
        lat,
        lng,
        geo_valid: lat.is_some(),
        sentiment: alias::finite(alias::at(item, &["sentiment"])),
        revenue: alias::finite(alias::at(item, &["revenue"])),
        grade: alias::at(item, &["grade"]).map(alias::coerce_string),
        rank_percent: alias::numeric(alias::first(item, RANK_PERCENT)),
    })
}

/// Normalizes a `GET /stores` response.
///
/// Entries that are not objects are dropped, so `items.len()` can be smaller
/// than the raw list.
#[must_use]
pub fn normalize_stores(resp: &Value) -> StoresPage {
    if !resp.is_object() {
        tracing::debug!(kind = json_kind(resp), "store list response is not an object");
        return StoresPage::default();
    }

    let items: Vec<NormalizedStore> = resp
        .get("items")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(normalize_store)
        .collect();

    StoresPage {
        total: count(resp.get("total")).unwrap_or(items.len()),
        limit: count(resp.get("limit")).unwrap_or(DEFAULT_LIMIT),
        offset: count(resp.get("offset")).unwrap_or(0),
        items,
    }
}

pub(crate) const fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
