use serde::Serialize;
use serde_json::Value;

use super::alias::{self, DASH};
use super::store::json_kind;
use crate::messages::Locale;

/// Radar breakdown aliases
pub const RADAR_DATA: &[&str] = &["radarData", "radar_data"];
/// Radar score aliases
pub const RADAR_SCORE: &[&str] = &["A", "score"];
/// Radar reason aliases
pub const RADAR_REASON: &[&str] = &["reason", "detail"];
/// Keyword list aliases
pub const KEYWORDS: &[&str] = &["keywords", "key_words"];
/// Keyword text aliases
pub const KEYWORD_TEXT: &[&str] = &["text", "word", "keyword"];
/// Solution list aliases
pub const SOLUTIONS: &[&str] = &["solutions", "strategies"];
/// Solution id aliases
pub const SOLUTION_ID: &[&str] = &["id", "strategy_id"];
/// Solution title aliases
pub const SOLUTION_TITLE: &[&str] = &["title", "name"];
/// Solution description aliases
pub const SOLUTION_DESC: &[&str] = &["desc", "description"];
/// Solution execution aliases
pub const SOLUTION_EXECUTION: &[&str] = &["execution", "how_to"];
/// Solution effect aliases
pub const SOLUTION_EFFECT: &[&str] = &["effect", "expected_effect"];
/// Store name aliases
pub const NAME: &[&str] = &["name", "store_name"];
/// Rank percentile aliases
pub const RANK_PERCENT: &[&str] = &["rankPercent", "rank_percent"];
/// Summary text aliases
pub const DESCRIPTION: &[&str] = &["description", "summary"];
/// Long-form report aliases
pub const FULL_REPORT: &[&str] = &["fullReport", "full_report"];

/// Category shown for a solution that does not name one
#[must_use]
pub const fn default_category(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Other",
        Locale::Ko => "기타",
    }
}

/// Display label for a radar subject code; unknown codes pass through.
#[must_use]
pub fn radar_label(subject: &str, locale: Locale) -> &str {
    match (subject, locale) {
        ("taste", Locale::En) => "Taste",
        ("taste", Locale::Ko) => "맛",
        ("service", Locale::En) => "Service",
        ("service", Locale::Ko) => "서비스",
        ("atmosphere", Locale::En) => "Atmosphere",
        ("atmosphere", Locale::Ko) => "분위기",
        ("price", Locale::En) => "Price",
        ("price", Locale::Ko) => "가격",
        ("hygiene", Locale::En) => "Hygiene",
        ("hygiene", Locale::Ko) => "위생",
        (other, _) => other,
    }
}

/// Sentiment tag of a review keyword
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    fn from_value(v: Option<&Value>) -> Self {
        match v.and_then(Value::as_str).map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("positive") => Self::Positive,
            Some(s) if s.eq_ignore_ascii_case("negative") => Self::Negative,
            _ => Self::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarEntry {
    pub subject: String,
    #[serde(rename = "A")]
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyword {
    pub text: String,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub category: String,
    pub title: String,
    pub desc: String,
    pub execution: String,
    pub effect: String,
}

/// Diagnostic report for one store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedXReportView {
    pub name: String,
    pub grade: String,
    pub rank_percent: f64,
    pub description: String,
    pub full_report: String,
    pub radar_data: Vec<RadarEntry>,
    pub keywords: Vec<Keyword>,
    pub solutions: Vec<Solution>,
}

impl Default for NormalizedXReportView {
    fn default() -> Self {
        Self {
            name: String::new(),
            grade: DASH.to_string(),
            rank_percent: 0.0,
            description: String::new(),
            full_report: String::new(),
            radar_data: Vec::new(),
            keywords: Vec::new(),
            solutions: Vec::new(),
        }
    }
}

fn radar_entry(item: &Value, locale: Locale) -> RadarEntry {
    let subject = alias::at(item, &["subject"])
        .and_then(Value::as_str)
        .map_or(DASH, |s| radar_label(s, locale));
    RadarEntry {
        subject: subject.to_string(),
        score: alias::num(alias::first(item, RADAR_SCORE)),
        reason: alias::text(alias::first(item, RADAR_REASON), ""),
    }
}

fn keyword(item: &Value) -> Keyword {
    Keyword {
        text: alias::text_or_dash(alias::first(item, KEYWORD_TEXT)),
        sentiment: Sentiment::from_value(alias::at(item, &["sentiment"])),
    }
}

fn solution(item: &Value, locale: Locale) -> Solution {
    Solution {
        id: alias::first(item, SOLUTION_ID).map(alias::coerce_string),
        category: alias::text(alias::at(item, &["category"]), default_category(locale)),
        title: alias::text_or_dash(alias::first(item, SOLUTION_TITLE)),
        desc: alias::text(alias::first(item, SOLUTION_DESC), ""),
        execution: alias::text(alias::first(item, SOLUTION_EXECUTION), ""),
        effect: alias::text(alias::first(item, SOLUTION_EFFECT), ""),
    }
}

/// Normalizes an X-Report view response with English labels.
#[must_use]
pub fn normalize_x_report_view(resp: &Value) -> NormalizedXReportView {
    normalize_x_report_view_in(resp, Locale::default())
}

/// Normalizes an X-Report view response, labelling radar subjects and
/// uncategorized solutions in `locale`.
#[must_use]
pub fn normalize_x_report_view_in(resp: &Value, locale: Locale) -> NormalizedXReportView {
    if !resp.is_object() {
        tracing::debug!(kind = json_kind(resp), "x-report response is not an object");
        return NormalizedXReportView::default();
    }

    NormalizedXReportView {
        name: alias::text(alias::first(resp, NAME), ""),
        grade: alias::text_or_dash(alias::at(resp, &["grade"])),
        rank_percent: alias::num(alias::first(resp, RANK_PERCENT)),
        description: alias::text(alias::first(resp, DESCRIPTION), ""),
        full_report: alias::text(alias::first(resp, FULL_REPORT), ""),
        radar_data: alias::objects(alias::first(resp, RADAR_DATA))
            .map(|item| radar_entry(item, locale))
            .collect(),
        keywords: alias::objects(alias::first(resp, KEYWORDS))
            .map(keyword)
            .collect(),
        solutions: alias::objects(alias::first(resp, SOLUTIONS))
            .map(|item| solution(item, locale))
            .collect(),
    }
}
