//! Y-Report (before/after comparison) normalizer.
//!
//! Backends name the two sides of a comparison in several ways. Each side has
//! its own alias chain and every field is resolved independently, so a payload
//! may mix `sim1.totalVisits` with `before.marketShare`.

use serde::Serialize;
use serde_json::{Map, Value};

use super::alias::{self, DASH};
use super::store::json_kind;
use crate::messages::Locale;

/// Baseline side aliases
pub const SIM1: &[&str] = &["sim1", "before", "simA", "baseCase"];
/// Variant side aliases
pub const SIM2: &[&str] = &["sim2", "after", "simB", "variantCase"];
/// Crosstab matrix aliases
pub const CROSSTAB_MATRIX: &[&str] = &["sim2", "after", "variantCase"];

/// Peak slot container aliases
pub const PEAK_SLOT: &[&str] = &["peakSlot", "peak_slot"];
/// Rating summary container aliases
pub const RATING_SUMMARY: &[&str] = &["ratingSummary", "rating_summary"];
/// Rating distribution aliases
pub const RATING_DISTRIBUTION: &[&str] = &["ratingDistribution", "rating_distribution"];
/// Hourly traffic aliases
pub const HOURLY_TRAFFIC: &[&str] = &["hourlyTraffic", "hourly_traffic"];
/// Agent type aliases
pub const AGENT_TYPE: &[&str] = &["agentType", "agent_type"];
/// Radar store name container aliases
pub const RADAR_STORES: &[&str] = &["radarStores", "radar_stores"];
/// Side-effect list aliases
pub const SIDE_EFFECTS: &[&str] = &["sideEffects", "side_effects"];
/// Risk score container aliases
pub const RISK_SCORE: &[&str] = &["riskScore", "risk_score"];
/// LLM summary aliases
pub const LLM_SUMMARY: &[&str] = &["llmSummary", "llm_summary"];

/// Retention field aliases, relative to the `retention` object
pub const RETENTION_SIM1_AGENTS: &[&str] = &["sim1Agents", "sim1_agents"];
pub const RETENTION_SIM2_AGENTS: &[&str] = &["sim2Agents", "sim2_agents"];
pub const RETENTION_NEW_USERS: &[&str] = &["newUsers", "new_users"];
pub const RETENTION_RATE: &[&str] = &["retentionRate", "retention_rate"];
pub const RETENTION_NEW_RATIO: &[&str] = &["newRatio", "new_ratio"];

/// Two values for the baseline and the variant
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Paired<T> {
    pub sim1: T,
    pub sim2: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSide {
    pub total_visits: f64,
    pub market_share: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatingSide {
    pub avg: f64,
    pub satisfaction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Retention {
    pub sim1_agents: f64,
    pub sim2_agents: f64,
    pub retained: f64,
    pub new_users: f64,
    pub churned: f64,
    pub retention_rate: f64,
    pub new_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarStores {
    pub comp1: String,
    pub comp2: String,
    pub comp3: String,
}

impl RadarStores {
    /// Placeholder competitor names in `locale`
    #[must_use]
    pub fn placeholders(locale: Locale) -> Self {
        let prefix = match locale {
            Locale::En => "Competitor",
            Locale::Ko => "경쟁사",
        };
        Self {
            comp1: format!("{prefix} 1"),
            comp2: format!("{prefix} 2"),
            comp3: format!("{prefix} 3"),
        }
    }
}

impl Default for RadarStores {
    fn default() -> Self {
        Self::placeholders(Locale::default())
    }
}

/// Generation x purpose cross tabulation of the variant side
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Crosstab {
    pub generations: Vec<Value>,
    pub purposes: Vec<Value>,
    pub sim2: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScore {
    pub score: f64,
    pub level: String,
    pub positive: f64,
    pub watch: f64,
    pub negative: f64,
    pub total_metrics: f64,
}

/// Before/after comparison report.
///
/// [`Default`] is the "no data yet" state shown while a simulation runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedYReportView {
    pub overview: Paired<OverviewSide>,
    pub keywords: Paired<Vec<Value>>,
    pub rating_distribution: Map<String, Value>,
    pub rating_summary: Paired<RatingSide>,
    pub hourly_traffic: Vec<Value>,
    pub peak_slot: Paired<String>,
    pub generation: Vec<Value>,
    pub purpose: Vec<Value>,
    pub retention: Retention,
    pub agent_type: Vec<Value>,
    pub gender: Vec<Value>,
    pub radar: Vec<Value>,
    pub radar_stores: RadarStores,
    pub crosstab: Crosstab,
    pub side_effects: Vec<Value>,
    pub tradeoffs: Vec<Value>,
    pub risk_score: RiskScore,
    pub llm_summary: String,
}

impl Default for NormalizedYReportView {
    fn default() -> Self {
        Self {
            overview: Paired::default(),
            keywords: Paired::default(),
            rating_distribution: Map::new(),
            rating_summary: Paired::default(),
            hourly_traffic: Vec::new(),
            peak_slot: Paired {
                sim1: DASH.into(),
                sim2: DASH.into(),
            },
            generation: Vec::new(),
            purpose: Vec::new(),
            retention: Retention::default(),
            agent_type: Vec::new(),
            gender: Vec::new(),
            radar: Vec::new(),
            radar_stores: RadarStores::default(),
            crosstab: Crosstab::default(),
            side_effects: Vec::new(),
            tradeoffs: Vec::new(),
            risk_score: RiskScore::default(),
            llm_summary: String::new(),
        }
    }
}

/// First present value of `container.side[.field]`, trying every side alias
/// within a container spelling before moving on to the next spelling.
fn on_side<'a>(
    root: &'a Value,
    containers: &[&str],
    sides: &[&str],
    field: Option<&str>,
) -> Option<&'a Value> {
    containers.iter().find_map(|container| {
        sides.iter().find_map(|side| match field {
            Some(field) => alias::at(root, &[*container, *side, field]),
            None => alias::at(root, &[*container, *side]),
        })
    })
}

/// First present `container.field` over container and field spellings.
fn within<'a>(root: &'a Value, containers: &[&str], fields: &[&str]) -> Option<&'a Value> {
    containers
        .iter()
        .find_map(|container| fields.iter().find_map(|f| alias::at(root, &[*container, *f])))
}

fn paired<T>(mut side: impl FnMut(&[&str]) -> T) -> Paired<T> {
    Paired {
        sim1: side(SIM1),
        sim2: side(SIM2),
    }
}

fn overview(resp: &Value) -> Paired<OverviewSide> {
    paired(|sides| OverviewSide {
        total_visits: alias::num(on_side(resp, &["overview"], sides, Some("totalVisits"))),
        market_share: alias::num(on_side(resp, &["overview"], sides, Some("marketShare"))),
    })
}

fn rating_summary(resp: &Value) -> Paired<RatingSide> {
    paired(|sides| RatingSide {
        avg: alias::num(on_side(resp, RATING_SUMMARY, sides, Some("avg"))),
        satisfaction: alias::num(on_side(resp, RATING_SUMMARY, sides, Some("satisfaction"))),
    })
}

fn retention(resp: &Value) -> Retention {
    fn field(resp: &Value, aliases: &[&str]) -> f64 {
        alias::num(within(resp, &["retention"], aliases))
    }
    Retention {
        sim1_agents: field(resp, RETENTION_SIM1_AGENTS),
        sim2_agents: field(resp, RETENTION_SIM2_AGENTS),
        retained: field(resp, &["retained"]),
        new_users: field(resp, RETENTION_NEW_USERS),
        churned: field(resp, &["churned"]),
        retention_rate: field(resp, RETENTION_RATE),
        new_ratio: field(resp, RETENTION_NEW_RATIO),
    }
}

fn radar_stores(resp: &Value, locale: Locale) -> RadarStores {
    let defaults = RadarStores::placeholders(locale);
    let name = |key: &str, fallback: &str| alias::text(within(resp, RADAR_STORES, &[key]), fallback);
    RadarStores {
        comp1: name("comp1", &defaults.comp1),
        comp2: name("comp2", &defaults.comp2),
        comp3: name("comp3", &defaults.comp3),
    }
}

fn crosstab(resp: &Value) -> Crosstab {
    let rows = alias::array(within(resp, &["crosstab"], CROSSTAB_MATRIX));
    Crosstab {
        generations: alias::array(alias::at(resp, &["crosstab", "generations"])),
        purposes: alias::array(alias::at(resp, &["crosstab", "purposes"])),
        sim2: rows.iter().map(|row| alias::array(Some(row))).collect(),
    }
}

fn risk_score(resp: &Value) -> RiskScore {
    let field = |camel: &str, snake: &str| {
        alias::first_at(resp, &[&["riskScore", camel], &["risk_score", snake]])
    };
    RiskScore {
        score: alias::num(field("score", "score")),
        level: alias::text(field("level", "level"), ""),
        positive: alias::num(field("positive", "positive")),
        watch: alias::num(field("watch", "watch")),
        negative: alias::num(field("negative", "negative")),
        total_metrics: alias::num(field("totalMetrics", "total_metrics")),
    }
}

/// Normalizes a Y-Report view response with English placeholders.
#[must_use]
pub fn normalize_y_report_view(resp: &Value) -> NormalizedYReportView {
    normalize_y_report_view_in(resp, Locale::default())
}

/// Normalizes a Y-Report view response, naming unnamed competitors in `locale`.
#[must_use]
pub fn normalize_y_report_view_in(resp: &Value, locale: Locale) -> NormalizedYReportView {
    if !resp.is_object() {
        tracing::debug!(kind = json_kind(resp), "y-report response is not an object");
        return NormalizedYReportView {
            radar_stores: RadarStores::placeholders(locale),
            ..NormalizedYReportView::default()
        };
    }

    NormalizedYReportView {
        overview: overview(resp),
        keywords: paired(|sides| alias::array(on_side(resp, &["keywords"], sides, None))),
        rating_distribution: alias::object(alias::first(resp, RATING_DISTRIBUTION)),
        rating_summary: rating_summary(resp),
        hourly_traffic: alias::array(alias::first(resp, HOURLY_TRAFFIC)),
        peak_slot: paired(|sides| alias::text_or_dash(on_side(resp, PEAK_SLOT, sides, None))),
        generation: alias::array(alias::at(resp, &["generation"])),
        purpose: alias::array(alias::at(resp, &["purpose"])),
        retention: retention(resp),
        agent_type: alias::array(alias::first(resp, AGENT_TYPE)),
        gender: alias::array(alias::at(resp, &["gender"])),
        radar: alias::array(alias::at(resp, &["radar"])),
        radar_stores: radar_stores(resp, locale),
        crosstab: crosstab(resp),
        side_effects: alias::array(alias::first(resp, SIDE_EFFECTS)),
        tradeoffs: alias::array(alias::at(resp, &["tradeoffs"])),
        risk_score: risk_score(resp),
        llm_summary: alias::text(alias::first(resp, LLM_SUMMARY), ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn side_chains_resolve_per_field() {
        let view = normalize_y_report_view(&json!({
            "overview": {
                "before": {"totalVisits": 100},
                "baseCase": {"totalVisits": 1, "marketShare": 0.2},
                "simB": {"totalVisits": 140, "marketShare": 0.3}
            }
        }));
        assert_eq!(view.overview.sim1.total_visits, 100.0);
        assert_eq!(view.overview.sim1.market_share, 0.2);
        assert_eq!(view.overview.sim2.total_visits, 140.0);
        assert_eq!(view.overview.sim2.market_share, 0.3);
    }

    #[test]
    fn earlier_side_alias_wins() {
        let view = normalize_y_report_view(&json!({
            "keywords": {"sim1": ["a"], "before": ["b"], "after": ["c"], "variantCase": ["d"]}
        }));
        assert_eq!(view.keywords.sim1, vec![json!("a")]);
        assert_eq!(view.keywords.sim2, vec![json!("c")]);
    }

    #[test]
    fn crosstab_defaults_and_rows() {
        let view = normalize_y_report_view(&json!({"crosstab": {"generations": ["20s"]}}));
        assert_eq!(view.crosstab.generations, vec![json!("20s")]);
        assert!(view.crosstab.purposes.is_empty());
        assert!(view.crosstab.sim2.is_empty());

        let view = normalize_y_report_view(&json!({
            "crosstab": {"after": [[1, 2], "bad", [3]], "variantCase": [[9]]}
        }));
        assert_eq!(
            view.crosstab.sim2,
            vec![vec![json!(1), json!(2)], vec![], vec![json!(3)]]
        );
    }

    #[test]
    fn snake_case_containers() {
        let view = normalize_y_report_view(&json!({
            "risk_score": {"score": 61, "level": "watch", "total_metrics": 12},
            "retention": {"sim1_agents": 10, "retained": 4, "retention_rate": 0.4},
            "radar_stores": {"comp2": "Rival"},
            "peak_slot": {"before": "12-13"},
            "llm_summary": "fine",
            "side_effects": [{"metric": "x"}]
        }));
        assert_eq!(view.risk_score.score, 61.0);
        assert_eq!(view.risk_score.level, "watch");
        assert_eq!(view.risk_score.total_metrics, 12.0);
        assert_eq!(view.retention.sim1_agents, 10.0);
        assert_eq!(view.retention.retained, 4.0);
        assert_eq!(view.retention.retention_rate, 0.4);
        assert_eq!(view.radar_stores.comp1, "Competitor 1");
        assert_eq!(view.radar_stores.comp2, "Rival");
        assert_eq!(view.peak_slot.sim1, "12-13");
        assert_eq!(view.peak_slot.sim2, DASH);
        assert_eq!(view.llm_summary, "fine");
        assert_eq!(view.side_effects.len(), 1);
    }

    #[test]
    fn korean_competitor_placeholders() {
        let view = normalize_y_report_view_in(&json!({"radarStores": {"comp3": "Rival"}}), Locale::Ko);
        assert_eq!(view.radar_stores.comp1, "경쟁사 1");
        assert_eq!(view.radar_stores.comp2, "경쟁사 2");
        assert_eq!(view.radar_stores.comp3, "Rival");

        let empty = normalize_y_report_view_in(&json!(null), Locale::Ko);
        assert_eq!(empty.radar_stores, RadarStores::placeholders(Locale::Ko));
        assert_eq!(empty.peak_slot.sim1, DASH);
    }

    #[test]
    fn camel_case_container_wins() {
        let view = normalize_y_report_view(&json!({
            "riskScore": {"score": 1},
            "risk_score": {"score": 2, "level": "high"}
        }));
        assert_eq!(view.risk_score.score, 1.0);
        assert_eq!(view.risk_score.level, "high");
    }

    #[test]
    fn invalid_input_is_no_data_state() {
        let empty = NormalizedYReportView::default();
        assert_eq!(normalize_y_report_view(&json!(null)), empty);
        assert_eq!(normalize_y_report_view(&json!("x")), empty);
        assert_eq!(normalize_y_report_view(&json!({})), empty);
        assert_eq!(empty.peak_slot.sim1, DASH);
    }

    #[test]
    fn non_finite_and_non_numeric_become_zero() {
        let view = normalize_y_report_view(&json!({
            "overview": {"sim1": {"totalVisits": "100"}},
            "ratingSummary": {"sim2": {"avg": 4.2, "satisfaction": null}}
        }));
        assert_eq!(view.overview.sim1.total_visits, 0.0);
        assert_eq!(view.rating_summary.sim2.avg, 4.2);
        assert_eq!(view.rating_summary.sim2.satisfaction, 0.0);
    }
}
