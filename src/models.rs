use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public directory listing of a business, as returned by the lookup service.
/// Immutable for the duration of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub name: String,
    pub address: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: u32,
    pub category: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub gps_coordinates: Option<GeoPoint>,
    pub place_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Canonical representation of every strength, weakness and recommendation.
/// Title is non-empty after trimming; the description may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl DetailItem {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Recommended timeframe for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    ShortTerm,
    MidTerm,
    LongTerm,
}

impl Horizon {
    /// Section label used in the rendered report.
    pub fn label(&self) -> &'static str {
        match self {
            Horizon::ShortTerm => "Court terme",
            Horizon::MidTerm => "Moyen terme",
            Horizon::LongTerm => "Long terme",
        }
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Horizon::ShortTerm => write!(f, "short_term"),
            Horizon::MidTerm => write!(f, "mid_term"),
            Horizon::LongTerm => write!(f, "long_term"),
        }
    }
}

/// A recommendation tagged with its horizon, used in the flattened
/// pipeline output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Horizon,
}

/// Model-derived score plus strengths and weaknesses for one profile.
///
/// When `message` is set the analysis was deliberately skipped: the score is
/// zero and both lists are empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: u8,
    #[serde(default)]
    pub strengths: Vec<DetailItem>,
    #[serde(default)]
    pub weaknesses: Vec<DetailItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AnalysisResult {
    /// Terminal no-analysis outcome: zero score, empty lists, a message
    /// explaining why the analysis was skipped.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self {
            score: 0,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.message.is_some()
    }
}

/// Three ordered recommendation lists, one per horizon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionPlan {
    #[serde(default)]
    pub short_term: Vec<DetailItem>,
    #[serde(default)]
    pub mid_term: Vec<DetailItem>,
    #[serde(default)]
    pub long_term: Vec<DetailItem>,
}

impl ActionPlan {
    pub fn is_empty(&self) -> bool {
        self.short_term.is_empty() && self.mid_term.is_empty() && self.long_term.is_empty()
    }

    /// Flatten the plan into horizon-tagged items, insertion order preserved
    /// within each horizon.
    pub fn flatten(&self, horizon: Horizon) -> Vec<ActionItem> {
        let items = match horizon {
            Horizon::ShortTerm => &self.short_term,
            Horizon::MidTerm => &self.mid_term,
            Horizon::LongTerm => &self.long_term,
        };
        items
            .iter()
            .map(|item| ActionItem {
                title: item.title.clone(),
                description: item.description.clone(),
                priority: horizon,
            })
            .collect()
    }
}

/// A successfully rendered report: the document bytes plus the generated
/// filename. Anything below `MIN_REPORT_BYTES` is treated as corrupt by the
/// layout engine and never reaches this type.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Minimum byte size of a well-formed report document.
pub const MIN_REPORT_BYTES: usize = 1024;

/// Persisted audit row. Analysis lists and the action plan are stored as
/// self-describing JSON text so a stored record survives schema drift;
/// malformed payloads decode to empty lists rather than failing the read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub api_key: String,
    pub name: String,
    pub location: String,
    pub score: u8,
    pub strengths: String,
    pub weaknesses: String,
    pub recommendations: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub business: Option<BusinessProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Logical projection of a stored record. Identical whether the record
    /// was fetched by id or by api-key.
    pub fn projection(&self) -> StoredAudit {
        StoredAudit {
            id: self.id,
            api_key: self.api_key.clone(),
            name: self.name.clone(),
            location: self.location.clone(),
            score: self.score,
            strengths: decode_items(&self.strengths),
            weaknesses: decode_items(&self.weaknesses),
            recommendations: decode_plan(&self.recommendations),
            owner: self.owner.clone(),
            business: self.business.clone(),
            created_at: self.created_at,
        }
    }
}

fn decode_items(raw: &str) -> Vec<DetailItem> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn decode_plan(raw: &str) -> ActionPlan {
    serde_json::from_str(raw).unwrap_or_default()
}

/// What a caller sees when retrieving a stored audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAudit {
    pub id: i64,
    pub api_key: String,
    pub name: String,
    pub location: String,
    pub score: u8,
    pub strengths: Vec<DetailItem>,
    pub weaknesses: Vec<DetailItem>,
    pub recommendations: ActionPlan,
    pub owner: Option<String>,
    pub business: Option<BusinessProfile>,
    pub created_at: DateTime<Utc>,
}

/// Pipeline input: both fields required, no further validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRequest {
    pub name: String,
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_analysis_holds_invariant() {
        let analysis = AnalysisResult::degenerate("site injoignable");
        assert_eq!(analysis.score, 0);
        assert!(analysis.strengths.is_empty());
        assert!(analysis.weaknesses.is_empty());
        assert!(analysis.is_degenerate());
    }

    #[test]
    fn projection_degrades_malformed_payloads_to_empty() {
        let record = AuditRecord {
            id: 1,
            api_key: "k".into(),
            name: "Cafe".into(),
            location: "Lyon".into(),
            score: 50,
            strengths: "not json at all".into(),
            weaknesses: "[{\"title\":\"ok\"}]".into(),
            recommendations: "{broken".into(),
            owner: None,
            business: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let projected = record.projection();
        assert!(projected.strengths.is_empty());
        assert_eq!(projected.weaknesses.len(), 1);
        assert!(projected.recommendations.is_empty());
    }
}
