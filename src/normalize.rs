//! Canonical values for annotated columns.
//!
//! Every mapping here is total: unknown input resolves to a documented
//! fallback (`Unspecified`, `false`, the first allowed icon variant) instead
//! of an error, so a renderer always receives something it can draw.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::annotation::{Column, SemanticKind};

static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\-\s]+").expect("valid separator pattern"));

/// Rank given to values outside the status vocabulary; sorts after every
/// known severity.
pub const UNRANKED: u16 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusValue {
    Critical,
    Error,
    High,
    Medium,
    Low,
    #[serde(rename = "Very Low")]
    VeryLow,
    Unresponsive,
    Bad,
    Poor,
    Inactive,
    #[serde(rename = "Not Monitored")]
    NotMonitored,
    Idle,
    Healthy,
    Good,
    Online,
    Unspecified,
}

impl StatusValue {
    pub const ALL: [StatusValue; 16] = [
        StatusValue::Critical,
        StatusValue::Error,
        StatusValue::High,
        StatusValue::Medium,
        StatusValue::Low,
        StatusValue::VeryLow,
        StatusValue::Unresponsive,
        StatusValue::Bad,
        StatusValue::Poor,
        StatusValue::Inactive,
        StatusValue::NotMonitored,
        StatusValue::Idle,
        StatusValue::Healthy,
        StatusValue::Good,
        StatusValue::Online,
        StatusValue::Unspecified,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusValue::Critical => "Critical",
            StatusValue::Error => "Error",
            StatusValue::High => "High",
            StatusValue::Medium => "Medium",
            StatusValue::Low => "Low",
            StatusValue::VeryLow => "Very Low",
            StatusValue::Unresponsive => "Unresponsive",
            StatusValue::Bad => "Bad",
            StatusValue::Poor => "Poor",
            StatusValue::Inactive => "Inactive",
            StatusValue::NotMonitored => "Not Monitored",
            StatusValue::Idle => "Idle",
            StatusValue::Healthy => "Healthy",
            StatusValue::Good => "Good",
            StatusValue::Online => "Online",
            StatusValue::Unspecified => "Unspecified",
        }
    }

    /// Severity rank; lower is more severe and sorts first when ascending.
    pub fn rank(self) -> u16 {
        match self {
            StatusValue::Critical | StatusValue::Error => 0,
            StatusValue::High => 1,
            StatusValue::Medium => 2,
            StatusValue::Low => 3,
            StatusValue::VeryLow => 4,
            StatusValue::Unresponsive => 5,
            StatusValue::Bad => 6,
            StatusValue::Poor => 7,
            StatusValue::Inactive => 8,
            StatusValue::NotMonitored => 9,
            StatusValue::Idle => 10,
            StatusValue::Healthy => 11,
            StatusValue::Good => 12,
            StatusValue::Online => 13,
            StatusValue::Unspecified => UNRANKED,
        }
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First non-empty token of a `,`/`|` separated cell.
pub fn first_token(raw: &str) -> &str {
    raw.split([',', '|'])
        .map(str::trim)
        .find(|token| !token.is_empty())
        .unwrap_or("")
}

pub fn normalize_status(raw: &str) -> StatusValue {
    let token = first_token(raw).to_lowercase();
    let folded = SEPARATOR_RUN.replace_all(&token, " ");
    match folded.trim() {
        "critical" | "critival" => StatusValue::Critical,
        "error" => StatusValue::Error,
        "high" => StatusValue::High,
        "medium" => StatusValue::Medium,
        "low" => StatusValue::Low,
        "very low" | "verylow" => StatusValue::VeryLow,
        "unresponsive" | "not responding" => StatusValue::Unresponsive,
        "bad" => StatusValue::Bad,
        "poor" => StatusValue::Poor,
        "inactive" => StatusValue::Inactive,
        "not monitored" | "unmonitored" => StatusValue::NotMonitored,
        "idle" => StatusValue::Idle,
        "healthy" => StatusValue::Healthy,
        "good" => StatusValue::Good,
        "online" => StatusValue::Online,
        _ => StatusValue::Unspecified,
    }
}

/// `Some` only for recognised truthy/falsy tokens. Comparison code must treat
/// `None` as "not boolean-comparable".
pub fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Rendering-side boolean: anything unrecognised draws as `false`.
pub fn boolean_for_display(raw: &str) -> bool {
    parse_boolean(raw).unwrap_or(false)
}

/// Trimmed, non-empty tags in presentation order.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split([',', '|'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercase alphanumerics with known synonyms folded together.
pub fn canonical_meaning(value: &str) -> String {
    let canon = value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect::<String>();
    match canon.as_str() {
        "onpremise" | "onpremises" | "onprem" => "onprem".to_string(),
        "saas" => "cloud".to_string(),
        "critival" => "critical".to_string(),
        _ => canon,
    }
}

/// Resolves a raw token to one of `allowed`: exact case-insensitive match,
/// then canonical match, then the first allowed value. With no allowed
/// values the trimmed raw token is returned unchanged.
pub fn resolve_icon_variant(raw: &str, allowed: &[String]) -> String {
    let Some(first) = allowed.first() else {
        return raw.trim().to_string();
    };
    let raw_lower = raw.trim().to_lowercase();
    if let Some(hit) = allowed
        .iter()
        .find(|value| value.trim().to_lowercase() == raw_lower)
    {
        return hit.clone();
    }
    let raw_canon = canonical_meaning(raw);
    if let Some(hit) = allowed
        .iter()
        .find(|value| canonical_meaning(value) == raw_canon)
    {
        return hit.clone();
    }
    first.clone()
}

/// A cell interpreted through its column's semantic kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellValue {
    Text { text: String },
    Link { text: String },
    Tags { tags: Vec<String> },
    Status { status: StatusValue },
    Boolean { value: bool, text: String },
    Icon { token: String },
}

impl CellValue {
    pub fn from_raw(column: &Column, raw: &str) -> Self {
        let trimmed = raw.trim();
        match column.semantic_kind {
            SemanticKind::Plain => CellValue::Text {
                text: trimmed.to_string(),
            },
            SemanticKind::Link => CellValue::Link {
                text: trimmed.to_string(),
            },
            SemanticKind::Chips => CellValue::Tags {
                tags: split_tags(trimmed),
            },
            SemanticKind::Status => CellValue::Status {
                status: normalize_status(trimmed),
            },
            SemanticKind::Boolean => CellValue::Boolean {
                value: boolean_for_display(trimmed),
                text: trimmed.to_string(),
            },
            SemanticKind::Icon => CellValue::Icon {
                token: trimmed.to_string(),
            },
        }
    }

    /// Plain-text rendering used by previews and text fallbacks.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text { text } | CellValue::Link { text } => text.clone(),
            CellValue::Tags { tags } => tags.join(", "),
            CellValue::Status { status } => status.to_string(),
            CellValue::Boolean { text, .. } => text.clone(),
            CellValue::Icon { token } => token.clone(),
        }
    }
}
