//! Content-aware row ordering.
//!
//! A comparator cascades through typed interpretations of the two cells and
//! stops at the first tier under which they differ:
//!
//! 1. status severity rank (status columns only)
//! 2. boolean, when both sides parse (boolean columns only)
//! 3. duration (`3 days`, `90 min`, ...)
//! 4. date/time (`M/D/YYYY [h:mm[:ss] AM|PM]`, then ISO/RFC forms)
//! 5. number (thousands separators ignored)
//! 6. first tag, case-insensitive (chip columns only)
//! 7. case-insensitive text
//!
//! Tiers 3-5 run for every kind, so a plain column still sorts by the most
//! specific interpretation its content supports.

use std::{cmp::Ordering, fmt, str::FromStr, sync::LazyLock};

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use itertools::Itertools;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    annotation::{Column, SemanticKind},
    csv_input::Row,
    normalize::{first_token, normalize_status, parse_boolean},
};

const SECONDS_PER_MINUTE: f64 = 60.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_WEEK: f64 = 7.0 * SECONDS_PER_DAY;
const SECONDS_PER_MONTH: f64 = 30.0 * SECONDS_PER_DAY;
const SECONDS_PER_YEAR: f64 = 365.0 * SECONDS_PER_DAY;

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d+(?:\.\d+)?)\s*(years?|yrs?|y|months?|mos?|mo|weeks?|w|days?|d|hours?|hrs?|h|minutes?|mins?|m|seconds?|secs?|s)\b",
    )
    .expect("valid duration pattern")
});

static US_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(\d{1,2})/(\d{1,2})/(\d{4})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?\s*(AM|PM))?\s*$",
    )
    .expect("valid date pattern")
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(anyhow!("Unknown sort direction '{other}'")),
        }
    }
}

/// At most one active sort column; `direction: None` means unsorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub by: Option<String>,
    pub direction: Option<SortDirection>,
}

impl SortState {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(by: impl Into<String>, direction: SortDirection) -> Self {
        SortState {
            by: Some(by.into()),
            direction: Some(direction),
        }
    }

    /// Parses `column[:asc|desc]`. A trailing segment that is not a direction
    /// is treated as part of the column name.
    pub fn parse(directive: &str) -> Result<Self> {
        let trimmed = directive.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Empty sort directive"));
        }
        let split = trimmed.rsplit_once(':').and_then(|(column, suffix)| {
            let direction = suffix.parse::<SortDirection>().ok()?;
            Some((column.trim(), direction))
        });
        match split {
            Some(("", _)) => Err(anyhow!("Sort directive '{trimmed}' is missing a column")),
            Some((column, direction)) => Ok(SortState::new(column, direction)),
            None => Ok(SortState::new(trimmed, SortDirection::Ascending)),
        }
    }

    pub fn active(&self) -> Option<(&str, SortDirection)> {
        match (&self.by, self.direction) {
            (Some(by), Some(direction)) => Some((by.as_str(), direction)),
            _ => None,
        }
    }

    pub fn is_active_for(&self, raw_header: &str) -> bool {
        self.active().is_some_and(|(by, _)| by == raw_header)
    }

    /// The state that actually applies to `columns`: inactive when the sort
    /// column is not among them.
    pub fn restricted_to(&self, columns: &[Column]) -> SortState {
        match self.active() {
            Some((by, direction)) if columns.iter().any(|c| c.raw_header == by) => {
                SortState::new(by, direction)
            }
            _ => SortState::none(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypedComparator {
    header: String,
    kind: SemanticKind,
    direction: SortDirection,
}

impl TypedComparator {
    pub fn new(column: &Column, direction: SortDirection) -> Self {
        TypedComparator {
            header: column.raw_header.clone(),
            kind: column.semantic_kind,
            direction,
        }
    }

    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        self.compare_values(a.get(&self.header), b.get(&self.header))
    }

    pub fn compare_values(&self, a: &str, b: &str) -> Ordering {
        let ordering = cascade(self.kind, a.trim(), b.trim());
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Comparator closure for `column` in `direction`.
pub fn build(column: &Column, direction: SortDirection) -> impl Fn(&Row, &Row) -> Ordering {
    let comparator = TypedComparator::new(column, direction);
    move |a: &Row, b: &Row| comparator.compare(a, b)
}

fn cascade(kind: SemanticKind, a: &str, b: &str) -> Ordering {
    if kind == SemanticKind::Status {
        let ranks = (normalize_status(a).rank(), normalize_status(b).rank());
        if ranks.0 != ranks.1 {
            return ranks.0.cmp(&ranks.1);
        }
    }

    if kind == SemanticKind::Boolean {
        if let (Some(left), Some(right)) = (parse_boolean(a), parse_boolean(b)) {
            if left != right {
                // true sorts first
                return right.cmp(&left);
            }
        }
    }

    if let (Some(left), Some(right)) = (parse_duration_seconds(a), parse_duration_seconds(b)) {
        if left != right {
            return left.total_cmp(&right);
        }
    }

    if let (Some(left), Some(right)) = (parse_timestamp_millis(a), parse_timestamp_millis(b)) {
        if left != right {
            return left.cmp(&right);
        }
    }

    if let (Some(left), Some(right)) = (parse_numeric(a), parse_numeric(b)) {
        if left != right {
            return left.total_cmp(&right);
        }
    }

    if kind == SemanticKind::Chips {
        let left = first_token(a).to_lowercase();
        let right = first_token(b).to_lowercase();
        if left != right {
            return left.cmp(&right);
        }
    }

    a.to_lowercase().cmp(&b.to_lowercase())
}

/// First `quantity unit` pair in the text, in seconds.
pub fn parse_duration_seconds(value: &str) -> Option<f64> {
    let lowered = value.trim().to_lowercase();
    let caps = DURATION.captures(&lowered)?;
    let quantity: f64 = caps.get(1)?.as_str().parse().ok()?;
    if !quantity.is_finite() {
        return None;
    }
    let unit = caps.get(2)?.as_str();
    let scale = if unit.starts_with('y') {
        SECONDS_PER_YEAR
    } else if unit.starts_with("mo") {
        SECONDS_PER_MONTH
    } else if unit.starts_with('w') {
        SECONDS_PER_WEEK
    } else if unit.starts_with('d') {
        SECONDS_PER_DAY
    } else if unit.starts_with('h') {
        SECONDS_PER_HOUR
    } else if unit.starts_with('m') {
        SECONDS_PER_MINUTE
    } else {
        1.0
    };
    Some(quantity * scale)
}

/// Milliseconds since the epoch. Offset-free values are read as UTC, which
/// keeps them mutually comparable.
pub fn parse_timestamp_millis(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(parsed) = US_DATE.captures(trimmed).and_then(|caps| us_datetime(&caps)) {
        return Some(parsed.and_utc().timestamp_millis());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.timestamp_millis());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(parsed.timestamp_millis());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(parsed.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }
    None
}

fn us_datetime(caps: &regex::Captures<'_>) -> Option<NaiveDateTime> {
    let number = |idx: usize, default: u32| -> Option<u32> {
        caps.get(idx)
            .map_or(Some(default), |m| m.as_str().parse().ok())
    };
    let month = number(1, 1)?;
    let day = number(2, 1)?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;
    let mut hour = number(4, 0)?;
    let minute = number(5, 0)?;
    let second = number(6, 0)?;
    if let Some(meridiem) = caps.get(7) {
        let is_pm = meridiem.as_str().eq_ignore_ascii_case("pm");
        hour = match (is_pm, hour) {
            (false, 12) => 0,
            (true, h) if h != 12 => h + 12,
            (_, h) => h,
        };
    }
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Number with `,` and space thousands separators removed.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let compact = value.replace([',', ' '], "");
    if compact.is_empty() {
        return None;
    }
    compact.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Stable merge sort that never panics, even when the comparator is not a
/// strict total order (mixed-type cascades can produce cycles).
pub fn stable_sort_by<T, F>(items: Vec<T>, compare: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = stable_sort_by(left, compare);
    let right = stable_sort_by(right, compare);
    left.into_iter()
        .merge_by(right, |l, r| compare(l, r) != Ordering::Greater)
        .collect()
}

/// Sorts `rows` per `sort` when its column is among `columns`; returns the
/// rows and the sort state that was actually applied.
pub fn sort_rows(columns: &[Column], rows: Vec<Row>, sort: &SortState) -> (Vec<Row>, SortState) {
    let applied = sort.restricted_to(columns);
    let Some((by, direction)) = applied.active() else {
        if sort.active().is_some() {
            debug!("Sort column {:?} is not selected; leaving rows unsorted", sort.by);
        }
        return (rows, applied);
    };
    let Some(column) = columns.iter().find(|c| c.raw_header == by) else {
        return (rows, SortState::none());
    };
    debug!(
        "Sorting {} row(s) by '{}' ({}, {})",
        rows.len(),
        column.display_label,
        column.semantic_kind,
        direction
    );
    let comparator = build(column, direction);
    let sorted = stable_sort_by(rows, &comparator);
    (sorted, applied)
}
