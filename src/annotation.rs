//! Header annotations: `Severity [status|c]` → label `Severity`, kind
//! [`SemanticKind::Status`], alignment [`Alignment::Center`].
//!
//! Every bracket group in a header is a tag group; tokens inside a group are
//! separated by `|` (commas and whitespace are accepted too). Parsing is total:
//! a header without annotations is a plain, left-aligned column.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

static TAG_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]").expect("valid tag group pattern"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticKind {
    #[default]
    Plain,
    Chips,
    Status,
    Boolean,
    Icon,
    Link,
}

impl SemanticKind {
    /// Kinds tried in this order when a header carries several semantic tags.
    pub const PRECEDENCE: [SemanticKind; 5] = [
        SemanticKind::Chips,
        SemanticKind::Status,
        SemanticKind::Boolean,
        SemanticKind::Icon,
        SemanticKind::Link,
    ];

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "chip" | "chips" => Some(SemanticKind::Chips),
            "status" => Some(SemanticKind::Status),
            "boolean" | "bool" => Some(SemanticKind::Boolean),
            "icon" => Some(SemanticKind::Icon),
            "link" => Some(SemanticKind::Link),
            _ => None,
        }
    }

    /// Kinds rendered by a fixed-shape component whose width does not depend
    /// on the cell value.
    pub fn is_fixed_shape(self) -> bool {
        matches!(
            self,
            SemanticKind::Status | SemanticKind::Boolean | SemanticKind::Icon
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SemanticKind::Plain => "plain",
            SemanticKind::Chips => "chips",
            SemanticKind::Status => "status",
            SemanticKind::Boolean => "boolean",
            SemanticKind::Icon => "icon",
            SemanticKind::Link => "link",
        }
    }
}

impl fmt::Display for SemanticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "l" | "left" => Some(Alignment::Left),
            "c" | "center" | "centre" => Some(Alignment::Center),
            "r" | "right" => Some(Alignment::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub raw_header: String,
    pub display_label: String,
    pub semantic_kind: SemanticKind,
    pub alignment: Alignment,
}

impl Column {
    pub fn parse(raw_header: &str) -> Self {
        let tokens = tag_tokens(raw_header);

        let semantic_kind = SemanticKind::PRECEDENCE
            .into_iter()
            .find(|kind| {
                tokens
                    .iter()
                    .any(|token| SemanticKind::from_token(token) == Some(*kind))
            })
            .unwrap_or_default();

        // right wins over center, center over left
        let alignments = tokens
            .iter()
            .filter_map(|token| Alignment::from_token(token))
            .collect::<Vec<_>>();
        let alignment = if alignments.contains(&Alignment::Right) {
            Alignment::Right
        } else if alignments.contains(&Alignment::Center) {
            Alignment::Center
        } else {
            Alignment::Left
        };

        Column {
            raw_header: raw_header.to_string(),
            display_label: display_label(raw_header),
            semantic_kind,
            alignment,
        }
    }
}

pub fn parse_columns(headers: &[String]) -> Vec<Column> {
    headers.iter().map(|h| Column::parse(h)).collect()
}

/// Header text with every bracket group removed and whitespace collapsed.
pub fn display_label(raw_header: &str) -> String {
    let stripped = TAG_GROUP.replace_all(raw_header, " ");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

fn tag_tokens(raw_header: &str) -> Vec<String> {
    TAG_GROUP
        .captures_iter(raw_header)
        .filter_map(|caps| caps.get(1))
        .flat_map(|group| {
            group
                .as_str()
                .split(|c: char| c == '|' || c == ',' || c.is_whitespace())
                .map(|token| token.trim().to_lowercase())
                .filter(|token| !token.is_empty())
                .collect::<Vec<_>>()
        })
        .collect()
}
