//! Contracts with the rendering host, plus a YAML-configured host profile.
//!
//! The core never talks to a canvas directly. It asks three collaborators:
//!
//! - [`MeasurementOracle`]: pixel widths of text and representative components
//! - [`ComponentResolver`]: optional design-system components and their
//!   property sets
//! - [`TokenSource`]: optional colour token references per [`ColorRole`]
//!
//! Every lookup returns `Result<_, ImportFailure>`. [`ResourceSet::resolve`]
//! turns failures into `None` once per request and logs the fallback, so the
//! builder only ever sees "present" or "absent".
//!
//! [`HostProfile`] implements all three traits from a YAML file for command
//! line use.

use std::{collections::BTreeMap, fmt, fs::File, io::BufReader, path::Path, sync::LazyLock};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotation::{Column, SemanticKind};

static ICON_AXIS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(icon|name|type|category|state|level|platform)$")
        .expect("valid icon axis pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportFailure {
    #[error("'{0}' is not available from the host")]
    Missing(String),
    #[error("host rejected '{name}': {reason}")]
    Rejected { name: String, reason: String },
    #[error("'{0}' could not be measured")]
    Unmeasurable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    /// Medium 14/24.
    Header,
    /// Regular 12/20.
    Body,
    /// Regular 11/16, used inside chips.
    Chip,
    /// Medium 24/32, page titles.
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentId {
    Chip,
    Status,
    Boolean,
    Icon,
    Checkbox,
    CardHeader,
    NavRail,
    FilterBar,
}

impl ComponentId {
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentId::Chip => "chip",
            ComponentId::Status => "status",
            ComponentId::Boolean => "boolean",
            ComponentId::Icon => "icon",
            ComponentId::Checkbox => "checkbox",
            ComponentId::CardHeader => "card_header",
            ComponentId::NavRail => "nav_rail",
            ComponentId::FilterBar => "filter_bar",
        }
    }

    /// Component drawing cells of `kind`, if that kind uses one.
    pub fn for_kind(kind: SemanticKind) -> Option<ComponentId> {
        match kind {
            SemanticKind::Chips => Some(ComponentId::Chip),
            SemanticKind::Status => Some(ComponentId::Status),
            SemanticKind::Boolean => Some(ComponentId::Boolean),
            SemanticKind::Icon => Some(ComponentId::Icon),
            SemanticKind::Plain | SemanticKind::Link => None,
        }
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    TextPrimary,
    Link,
    Divider,
    CardBackground,
    CardBorder,
}

/// Opaque design-token reference; the host owns the actual colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenRef(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    #[default]
    Variant,
    Text,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentProperty {
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub value: String,
    /// Legal values for variant properties.
    pub options: Vec<String>,
}

/// A resolved component and its mutable property set, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentHandle {
    pub key: String,
    pub properties: IndexMap<String, ComponentProperty>,
}

pub type PropertyOverrides = BTreeMap<String, String>;

impl ComponentHandle {
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Variant axis that picks the icon glyph: a conventionally named axis if
    /// present, otherwise the first variant axis the component declares.
    pub fn icon_axis(&self) -> Option<&str> {
        let axes: Vec<&str> = self
            .properties
            .iter()
            .filter(|(_, prop)| prop.kind == PropertyKind::Variant)
            .map(|(name, _)| name.as_str())
            .collect();
        axes.iter()
            .copied()
            .find(|name| ICON_AXIS_NAME.is_match(name))
            .or_else(|| axes.first().copied())
    }

    pub fn allowed_values(&self, axis: &str) -> &[String] {
        self.properties
            .get(axis)
            .map(|prop| prop.options.as_slice())
            .unwrap_or(&[])
    }

    /// Overrides selecting `value` on `axis` while every other variant axis
    /// keeps its current value.
    pub fn variant_overrides(&self, axis: &str, value: &str) -> PropertyOverrides {
        let mut overrides: PropertyOverrides = self
            .properties
            .iter()
            .filter(|(_, prop)| prop.kind == PropertyKind::Variant)
            .map(|(name, prop)| (name.clone(), prop.value.clone()))
            .collect();
        overrides.insert(axis.to_string(), value.to_string());
        overrides
    }
}

pub trait MeasurementOracle {
    fn measure_text(&self, value: &str, style: TextStyle) -> f64;

    fn measure_representative(
        &self,
        kind: SemanticKind,
        canonical_value: &str,
    ) -> Result<f64, ImportFailure>;
}

pub trait ComponentResolver {
    fn resolve(&self, id: ComponentId) -> Result<ComponentHandle, ImportFailure>;
}

pub trait TokenSource {
    fn token(&self, role: ColorRole) -> Result<TokenRef, ImportFailure>;
}

/// Which optional resources one request needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceNeeds {
    pub checkboxes: bool,
    pub card: bool,
    pub page: bool,
    pub filter_bar: bool,
}

/// Components and tokens fetched for one request; `None` means "use the
/// fallback rendering".
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    pub components: BTreeMap<ComponentId, ComponentHandle>,
    pub tokens: BTreeMap<ColorRole, TokenRef>,
}

impl ResourceSet {
    pub fn resolve(
        columns: &[Column],
        needs: ResourceNeeds,
        resolver: &dyn ComponentResolver,
        tokens: &dyn TokenSource,
    ) -> Self {
        let mut wanted: Vec<ComponentId> = columns
            .iter()
            .filter_map(|c| ComponentId::for_kind(c.semantic_kind))
            .collect();
        if needs.checkboxes {
            wanted.push(ComponentId::Checkbox);
        }
        if needs.card {
            wanted.push(ComponentId::CardHeader);
        }
        if needs.page {
            wanted.push(ComponentId::NavRail);
            if needs.filter_bar {
                wanted.push(ComponentId::FilterBar);
            }
        }
        wanted.sort();
        wanted.dedup();

        let mut set = ResourceSet::default();
        for id in wanted {
            match resolver.resolve(id) {
                Ok(handle) => {
                    debug!("Resolved component '{id}' ({})", handle.key);
                    set.components.insert(id, handle);
                }
                Err(err) => warn!("{err}; drawing '{id}' with the built-in fallback"),
            }
        }

        let mut roles = vec![ColorRole::TextPrimary, ColorRole::Divider];
        if columns.iter().any(|c| c.semantic_kind == SemanticKind::Link) {
            roles.push(ColorRole::Link);
        }
        if needs.card {
            roles.extend([ColorRole::CardBackground, ColorRole::CardBorder]);
        }
        for role in roles {
            match tokens.token(role) {
                Ok(token) => {
                    set.tokens.insert(role, token);
                }
                Err(err) => warn!("{err}; {role:?} uses the default colour"),
            }
        }
        set
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentHandle> {
        self.components.get(&id)
    }

    pub fn token(&self, role: ColorRole) -> Option<&TokenRef> {
        self.tokens.get(&role)
    }

    /// Canonical value used to measure one representative instance of
    /// `kind`, or `None` when no component is available to instantiate.
    ///
    /// An icon without a usable variant axis is still measured: its default
    /// instance is what gets drawn.
    pub fn representative_value(&self, kind: SemanticKind) -> Option<String> {
        let id = ComponentId::for_kind(kind)?;
        let handle = self.component(id)?;
        match kind {
            SemanticKind::Status => Some("Unspecified".to_string()),
            SemanticKind::Boolean => Some("true".to_string()),
            SemanticKind::Icon => {
                let variant = handle.icon_axis().and_then(|axis| {
                    handle
                        .allowed_values(axis)
                        .first()
                        .or_else(|| handle.properties.get(axis).map(|prop| &prop.value))
                        .cloned()
                });
                Some(variant.unwrap_or_default())
            }
            _ => None,
        }
    }
}

/// Average glyph advance per text style, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMetrics {
    pub header: f64,
    pub body: f64,
    pub chip: f64,
    pub title: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        TextMetrics {
            header: 8.2,
            body: 6.6,
            chip: 6.1,
            title: 13.8,
        }
    }
}

impl TextMetrics {
    fn advance(&self, style: TextStyle) -> f64 {
        match style {
            TextStyle::Header => self.header,
            TextStyle::Body => self.body,
            TextStyle::Chip => self.chip,
            TextStyle::Title => self.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileComponent {
    pub key: String,
    /// Rendered width of a default instance; absent means "cannot measure".
    pub width: Option<f64>,
    pub properties: IndexMap<String, ComponentProperty>,
}

/// Host stand-in loaded from YAML. An empty profile has no components and
/// no tokens, so every fallback path is taken.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostProfile {
    pub metrics: TextMetrics,
    pub components: BTreeMap<ComponentId, ProfileComponent>,
    pub tokens: BTreeMap<ColorRole, String>,
}

impl HostProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening host profile {path:?}"))?;
        let reader = BufReader::new(file);
        let profile = serde_yaml::from_reader(reader).context("Parsing host profile YAML")?;
        Ok(profile)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Parsing host profile YAML")
    }
}

impl MeasurementOracle for HostProfile {
    fn measure_text(&self, value: &str, style: TextStyle) -> f64 {
        (value.chars().count() as f64 * self.metrics.advance(style)).ceil()
    }

    fn measure_representative(
        &self,
        kind: SemanticKind,
        canonical_value: &str,
    ) -> Result<f64, ImportFailure> {
        let id = ComponentId::for_kind(kind)
            .ok_or_else(|| ImportFailure::Missing(format!("{kind} component")))?;
        let component = self
            .components
            .get(&id)
            .ok_or_else(|| ImportFailure::Missing(id.to_string()))?;
        match component.width {
            Some(width) if width > 0.0 => Ok(width.ceil()),
            _ => Err(ImportFailure::Unmeasurable(format!(
                "{id} ({canonical_value})"
            ))),
        }
    }
}

impl ComponentResolver for HostProfile {
    fn resolve(&self, id: ComponentId) -> Result<ComponentHandle, ImportFailure> {
        let component = self
            .components
            .get(&id)
            .ok_or_else(|| ImportFailure::Missing(id.to_string()))?;
        if component.key.trim().is_empty() {
            return Err(ImportFailure::Rejected {
                name: id.to_string(),
                reason: "component key is empty".to_string(),
            });
        }
        Ok(ComponentHandle {
            key: component.key.clone(),
            properties: component.properties.clone(),
        })
    }
}

impl TokenSource for HostProfile {
    fn token(&self, role: ColorRole) -> Result<TokenRef, ImportFailure> {
        self.tokens
            .get(&role)
            .map(|token| TokenRef(token.clone()))
            .ok_or_else(|| ImportFailure::Missing(format!("{role:?} colour token")))
    }
}
