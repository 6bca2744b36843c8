//! Table composition: sized columns and typed cells in, a layout tree out.
//!
//! The core table is always built the same way: a header row, a divider,
//! then data rows separated by dividers. Optional presentation is added by
//! folding an ordered list of [`WrapStage`]s over that core node:
//!
//! - fixed checkbox column beside the scrollable table
//! - card container
//! - page frame with navigation rail and title
//!
//! A stage only wraps the node it receives. It never re-measures the inner
//! node or changes its sizing.

use std::path::Path;

use heck::ToTitleCase;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    annotation::{Alignment, Column},
    compare::{SortDirection, SortState},
    csv_input::Row,
    host::{ColorRole, ComponentId, PropertyOverrides, ResourceSet, TextStyle, TokenRef},
    normalize::{CellValue, StatusValue, resolve_icon_variant},
    sizing::{CELL_HORIZONTAL_PADDING, SizingResult},
};

pub const HEADER_ROW_HEIGHT: f64 = 56.0;
pub const DATA_ROW_HEIGHT: f64 = 40.0;
pub const DATA_CELL_VERTICAL_PADDING: f64 = 10.0;
pub const SORT_INDICATOR_SIZE: f64 = 18.0;
pub const CHECKBOX_COLUMN_WIDTH: f64 = 48.0;
pub const FALLBACK_CHIP_PADDING_X: f64 = 8.0;
pub const FALLBACK_CHIP_PADDING_Y: f64 = 4.0;
pub const FALLBACK_CHIP_RADIUS: f64 = 6.0;
pub const CHIP_GAP: f64 = 4.0;
pub const CARD_RADIUS: f64 = 8.0;
pub const PAGE_WIDTH: f64 = 1440.0;
pub const PAGE_HEIGHT: f64 = 1024.0;
pub const NAV_RAIL_WIDTH: f64 = 72.0;
pub const FILTER_BAR_HEIGHT: f64 = 48.0;
pub const DEFAULT_TITLE: &str = "Table";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Hug,
    Fill,
    Fixed(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Layout {
    pub width: Dimension,
    pub height: Dimension,
}

impl Layout {
    pub const HUG: Layout = Layout {
        width: Dimension::Hug,
        height: Dimension::Hug,
    };
    pub const FILL: Layout = Layout {
        width: Dimension::Fill,
        height: Dimension::Fill,
    };

    pub fn fixed(width: f64, height: f64) -> Self {
        Layout {
            width: Dimension::Fixed(width),
            height: Dimension::Fixed(height),
        }
    }
}

/// Colour role plus the host token bound to it, when one was resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paint {
    pub role: ColorRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenRef>,
}

impl Paint {
    fn new(role: ColorRole, resources: &ResourceSet) -> Self {
        Paint {
            role,
            token: resources.token(role).cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
    pub text: String,
    pub style: TextStyle,
    pub strong: bool,
    pub color: Paint,
}

/// An instance of a host component with property overrides applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceNode {
    pub component: ComponentId,
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "PropertyOverrides::is_empty")]
    pub properties: PropertyOverrides,
    /// Replacement text for the instance's label layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Built-in chip drawn when no chip component is available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChipShape {
    pub label: TextNode,
    pub padding_x: f64,
    pub padding_y: f64,
    pub corner_radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckboxState {
    Unchecked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRole {
    CardHeader,
    NavRail,
    FilterBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowRole {
    Header,
    Data,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellNode {
    pub width: f64,
    pub height: f64,
    pub alignment: Alignment,
    pub padding_x: f64,
    pub padding_y: f64,
    pub content: Vec<CompositionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowNode {
    pub role: RowRole,
    pub cells: Vec<CellNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableNode {
    pub width: f64,
    pub layout: Layout,
    pub children: Vec<CompositionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Box<CompositionNode>>,
    pub shadow: bool,
    pub corner_radius: f64,
    pub background: Paint,
    pub border: Paint,
    pub body_layout: Layout,
    pub body: Box<CompositionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageNode {
    pub layout: Layout,
    pub nav: Box<CompositionNode>,
    pub title: TextNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_bar: Option<Box<CompositionNode>>,
    pub content_layout: Layout,
    pub content: Box<CompositionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompositionNode {
    Text(TextNode),
    /// Status or boolean component instance.
    Badge(InstanceNode),
    Icon(InstanceNode),
    TagGroup {
        gap: f64,
        tags: Vec<CompositionNode>,
    },
    Chip(InstanceNode),
    FallbackChip(ChipShape),
    SortIndicator {
        direction: SortDirection,
        size: f64,
        color: Paint,
    },
    Checkbox {
        state: CheckboxState,
        #[serde(skip_serializing_if = "Option::is_none")]
        instance: Option<InstanceNode>,
    },
    /// Component instance or a placeholder frame when the component is absent.
    Slot {
        role: SlotRole,
        layout: Layout,
        #[serde(skip_serializing_if = "Option::is_none")]
        instance: Option<InstanceNode>,
    },
    Row(RowNode),
    Divider {
        width: f64,
        color: Paint,
    },
    Table(TableNode),
    /// Non-scrolling side column laid out beside the scrollable table.
    FixedColumn {
        fixed: Box<CompositionNode>,
        scroll: Box<CompositionNode>,
    },
    Card(CardNode),
    Page(PageNode),
}

impl CompositionNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            CompositionNode::Text(_) => "text",
            CompositionNode::Badge(_) => "badge",
            CompositionNode::Icon(_) => "icon",
            CompositionNode::TagGroup { .. } => "tag_group",
            CompositionNode::Chip(_) => "chip",
            CompositionNode::FallbackChip(_) => "fallback_chip",
            CompositionNode::SortIndicator { .. } => "sort_indicator",
            CompositionNode::Checkbox { .. } => "checkbox",
            CompositionNode::Slot { .. } => "slot",
            CompositionNode::Row(_) => "row",
            CompositionNode::Divider { .. } => "divider",
            CompositionNode::Table(_) => "table",
            CompositionNode::FixedColumn { .. } => "fixed_column",
            CompositionNode::Card(_) => "card",
            CompositionNode::Page(_) => "page",
        }
    }

    /// Direct children in layout order; cell content is flattened into its row.
    pub fn children(&self) -> Vec<&CompositionNode> {
        match self {
            CompositionNode::TagGroup { tags, .. } => tags.iter().collect(),
            CompositionNode::Row(row) => row
                .cells
                .iter()
                .flat_map(|cell| cell.content.iter())
                .collect(),
            CompositionNode::Table(table) => table.children.iter().collect(),
            CompositionNode::FixedColumn { fixed, scroll } => vec![&**fixed, &**scroll],
            CompositionNode::Card(card) => card
                .header
                .as_deref()
                .into_iter()
                .chain([&*card.body])
                .collect(),
            CompositionNode::Page(page) => std::iter::once(&*page.nav)
                .chain(page.filter_bar.as_deref())
                .chain([&*page.content])
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including `self`, matching `predicate`.
    pub fn count_where<F>(&self, predicate: &F) -> usize
    where
        F: Fn(&CompositionNode) -> bool,
    {
        let own = usize::from(predicate(self));
        own + self
            .children()
            .into_iter()
            .map(|child| child.count_where(predicate))
            .sum::<usize>()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionOptions {
    pub include_checkboxes: bool,
    pub place_within_card: bool,
    pub card_shadow: bool,
    pub place_within_page: bool,
    /// Only honoured together with `place_within_page`.
    pub include_filter_bar: bool,
}

impl CompositionOptions {
    /// Wrapping stages in the order they are applied, innermost first.
    pub fn stages(&self) -> Vec<WrapStage> {
        let mut stages = Vec::new();
        if self.include_checkboxes {
            stages.push(WrapStage::CheckboxColumn);
        }
        if self.place_within_card {
            stages.push(WrapStage::Card {
                shadow: self.card_shadow,
            });
        }
        if self.place_within_page {
            stages.push(WrapStage::Page {
                filter_bar: self.include_filter_bar,
            });
        }
        stages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapStage {
    CheckboxColumn,
    Card { shadow: bool },
    Page { filter_bar: bool },
}

/// What a stage may know about the table it wraps.
struct StageContext<'a> {
    row_count: usize,
    resources: &'a ResourceSet,
    title: String,
}

impl WrapStage {
    fn apply(self, inner: CompositionNode, ctx: &StageContext<'_>) -> CompositionNode {
        debug!("Wrapping {} node with {self:?}", inner.kind_name());
        match self {
            WrapStage::CheckboxColumn => CompositionNode::FixedColumn {
                fixed: Box::new(checkbox_column(ctx.row_count, ctx.resources)),
                scroll: Box::new(inner),
            },
            WrapStage::Card { shadow } => CompositionNode::Card(CardNode {
                header: slot_instance(ComponentId::CardHeader, ctx.resources).map(|instance| {
                    Box::new(CompositionNode::Slot {
                        role: SlotRole::CardHeader,
                        layout: Layout {
                            width: Dimension::Fill,
                            height: Dimension::Hug,
                        },
                        instance: Some(instance),
                    })
                }),
                shadow,
                corner_radius: CARD_RADIUS,
                background: Paint::new(ColorRole::CardBackground, ctx.resources),
                border: Paint::new(ColorRole::CardBorder, ctx.resources),
                body_layout: Layout::FILL,
                body: Box::new(inner),
            }),
            WrapStage::Page { filter_bar } => CompositionNode::Page(PageNode {
                layout: Layout::fixed(PAGE_WIDTH, PAGE_HEIGHT),
                nav: Box::new(CompositionNode::Slot {
                    role: SlotRole::NavRail,
                    layout: Layout {
                        width: Dimension::Fixed(NAV_RAIL_WIDTH),
                        height: Dimension::Fill,
                    },
                    instance: slot_instance(ComponentId::NavRail, ctx.resources),
                }),
                title: TextNode {
                    text: ctx.title.clone(),
                    style: TextStyle::Title,
                    strong: true,
                    color: Paint::new(ColorRole::TextPrimary, ctx.resources),
                },
                filter_bar: filter_bar.then(|| {
                    Box::new(CompositionNode::Slot {
                        role: SlotRole::FilterBar,
                        layout: Layout {
                            width: Dimension::Fill,
                            height: Dimension::Fixed(FILTER_BAR_HEIGHT),
                        },
                        instance: slot_instance(ComponentId::FilterBar, ctx.resources),
                    })
                }),
                content_layout: Layout::FILL,
                content: Box::new(inner),
            }),
        }
    }
}

/// Builds the layout tree for already sorted, projected rows.
pub fn compose(
    columns: &[Column],
    rows: &[Row],
    sizing: &SizingResult,
    sort: &SortState,
    options: &CompositionOptions,
    resources: &ResourceSet,
    source_name: Option<&str>,
) -> CompositionNode {
    let core = core_table(columns, rows, sizing, sort, resources);
    let ctx = StageContext {
        row_count: rows.len(),
        resources,
        title: humanize_title(source_name),
    };
    options
        .stages()
        .into_iter()
        .fold(core, |node, stage| stage.apply(node, &ctx))
}

/// Title-cased file stem, or `Table` when there is no usable name.
pub fn humanize_title(source_name: Option<&str>) -> String {
    let stem = source_name
        .and_then(|name| Path::new(name.trim()).file_stem())
        .map(|stem| stem.to_string_lossy().to_title_case())
        .unwrap_or_default();
    if stem.trim().is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        stem
    }
}

fn core_table(
    columns: &[Column],
    rows: &[Row],
    sizing: &SizingResult,
    sort: &SortState,
    resources: &ResourceSet,
) -> CompositionNode {
    let divider_width = sizing.table_width().round().max(1.0);
    let divider = || CompositionNode::Divider {
        width: divider_width,
        color: Paint::new(ColorRole::Divider, resources),
    };

    let mut children = Vec::with_capacity(rows.len() * 2 + 2);
    children.push(header_row(columns, sizing, sort, resources));
    children.push(divider());
    for (idx, row) in rows.iter().enumerate() {
        if idx > 0 {
            children.push(divider());
        }
        children.push(data_row(columns, row, sizing, resources));
    }

    CompositionNode::Table(TableNode {
        width: sizing.table_width(),
        layout: Layout::HUG,
        children,
    })
}

fn header_row(
    columns: &[Column],
    sizing: &SizingResult,
    sort: &SortState,
    resources: &ResourceSet,
) -> CompositionNode {
    let cells = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let mut content = vec![CompositionNode::Text(TextNode {
                text: column.display_label.clone(),
                style: TextStyle::Header,
                strong: true,
                color: Paint::new(ColorRole::TextPrimary, resources),
            })];
            if let Some((by, direction)) = sort.active() {
                if by == column.raw_header {
                    content.push(CompositionNode::SortIndicator {
                        direction,
                        size: SORT_INDICATOR_SIZE,
                        color: Paint::new(ColorRole::TextPrimary, resources),
                    });
                }
            }
            CellNode {
                width: sizing.cell_width(idx),
                height: HEADER_ROW_HEIGHT,
                alignment: column.alignment,
                padding_x: CELL_HORIZONTAL_PADDING,
                padding_y: 0.0,
                content,
            }
        })
        .collect();
    CompositionNode::Row(RowNode {
        role: RowRole::Header,
        cells,
    })
}

fn data_row(
    columns: &[Column],
    row: &Row,
    sizing: &SizingResult,
    resources: &ResourceSet,
) -> CompositionNode {
    let cells = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let value = CellValue::from_raw(column, row.get(&column.raw_header));
            CellNode {
                width: sizing.cell_width(idx),
                height: DATA_ROW_HEIGHT,
                alignment: column.alignment,
                padding_x: CELL_HORIZONTAL_PADDING,
                padding_y: DATA_CELL_VERTICAL_PADDING,
                content: vec![cell_content(value, resources)],
            }
        })
        .collect();
    CompositionNode::Row(RowNode {
        role: RowRole::Data,
        cells,
    })
}

fn cell_content(value: CellValue, resources: &ResourceSet) -> CompositionNode {
    match value {
        CellValue::Text { text } => body_text(text, ColorRole::TextPrimary, false, resources),
        CellValue::Link { text } => body_text(text, ColorRole::Link, false, resources),
        CellValue::Tags { tags } => CompositionNode::TagGroup {
            gap: CHIP_GAP,
            tags: tags.into_iter().map(|tag| chip(tag, resources)).collect(),
        },
        CellValue::Status { status } => status_badge(status, resources),
        CellValue::Boolean { value, text } => boolean_badge(value, text, resources),
        CellValue::Icon { token } => icon(token, resources),
    }
}

fn body_text(
    text: String,
    role: ColorRole,
    strong: bool,
    resources: &ResourceSet,
) -> CompositionNode {
    CompositionNode::Text(TextNode {
        text,
        style: TextStyle::Body,
        strong,
        color: Paint::new(role, resources),
    })
}

fn chip(tag: String, resources: &ResourceSet) -> CompositionNode {
    match resources.component(ComponentId::Chip) {
        Some(handle) => CompositionNode::Chip(InstanceNode {
            component: ComponentId::Chip,
            key: handle.key.clone(),
            name: format!("Chip / {tag}"),
            properties: PropertyOverrides::new(),
            label: Some(tag),
        }),
        None => CompositionNode::FallbackChip(ChipShape {
            label: TextNode {
                text: tag,
                style: TextStyle::Chip,
                strong: false,
                color: Paint::new(ColorRole::TextPrimary, resources),
            },
            padding_x: FALLBACK_CHIP_PADDING_X,
            padding_y: FALLBACK_CHIP_PADDING_Y,
            corner_radius: FALLBACK_CHIP_RADIUS,
        }),
    }
}

fn status_badge(status: StatusValue, resources: &ResourceSet) -> CompositionNode {
    let Some(handle) = resources.component(ComponentId::Status) else {
        return body_text(status.to_string(), ColorRole::TextPrimary, true, resources);
    };
    let mut properties = PropertyOverrides::new();
    if handle.has_property("status") {
        properties.insert("status".to_string(), status.to_string());
    }
    CompositionNode::Badge(InstanceNode {
        component: ComponentId::Status,
        key: handle.key.clone(),
        name: format!("Status / {status}"),
        properties,
        label: None,
    })
}

fn boolean_badge(value: bool, text: String, resources: &ResourceSet) -> CompositionNode {
    let Some(handle) = resources.component(ComponentId::Boolean) else {
        return body_text(text, ColorRole::TextPrimary, false, resources);
    };
    let mut properties = PropertyOverrides::new();
    if handle.has_property("boolean") {
        properties.insert("boolean".to_string(), value.to_string());
    }
    CompositionNode::Badge(InstanceNode {
        component: ComponentId::Boolean,
        key: handle.key.clone(),
        name: format!("Boolean / {value}"),
        properties,
        label: None,
    })
}

fn icon(token: String, resources: &ResourceSet) -> CompositionNode {
    let Some(handle) = resources.component(ComponentId::Icon) else {
        return body_text(token, ColorRole::TextPrimary, false, resources);
    };
    let properties = match handle.icon_axis() {
        Some(axis) => {
            let variant = resolve_icon_variant(&token, handle.allowed_values(axis));
            handle.variant_overrides(axis, &variant)
        }
        None => PropertyOverrides::new(),
    };
    CompositionNode::Icon(InstanceNode {
        component: ComponentId::Icon,
        key: handle.key.clone(),
        name: format!("Icon / {token}"),
        properties,
        label: None,
    })
}

fn slot_instance(id: ComponentId, resources: &ResourceSet) -> Option<InstanceNode> {
    resources.component(id).map(|handle| InstanceNode {
        component: id,
        key: handle.key.clone(),
        name: id.to_string().to_title_case(),
        properties: PropertyOverrides::new(),
        label: None,
    })
}

/// One checkbox per data row plus the header control, with dividers matching
/// the core table so rows line up.
fn checkbox_column(row_count: usize, resources: &ResourceSet) -> CompositionNode {
    let checkbox = || CompositionNode::Checkbox {
        state: CheckboxState::Unchecked,
        instance: resources
            .component(ComponentId::Checkbox)
            .map(|handle| InstanceNode {
                component: ComponentId::Checkbox,
                key: handle.key.clone(),
                name: "Checkbox".to_string(),
                properties: PropertyOverrides::new(),
                label: None,
            }),
    };
    let cell = |role: RowRole, height: f64| {
        CompositionNode::Row(RowNode {
            role,
            cells: vec![CellNode {
                width: CHECKBOX_COLUMN_WIDTH,
                height,
                alignment: Alignment::Center,
                padding_x: 0.0,
                padding_y: 0.0,
                content: vec![checkbox()],
            }],
        })
    };
    let divider = || CompositionNode::Divider {
        width: CHECKBOX_COLUMN_WIDTH,
        color: Paint::new(ColorRole::Divider, resources),
    };

    let mut children = vec![cell(RowRole::Header, HEADER_ROW_HEIGHT), divider()];
    for idx in 0..row_count {
        if idx > 0 {
            children.push(divider());
        }
        children.push(cell(RowRole::Data, DATA_ROW_HEIGHT));
    }
    CompositionNode::Table(TableNode {
        width: CHECKBOX_COLUMN_WIDTH,
        layout: Layout {
            width: Dimension::Fixed(CHECKBOX_COLUMN_WIDTH),
            height: Dimension::Hug,
        },
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        annotation::parse_columns,
        compare::SortDirection,
        csv_input::parse_csv,
        host::{ComponentHandle, ComponentProperty, PropertyKind},
    };
    use indexmap::IndexMap;

    fn table(text: &str) -> (Vec<Column>, Vec<Row>) {
        let parsed = parse_csv(text, b',').unwrap();
        (parse_columns(&parsed.headers), parsed.rows)
    }

    fn sizing_for(columns: &[Column]) -> SizingResult {
        SizingResult::from_widths(vec![60.0; columns.len()])
    }

    fn is_kind(name: &'static str) -> impl Fn(&CompositionNode) -> bool {
        move |node| node.kind_name() == name
    }

    fn variant(value: &str, options: &[&str]) -> ComponentProperty {
        ComponentProperty {
            kind: PropertyKind::Variant,
            value: value.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    fn core_children(node: &CompositionNode) -> &[CompositionNode] {
        match node {
            CompositionNode::Table(table) => &table.children,
            other => panic!("expected table, got {}", other.kind_name()),
        }
    }

    #[test]
    fn body_has_one_row_per_record_and_dividers_between() {
        let (columns, rows) = table("Name,Count [r]\na,1\nb,2\nc,3\n");
        let root = compose(
            &columns,
            &rows,
            &sizing_for(&columns),
            &SortState::none(),
            &CompositionOptions::default(),
            &ResourceSet::default(),
            None,
        );
        let children = core_children(&root);
        assert_eq!(children[0].kind_name(), "row");
        assert_eq!(children[1].kind_name(), "divider");
        let body = &children[2..];
        assert_eq!(body.iter().filter(|n| n.kind_name() == "row").count(), 3);
        assert_eq!(body.iter().filter(|n| n.kind_name() == "divider").count(), 2);
        assert_eq!(body.last().map(|n| n.kind_name()), Some("row"));
    }

    #[test]
    fn empty_body_has_header_only() {
        let (columns, rows) = table("Name,Count\n");
        let root = compose(
            &columns,
            &rows,
            &sizing_for(&columns),
            &SortState::none(),
            &CompositionOptions::default(),
            &ResourceSet::default(),
            None,
        );
        assert_eq!(core_children(&root).len(), 2);
    }

    #[test]
    fn cells_carry_width_height_and_alignment() {
        let (columns, rows) = table("Name,Count [r]\na,1\n");
        let sizing = SizingResult::from_widths(vec![30.0, 50.0]);
        let root = compose(
            &columns,
            &rows,
            &sizing,
            &SortState::none(),
            &CompositionOptions::default(),
            &ResourceSet::default(),
            None,
        );
        let CompositionNode::Row(header) = &core_children(&root)[0] else {
            panic!("header row");
        };
        assert_eq!(header.role, RowRole::Header);
        assert_eq!(header.cells[0].width, 50.0);
        assert_eq!(header.cells[0].height, HEADER_ROW_HEIGHT);
        let CompositionNode::Row(data) = &core_children(&root)[2] else {
            panic!("data row");
        };
        assert_eq!(data.cells[1].width, 70.0);
        assert_eq!(data.cells[1].height, DATA_ROW_HEIGHT);
        assert_eq!(data.cells[1].alignment, Alignment::Right);
        let CompositionNode::Divider { width, .. } = &core_children(&root)[1] else {
            panic!("divider");
        };
        assert_eq!(*width, 120.0);
    }

    #[test]
    fn sort_indicator_only_on_active_column() {
        let (columns, rows) = table("Name,Count\na,1\n");
        let sort = SortState::new("Count", SortDirection::Descending);
        let root = compose(
            &columns,
            &rows,
            &sizing_for(&columns),
            &sort,
            &CompositionOptions::default(),
            &ResourceSet::default(),
            None,
        );
        let CompositionNode::Row(header) = &core_children(&root)[0] else {
            panic!("header row");
        };
        assert_eq!(header.cells[0].content.len(), 1);
        assert!(matches!(
            header.cells[1].content[1],
            CompositionNode::SortIndicator {
                direction: SortDirection::Descending,
                ..
            }
        ));
        assert_eq!(root.count_where(&is_kind("sort_indicator")), 1);
    }

    #[test]
    fn missing_components_fall_back_to_text_and_chip_shapes() {
        let (columns, rows) = table("S [status],B [boolean],I [icon],T [chips]\nbad,Maybe,cloud,\"x, y\"\n");
        let root = compose(
            &columns,
            &rows,
            &sizing_for(&columns),
            &SortState::none(),
            &CompositionOptions::default(),
            &ResourceSet::default(),
            None,
        );
        let CompositionNode::Row(data) = &core_children(&root)[2] else {
            panic!("data row");
        };
        let CompositionNode::Text(status) = &data.cells[0].content[0] else {
            panic!("status text");
        };
        assert_eq!(status.text, "Bad");
        assert!(status.strong);
        let CompositionNode::Text(boolean) = &data.cells[1].content[0] else {
            panic!("boolean text");
        };
        assert_eq!(boolean.text, "Maybe");
        let CompositionNode::Text(icon) = &data.cells[2].content[0] else {
            panic!("icon text");
        };
        assert_eq!(icon.text, "cloud");
        assert_eq!(root.count_where(&is_kind("fallback_chip")), 2);
    }

    #[test]
    fn components_receive_canonical_properties() {
        let (columns, rows) = table("S [status],B [boolean],I [icon],T [chips]\ncritival,yes,saas,x\n");
        let mut resources = ResourceSet::default();
        resources.components.insert(
            ComponentId::Status,
            ComponentHandle {
                key: "status-key".to_string(),
                properties: IndexMap::from([(
                    "status".to_string(),
                    variant("Unspecified", &["Critical", "Unspecified"]),
                )]),
            },
        );
        resources.components.insert(
            ComponentId::Boolean,
            ComponentHandle {
                key: "bool-key".to_string(),
                properties: IndexMap::from([(
                    "boolean".to_string(),
                    variant("false", &["true", "false"]),
                )]),
            },
        );
        resources.components.insert(
            ComponentId::Icon,
            ComponentHandle {
                key: "icon-key".to_string(),
                properties: IndexMap::from([
                    ("Size".to_string(), variant("16", &["16", "24"])),
                    ("Platform".to_string(), variant("On Prem", &["On Prem", "Cloud"])),
                ]),
            },
        );
        resources.components.insert(
            ComponentId::Chip,
            ComponentHandle {
                key: "chip-key".to_string(),
                properties: IndexMap::new(),
            },
        );
        let root = compose(
            &columns,
            &rows,
            &sizing_for(&columns),
            &SortState::none(),
            &CompositionOptions::default(),
            &resources,
            None,
        );
        let CompositionNode::Row(data) = &core_children(&root)[2] else {
            panic!("data row");
        };
        let CompositionNode::Badge(status) = &data.cells[0].content[0] else {
            panic!("status badge");
        };
        assert_eq!(status.properties.get("status").map(String::as_str), Some("Critical"));
        let CompositionNode::Badge(boolean) = &data.cells[1].content[0] else {
            panic!("boolean badge");
        };
        assert_eq!(boolean.properties.get("boolean").map(String::as_str), Some("true"));
        let CompositionNode::Icon(icon) = &data.cells[2].content[0] else {
            panic!("icon");
        };
        assert_eq!(icon.properties.get("Platform").map(String::as_str), Some("Cloud"));
        assert_eq!(icon.properties.get("Size").map(String::as_str), Some("16"));
        assert_eq!(root.count_where(&is_kind("chip")), 1);
    }

    #[test]
    fn link_cells_use_the_link_colour_role() {
        let (columns, rows) = table("Name,Docs [link]\nweb,https://docs.example.com\n");
        let mut resources = ResourceSet::default();
        resources
            .tokens
            .insert(ColorRole::Link, TokenRef("color/text/link".to_string()));
        let root = compose(
            &columns,
            &rows,
            &sizing_for(&columns),
            &SortState::none(),
            &CompositionOptions::default(),
            &resources,
            None,
        );
        let CompositionNode::Row(data) = &core_children(&root)[2] else {
            panic!("data row");
        };
        let CompositionNode::Text(name) = &data.cells[0].content[0] else {
            panic!("name text");
        };
        assert_eq!(name.color.role, ColorRole::TextPrimary);
        assert_eq!(name.color.token, None);
        let CompositionNode::Text(link) = &data.cells[1].content[0] else {
            panic!("link text");
        };
        assert_eq!(link.text, "https://docs.example.com");
        assert_eq!(link.color.role, ColorRole::Link);
        assert_eq!(
            link.color.token,
            Some(TokenRef("color/text/link".to_string()))
        );
    }

    #[test]
    fn wrappers_nest_checkbox_then_card_then_page() {
        let (columns, rows) = table("Name\na\nb\n");
        let options = CompositionOptions {
            include_checkboxes: true,
            place_within_card: true,
            card_shadow: true,
            place_within_page: true,
            include_filter_bar: true,
        };
        let root = compose(
            &columns,
            &rows,
            &sizing_for(&columns),
            &SortState::none(),
            &options,
            &ResourceSet::default(),
            Some("server_health-report.csv"),
        );
        let CompositionNode::Page(page) = &root else {
            panic!("page");
        };
        assert_eq!(page.title.text, "Server Health Report");
        assert!(page.filter_bar.is_some());
        let CompositionNode::Card(card) = &*page.content else {
            panic!("card");
        };
        assert!(card.shadow);
        assert!(card.header.is_none());
        assert_eq!(card.body_layout, Layout::FILL);
        let CompositionNode::FixedColumn { fixed, scroll } = &*card.body else {
            panic!("fixed column");
        };
        assert_eq!(scroll.kind_name(), "table");
        assert_eq!(fixed.count_where(&is_kind("checkbox")), 3);
        assert_eq!(fixed.count_where(&is_kind("divider")), 2);
    }

    #[test]
    fn filter_bar_needs_page() {
        let options = CompositionOptions {
            include_filter_bar: true,
            ..CompositionOptions::default()
        };
        assert!(options.stages().is_empty());
    }

    #[test]
    fn wrapping_does_not_touch_inner_table() {
        let (columns, rows) = table("Name\na\n");
        let sizing = sizing_for(&columns);
        let bare = compose(
            &columns,
            &rows,
            &sizing,
            &SortState::none(),
            &CompositionOptions::default(),
            &ResourceSet::default(),
            None,
        );
        let carded = compose(
            &columns,
            &rows,
            &sizing,
            &SortState::none(),
            &CompositionOptions {
                place_within_card: true,
                ..CompositionOptions::default()
            },
            &ResourceSet::default(),
            None,
        );
        let CompositionNode::Card(card) = carded else {
            panic!("card");
        };
        assert_eq!(*card.body, bare);
    }

    #[test]
    fn titles_are_humanized() {
        assert_eq!(humanize_title(Some("data/cloud_inventory.csv")), "Cloud Inventory");
        assert_eq!(humanize_title(Some("   ")), "Table");
        assert_eq!(humanize_title(None), "Table");
    }
}
