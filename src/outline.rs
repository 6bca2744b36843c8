//! Indented, human-readable dump of a composition tree.

use std::fmt::Write as _;

use itertools::Itertools;

use crate::compose::{CompositionNode, Dimension, InstanceNode, Layout};

const INDENT: &str = "  ";

pub fn render_outline(root: &CompositionNode) -> String {
    let mut out = String::new();
    write_node(&mut out, root, 0);
    out
}

fn write_node(out: &mut String, node: &CompositionNode, depth: usize) {
    let pad = INDENT.repeat(depth);
    let _ = writeln!(out, "{pad}{}", describe(node));
    match node {
        CompositionNode::Row(row) => {
            for cell in &row.cells {
                let _ = writeln!(
                    out,
                    "{pad}{INDENT}cell {}x{} {}",
                    cell.width, cell.height, cell.alignment
                );
                for child in &cell.content {
                    write_node(out, child, depth + 2);
                }
            }
        }
        other => {
            for child in other.children() {
                write_node(out, child, depth + 1);
            }
        }
    }
}

fn describe(node: &CompositionNode) -> String {
    match node {
        CompositionNode::Text(text) => format!("text {:?} ({:?})", text.text, text.style),
        CompositionNode::Badge(instance)
        | CompositionNode::Icon(instance)
        | CompositionNode::Chip(instance) => {
            format!("{} {}", node.kind_name(), describe_instance(instance))
        }
        CompositionNode::TagGroup { tags, .. } => format!("tag_group ({} tag(s))", tags.len()),
        CompositionNode::FallbackChip(shape) => format!("fallback_chip {:?}", shape.label.text),
        CompositionNode::SortIndicator { direction, .. } => format!("sort_indicator {direction}"),
        CompositionNode::Checkbox { instance, .. } => match instance {
            Some(instance) => format!("checkbox {}", describe_instance(instance)),
            None => "checkbox (built-in)".to_string(),
        },
        CompositionNode::Slot {
            role,
            layout,
            instance,
        } => match instance {
            Some(instance) => format!("slot {role:?} {} {}", describe_layout(layout), describe_instance(instance)),
            None => format!("slot {role:?} {} (placeholder)", describe_layout(layout)),
        },
        CompositionNode::Row(row) => format!("row {:?}", row.role),
        CompositionNode::Divider { width, .. } => format!("divider {width}"),
        CompositionNode::Table(table) => {
            format!("table {} {}", table.width, describe_layout(&table.layout))
        }
        CompositionNode::FixedColumn { .. } => "fixed_column".to_string(),
        CompositionNode::Card(card) => format!(
            "card{}",
            if card.shadow { " (shadow)" } else { "" }
        ),
        CompositionNode::Page(page) => {
            format!("page {:?} {}", page.title.text, describe_layout(&page.layout))
        }
    }
}

fn describe_instance(instance: &InstanceNode) -> String {
    let props = instance
        .properties
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .join(", ");
    let mut text = format!("<{}>", instance.key);
    if let Some(label) = &instance.label {
        let _ = write!(text, " {label:?}");
    }
    if !props.is_empty() {
        let _ = write!(text, " [{props}]");
    }
    text
}

fn describe_layout(layout: &Layout) -> String {
    let dim = |d: Dimension| match d {
        Dimension::Hug => "hug".to_string(),
        Dimension::Fill => "fill".to_string(),
        Dimension::Fixed(value) => value.to_string(),
    };
    format!("{}x{}", dim(layout.width), dim(layout.height))
}
