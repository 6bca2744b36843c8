//! Column widths from host measurements.
//!
//! Text-driven kinds measure every cell. Status, boolean and icon columns are
//! drawn by fixed-shape components, so one representative instance is
//! measured per kind and reused for the whole column; per-row text
//! measurement is only the fallback when no representative can be obtained.

use std::collections::HashMap;

use log::{debug, warn};
use serde::Serialize;

use crate::{
    annotation::{Column, SemanticKind},
    compare::SortState,
    csv_input::Row,
    host::{MeasurementOracle, ResourceSet, TextStyle},
    normalize::{normalize_status, split_tags},
};

/// Floor applied to every column width.
pub const MIN_COLUMN_WIDTH: f64 = 8.0;
/// Floor applied to a single text measurement.
pub const MIN_TEXT_WIDTH: f64 = 4.0;
/// Room for the sort glyph next to the active header label.
pub const SORT_INDICATOR_RESERVE: f64 = 22.0;
pub const CHIP_HORIZONTAL_PADDING: f64 = 16.0;
pub const CHIP_GAP: f64 = 4.0;
pub const CELL_HORIZONTAL_PADDING: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizingResult {
    widths: Vec<f64>,
    table_width: f64,
}

impl SizingResult {
    pub fn from_widths(widths: Vec<f64>) -> Self {
        let widths: Vec<f64> = widths
            .into_iter()
            .map(|w| w.max(MIN_COLUMN_WIDTH))
            .collect();
        let table_width = widths
            .iter()
            .map(|w| w + 2.0 * CELL_HORIZONTAL_PADDING)
            .sum();
        SizingResult {
            widths,
            table_width,
        }
    }

    /// Content width of column `idx`.
    pub fn width(&self, idx: usize) -> f64 {
        self.widths.get(idx).copied().unwrap_or(MIN_COLUMN_WIDTH)
    }

    /// Content width plus horizontal cell padding on both sides.
    pub fn cell_width(&self, idx: usize) -> f64 {
        self.width(idx) + 2.0 * CELL_HORIZONTAL_PADDING
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    pub fn table_width(&self) -> f64 {
        self.table_width
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

pub struct ColumnSizingEngine<'a> {
    oracle: &'a dyn MeasurementOracle,
    resources: &'a ResourceSet,
}

impl<'a> ColumnSizingEngine<'a> {
    pub fn new(oracle: &'a dyn MeasurementOracle, resources: &'a ResourceSet) -> Self {
        ColumnSizingEngine { oracle, resources }
    }

    /// `sort` must be the state actually applied to `rows`.
    pub fn size(&self, columns: &[Column], rows: &[Row], sort: &SortState) -> SizingResult {
        let mut representatives: HashMap<SemanticKind, Option<f64>> = HashMap::new();
        let widths = columns
            .iter()
            .map(|column| {
                let width = self.column_width(column, rows, sort, &mut representatives);
                debug!(
                    "Column '{}' ({}) sized to {width}px",
                    column.display_label, column.semantic_kind
                );
                width
            })
            .collect();
        SizingResult::from_widths(widths)
    }

    fn column_width(
        &self,
        column: &Column,
        rows: &[Row],
        sort: &SortState,
        representatives: &mut HashMap<SemanticKind, Option<f64>>,
    ) -> f64 {
        let reserve = if sort.is_active_for(&column.raw_header) {
            SORT_INDICATOR_RESERVE
        } else {
            0.0
        };
        let header = self.text_width(&column.display_label, TextStyle::Header) + reserve;

        let content = match column.semantic_kind {
            SemanticKind::Chips => rows
                .iter()
                .map(|row| row.get(&column.raw_header).trim())
                .filter(|raw| !raw.is_empty())
                .map(|raw| self.chip_group_width(raw))
                .fold(0.0, f64::max),
            kind if kind.is_fixed_shape() => {
                let representative = *representatives
                    .entry(kind)
                    .or_insert_with(|| self.representative_width(kind));
                match representative {
                    Some(width) => width,
                    None => rows
                        .iter()
                        .map(|row| self.fallback_text_width(kind, row.get(&column.raw_header)))
                        .fold(0.0, f64::max),
                }
            }
            _ => rows
                .iter()
                .map(|row| self.text_width(row.get(&column.raw_header), TextStyle::Body))
                .fold(0.0, f64::max),
        };
        header.max(content).max(MIN_COLUMN_WIDTH)
    }

    fn text_width(&self, value: &str, style: TextStyle) -> f64 {
        self.oracle
            .measure_text(value, style)
            .ceil()
            .max(MIN_TEXT_WIDTH)
    }

    /// Sum of chip widths (label + padding) with a gap between chips.
    fn chip_group_width(&self, raw: &str) -> f64 {
        let tags = split_tags(raw);
        if tags.is_empty() {
            return 0.0;
        }
        let total: f64 = tags
            .iter()
            .enumerate()
            .map(|(idx, tag)| {
                let gap = if idx > 0 { CHIP_GAP } else { 0.0 };
                self.oracle.measure_text(tag, TextStyle::Chip).ceil() + CHIP_HORIZONTAL_PADDING + gap
            })
            .sum();
        total.max(MIN_TEXT_WIDTH)
    }

    fn representative_width(&self, kind: SemanticKind) -> Option<f64> {
        let canonical = self.resources.representative_value(kind)?;
        match self.oracle.measure_representative(kind, &canonical) {
            Ok(width) if width > 0.0 => Some(width.ceil()),
            Ok(_) => {
                warn!("Representative {kind} measured as zero width; measuring cell text instead");
                None
            }
            Err(err) => {
                warn!("{err}; measuring {kind} cell text instead");
                None
            }
        }
    }

    fn fallback_text_width(&self, kind: SemanticKind, raw: &str) -> f64 {
        match kind {
            SemanticKind::Status => self.text_width(normalize_status(raw).as_str(), TextStyle::Body),
            SemanticKind::Boolean => self.text_width(raw.trim(), TextStyle::Body),
            _ => self.text_width(raw, TextStyle::Body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        annotation::parse_columns,
        compare::SortDirection,
        csv_input::parse_csv,
        host::{ComponentHandle, ComponentId, ImportFailure, ResourceSet},
    };
    use proptest::prelude::*;
    use std::cell::RefCell;

    /// Every character is 10px wide; counts representative measurements.
    struct FixedOracle {
        representative: Option<f64>,
        calls: RefCell<usize>,
    }

    impl FixedOracle {
        fn new(representative: Option<f64>) -> Self {
            FixedOracle {
                representative,
                calls: RefCell::new(0),
            }
        }
    }

    impl MeasurementOracle for FixedOracle {
        fn measure_text(&self, value: &str, _style: TextStyle) -> f64 {
            value.chars().count() as f64 * 10.0
        }

        fn measure_representative(
            &self,
            kind: SemanticKind,
            _canonical_value: &str,
        ) -> Result<f64, ImportFailure> {
            *self.calls.borrow_mut() += 1;
            self.representative
                .ok_or_else(|| ImportFailure::Unmeasurable(kind.to_string()))
        }
    }

    fn resources_with(ids: &[ComponentId]) -> ResourceSet {
        let mut set = ResourceSet::default();
        for id in ids {
            set.components.insert(*id, ComponentHandle::default());
        }
        set
    }

    #[test]
    fn plain_columns_take_widest_cell_or_header() {
        let table = parse_csv("Name,Id\nAlexandra,1\nBo,22\n", b',').unwrap();
        let columns = parse_columns(&table.headers);
        let oracle = FixedOracle::new(None);
        let resources = ResourceSet::default();
        let sizing = ColumnSizingEngine::new(&oracle, &resources).size(
            &columns,
            &table.rows,
            &SortState::none(),
        );
        assert_eq!(sizing.widths(), [90.0, 20.0]);
        assert_eq!(sizing.table_width(), 90.0 + 20.0 + 4.0 * CELL_HORIZONTAL_PADDING);
    }

    #[test]
    fn sort_indicator_reserves_header_space() {
        let table = parse_csv("Name\nBo\n", b',').unwrap();
        let columns = parse_columns(&table.headers);
        let oracle = FixedOracle::new(None);
        let resources = ResourceSet::default();
        let sort = SortState::new("Name", SortDirection::Descending);
        let sizing = ColumnSizingEngine::new(&oracle, &resources).size(&columns, &table.rows, &sort);
        assert_eq!(sizing.width(0), 40.0 + SORT_INDICATOR_RESERVE);
    }

    #[test]
    fn chip_columns_sum_tags_with_padding_and_gaps() {
        let table = parse_csv("T [chips]\n\"ab, cde\"\nx\n", b',').unwrap();
        let columns = parse_columns(&table.headers);
        let oracle = FixedOracle::new(None);
        let resources = ResourceSet::default();
        let sizing = ColumnSizingEngine::new(&oracle, &resources).size(
            &columns,
            &table.rows,
            &SortState::none(),
        );
        let expected = (20.0 + CHIP_HORIZONTAL_PADDING) + (30.0 + CHIP_HORIZONTAL_PADDING + CHIP_GAP);
        assert_eq!(sizing.width(0), expected);
    }

    #[test]
    fn fixed_shape_columns_reuse_one_representative_measurement() {
        let table = parse_csv(
            "A [status],B [status],C [boolean]\ncritical,bad,yes\nidle,good,no\n",
            b',',
        )
        .unwrap();
        let columns = parse_columns(&table.headers);
        let oracle = FixedOracle::new(Some(72.4));
        let resources = resources_with(&[ComponentId::Status, ComponentId::Boolean]);
        let sizing = ColumnSizingEngine::new(&oracle, &resources).size(
            &columns,
            &table.rows,
            &SortState::none(),
        );
        assert_eq!(sizing.widths(), [73.0, 73.0, 73.0]);
        assert_eq!(*oracle.calls.borrow(), 2);
    }

    #[test]
    fn missing_component_falls_back_to_text_measurement() {
        let table = parse_csv("S [status],B [boolean]\nnot monitored,  Maybe \n", b',').unwrap();
        let columns = parse_columns(&table.headers);
        let oracle = FixedOracle::new(Some(50.0));
        let resources = ResourceSet::default();
        let sizing = ColumnSizingEngine::new(&oracle, &resources).size(
            &columns,
            &table.rows,
            &SortState::none(),
        );
        // "Not Monitored" / "Maybe"
        assert_eq!(sizing.widths(), [130.0, 50.0]);
        assert_eq!(*oracle.calls.borrow(), 0);
    }

    #[test]
    fn unmeasurable_representative_falls_back_to_text() {
        let table = parse_csv("S [status]\nhealthy\n", b',').unwrap();
        let columns = parse_columns(&table.headers);
        let oracle = FixedOracle::new(None);
        let resources = resources_with(&[ComponentId::Status]);
        let sizing = ColumnSizingEngine::new(&oracle, &resources).size(
            &columns,
            &table.rows,
            &SortState::none(),
        );
        assert_eq!(sizing.width(0), 70.0);
    }

    #[test]
    fn icon_without_variant_axis_uses_representative_width() {
        let table = parse_csv("I [icon]
some-very-long-platform-name
", b',').unwrap();
        let columns = parse_columns(&table.headers);
        let oracle = FixedOracle::new(Some(24.0));
        let resources = resources_with(&[ComponentId::Icon]);
        let sizing = ColumnSizingEngine::new(&oracle, &resources).size(
            &columns,
            &table.rows,
            &SortState::none(),
        );
        assert_eq!(sizing.width(0), 24.0);
        assert_eq!(*oracle.calls.borrow(), 1);
    }

    #[test]
    fn empty_table_sizes_to_nothing() {
        let oracle = FixedOracle::new(None);
        let resources = ResourceSet::default();
        let sizing =
            ColumnSizingEngine::new(&oracle, &resources).size(&[], &[], &SortState::none());
        assert!(sizing.is_empty());
        assert_eq!(sizing.table_width(), 0.0);
    }

    proptest! {
        #[test]
        fn widths_never_drop_below_floor(
            header in "[a-z \\[\\]|]{0,12}",
            cells in prop::collection::vec(".{0,8}", 0..5),
            advance in 0.0f64..3.0,
        ) {
            struct Scaled(f64);
            impl MeasurementOracle for Scaled {
                fn measure_text(&self, value: &str, _style: TextStyle) -> f64 {
                    value.len() as f64 * self.0
                }
                fn measure_representative(
                    &self,
                    _kind: SemanticKind,
                    _canonical_value: &str,
                ) -> Result<f64, ImportFailure> {
                    Ok(0.0)
                }
            }
            let column = Column::parse(&header);
            let rows: Vec<Row> = cells
                .iter()
                .map(|cell| [(column.raw_header.as_str(), cell.as_str())].into_iter().collect())
                .collect();
            let resources = resources_with(&[
                ComponentId::Status,
                ComponentId::Boolean,
                ComponentId::Icon,
            ]);
            let oracle = Scaled(advance);
            let sizing = ColumnSizingEngine::new(&oracle, &resources).size(
                std::slice::from_ref(&column),
                &rows,
                &SortState::none(),
            );
            prop_assert!(sizing.widths().iter().all(|w| *w >= MIN_COLUMN_WIDTH));
        }
    }
}
