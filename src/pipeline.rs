//! One generation request end to end: project, annotate, sort, resolve host
//! resources, size, compose.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    annotation::{Column, parse_columns},
    compare::{SortState, sort_rows},
    compose::{CompositionNode, CompositionOptions, compose},
    csv_input::{CsvTable, parse_csv},
    host::{ComponentResolver, MeasurementOracle, ResourceNeeds, ResourceSet, TokenSource},
    sizing::{ColumnSizingEngine, SizingResult},
};

pub const DEFAULT_ROW_LIMIT: usize = 50;

/// Host collaborators for one request.
pub struct Host<'a> {
    pub oracle: &'a dyn MeasurementOracle,
    pub resolver: &'a dyn ComponentResolver,
    pub tokens: &'a dyn TokenSource,
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub table: CsvTable,
    /// Headers to keep, in output order; `None` or empty keeps every column.
    pub selected_columns: Option<Vec<String>>,
    pub row_limit: Option<usize>,
    pub sort: SortState,
    pub options: CompositionOptions,
    pub source_name: Option<String>,
}

impl GenerationRequest {
    pub fn new(table: CsvTable) -> Self {
        GenerationRequest {
            table,
            selected_columns: None,
            row_limit: Some(DEFAULT_ROW_LIMIT),
            sort: SortState::none(),
            options: CompositionOptions::default(),
            source_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub sort: SortState,
    pub columns: Vec<Column>,
    pub sizing: SizingResult,
    pub root: CompositionNode,
}

pub fn generate(request: GenerationRequest, host: &Host<'_>) -> Result<GenerationOutput> {
    let GenerationRequest {
        table,
        selected_columns,
        row_limit,
        sort,
        options,
        source_name,
    } = request;

    let projected = table.project(selected_columns.as_deref(), row_limit);
    let columns = parse_columns(&projected.headers);
    let (rows, applied) = sort_rows(&columns, projected.rows, &sort);

    let needs = ResourceNeeds {
        checkboxes: options.include_checkboxes,
        card: options.place_within_card,
        page: options.place_within_page,
        filter_bar: options.include_filter_bar,
    };
    let resources = ResourceSet::resolve(&columns, needs, host.resolver, host.tokens);
    let sizing = ColumnSizingEngine::new(host.oracle, &resources).size(&columns, &rows, &applied);
    let root = compose(
        &columns,
        &rows,
        &sizing,
        &applied,
        &options,
        &resources,
        source_name.as_deref(),
    );

    info!(
        "Composed {} column(s) x {} row(s), table width {}px",
        columns.len(),
        rows.len(),
        sizing.table_width()
    );
    Ok(GenerationOutput {
        source: source_name,
        sort: applied,
        columns,
        sizing,
        root,
    })
}

/// Parses `text` and runs [`generate`]; any failure is reported as a failed
/// table creation.
pub fn generate_from_text(
    text: &str,
    delimiter: u8,
    configure: impl FnOnce(&mut GenerationRequest),
    host: &Host<'_>,
) -> Result<GenerationOutput> {
    let table = parse_csv(text, delimiter).context("Failed to create table")?;
    let mut request = GenerationRequest::new(table);
    configure(&mut request);
    generate(request, host).context("Failed to create table")
}
