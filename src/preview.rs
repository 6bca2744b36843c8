use anyhow::Result;
use log::info;

use crate::{
    annotation::parse_columns,
    cli::{InspectArgs, PreviewArgs},
    compare::{SortState, sort_rows},
    csv_input,
    normalize::CellValue,
    table,
};

/// Prints the first rows as they would be drawn: normalized cell text in
/// annotation alignment, after sorting.
pub fn execute(args: &PreviewArgs) -> Result<()> {
    let source = &args.source;
    let table = csv_input::load_table(
        &source.input,
        source.delimiter,
        source.input_encoding.as_deref(),
    )?;
    let projected = table.project(None, Some(args.rows));
    let columns = parse_columns(&projected.headers);
    let sort = match &args.sort {
        Some(directive) => SortState::parse(directive)?,
        None => SortState::none(),
    };
    let (rows, applied) = sort_rows(&columns, projected.rows, &sort);

    let headers = columns
        .iter()
        .map(|column| match applied.active() {
            Some((by, direction)) if by == column.raw_header => {
                format!("{} ({direction})", column.display_label)
            }
            _ => column.display_label.clone(),
        })
        .collect::<Vec<_>>();
    let cells = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| CellValue::from_raw(column, row.get(&column.raw_header)).display_text())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let alignments = columns.iter().map(|c| c.alignment).collect::<Vec<_>>();

    print!("{}", table::render_table(&headers, &cells, &alignments));
    info!("Displayed {} row(s) from {:?}", rows.len(), source.input);
    Ok(())
}

/// Prints how each header annotation is interpreted.
pub fn inspect(args: &InspectArgs) -> Result<()> {
    let source = &args.source;
    let table = csv_input::load_table(
        &source.input,
        source.delimiter,
        source.input_encoding.as_deref(),
    )?;
    let columns = parse_columns(&table.headers);
    let headers = ["header", "label", "kind", "alignment"]
        .map(str::to_string)
        .to_vec();
    let rows = columns
        .iter()
        .map(|c| {
            vec![
                c.raw_header.clone(),
                c.display_label.clone(),
                c.semantic_kind.to_string(),
                c.alignment.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    print!("{}", table::render_table(&headers, &rows, &[]));
    info!("Inspected {} column(s) from {:?}", columns.len(), source.input);
    Ok(())
}
