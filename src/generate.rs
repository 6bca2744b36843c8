use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::{GenerateArgs, OutputFormat},
    compare::SortState,
    compose::CompositionOptions,
    csv_input,
    host::HostProfile,
    io_utils,
    outline::render_outline,
    pipeline::{self, GenerationOutput, GenerationRequest, Host},
};

pub fn execute(args: &GenerateArgs) -> Result<()> {
    let input = &args.source.input;
    info!("Generating table layout from '{}'", input.display());
    let table = csv_input::load_table(
        input,
        args.source.delimiter,
        args.source.input_encoding.as_deref(),
    )
    .context("Failed to create table")?;
    info!(
        "Read {} column(s) and {} row(s)",
        table.headers.len(),
        table.rows.len()
    );

    let profile = match &args.host {
        Some(path) => HostProfile::load(path)
            .with_context(|| format!("Loading host profile from {path:?}"))?,
        None => HostProfile::default(),
    };
    let sort = match &args.sort {
        Some(directive) => SortState::parse(directive)?,
        None => SortState::none(),
    };

    let request = GenerationRequest {
        table,
        selected_columns: (!args.columns.is_empty()).then(|| args.columns.clone()),
        row_limit: Some(args.limit),
        sort,
        options: CompositionOptions {
            include_checkboxes: args.checkboxes,
            place_within_card: args.card || args.card_shadow,
            card_shadow: args.card_shadow,
            place_within_page: args.page,
            include_filter_bar: args.filter_bar,
        },
        source_name: io_utils::source_name(input),
    };
    let host = Host {
        oracle: &profile,
        resolver: &profile,
        tokens: &profile,
    };
    let output = pipeline::generate(request, &host).context("Failed to create table")?;

    let rendered = render(&output, args.format)?;
    io_utils::write_text(args.output.as_deref(), &rendered)?;
    if let Some(path) = &args.output {
        info!("Layout written to {path:?}");
    }
    Ok(())
}

pub fn render(output: &GenerationOutput, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(output).context("Serializing layout as JSON")
        }
        OutputFormat::Yaml => serde_yaml::to_string(output).context("Serializing layout as YAML"),
        OutputFormat::Outline => Ok(render_outline(&output.root)),
    }
}
