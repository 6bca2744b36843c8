use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::pipeline::DEFAULT_ROW_LIMIT;

#[derive(Debug, Parser)]
#[command(author, version, about = "Turn annotated CSV files into table layouts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a table layout description from an annotated CSV file
    Generate(GenerateArgs),
    /// Show how each header annotation is interpreted
    Inspect(InspectArgs),
    /// Preview normalized cell values in a formatted table
    Preview(PreviewArgs),
}

/// Options shared by every command that reads a CSV source.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file (use '-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Raw header of a column to include; repeat to select several (defaults to all, in file order)
    #[arg(short = 'C', long = "columns", action = clap::ArgAction::Append)]
    pub columns: Vec<String>,
    /// Sort directive such as `Severity [status]:desc` (direction defaults to asc)
    #[arg(long)]
    pub sort: Option<String>,
    /// Maximum number of data rows to lay out
    #[arg(long, default_value_t = DEFAULT_ROW_LIMIT)]
    pub limit: usize,
    /// Add a fixed checkbox column beside the table
    #[arg(long)]
    pub checkboxes: bool,
    /// Place the table inside a card
    #[arg(long)]
    pub card: bool,
    /// Give the card a drop shadow (implies --card)
    #[arg(long = "card-shadow")]
    pub card_shadow: bool,
    /// Place the result inside a full page frame
    #[arg(long)]
    pub page: bool,
    /// Add a filter bar above the content (only with --page)
    #[arg(long = "filter-bar")]
    pub filter_bar: bool,
    /// YAML host profile describing text metrics, components and tokens
    #[arg(long = "host")]
    pub host: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
    /// Output file (defaults to stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: InputArgs,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Sort directive such as `Severity [status]:desc`
    #[arg(long)]
    pub sort: Option<String>,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Outline,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_names_and_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("pipe"), Ok(b'|'));
        assert_eq!(parse_delimiter(":"), Ok(b':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn generate_defaults() {
        let cli = Cli::try_parse_from(["csv-layout", "generate", "-i", "data.csv"]).unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.limit, DEFAULT_ROW_LIMIT);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.columns.is_empty());
        assert!(!args.checkboxes);
    }
}
