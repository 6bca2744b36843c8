//! I/O utilities for reading CSV sources and writing generated documents.
//!
//! All file I/O in csv-layout flows through this module. It provides:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.psv` → pipe,
//!   `.tsv` → tab, anything else → comma) with manual override support.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_PSV_DELIMITER: u8 = b'|';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("psv") => DEFAULT_PSV_DELIMITER,
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

/// Reads the whole input (file or stdin) and decodes it into a `String`.
pub fn read_text(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading input from stdin")?;
    } else {
        let mut reader = BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        );
        reader
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    decode_bytes(&bytes, encoding)
}

pub fn open_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout()),
    };
    Ok(writer)
}

pub fn write_text(path: Option<&Path>, contents: &str) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer
        .write_all(contents.as_bytes())
        .context("Writing output")?;
    if !contents.ends_with('\n') {
        writer.write_all(b"\n").context("Writing output")?;
    }
    writer.flush().context("Flushing output")
}

/// File name used to title generated pages: the last path component, or
/// `None` when reading from stdin.
pub fn source_name(path: &Path) -> Option<String> {
    if is_dash(path) {
        return None;
    }
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;
    use std::path::PathBuf;

    #[test]
    fn delimiter_follows_extension_unless_provided() {
        assert_eq!(resolve_input_delimiter(Path::new("a.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(Path::new("a.PSV"), None), b'|');
        assert_eq!(resolve_input_delimiter(Path::new("a.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(Path::new("a.csv"), Some(b'|')), b'|');
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        assert!(resolve_encoding(Some("not-an-encoding")).is_err());
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
        assert_eq!(resolve_encoding(Some(" windows-1252 ")).unwrap(), WINDOWS_1252);
    }

    #[test]
    fn decode_bytes_handles_legacy_encodings() {
        let decoded = decode_bytes(&[0x63, 0x61, 0x66, 0xE9], WINDOWS_1252).unwrap();
        assert_eq!(decoded, "café");
    }

    #[test]
    fn source_name_skips_stdin() {
        assert_eq!(source_name(Path::new("-")), None);
        assert_eq!(
            source_name(&PathBuf::from("/tmp/server_health.csv")).as_deref(),
            Some("server_health.csv")
        );
    }
}
