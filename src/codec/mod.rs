//! File formats
//!
//! Each codec turns bytes into a [`Table`] or a [`Table`] into bytes.
//! Output is fully encoded in memory before anything touches the disk, so
//! a failed run leaves no partial file behind.
//!
//! Type fidelity per format:
//! - CSV has no types; Text that looks like a number or boolean reads back
//!   as Number/Boolean, and empty Text reads back as Missing.
//! - JSON writes Errors as their literal strings, which read back as Text.
//! - Excel keeps Number/Text/Boolean; Errors are written as literal strings.

pub mod csv;
pub mod json;

use crate::error::{CellforgeError, CellforgeResult};
use crate::excel::{ExcelExporter, ExcelImporter};
use crate::types::Table;
use crate::writer::{self, RenderOptions};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Supported formats. Markdown and Text are output-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Csv,
    Json,
    Xlsx,
    Markdown,
    Text,
}

impl Format {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> CellforgeResult<Format> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "tsv" | "txt" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Format::Xlsx),
            "md" | "markdown" => Ok(Format::Markdown),
            "parquet" | "avro" => Err(CellforgeError::UnsupportedFormat(format!(
                "{} files are not supported",
                ext
            ))),
            "" => Err(CellforgeError::UnsupportedFormat(format!(
                "cannot tell the format of '{}' (no extension); pass --format",
                path.display()
            ))),
            other => Err(CellforgeError::UnsupportedFormat(format!(
                "unknown extension '.{}'",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Xlsx => "xlsx",
            Format::Markdown => "markdown",
            Format::Text => "text",
        }
    }

    pub fn is_readable(&self) -> bool {
        matches!(self, Format::Csv | Format::Json | Format::Xlsx)
    }
}

/// CSV dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
        }
    }
}

impl CsvOptions {
    /// The dialect for `path`: `.tsv` files are always tab-separated
    pub fn for_path(&self, path: &Path) -> CsvOptions {
        let tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("tsv"));
        if tsv {
            CsvOptions {
                delimiter: b'\t',
                ..*self
            }
        } else {
            *self
        }
    }
}

/// Options for reading a file
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Worksheet to read from a workbook (default: first)
    pub sheet: Option<String>,
    pub csv: CsvOptions,
}

/// Options for writing a file
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Worksheet name in a written workbook
    pub sheet: Option<String>,
    pub csv: CsvOptions,
    pub render: RenderOptions,
}

/// Read a table, choosing the codec from `format` or the file extension
pub fn read_table(
    path: &Path,
    format: Option<Format>,
    options: &ReadOptions,
) -> CellforgeResult<Table> {
    let format = match format {
        Some(f) => f,
        None => Format::from_path(path)?,
    };
    if !format.is_readable() {
        return Err(CellforgeError::UnsupportedFormat(format!(
            "{} is an output-only format",
            format.name()
        )));
    }

    let table = match format {
        Format::Csv => csv::read(fs::File::open(path)?, &options.csv.for_path(path))?,
        Format::Json => json::read(fs::File::open(path)?)?,
        _ => ExcelImporter::new(path).read_sheet(options.sheet.as_deref())?,
    };

    info!(
        path = %path.display(),
        format = format.name(),
        rows = table.row_count(),
        columns = table.column_count(),
        "read table"
    );
    Ok(table)
}

/// Encode a table in memory
pub fn encode_table(
    table: &Table,
    format: Format,
    options: &WriteOptions,
) -> CellforgeResult<Vec<u8>> {
    let bytes = match format {
        Format::Csv => {
            let mut buf = Vec::new();
            csv::write(table, &mut buf, &options.csv)?;
            buf
        }
        Format::Json => json::write(table)?,
        Format::Xlsx => {
            let sheet = options.sheet.as_deref().unwrap_or("Sheet1");
            ExcelExporter::new(sheet).export(table)?
        }
        Format::Markdown => writer::markdown(table, &options.render).into_bytes(),
        Format::Text => writer::text(table, &options.render).into_bytes(),
    };
    debug!(format = format.name(), bytes = bytes.len(), "encoded table");
    Ok(bytes)
}

/// Write a table, choosing the codec from `format` or the file extension
pub fn write_table(
    table: &Table,
    path: &Path,
    format: Option<Format>,
    options: &WriteOptions,
) -> CellforgeResult<()> {
    let format = match format {
        Some(f) => f,
        None => Format::from_path(path)?,
    };
    let bytes = if format == Format::Csv {
        let options = WriteOptions {
            csv: options.csv.for_path(path),
            ..options.clone()
        };
        encode_table(table, format, &options)?
    } else {
        encode_table(table, format, options)?
    };
    fs::write(path, bytes)?;
    info!(path = %path.display(), format = format.name(), "wrote table");
    Ok(())
}

/// Names of the worksheets in a workbook
pub fn sheet_names(path: &Path) -> CellforgeResult<Vec<String>> {
    ExcelImporter::new(path).sheet_names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;
    use crate::value::Value;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a.CSV")).unwrap(), Format::Csv);
        assert_eq!(Format::from_path(Path::new("a.json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("a.xlsx")).unwrap(), Format::Xlsx);
        assert_eq!(Format::from_path(Path::new("a.md")).unwrap(), Format::Markdown);
        assert!(matches!(
            Format::from_path(Path::new("a.parquet")),
            Err(CellforgeError::UnsupportedFormat(_))
        ));
        assert!(Format::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_tsv_dialect_follows_extension() {
        let configured = CsvOptions {
            delimiter: b';',
            has_header: false,
        };
        let tsv = configured.for_path(Path::new("data.TSV"));
        assert_eq!(tsv.delimiter, b'\t');
        assert!(!tsv.has_header);
        assert_eq!(configured.for_path(Path::new("data.csv")), configured);
        assert_eq!(configured.for_path(Path::new("data")), configured);
    }

    #[test]
    fn test_markdown_is_not_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.md");
        std::fs::write(&path, "| a |\n|---|\n| 1 |\n").unwrap();
        assert!(matches!(
            read_table(&path, None, &ReadOptions::default()),
            Err(CellforgeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_write_then_read_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = Table::new(vec![Column::new(
            "n",
            vec![Value::Number(1.5), Value::Missing],
        )])
        .unwrap();
        write_table(&table, &path, None, &WriteOptions::default()).unwrap();
        let back = read_table(&path, None, &ReadOptions::default()).unwrap();
        assert_eq!(back, table);
    }
}
