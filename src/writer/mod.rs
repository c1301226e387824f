//! Human-readable rendering: Markdown pipe tables and aligned text

use crate::codec::{self, Format, WriteOptions};
use crate::core::operations::Report;
use crate::error::{CellforgeError, CellforgeResult};
use crate::types::{ColumnType, Table};
use crate::value::{format_number, Value};

/// Display settings for rendered output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Decimal places for non-integral numbers (default: shortest form)
    pub precision: Option<usize>,
}

/// Cell text under the given options
pub fn display_value(value: &Value, options: &RenderOptions) -> String {
    match (value, options.precision) {
        (Value::Number(n), Some(places)) if n.fract() != 0.0 => format!("{:.*}", places, n),
        (Value::Number(n), _) => format_number(*n),
        (other, _) => other.as_text(),
    }
}

fn cells(table: &Table, options: &RenderOptions) -> Vec<Vec<String>> {
    table
        .rows()
        .map(|row| row.iter().map(|v| display_value(v, options)).collect())
        .collect()
}

fn right_aligned(table: &Table) -> Vec<bool> {
    table
        .columns()
        .iter()
        .map(|c| c.column_type() == ColumnType::Number)
        .collect()
}

/// Markdown pipe table; Number columns are right-aligned
pub fn markdown(table: &Table, options: &RenderOptions) -> String {
    if table.column_count() == 0 {
        return String::new();
    }
    let mut out = String::new();
    let header: Vec<String> = table.column_names().into_iter().map(escape_markdown).collect();
    out.push_str(&format!("| {} |\n", header.join(" | ")));

    let rule: Vec<&str> = right_aligned(table)
        .into_iter()
        .map(|right| if right { "---:" } else { "---" })
        .collect();
    out.push_str(&format!("| {} |\n", rule.join(" | ")));

    for row in cells(table, options) {
        let row: Vec<String> = row.iter().map(|c| escape_markdown(c)).collect();
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out
}

fn escape_markdown(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}

/// Space-aligned columns for terminals
pub fn text(table: &Table, options: &RenderOptions) -> String {
    if table.column_count() == 0 {
        return String::new();
    }
    let body = cells(table, options);
    let names = table.column_names();
    let widths: Vec<usize> = names
        .iter()
        .enumerate()
        .map(|(col, name)| {
            body.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let right = right_aligned(table);

    let mut out = aligned_line(&names, &widths, &right);
    let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rules: Vec<&str> = rules.iter().map(String::as_str).collect();
    out.push_str(&aligned_line(&rules, &widths, &right));
    for row in &body {
        let fields: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&aligned_line(&fields, &widths, &right));
    }
    out
}

fn aligned_line(fields: &[&str], widths: &[usize], right: &[bool]) -> String {
    let padded: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(col, field)| {
            if right[col] {
                format!("{:>width$}", field, width = widths[col])
            } else {
                format!("{:<width$}", field, width = widths[col])
            }
        })
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

/// Fail for formats that cannot go to a terminal
pub fn ensure_printable(format: Format) -> CellforgeResult<()> {
    match format {
        Format::Xlsx => Err(CellforgeError::UnsupportedFormat(
            "xlsx output needs --output <file>".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Render a table as text in any printable format
pub fn render_table(
    table: &Table,
    format: Format,
    options: &WriteOptions,
) -> CellforgeResult<String> {
    ensure_printable(format)?;
    let bytes = codec::encode_table(table, format, options)?;
    String::from_utf8(bytes).map_err(|e| CellforgeError::Codec(e.to_string()))
}

/// Encode a `describe` report: JSON keeps the per-column records, every
/// other format gets the stat-by-column table
pub fn render_report(
    report: &Report,
    format: Format,
    options: &WriteOptions,
) -> CellforgeResult<Vec<u8>> {
    match format {
        Format::Json => {
            let mut bytes = serde_json::to_vec_pretty(report)?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        other => codec::encode_table(&report.to_table()?, other, options),
    }
}
