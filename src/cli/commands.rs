use crate::codec::{self, Format, ReadOptions, WriteOptions};
use crate::config::Config;
use crate::core::operations::{describe, AggSpec, Operation, Pipeline, Predicate};
use crate::core::{evaluate_formula, CellAddress};
use crate::error::{CellforgeError, CellforgeResult};
use crate::types::Table;
use crate::writer::{self, RenderOptions};
use colored::Colorize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Input/output flags shared by every table command
#[derive(Debug, Clone, Default)]
pub struct IoArgs {
    /// Table to read
    pub input: PathBuf,
    /// Destination file; stdout when absent
    pub output: Option<PathBuf>,
    /// Output format; inferred from `output` when absent
    pub format: Option<Format>,
    /// Worksheet to read from a workbook input
    pub sheet: Option<String>,
}

//==============================================================================
// Plumbing
//==============================================================================

fn read_options(config: &Config, io: &IoArgs) -> CellforgeResult<ReadOptions> {
    Ok(ReadOptions {
        sheet: io.sheet.clone(),
        csv: config.csv_options()?,
    })
}

fn write_options(config: &Config) -> CellforgeResult<WriteOptions> {
    Ok(WriteOptions {
        sheet: None,
        csv: config.csv_options()?,
        render: RenderOptions {
            precision: config.precision,
        },
    })
}

fn load(config: &Config, io: &IoArgs) -> CellforgeResult<Table> {
    codec::read_table(&io.input, None, &read_options(config, io)?)
}

/// Format for a file destination: `--format`, else the file extension
fn file_format(io: &IoArgs, path: &Path) -> CellforgeResult<Format> {
    match io.format {
        Some(format) => Ok(format),
        None => Format::from_path(path),
    }
}

/// Format for stdout: `--format`, else the configured default, else CSV
fn stdout_format(config: &Config, io: &IoArgs) -> Format {
    io.format.or(config.default_format).unwrap_or(Format::Csv)
}

fn print_bytes(bytes: &[u8]) -> CellforgeResult<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(bytes)?;
    handle.flush()?;
    Ok(())
}

/// Write the result table to `--output` or stdout
fn emit(config: &Config, io: &IoArgs, table: &Table) -> CellforgeResult<()> {
    let options = write_options(config)?;
    match &io.output {
        Some(path) => {
            let format = file_format(io, path)?;
            codec::write_table(table, path, Some(format), &options)?;
            eprintln!(
                "{} {} rows x {} columns → {}",
                "✅ Wrote".bold().green(),
                table.row_count(),
                table.column_count(),
                path.display()
            );
        }
        None => {
            let rendered = writer::render_table(table, stdout_format(config, io), &options)?;
            print_bytes(rendered.as_bytes())?;
        }
    }
    Ok(())
}

/// Read the input, run the operations, emit the result
fn run(config: &Config, io: &IoArgs, pipeline: Pipeline) -> CellforgeResult<()> {
    let table = load(config, io)?;
    let result = pipeline.run(&table)?;
    info!(
        input = %io.input.display(),
        steps = pipeline.steps().len(),
        rows = result.row_count(),
        "pipeline finished"
    );
    emit(config, io, &result)
}

fn single(operation: Operation) -> Pipeline {
    Pipeline::new().then(operation)
}

/// Split a comma-separated flag value, dropping blanks
fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

//==============================================================================
// Commands
//==============================================================================

/// Print a table, optionally only the cells covered by `range`
pub fn read(config: &Config, io: &IoArgs, range: Option<String>) -> CellforgeResult<()> {
    let pipeline = match range {
        Some(range) => single(Operation::Slice(range)),
        None => Pipeline::new(),
    };
    run(config, io, pipeline)
}

/// Re-encode a table in another format
pub fn convert(config: &Config, io: &IoArgs) -> CellforgeResult<()> {
    if io.output.is_none() && io.format.is_none() {
        return Err(CellforgeError::InvalidArgument(
            "convert needs --output or --format".to_string(),
        ));
    }
    run(config, io, Pipeline::new())
}

/// Evaluate a formula.
///
/// With `--output`, the result is written into `--cell` and the whole table
/// is saved. Without it, the value is printed.
pub fn formula(
    config: &Config,
    io: &IoArgs,
    formula: &str,
    cell: Option<String>,
) -> CellforgeResult<()> {
    if io.output.is_some() {
        let cell = cell.ok_or_else(|| {
            CellforgeError::InvalidArgument("--output needs --cell to place the result".to_string())
        })?;
        return run(
            config,
            io,
            single(Operation::Formula {
                formula: formula.to_string(),
                cell,
            }),
        );
    }

    let table = load(config, io)?;
    let target_row = match cell {
        Some(cell) => Some(CellAddress::parse(&cell)?.row),
        None => None,
    };
    let value = evaluate_formula(formula, &table, target_row);
    debug!(formula, value = ?value, "evaluated formula");

    let rendered = writer::display_value(
        &value,
        &RenderOptions {
            precision: config.precision,
        },
    );
    print_bytes(format!("{}\n", rendered).as_bytes())
}

pub fn sort(config: &Config, io: &IoArgs, column: &str, descending: bool) -> CellforgeResult<()> {
    run(
        config,
        io,
        single(Operation::Sort {
            column: column.to_string(),
            descending,
        }),
    )
}

pub fn filter(config: &Config, io: &IoArgs, predicate: &str) -> CellforgeResult<()> {
    run(config, io, single(Operation::Filter(Predicate::parse(predicate)?)))
}

pub fn dedupe(config: &Config, io: &IoArgs) -> CellforgeResult<()> {
    run(config, io, single(Operation::Dedupe))
}

pub fn transpose(config: &Config, io: &IoArgs) -> CellforgeResult<()> {
    run(config, io, single(Operation::Transpose))
}

/// Keep the named columns, in the given order
pub fn select(config: &Config, io: &IoArgs, columns: &str) -> CellforgeResult<()> {
    let columns = split_list(columns);
    if columns.is_empty() {
        return Err(CellforgeError::InvalidArgument(
            "--columns names no columns".to_string(),
        ));
    }
    run(config, io, single(Operation::Select(columns)))
}

pub fn head(config: &Config, io: &IoArgs, n: usize) -> CellforgeResult<()> {
    run(config, io, single(Operation::Head(n)))
}

pub fn tail(config: &Config, io: &IoArgs, n: usize) -> CellforgeResult<()> {
    run(config, io, single(Operation::Tail(n)))
}

/// `--by Category,Region --agg sum:Amount,avg:Price`
pub fn groupby(config: &Config, io: &IoArgs, by: &str, aggs: &str) -> CellforgeResult<()> {
    let by = split_list(by);
    let aggs = AggSpec::parse_list(aggs)?;
    run(config, io, single(Operation::GroupBy { by, aggs }))
}

/// Fill empty cells with `value`, in `columns` or everywhere
pub fn fillna(
    config: &Config,
    io: &IoArgs,
    value: &str,
    columns: Option<&str>,
) -> CellforgeResult<()> {
    let columns = columns.map(split_list).unwrap_or_default();
    run(
        config,
        io,
        single(Operation::FillNa {
            value: value.to_string(),
            columns,
        }),
    )
}

/// Drop rows with an empty cell in `columns`, or in any column
pub fn dropna(config: &Config, io: &IoArgs, columns: Option<&str>) -> CellforgeResult<()> {
    let columns = columns.map(split_list).unwrap_or_default();
    run(config, io, single(Operation::DropNa { columns }))
}

/// `--from Qty,Amt --to Quantity,Amount`
pub fn rename(config: &Config, io: &IoArgs, from: &str, to: &str) -> CellforgeResult<()> {
    let from = split_list(from);
    let to = split_list(to);
    if from.is_empty() || from.len() != to.len() {
        return Err(CellforgeError::InvalidArgument(format!(
            "--from names {} columns but --to names {}",
            from.len(),
            to.len()
        )));
    }
    run(
        config,
        io,
        single(Operation::Rename(from.into_iter().zip(to).collect())),
    )
}

pub fn drop_columns(config: &Config, io: &IoArgs, columns: &str) -> CellforgeResult<()> {
    let columns = split_list(columns);
    if columns.is_empty() {
        return Err(CellforgeError::InvalidArgument(
            "--columns names no columns".to_string(),
        ));
    }
    run(config, io, single(Operation::Drop(columns)))
}

pub fn replace(
    config: &Config,
    io: &IoArgs,
    find: &str,
    with: &str,
    column: Option<&str>,
) -> CellforgeResult<()> {
    run(
        config,
        io,
        single(Operation::Replace {
            find: find.to_string(),
            with: with.to_string(),
            column: column.map(str::to_string),
        }),
    )
}

/// Each distinct value of `column` with its count, most frequent first
pub fn value_counts(config: &Config, io: &IoArgs, column: &str) -> CellforgeResult<()> {
    run(config, io, single(Operation::ValueCounts(column.to_string())))
}

pub fn unique(config: &Config, io: &IoArgs, column: &str) -> CellforgeResult<()> {
    run(config, io, single(Operation::Unique(column.to_string())))
}

/// Summary statistics of the Number columns
pub fn describe_table(config: &Config, io: &IoArgs) -> CellforgeResult<()> {
    let table = load(config, io)?;
    let report = describe(&table);
    let mut options = write_options(config)?;

    match &io.output {
        Some(path) => {
            options.csv = options.csv.for_path(path);
            let bytes = writer::render_report(&report, file_format(io, path)?, &options)?;
            fs::write(path, bytes)?;
            eprintln!(
                "{} statistics for {} columns → {}",
                "✅ Wrote".bold().green(),
                report.columns.len(),
                path.display()
            );
            Ok(())
        }
        None => {
            let format = stdout_format(config, io);
            writer::ensure_printable(format)?;
            print_bytes(&writer::render_report(&report, format, &options)?)
        }
    }
}

/// List the worksheets of a workbook
pub fn sheets(input: &Path) -> CellforgeResult<()> {
    let names = codec::sheet_names(input)?;
    eprintln!(
        "{} {} ({} sheets)",
        "📒".cyan(),
        input.display(),
        names.len()
    );
    let mut out = String::new();
    for name in names {
        out.push_str(&name);
        out.push('\n');
    }
    print_bytes(out.as_bytes())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
