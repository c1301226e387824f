use anyhow::Context;
use cellforge::cli::{self, IoArgs};
use cellforge::codec::Format;
use cellforge::config::Config;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cellforge")]
#[command(about = "Spreadsheet-style formulas and table operations for CSV, JSON and Excel files")]
#[command(long_about = "cellforge - spreadsheet operations from the command line

Reads CSV, JSON and Excel files, evaluates Excel-style formulas against
them, and sorts, filters, groups and summarizes their rows.

COMMANDS:
  read       - Print a table (optionally a range of it)
  convert    - Convert between csv, json and xlsx
  formula    - Evaluate a formula (=SUM(B1:B10), =IF(A1>0,\"up\",\"down\"), ...)
  sort       - Sort rows by a column
  filter     - Keep rows matching a predicate (\"Amount > 1000\")
  dedupe     - Drop repeated rows
  transpose  - Swap rows and columns
  select     - Keep and reorder columns
  head/tail  - First or last n rows
  groupby    - Aggregate rows by key columns
  fillna     - Fill empty cells with a value
  dropna     - Drop rows with empty cells
  rename     - Rename columns
  drop       - Remove columns
  replace    - Find and replace cell text
  value-counts - Count each distinct value of a column
  unique     - Distinct values of a column
  describe   - Summary statistics of numeric columns
  sheets     - List the worksheets of a workbook

EXAMPLES:
  cellforge formula -i sales.csv --formula \"=SUM(C1:C100)\"
  cellforge filter -i sales.csv --where \"Amount > 1000\" -o big.json
  cellforge groupby -i sales.csv --by Category --agg sum:Amount,avg:Amount -f markdown

Cell references address data rows: A1 is the first row below the header.")]
#[command(version)]
struct Cli {
    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML config file
    #[arg(long, global = true, env = cellforge::config::CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by commands that read and write tables
#[derive(Args)]
struct IoFlags {
    /// Input file (.csv, .json, .xlsx, .xls, .ods)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file; results go to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: output extension, else config, else csv)
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Worksheet to read from a workbook (default: first)
    #[arg(short, long)]
    sheet: Option<String>,
}

impl From<IoFlags> for IoArgs {
    fn from(flags: IoFlags) -> Self {
        IoArgs {
            input: flags.input,
            output: flags.output,
            format: flags.format,
            sheet: flags.sheet,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print a table, or the cells covered by --range
    Read {
        #[command(flatten)]
        io: IoFlags,

        /// Range to keep, e.g. A1:C10
        #[arg(long)]
        range: Option<String>,
    },

    /// Convert a table to another format
    Convert {
        #[command(flatten)]
        io: IoFlags,
    },

    #[command(long_about = "Evaluate an Excel-style formula against a table.

Without --output the result is printed. With --output the result is
written into --cell and the whole table is saved.

Errors are values: a division by zero prints #DIV/0!, a reference
outside the table prints #REF!, an unknown function prints #NAME?.

FUNCTIONS:
  SUM AVERAGE COUNT COUNTA MIN MAX SUMIF COUNTIF VLOOKUP
  IF AND OR NOT ROUND ABS LEN CONCAT ROW")]
    /// Evaluate a formula
    Formula {
        #[command(flatten)]
        io: IoFlags,

        /// Formula, e.g. =AVERAGE(B1:B10)
        #[arg(long)]
        formula: String,

        /// Target cell (required with --output)
        #[arg(long)]
        cell: Option<String>,
    },

    /// Sort rows by a column (stable)
    Sort {
        #[command(flatten)]
        io: IoFlags,

        #[arg(long)]
        column: String,

        #[arg(long)]
        descending: bool,
    },

    /// Keep rows matching a predicate such as "Amount >= 1000"
    Filter {
        #[command(flatten)]
        io: IoFlags,

        /// Predicate: column, one of = <> < <= > >=, literal
        #[arg(long = "where")]
        predicate: String,
    },

    /// Drop rows that repeat an earlier row
    Dedupe {
        #[command(flatten)]
        io: IoFlags,
    },

    /// Swap rows and columns
    Transpose {
        #[command(flatten)]
        io: IoFlags,
    },

    /// Keep the given columns, in the given order
    Select {
        #[command(flatten)]
        io: IoFlags,

        /// Comma-separated column names
        #[arg(long)]
        columns: String,
    },

    /// First n rows
    Head {
        #[command(flatten)]
        io: IoFlags,

        #[arg(short = 'n', long, default_value_t = 10)]
        n: usize,
    },

    /// Last n rows
    Tail {
        #[command(flatten)]
        io: IoFlags,

        #[arg(short = 'n', long, default_value_t = 10)]
        n: usize,
    },

    /// Aggregate rows grouped by key columns
    Groupby {
        #[command(flatten)]
        io: IoFlags,

        /// Comma-separated key columns
        #[arg(long)]
        by: String,

        /// Comma-separated func:column specs (sum, avg, count, counta, min, max)
        #[arg(long)]
        agg: String,
    },

    /// Fill empty cells with a value, typed per column
    Fillna {
        #[command(flatten)]
        io: IoFlags,

        /// Fill value, e.g. 0 or n/a
        #[arg(long)]
        value: String,

        /// Comma-separated columns to fill (default: all)
        #[arg(long)]
        columns: Option<String>,
    },

    /// Drop rows with an empty cell
    Dropna {
        #[command(flatten)]
        io: IoFlags,

        /// Comma-separated columns to check (default: all)
        #[arg(long)]
        columns: Option<String>,
    },

    /// Rename columns pairwise: --from Qty,Amt --to Quantity,Amount
    Rename {
        #[command(flatten)]
        io: IoFlags,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },

    /// Remove columns
    Drop {
        #[command(flatten)]
        io: IoFlags,

        /// Comma-separated column names
        #[arg(long)]
        columns: String,
    },

    /// Replace text inside cells; non-text cells must match whole
    Replace {
        #[command(flatten)]
        io: IoFlags,

        #[arg(long)]
        find: String,

        /// Replacement (may be empty)
        #[arg(long, default_value = "")]
        with: String,

        /// Only this column (default: all)
        #[arg(long)]
        column: Option<String>,
    },

    /// Count each distinct value of a column, most frequent first
    ValueCounts {
        #[command(flatten)]
        io: IoFlags,

        #[arg(long)]
        column: String,
    },

    /// Distinct values of a column in first-seen order
    Unique {
        #[command(flatten)]
        io: IoFlags,

        #[arg(long)]
        column: String,
    },

    /// Summary statistics for numeric columns
    Describe {
        #[command(flatten)]
        io: IoFlags,
    },

    /// List worksheet names
    Sheets {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "cellforge=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Read { io, range } => cli::read(&config, &IoArgs::from(io), range),
        Commands::Convert { io } => cli::convert(&config, &IoArgs::from(io)),
        Commands::Formula { io, formula, cell } => {
            cli::formula(&config, &IoArgs::from(io), &formula, cell)
        }
        Commands::Sort {
            io,
            column,
            descending,
        } => cli::sort(&config, &IoArgs::from(io), &column, descending),
        Commands::Filter { io, predicate } => cli::filter(&config, &IoArgs::from(io), &predicate),
        Commands::Dedupe { io } => cli::dedupe(&config, &IoArgs::from(io)),
        Commands::Transpose { io } => cli::transpose(&config, &IoArgs::from(io)),
        Commands::Select { io, columns } => cli::select(&config, &IoArgs::from(io), &columns),
        Commands::Head { io, n } => cli::head(&config, &IoArgs::from(io), n),
        Commands::Tail { io, n } => cli::tail(&config, &IoArgs::from(io), n),
        Commands::Groupby { io, by, agg } => cli::groupby(&config, &IoArgs::from(io), &by, &agg),
        Commands::Fillna { io, value, columns } => {
            cli::fillna(&config, &IoArgs::from(io), &value, columns.as_deref())
        }
        Commands::Dropna { io, columns } => {
            cli::dropna(&config, &IoArgs::from(io), columns.as_deref())
        }
        Commands::Rename { io, from, to } => cli::rename(&config, &IoArgs::from(io), &from, &to),
        Commands::Drop { io, columns } => cli::drop_columns(&config, &IoArgs::from(io), &columns),
        Commands::Replace {
            io,
            find,
            with,
            column,
        } => cli::replace(&config, &IoArgs::from(io), &find, &with, column.as_deref()),
        Commands::ValueCounts { io, column } => {
            cli::value_counts(&config, &IoArgs::from(io), &column)
        }
        Commands::Unique { io, column } => cli::unique(&config, &IoArgs::from(io), &column),
        Commands::Describe { io } => cli::describe_table(&config, &IoArgs::from(io)),
        Commands::Sheets { input } => cli::sheets(&input),
    }?;

    Ok(())
}
