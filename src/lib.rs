//! cellforge - spreadsheet-style operations on tabular files
//!
//! Reads CSV, JSON and Excel files into an immutable, column-typed
//! [`Table`], evaluates Excel-style formulas against it, and runs table
//! operations (sort, filter, dedupe, transpose, select, head, tail,
//! groupby, describe).
//!
//! # Example
//!
//! ```no_run
//! use cellforge::codec::{read_table, ReadOptions};
//! use cellforge::core::evaluate_formula;
//! use cellforge::core::operations::{Operation, Pipeline, Predicate};
//! use std::path::Path;
//!
//! let table = read_table(Path::new("sales.csv"), None, &ReadOptions::default())?;
//! println!("total = {}", evaluate_formula("=SUM(C1:C100)", &table, None));
//!
//! let big = Pipeline::new()
//!     .then(Operation::Filter(Predicate::parse("Amount > 1000")?))
//!     .then(Operation::Head(10))
//!     .run(&table)?;
//! println!("{} rows", big.row_count());
//! # Ok::<(), cellforge::error::CellforgeError>(())
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod types;
pub mod value;
pub mod writer;

// Re-export commonly used types
pub use error::{CellforgeError, CellforgeResult};
pub use types::{Column, ColumnType, Table};
pub use value::{ErrorKind, Value};
