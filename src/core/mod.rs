//! Core engine: cell references, formulas and table operations

pub mod formula;
pub mod operations;
pub mod reference;

pub use formula::{apply_formula, evaluate_formula};
pub use operations::{Operation, Pipeline, Report};
pub use reference::{CellAddress, RangeAddress, Resolver};
