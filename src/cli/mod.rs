//! CLI command handlers

pub mod commands;

pub use commands::{
    convert, dedupe, describe_table, drop_columns, dropna, fillna, filter, formula, groupby, head,
    read, rename, replace, select, sheets, sort, tail, transpose, unique, value_counts, IoArgs,
};
