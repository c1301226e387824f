//! Cleaning transforms: fillna, dropna, replace

use super::predicate::literal_for;
use crate::error::{CellforgeError, CellforgeResult};
use crate::types::{Column, Table};
use crate::value::Value;
use tracing::debug;

/// Flags for the columns named in `names`; an empty list flags every column
fn targeted(table: &Table, names: &[String]) -> CellforgeResult<Vec<bool>> {
    if names.is_empty() {
        return Ok(vec![true; table.column_count()]);
    }
    let mut flags = vec![false; table.column_count()];
    for name in names {
        flags[table.require_column(name)?] = true;
    }
    Ok(flags)
}

/// Rebuild each flagged column through `map`, re-inferring its type
fn map_columns<F>(table: &Table, flags: &[bool], mut map: F) -> CellforgeResult<Table>
where
    F: FnMut(&Column, &Value) -> Value,
{
    let columns = table
        .columns()
        .iter()
        .zip(flags)
        .map(|(column, &flagged)| {
            if flagged {
                let values = column.values().iter().map(|v| map(column, v)).collect();
                Column::new(column.name(), values)
            } else {
                column.clone()
            }
        })
        .collect();
    Table::new(columns)
}

/// Replace Missing cells with `fill`, read as a value of each column's type.
///
/// `columns` limits the fill to those columns; empty means all. Error cells
/// are not missing and are left alone.
pub fn fillna(table: &Table, fill: &str, columns: &[String]) -> CellforgeResult<Table> {
    if fill.is_empty() {
        return Err(CellforgeError::InvalidArgument(
            "fill value is empty".to_string(),
        ));
    }
    let flags = targeted(table, columns)?;

    let mut filled = 0usize;
    let result = map_columns(table, &flags, |column, value| {
        if value.is_missing() {
            filled += 1;
            literal_for(column.column_type(), fill)
        } else {
            value.clone()
        }
    })?;
    debug!(filled, "filled missing cells");
    Ok(result)
}

/// Drop every row with a Missing cell in any of `columns` (empty means all)
pub fn dropna(table: &Table, columns: &[String]) -> CellforgeResult<Table> {
    let flags = targeted(table, columns)?;
    let keep: Vec<usize> = (0..table.row_count())
        .filter(|&row| {
            table
                .columns()
                .iter()
                .zip(&flags)
                .filter(|&(_, &flagged)| flagged)
                .all(|(column, _)| column.get(row).map_or(false, |v| !v.is_missing()))
        })
        .collect();
    Ok(table.take_rows(&keep))
}

/// Find and replace in one column, or every column when `column` is None.
///
/// Text cells have each occurrence of `find` replaced and stay Text. Any
/// other cell whose displayed text is exactly `find` becomes `with`, read as
/// a value of the column's type. Missing cells never match.
pub fn replace(
    table: &Table,
    find: &str,
    with: &str,
    column: Option<&str>,
) -> CellforgeResult<Table> {
    if find.is_empty() {
        return Err(CellforgeError::InvalidArgument(
            "nothing to find: the search text is empty".to_string(),
        ));
    }
    let names: Vec<String> = column.map(str::to_string).into_iter().collect();
    let flags = targeted(table, &names)?;

    let mut replaced = 0usize;
    let result = map_columns(table, &flags, |column, value| match value {
        Value::Text(text) if text.contains(find) => {
            replaced += 1;
            Value::Text(text.replace(find, with))
        }
        Value::Number(_) | Value::Boolean(_) | Value::Error(_) if value.as_text() == find => {
            replaced += 1;
            literal_for(column.column_type(), with)
        }
        other => other.clone(),
    })?;
    debug!(replaced, "replaced cells");
    Ok(result)
}
