use crate::core::reference::column_letters;
use crate::error::{CellforgeError, CellforgeResult};
use crate::value::Value;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

//==============================================================================
// Column
//==============================================================================

/// Primitive type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Number,
    Text,
    Boolean,
    /// Values of more than one category, or none at all
    Mixed,
}

impl ColumnType {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Number => "Number",
            ColumnType::Text => "Text",
            ColumnType::Boolean => "Boolean",
            ColumnType::Mixed => "Mixed",
        }
    }

    /// Whether a value may live in a column of this type.
    /// Missing and Error values fit every type.
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value.category()) {
            (ColumnType::Mixed, _) | (_, None) => true,
            (expected, Some(actual)) => *expected == actual,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named, typed column of cell values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    values: Vec<Value>,
}

impl Column {
    /// Create a column whose type is inferred from its values
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let column_type = Self::infer_type(&values);
        Self {
            name: name.into(),
            column_type,
            values,
        }
    }

    /// Create a column with a declared type, validating every value
    pub fn with_type(
        name: impl Into<String>,
        column_type: ColumnType,
        values: Vec<Value>,
    ) -> CellforgeResult<Self> {
        let name = name.into();
        if let Some((row, value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !column_type.admits(v))
        {
            return Err(CellforgeError::TypeMismatch(format!(
                "column '{}' is declared {} but row {} holds {:?}",
                name,
                column_type,
                row + 1,
                value
            )));
        }
        Ok(Self {
            name,
            column_type,
            values,
        })
    }

    /// One category across all present values → that category, else Mixed
    pub fn infer_type(values: &[Value]) -> ColumnType {
        let mut categories = values.iter().filter_map(Value::category);
        match categories.next() {
            None => ColumnType::Mixed,
            Some(first) => {
                if categories.all(|c| c == first) {
                    first
                } else {
                    ColumnType::Mixed
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Same values and type under another name
    pub fn renamed(&self, name: impl Into<String>) -> Column {
        Column {
            name: name.into(),
            column_type: self.column_type,
            values: self.values.clone(),
        }
    }

    /// Values at the given row indices; the column type is kept
    fn take(&self, indices: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            column_type: self.column_type,
            values: indices
                .iter()
                .map(|&i| self.values.get(i).cloned().unwrap_or(Value::Missing))
                .collect(),
        }
    }
}

//==============================================================================
// Table
//==============================================================================

/// Rows in the largest worksheet, header row included
pub const MAX_ROWS: usize = 1_048_576;
/// Columns in the largest worksheet
pub const MAX_COLUMNS: usize = 16_384;

/// An immutable, column-oriented table.
///
/// Every column holds exactly `row_count` values and names are unique.
/// There are no mutating methods; transforms build new tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table from columns, checking the shape invariants
    pub fn new(columns: Vec<Column>) -> CellforgeResult<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);

        let mut seen = HashSet::new();
        for column in &columns {
            if column.len() != row_count {
                return Err(CellforgeError::Schema(format!(
                    "column '{}' has {} values, expected {}",
                    column.name,
                    column.len(),
                    row_count
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(CellforgeError::Schema(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns, row_count })
    }

    /// A table with no columns and no rows
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            row_count: 0,
        }
    }

    /// Build a table from a header and row-major values, inferring types
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<Value>>) -> CellforgeResult<Self> {
        let width = names.len();
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); width];

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(CellforgeError::Schema(format!(
                    "row {} has {} values, expected {}",
                    index + 1,
                    row.len(),
                    width
                )));
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        Table::new(
            names
                .into_iter()
                .zip(columns)
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        )
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Look up a column index, failing with `ColumnNotFound`
    pub fn require_column(&self, name: &str) -> CellforgeResult<usize> {
        self.column_index(name)
            .ok_or_else(|| CellforgeError::ColumnNotFound(name.to_string()))
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Cell at zero-based (row, column)
    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.columns.get(column).and_then(|c| c.get(row))
    }

    /// Values of one row, left to right
    pub fn row(&self, row: usize) -> Vec<Value> {
        self.columns
            .iter()
            .map(|c| c.get(row).cloned().unwrap_or(Value::Missing))
            .collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.row_count).map(move |r| self.row(r))
    }

    /// New table holding the given rows in the given order
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            row_count: indices.len(),
        }
    }

    /// New table with one cell replaced.
    ///
    /// Writing past the right edge adds columns named by their letters;
    /// writing past the last row adds rows. New cells are Missing. The
    /// written column's type is re-inferred.
    pub fn with_cell(&self, row: usize, column: usize, value: Value) -> Table {
        let mut columns = self.columns.clone();
        let row_count = self.row_count.max(row + 1);

        while columns.len() <= column {
            let existing: Vec<&str> = columns.iter().map(Column::name).collect();
            let name = unique_name(&column_letters(columns.len()), &existing);
            columns.push(Column {
                name,
                column_type: ColumnType::Mixed,
                values: Vec::new(),
            });
        }

        for (index, col) in columns.iter_mut().enumerate() {
            col.values.resize(row_count, Value::Missing);
            if index == column {
                col.values[row] = value.clone();
                col.column_type = Column::infer_type(&col.values);
            }
        }

        Table { columns, row_count }
    }
}

/// `base`, or `base_2`, `base_3`… whichever is not taken
pub fn unique_name(base: &str, existing: &[&str]) -> String {
    if !existing.contains(&base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !existing.contains(&candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}
