//! Cell and range addresses
//!
//! `C1` names column C, data row 1 (the header is not counted). Ranges such
//! as `A1:C5` are inclusive rectangles, normalized so that `C5:A1` is the
//! same range.

use crate::error::{CellforgeError, CellforgeResult};
use crate::types::Table;
use crate::value::Value;
use std::fmt;

/// Split `AB12` into its letters and digits; `None` unless the text is
/// one or more ASCII letters followed by one or more ASCII digits.
fn split_cell(text: &str) -> Option<(&str, &str)> {
    let digits_at = text.find(|c: char| !c.is_ascii_alphabetic())?;
    let (letters, digits) = text.split_at(digits_at);
    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((letters, digits))
}

/// Whether `text` has the letters+digits shape of a cell address
pub fn looks_like_cell(text: &str) -> bool {
    split_cell(text).is_some()
}

/// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
pub fn column_letters(index: usize) -> String {
    let mut result = String::new();
    let mut n = index + 1;

    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }

    result
}

/// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
pub fn letters_to_column(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut column: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        column = column.checked_mul(26)?.checked_add(digit)?;
    }
    Some(column - 1)
}

//==============================================================================
// Addresses
//==============================================================================

/// A single cell, zero-based on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: usize,
    pub column: usize,
}

impl CellAddress {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Parse `A1`-style notation (case-insensitive)
    pub fn parse(text: &str) -> CellforgeResult<Self> {
        let text = text.trim();
        let (letters, digits) = split_cell(text)
            .ok_or_else(|| CellforgeError::Reference(format!("'{}' is not a cell address", text)))?;

        let column = letters_to_column(letters).ok_or_else(|| {
            CellforgeError::Reference(format!("column out of range in '{}'", text))
        })?;
        let row: usize = digits
            .parse()
            .map_err(|_| CellforgeError::Reference(format!("row out of range in '{}'", text)))?;
        if row == 0 {
            return Err(CellforgeError::Reference(format!(
                "row number must be >= 1 in '{}'",
                text
            )));
        }

        Ok(Self {
            row: row - 1,
            column,
        })
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row + 1)
    }
}

/// An inclusive rectangle of cells, always top-left to bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeAddress {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl RangeAddress {
    /// Create a range from any two corners
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.column.min(b.column)),
            end: CellAddress::new(a.row.max(b.row), a.column.max(b.column)),
        }
    }

    /// Parse `A1:C5`
    pub fn parse(text: &str) -> CellforgeResult<Self> {
        let (start, end) = text
            .split_once(':')
            .ok_or_else(|| CellforgeError::Reference(format!("'{}' is not a range", text)))?;
        Ok(Self::new(CellAddress::parse(start)?, CellAddress::parse(end)?))
    }

    pub fn height(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    pub fn width(&self) -> usize {
        self.end.column - self.start.column + 1
    }
}

impl fmt::Display for RangeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

//==============================================================================
// Resolver
//==============================================================================

/// Resolves addresses against a table's bounds and reads cell values
pub struct Resolver<'a> {
    table: &'a Table,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self { table }
    }

    fn in_bounds(&self, address: &CellAddress) -> bool {
        address.row < self.table.row_count() && address.column < self.table.column_count()
    }

    /// Parse a cell address and check it lies inside the table
    pub fn resolve_cell(&self, text: &str) -> CellforgeResult<CellAddress> {
        let address = CellAddress::parse(text)?;
        if !self.in_bounds(&address) {
            return Err(CellforgeError::Reference(format!(
                "{} is outside the table ({} rows x {} columns)",
                address,
                self.table.row_count(),
                self.table.column_count()
            )));
        }
        Ok(address)
    }

    /// Parse a range and check its top-left corner lies inside the table.
    /// The far corner may extend past the table; reads clamp it.
    pub fn resolve_range(&self, text: &str) -> CellforgeResult<RangeAddress> {
        let range = RangeAddress::parse(text)?;
        if !self.in_bounds(&range.start) {
            return Err(CellforgeError::Reference(format!(
                "{} starts outside the table ({} rows x {} columns)",
                range,
                self.table.row_count(),
                self.table.column_count()
            )));
        }
        Ok(range)
    }

    /// Value of a cell; out-of-bounds cells read as Missing
    pub fn value(&self, address: &CellAddress) -> Value {
        self.table
            .cell(address.row, address.column)
            .cloned()
            .unwrap_or(Value::Missing)
    }

    /// Cells of a range in row-major order
    pub fn range_values(&self, range: &RangeAddress) -> Vec<Value> {
        self.range_rows(range).into_iter().flatten().collect()
    }

    /// Cells of a range, one vector per row, clamped to the table's edge
    pub fn range_rows(&self, range: &RangeAddress) -> Vec<Vec<Value>> {
        let last_row = range.end.row.min(self.table.row_count().saturating_sub(1));
        let last_column = range.end.column.min(self.table.column_count().saturating_sub(1));
        (range.start.row..=last_row)
            .map(|row| {
                (range.start.column..=last_column)
                    .map(|column| self.value(&CellAddress::new(row, column)))
                    .collect()
            })
            .collect()
    }
}
