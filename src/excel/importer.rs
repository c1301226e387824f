//! Excel importer: one worksheet → one table
//!
//! The first row of the sheet's used area is the header.

use crate::error::{CellforgeError, CellforgeResult};
use crate::types::{unique_name, Table};
use crate::value::{ErrorKind, Value};
use calamine::{open_workbook_auto, CellErrorType, Data, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads worksheets from .xlsx/.xlsm/.xls/.ods workbooks
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Names of all worksheets, in workbook order
    pub fn sheet_names(&self) -> CellforgeResult<Vec<String>> {
        let workbook = open_workbook_auto(&self.path)
            .map_err(|e| CellforgeError::Excel(format!("Failed to open workbook: {}", e)))?;
        Ok(workbook.sheet_names())
    }

    /// Read one worksheet (the first when `sheet` is None)
    pub fn read_sheet(&self, sheet: Option<&str>) -> CellforgeResult<Table> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| CellforgeError::Excel(format!("Failed to open workbook: {}", e)))?;

        let names = workbook.sheet_names();
        let name = match sheet {
            Some(wanted) => names
                .iter()
                .find(|n| n.as_str() == wanted)
                .cloned()
                .ok_or_else(|| {
                    CellforgeError::Excel(format!(
                        "no sheet named '{}' (available: {})",
                        wanted,
                        names.join(", ")
                    ))
                })?,
            None => names
                .first()
                .cloned()
                .ok_or_else(|| CellforgeError::Excel("workbook has no sheets".to_string()))?,
        };

        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| CellforgeError::Excel(format!("Failed to read sheet '{}': {}", name, e)))?;
        debug!(sheet = %name, size = ?range.get_size(), "read worksheet");

        range_to_table(&range)
    }
}

fn range_to_table(range: &Range<Data>) -> CellforgeResult<Table> {
    let mut rows = range.rows();
    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(Table::empty()),
    };

    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (index, cell) in header.iter().enumerate() {
        let base = match cell_value(cell) {
            Value::Missing => format!("col_{}", index + 1),
            value => value.as_text().trim().to_string(),
        };
        let existing: Vec<&str> = names.iter().map(String::as_str).collect();
        let name = unique_name(&base, &existing);
        names.push(name);
    }

    let body: Vec<Vec<Value>> = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    Table::from_rows(names, body)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) => Value::Number(*f),
        Data::String(s) if s.is_empty() => Value::Missing,
        Data::String(s) => Value::Text(s.clone()),
        Data::Bool(b) => Value::Boolean(*b),
        Data::DateTime(dt) => Value::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Error(error_kind(e)),
        Data::Empty => Value::Missing,
    }
}

fn error_kind(error: &CellErrorType) -> ErrorKind {
    match error {
        CellErrorType::Div0 => ErrorKind::DivByZero,
        CellErrorType::Name => ErrorKind::UnknownFunction,
        CellErrorType::Value | CellErrorType::Num => ErrorKind::TypeMismatch,
        _ => ErrorKind::InvalidRef,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::ExcelExporter;

    fn round_trip(table: &Table) -> Table {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        let bytes = ExcelExporter::new("Data").export(table).unwrap();
        std::fs::write(&path, bytes).unwrap();
        ExcelImporter::new(&path).read_sheet(None).unwrap()
    }

    #[test]
    fn test_export_then_import() {
        let table = Table::from_rows(
            vec!["Name".to_string(), "Qty".to_string(), "Ok".to_string()],
            vec![
                vec![Value::from("a"), Value::Number(1.5), Value::Boolean(true)],
                vec![Value::from("b"), Value::Number(2.0), Value::Boolean(false)],
            ],
        )
        .unwrap();
        assert_eq!(round_trip(&table), table);
    }

    #[test]
    fn test_sheet_names_and_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        let table = Table::from_rows(vec!["x".to_string()], vec![vec![Value::Number(1.0)]]).unwrap();
        std::fs::write(&path, ExcelExporter::new("Sales").export(&table).unwrap()).unwrap();

        let importer = ExcelImporter::new(&path);
        assert_eq!(importer.sheet_names().unwrap(), vec!["Sales".to_string()]);
        assert!(importer.read_sheet(Some("Sales")).is_ok());
        assert!(matches!(
            importer.read_sheet(Some("Nope")),
            Err(CellforgeError::Excel(_))
        ));
    }

    #[test]
    fn test_cell_mapping() {
        assert_eq!(cell_value(&Data::Int(3)), Value::Number(3.0));
        assert_eq!(cell_value(&Data::Empty), Value::Missing);
        assert_eq!(
            cell_value(&Data::Error(CellErrorType::Div0)),
            Value::Error(ErrorKind::DivByZero)
        );
    }
}
