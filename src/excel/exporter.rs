//! Excel exporter: one table → one worksheet

use crate::error::{CellforgeError, CellforgeResult};
use crate::types::{Table, MAX_COLUMNS, MAX_ROWS};
use crate::value::Value;
use rust_xlsxwriter::{Workbook, Worksheet};

/// Writes a table as an .xlsx workbook with a single worksheet
pub struct ExcelExporter {
    sheet_name: String,
}

impl ExcelExporter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }

    /// Encode the workbook in memory
    pub fn export(&self, table: &Table) -> CellforgeResult<Vec<u8>> {
        if table.row_count() + 1 > MAX_ROWS || table.column_count() > MAX_COLUMNS {
            return Err(CellforgeError::Excel(format!(
                "{} rows x {} columns does not fit in a worksheet",
                table.row_count(),
                table.column_count()
            )));
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&self.sheet_name)
            .map_err(|e| CellforgeError::Excel(format!("Invalid worksheet name: {}", e)))?;

        for (col, name) in table.column_names().iter().enumerate() {
            worksheet
                .write_string(0, col as u16, *name)
                .map_err(|e| CellforgeError::Excel(format!("Failed to write header: {}", e)))?;
        }

        for (row_idx, row) in table.rows().enumerate() {
            for (col, value) in row.iter().enumerate() {
                Self::write_cell(worksheet, row_idx as u32 + 1, col as u16, value)?;
            }
        }

        workbook
            .save_to_buffer()
            .map_err(|e| CellforgeError::Excel(format!("Failed to encode workbook: {}", e)))
    }

    fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> CellforgeResult<()> {
        let result = match value {
            Value::Number(n) => worksheet.write_number(row, col, *n).map(|_| ()),
            Value::Text(s) => worksheet.write_string(row, col, s).map(|_| ()),
            Value::Boolean(b) => worksheet.write_boolean(row, col, *b).map(|_| ()),
            Value::Error(kind) => worksheet.write_string(row, col, kind.literal()).map(|_| ()),
            Value::Missing => Ok(()),
        };
        result.map_err(|e| CellforgeError::Excel(format!("Failed to write cell: {}", e)))
    }
}
