//! Excel workbooks
//!
//! - Import: one worksheet → `Table` (calamine)
//! - Export: `Table` → single-sheet .xlsx (rust_xlsxwriter)

mod exporter;
mod importer;

pub use exporter::ExcelExporter;
pub use importer::ExcelImporter;
