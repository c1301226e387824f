//! CSV codec

use super::CsvOptions;
use crate::error::{CellforgeError, CellforgeResult};
use crate::types::{unique_name, Table};
use crate::value::Value;
use ::csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::io::{Read, Write};

/// Read CSV into a table.
///
/// Fields are typed with [`Value::infer`]. Rows shorter than the header are
/// padded with Missing; longer rows are an error. Without a header, columns
/// are named `col_1`, `col_2`…
pub fn read<R: Read>(reader: R, options: &CsvOptions) -> CellforgeResult<Table> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records();

    let first = match records.next() {
        Some(record) => record?,
        None => return Ok(Table::empty()),
    };

    let (names, mut rows) = if options.has_header {
        (header_names(&first), Vec::new())
    } else {
        let names = (1..=first.len()).map(|n| format!("col_{}", n)).collect();
        (names, vec![typed_row(&first)])
    };

    let width = names.len();
    for (index, record) in records.enumerate() {
        let record = record?;
        if record.len() > width {
            return Err(CellforgeError::Codec(format!(
                "line {} has {} fields, expected {}",
                index + 2,
                record.len(),
                width
            )));
        }
        let mut row = typed_row(&record);
        row.resize(width, Value::Missing);
        rows.push(row);
    }

    Table::from_rows(names, rows)
}

/// Header names: blanks become `col_N`, repeats get a numeric suffix
fn header_names(record: &StringRecord) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(record.len());
    for (index, field) in record.iter().enumerate() {
        let base = match field.trim() {
            "" => format!("col_{}", index + 1),
            name => name.to_string(),
        };
        let existing: Vec<&str> = names.iter().map(String::as_str).collect();
        let name = unique_name(&base, &existing);
        names.push(name);
    }
    names
}

fn typed_row(record: &StringRecord) -> Vec<Value> {
    record.iter().map(Value::infer).collect()
}

/// Write a table as CSV. The header row is written when `has_header` is set.
pub fn write<W: Write>(table: &Table, writer: W, options: &CsvOptions) -> CellforgeResult<()> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(writer);

    if options.has_header && table.column_count() > 0 {
        csv_writer.write_record(table.column_names())?;
    }

    for row in table.rows() {
        csv_writer.write_record(row.iter().map(Value::as_text))?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnType;
    use crate::value::ErrorKind;
    use pretty_assertions::assert_eq;

    fn read_str(text: &str) -> CellforgeResult<Table> {
        read(text.as_bytes(), &CsvOptions::default())
    }

    #[test]
    fn test_read_infers_types() {
        let table = read_str("Name,Qty,Active\napple,3,true\npear,,FALSE\n").unwrap();
        assert_eq!(table.column_names(), vec!["Name", "Qty", "Active"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 1), Some(&Value::Number(3.0)));
        assert_eq!(table.cell(1, 1), Some(&Value::Missing));
        assert_eq!(table.cell(1, 2), Some(&Value::Boolean(false)));
        assert_eq!(
            table.column("Qty").unwrap().column_type(),
            ColumnType::Number
        );
    }

    #[test]
    fn test_read_error_literals() {
        let table = read_str("x\n#DIV/0!\n").unwrap();
        assert_eq!(table.cell(0, 0), Some(&Value::Error(ErrorKind::DivByZero)));
    }

    #[test]
    fn test_blank_and_duplicate_headers() {
        let table = read_str("a,,a\n1,2,3\n").unwrap();
        assert_eq!(table.column_names(), vec!["a", "col_2", "a_2"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = read_str("a,b,c\n1\n").unwrap();
        assert_eq!(table.row(0), vec![Value::Number(1.0), Value::Missing, Value::Missing]);
    }

    #[test]
    fn test_long_rows_are_rejected() {
        assert!(matches!(
            read_str("a,b\n1,2,3\n"),
            Err(CellforgeError::Codec(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        let table = read_str("").unwrap();
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_no_header() {
        let options = CsvOptions {
            delimiter: b';',
            has_header: false,
        };
        let table = read("1;2\n3;4\n".as_bytes(), &options).unwrap();
        assert_eq!(table.column_names(), vec!["col_1", "col_2"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_write_quotes_and_literals() {
        let table = Table::from_rows(
            vec!["name".to_string(), "v".to_string()],
            vec![
                vec![Value::from("a,b"), Value::Number(2.0)],
                vec![Value::Missing, Value::Error(ErrorKind::InvalidRef)],
            ],
        )
        .unwrap();
        let mut out = Vec::new();
        write(&table, &mut out, &CsvOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "name,v\n\"a,b\",2\n,#REF!\n"
        );
    }
}
