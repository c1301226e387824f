//! JSON codec: an array of flat objects, one object per row

use crate::error::{CellforgeError, CellforgeResult};
use crate::types::Table;
use crate::value::Value;
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::HashMap;
use std::io::Read;

/// Read `[{"a": 1, "b": "x"}, ...]` into a table.
///
/// Columns appear in first-seen key order. A key absent from a row and
/// `null` both read as Missing. Nested arrays or objects are rejected.
pub fn read<R: Read>(reader: R) -> CellforgeResult<Table> {
    let document: JsonValue = serde_json::from_reader(reader)?;
    let JsonValue::Array(items) = document else {
        return Err(CellforgeError::Codec(
            "JSON input must be an array of objects".to_string(),
        ));
    };

    let mut names: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let JsonValue::Object(object) = item else {
            return Err(CellforgeError::Codec(format!(
                "element {} is not an object",
                index
            )));
        };

        let mut row = vec![Value::Missing; names.len()];
        for (key, field) in object {
            let value = cell_value(&key, field)?;
            let position = match positions.get(&key) {
                Some(&position) => position,
                None => {
                    positions.insert(key.clone(), names.len());
                    names.push(key);
                    names.len() - 1
                }
            };
            if row.len() <= position {
                row.resize(position + 1, Value::Missing);
            }
            row[position] = value;
        }
        rows.push(row);
    }

    let width = names.len();
    for row in &mut rows {
        row.resize(width, Value::Missing);
    }
    Table::from_rows(names, rows)
}

fn cell_value(key: &str, field: JsonValue) -> CellforgeResult<Value> {
    match field {
        JsonValue::Null => Ok(Value::Missing),
        JsonValue::Bool(b) => Ok(Value::Boolean(b)),
        JsonValue::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(Value::Number)
            .ok_or_else(|| CellforgeError::Codec(format!("field '{}': number out of range", key))),
        JsonValue::String(s) => Ok(Value::Text(s)),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(CellforgeError::Codec(format!(
            "field '{}' holds a nested value",
            key
        ))),
    }
}

/// Write a table as a pretty-printed array of objects
pub fn write(table: &Table) -> CellforgeResult<Vec<u8>> {
    let names = table.column_names();
    let records: Vec<JsonValue> = table
        .rows()
        .map(|row| {
            let object: Map<String, JsonValue> = names
                .iter()
                .zip(row)
                .map(|(name, value)| (name.to_string(), json_value(&value)))
                .collect();
            JsonValue::Object(object)
        })
        .collect();

    let mut bytes = serde_json::to_vec_pretty(&records)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Integral numbers are written without a fraction; errors as literals
pub fn json_value(value: &Value) -> JsonValue {
    match value {
        Value::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                JsonValue::Number(Number::from(*n as i64))
            } else {
                Number::from_f64(*n)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null)
            }
        }
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Missing => JsonValue::Null,
        Value::Error(kind) => JsonValue::String(kind.literal().to_string()),
    }
}
