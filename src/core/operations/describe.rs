//! Summary statistics for numeric columns

use crate::error::CellforgeResult;
use crate::types::{unique_name, Column, ColumnType, Table};
use crate::value::Value;
use serde::Serialize;

/// Statistics for one Number column. Fields other than `count` are `None`
/// when the column has no numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1); 0 when count < 2
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Output of `describe`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub columns: Vec<ColumnStats>,
}

/// Row labels of [`Report::to_table`]
pub const STAT_NAMES: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

impl Report {
    /// Tabular form: a `stat` column followed by one column per described
    /// column, one row per statistic
    pub fn to_table(&self) -> CellforgeResult<Table> {
        let mut columns = vec![Column::new(
            "stat",
            STAT_NAMES.iter().map(|s| Value::from(*s)).collect(),
        )];

        for stats in &self.columns {
            let cell = |v: Option<f64>| v.map(Value::Number).unwrap_or(Value::Missing);
            let existing: Vec<&str> = columns.iter().map(Column::name).collect();
            let name = unique_name(&stats.column, &existing);
            columns.push(Column::new(
                name,
                vec![
                    Value::Number(stats.count as f64),
                    cell(stats.mean),
                    cell(stats.std),
                    cell(stats.min),
                    cell(stats.q25),
                    cell(stats.q50),
                    cell(stats.q75),
                    cell(stats.max),
                ],
            ));
        }

        Table::new(columns)
    }
}

/// Describe every Number-typed column; other columns are omitted
pub fn describe(table: &Table) -> Report {
    Report {
        columns: table
            .columns()
            .iter()
            .filter(|c| c.column_type() == ColumnType::Number)
            .map(column_stats)
            .collect(),
    }
}

fn column_stats(column: &Column) -> ColumnStats {
    let mut values: Vec<f64> = column.values().iter().filter_map(Value::as_number).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let count = values.len();

    if count == 0 {
        return ColumnStats {
            column: column.name().to_string(),
            count,
            mean: None,
            std: None,
            min: None,
            q25: None,
            q50: None,
            q75: None,
            max: None,
        };
    }

    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count < 2 {
        0.0
    } else {
        let variance =
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    };

    ColumnStats {
        column: column.name().to_string(),
        count,
        mean: Some(mean),
        std: Some(std),
        min: values.first().copied(),
        q25: Some(quantile(&values, 0.25)),
        q50: Some(quantile(&values, 0.50)),
        q75: Some(quantile(&values, 0.75)),
        max: values.last().copied(),
    }
}

/// Linear interpolation between closest ranks at position `(n - 1) * p`.
/// `sorted` must be non-empty and ascending.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * p;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
