use google_sheets4::api::ValueRange;
use serde_json::Value;

use crate::domain::sheets::a1_notation::A1Notation;

pub trait ValueRangeFactory {
    fn from_rows(range: &A1Notation, rows: &[Vec<String>]) -> Self;
}

fn wrap_value(value: &str) -> Value {
    Value::String(value.to_owned())
}

impl ValueRangeFactory for ValueRange {
    fn from_rows(range: &A1Notation, rows: &[Vec<String>]) -> Self {
        ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: Some(range.to_string()),
            values: Some(
                rows.iter()
                    .map(|row| row.iter().map(|cell| wrap_value(cell)).collect())
                    .collect(),
            ),
        }
    }
}

/// Converts API cell values into display strings.
pub trait IntoCells {
    fn into_cells(self) -> Vec<Vec<String>>;
}

impl IntoCells for Vec<Vec<Value>> {
    fn into_cells(self) -> Vec<Vec<String>> {
        self.into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
