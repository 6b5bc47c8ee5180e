// ============================================================
// CELL VALUES
// ============================================================
// Typed cells and per-column type inference

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view; integral floats count, text does not
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Label used for grouping and filtering; `None` for nulls
    pub fn as_label(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Storage type of a whole column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Text,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Int => "INTEGER",
            ColumnType::Float => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// Widest type present among the cells; all-null columns are text
    pub fn of<'a>(cells: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut seen_int = false;
        let mut seen_float = false;
        for cell in cells {
            match cell {
                Value::Text(_) => return ColumnType::Text,
                Value::Float(_) => seen_float = true,
                Value::Int(_) => seen_int = true,
                Value::Null => {}
            }
        }
        if seen_float {
            ColumnType::Float
        } else if seen_int {
            ColumnType::Int
        } else {
            ColumnType::Text
        }
    }
}

/// Convert raw cells of one column into typed values.
///
/// Every non-empty cell parsing as `i64` makes an integer column; otherwise
/// every cell parsing as `f64` makes a float column; anything else stays text.
/// Empty cells become `Null` in all cases.
pub fn infer_column(raw: Vec<Option<String>>) -> Vec<Value> {
    let present = || raw.iter().flatten().map(|s| s.trim());

    if present().all(|s| s.parse::<i64>().is_ok()) {
        return raw
            .iter()
            .map(|cell| match cell {
                Some(s) => s.trim().parse::<i64>().map(Value::Int).unwrap_or(Value::Null),
                None => Value::Null,
            })
            .collect();
    }

    if present().all(|s| s.parse::<f64>().is_ok()) {
        return raw
            .iter()
            .map(|cell| match cell {
                Some(s) => s.trim().parse::<f64>().map(Value::Float).unwrap_or(Value::Null),
                None => Value::Null,
            })
            .collect();
    }

    raw.into_iter()
        .map(|cell| cell.map(Value::Text).unwrap_or(Value::Null))
        .collect()
}
