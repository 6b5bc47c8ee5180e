// ============================================================
// TABLE
// ============================================================
// In-memory entity table: ordered columns and rows of typed cells

use serde::Serialize;

use super::{ColumnType, Value};

/// An ordered set of named columns with uniform rows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given header
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from typed columns of equal length
    pub fn from_columns(columns: Vec<String>, data: Vec<Vec<Value>>) -> Self {
        let row_count = data.iter().map(Vec::len).max().unwrap_or(0);
        let mut rows = vec![Vec::with_capacity(columns.len()); row_count];
        for column in &data {
            for (i, row) in rows.iter_mut().enumerate() {
                row.push(column.get(i).cloned().unwrap_or(Value::Null));
            }
        }
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row, padding with nulls or truncating to the header width
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Cell lookup by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All cells of a column, top to bottom
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn column_type(&self, idx: usize) -> ColumnType {
        ColumnType::of(self.rows.iter().filter_map(|row| row.get(idx)))
    }

    /// Replace a column's values, or append it when absent.
    /// Missing trailing values are null.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) {
        let mut values = values.into_iter();
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = values.next().unwrap_or(Value::Null);
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(values.next().unwrap_or(Value::Null));
                }
            }
        }
    }

    /// Rows for which `keep` returns true, in their original order
    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[Value]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.as_slice()))
                .cloned()
                .collect(),
        }
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(
            vec!["id".into(), "name".into()],
            vec![
                vec![Value::Int(1), Value::Int(2)],
                vec![Value::Text("a".into()), Value::Null],
            ],
        )
    }

    #[test]
    fn test_from_columns_transposes() {
        let table = sample();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "name"), Some(&Value::Text("a".into())));
        assert_eq!(table.get(1, "id"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        table.push_row(vec![Value::Int(1)]);
        assert_eq!(table.rows()[0], vec![Value::Int(1), Value::Null]);
    }

    #[test]
    fn test_set_column_and_filter() {
        let mut table = sample();
        table.set_column("flag", vec![Value::Int(0)]);
        assert_eq!(table.get(1, "flag"), Some(&Value::Null));

        let filtered = table.filter_rows(|row| !row[1].is_null());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.columns().len(), 3);
    }

    #[test]
    fn test_set_column_replaces_existing() {
        let mut table = sample();
        table.set_column("id", vec![Value::Int(7), Value::Int(8)]);
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.get(1, "id"), Some(&Value::Int(8)));
    }

    #[test]
    fn test_column_type() {
        let table = sample();
        assert_eq!(table.column_type(0), ColumnType::Int);
        assert_eq!(table.column_type(1), ColumnType::Text);
    }
}
