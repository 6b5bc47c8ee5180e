use serde::Serialize;

use super::columns;
use crate::domain::tabular::{Table, Value};

/// The joined section-level table with its derived rate column
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrollmentTable {
    table: Table,
}

/// Typed view of the columns the summaries and charts read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentRecord {
    pub course_name: Option<String>,
    pub department_name: Option<String>,
    pub instructor_name: Option<String>,
    pub term: Option<String>,
    pub enrolled: Option<i64>,
    pub capacity: Option<i64>,
    pub enrollment_rate: Option<f64>,
}

impl EnrollmentTable {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Typed rows; absent columns read as null
    pub fn records(&self) -> Vec<EnrollmentRecord> {
        let idx = |name: &str| self.table.column_index(name);
        let course = idx(columns::COURSE_NAME);
        let department = idx(columns::DEPARTMENT_NAME);
        let instructor = idx(columns::INSTRUCTOR_NAME);
        let term = idx(columns::TERM);
        let enrolled = idx(columns::ENROLLED);
        let capacity = idx(columns::CAPACITY);
        let rate = idx(columns::ENROLLMENT_RATE);

        let cell = |row: &[Value], at: Option<usize>| -> Option<Value> {
            at.and_then(|i| row.get(i)).cloned()
        };

        self.table
            .rows()
            .iter()
            .map(|row| EnrollmentRecord {
                course_name: cell(row, course).and_then(|v| v.as_label()),
                department_name: cell(row, department).and_then(|v| v.as_label()),
                instructor_name: cell(row, instructor).and_then(|v| v.as_label()),
                term: cell(row, term).and_then(|v| v.as_label()),
                enrolled: cell(row, enrolled).and_then(|v| v.as_i64()),
                capacity: cell(row, capacity).and_then(|v| v.as_i64()),
                enrollment_rate: cell(row, rate).and_then(|v| v.as_f64()),
            })
            .collect()
    }

    /// Distinct non-null labels of a column in first-seen order
    pub fn distinct(&self, column: &str) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        if let Some(values) = self.table.column(column) {
            for label in values.filter_map(Value::as_label) {
                if !seen.contains(&label) {
                    seen.push(label);
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_read_missing_columns_as_null() {
        let table = Table::from_columns(
            vec![columns::ENROLLED.into(), columns::TERM.into()],
            vec![
                vec![Value::Int(30), Value::Float(12.0)],
                vec![Value::Text("Fall".into()), Value::Null],
            ],
        );
        let records = EnrollmentTable::new(table).records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].enrolled, Some(30));
        assert_eq!(records[1].enrolled, Some(12));
        assert_eq!(records[0].term.as_deref(), Some("Fall"));
        assert_eq!(records[0].department_name, None);
        assert_eq!(records[0].enrollment_rate, None);
    }

    #[test]
    fn test_distinct_skips_nulls() {
        let table = Table::from_columns(
            vec![columns::TERM.into()],
            vec![vec![
                Value::Text("Fall".into()),
                Value::Null,
                Value::Text("Spring".into()),
                Value::Text("Fall".into()),
            ]],
        );
        let terms = EnrollmentTable::new(table).distinct(columns::TERM);
        assert_eq!(terms, vec!["Fall".to_string(), "Spring".to_string()]);
    }
}
