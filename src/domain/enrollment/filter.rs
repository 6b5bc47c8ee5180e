use serde::{Deserialize, Serialize};

use super::{columns, EnrollmentTable};
use crate::domain::tabular::Value;

pub const DEPARTMENTS_PARAM: &str = "departments";
pub const TERMS_PARAM: &str = "terms";

/// Department and term selection for the dashboard.
///
/// `None` leaves a dimension unfiltered. `Some(list)` keeps only rows whose
/// label is listed, so rows with a null label drop out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentFilter {
    pub departments: Option<Vec<String>>,
    pub terms: Option<Vec<String>>,
}

impl EnrollmentFilter {
    /// Build from repeated query parameters (`departments=A&departments=B`).
    ///
    /// A parameter that appears at all turns its dimension on; empty values
    /// only mark it present, so `departments=` selects nothing. Unknown keys
    /// are ignored.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut filter = Self::default();
        for (key, value) in pairs {
            let slot = match key {
                DEPARTMENTS_PARAM => &mut filter.departments,
                TERMS_PARAM => &mut filter.terms,
                _ => continue,
            };
            let list = slot.get_or_insert_with(Vec::new);
            if !value.is_empty() {
                list.push(value.to_string());
            }
        }
        filter
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_none() && self.terms.is_none()
    }

    pub fn apply(&self, table: &EnrollmentTable) -> EnrollmentTable {
        if self.is_empty() {
            return table.clone();
        }

        let inner = table.table();
        let department_idx = inner.column_index(columns::DEPARTMENT_NAME);
        let term_idx = inner.column_index(columns::TERM);

        let filtered = inner.filter_rows(|row| {
            selected(&self.departments, department_idx.map(|i| &row[i]))
                && selected(&self.terms, term_idx.map(|i| &row[i]))
        });
        EnrollmentTable::new(filtered)
    }
}

fn selected(choice: &Option<Vec<String>>, cell: Option<&Value>) -> bool {
    match choice {
        None => true,
        Some(allowed) => cell
            .and_then(Value::as_label)
            .map(|label| allowed.contains(&label))
            .unwrap_or(false),
    }
}
