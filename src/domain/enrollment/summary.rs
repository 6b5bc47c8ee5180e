use serde::Serialize;
use std::collections::BTreeMap;

use super::EnrollmentRecord;

/// Headline numbers and grouped totals for one enrollment table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_enrollments: i64,
    /// Mean of `enrolled`; `None` when no row carries a value
    pub average_class_size: Option<f64>,
    /// Percent of capacity filled, over rows with capacity > 0
    pub overall_enrollment_rate: Option<f64>,
    pub department_enrollments: BTreeMap<String, i64>,
    pub instructor_workload: BTreeMap<String, i64>,
    pub term_enrollments: BTreeMap<String, i64>,
    pub top_department: Option<(String, i64)>,
}

/// Sum `enrolled` per group label. Rows with a null label are dropped and
/// totals saturate at `i64::MAX`.
pub fn group_sum<F>(records: &[EnrollmentRecord], key: F) -> BTreeMap<String, i64>
where
    F: Fn(&EnrollmentRecord) -> Option<&String>,
{
    let mut groups = BTreeMap::new();
    for record in records {
        if let Some(label) = key(record) {
            let total = groups.entry(label.clone()).or_insert(0i64);
            *total = total.saturating_add(record.enrolled.unwrap_or(0));
        }
    }
    groups
}

/// Largest groups first; equal totals keep label order
pub fn top_n(groups: &BTreeMap<String, i64>, n: usize) -> Vec<(String, i64)> {
    let mut ranked: Vec<(String, i64)> = groups.iter().map(|(k, v)| (k.clone(), *v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(department: Option<&str>, enrolled: i64) -> EnrollmentRecord {
        EnrollmentRecord {
            course_name: None,
            department_name: department.map(String::from),
            instructor_name: None,
            term: None,
            enrolled: Some(enrolled),
            capacity: None,
            enrollment_rate: None,
        }
    }

    #[test]
    fn test_group_sum_drops_null_keys() {
        let records = vec![
            record(Some("CS"), 10),
            record(None, 99),
            record(Some("CS"), 5),
            record(Some("Math"), 7),
        ];
        let groups = group_sum(&records, |r| r.department_name.as_ref());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["CS"], 15);
        assert_eq!(groups["Math"], 7);
    }

    #[test]
    fn test_group_sum_saturates_instead_of_overflowing() {
        let records = vec![record(Some("CS"), i64::MAX), record(Some("CS"), 1)];
        let groups = group_sum(&records, |r| r.department_name.as_ref());
        assert_eq!(groups["CS"], i64::MAX);
    }

    #[test]
    fn test_top_n_is_stable_on_ties() {
        let mut groups = BTreeMap::new();
        groups.insert("b".to_string(), 5);
        groups.insert("a".to_string(), 5);
        groups.insert("c".to_string(), 9);

        let top = top_n(&groups, 2);
        assert_eq!(top, vec![("c".to_string(), 9), ("a".to_string(), 5)]);
    }
}
