// ============================================================
// ENROLLMENT JOIN USE CASE
// ============================================================
// Section-driven left-outer joins plus the derived enrollment rate

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::domain::enrollment::{columns, EnrollmentTable, Entity};
use crate::domain::tabular::{Table, Value};

/// Equality key for joins. Integral floats fold into integers so `1.0`
/// matches `1`; nulls and NaN never produce a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum JoinKey {
    Int(i64),
    Float(u64),
    Text(String),
}

impl JoinKey {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Int(n) => Some(JoinKey::Int(*n)),
            Value::Float(f) if f.is_nan() => None,
            Value::Float(f) => match value.as_i64() {
                Some(n) => Some(JoinKey::Int(n)),
                None => Some(JoinKey::Float(f.to_bits())),
            },
            Value::Text(s) => Some(JoinKey::Text(s.clone())),
        }
    }
}

/// Join the four source tables into the enrollment table.
///
/// Row count always equals the section row count.
pub fn join(
    course: &Table,
    section: &Table,
    instructor: &Table,
    department: &Table,
) -> EnrollmentTable {
    let with_course = left_join(section, course, columns::COURSE_ID, Entity::Course.name());
    let with_instructor = left_join(
        &with_course,
        instructor,
        columns::INSTRUCTOR_ID,
        Entity::Instructor.name(),
    );
    let mut joined = left_join(
        &with_instructor,
        department,
        columns::DEPARTMENT_ID,
        Entity::Department.name(),
    );

    let rates = enrollment_rates(&joined);
    joined.set_column(columns::ENROLLMENT_RATE, rates);

    debug!(
        rows = joined.len(),
        columns = joined.columns().len(),
        "Joined enrollment table"
    );
    EnrollmentTable::new(joined)
}

/// Keep every row of `left`, appending the columns of the first `right` row
/// whose `key` equals the left row's `key`, or nulls when none does.
///
/// The right key column is not repeated. A right column whose name is
/// already on the left is appended as `<name>_<right_name>`.
pub fn left_join(left: &Table, right: &Table, key: &str, right_name: &str) -> Table {
    let left_key = left.column_index(key);
    let right_key = right.column_index(key);

    if left_key.is_none() {
        warn!(key, right = right_name, "Left table has no join key, right columns will be null");
    }
    if right_key.is_none() {
        warn!(key, right = right_name, "Right table has no join key, treating it as empty");
    }

    let appended: Vec<(usize, String)> = right
        .columns()
        .iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != right_key)
        .map(|(idx, name)| {
            let out = if left.has_column(name) {
                format!("{}_{}", name, right_name)
            } else {
                name.clone()
            };
            (idx, out)
        })
        .collect();

    let mut index: HashMap<JoinKey, usize> = HashMap::new();
    let mut duplicates = 0usize;
    if let Some(rk) = right_key {
        for (row_idx, row) in right.rows().iter().enumerate() {
            if let Some(k) = JoinKey::from_value(&row[rk]) {
                match index.entry(k) {
                    Entry::Vacant(slot) => {
                        slot.insert(row_idx);
                    }
                    Entry::Occupied(_) => duplicates += 1,
                }
            }
        }
    }
    if duplicates > 0 {
        warn!(
            key,
            right = right_name,
            duplicates,
            "Duplicate join keys, keeping the first row for each"
        );
    }

    let mut out_columns = left.columns().to_vec();
    out_columns.extend(appended.iter().map(|(_, name)| name.clone()));
    let mut joined = Table::new(out_columns);

    for row in left.rows() {
        let matched = left_key
            .and_then(|lk| JoinKey::from_value(&row[lk]))
            .and_then(|k| index.get(&k))
            .map(|&m| &right.rows()[m]);

        let mut out = row.clone();
        out.extend(appended.iter().map(|(idx, _)| {
            matched
                .map(|right_row| right_row[*idx].clone())
                .unwrap_or(Value::Null)
        }));
        joined.push_row(out);
    }

    joined
}

/// `enrolled / capacity` per row; null when capacity is zero or an operand
/// is missing or non-numeric
fn enrollment_rates(table: &Table) -> Vec<Value> {
    let enrolled = table.column_index(columns::ENROLLED);
    let capacity = table.column_index(columns::CAPACITY);

    table
        .rows()
        .iter()
        .map(|row| {
            let e = enrolled.and_then(|i| row[i].as_f64());
            let c = capacity.and_then(|i| row[i].as_f64());
            match (e, c) {
                (Some(e), Some(c)) if c != 0.0 => {
                    let rate = e / c;
                    if rate.is_finite() {
                        Value::Float(rate)
                    } else {
                        Value::Null
                    }
                }
                _ => Value::Null,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn course() -> Table {
        Table::from_columns(
            names(&["course_id", "course_name", "department_id"]),
            vec![vec![Value::Int(1)], vec![text("CS101")], vec![Value::Int(10)]],
        )
    }

    fn section() -> Table {
        Table::from_columns(
            names(&[
                "course_id",
                "instructor_id",
                "department_id",
                "enrolled",
                "capacity",
                "term",
            ]),
            vec![
                vec![Value::Int(1)],
                vec![Value::Int(1)],
                vec![Value::Int(10)],
                vec![Value::Int(30)],
                vec![Value::Int(50)],
                vec![text("Fall")],
            ],
        )
    }

    fn instructor() -> Table {
        Table::from_columns(
            names(&["instructor_id", "instructor_name"]),
            vec![vec![Value::Int(1)], vec![text("Dr. A")]],
        )
    }

    fn department() -> Table {
        Table::from_columns(
            names(&["department_id", "department_name"]),
            vec![vec![Value::Int(10)], vec![text("CS")]],
        )
    }

    #[test]
    fn test_single_section_scenario() {
        let joined = join(&course(), &section(), &instructor(), &department());
        let record = &joined.records()[0];

        assert_eq!(joined.len(), 1);
        assert_eq!(record.course_name.as_deref(), Some("CS101"));
        assert_eq!(record.department_name.as_deref(), Some("CS"));
        assert_eq!(record.instructor_name.as_deref(), Some("Dr. A"));
        assert_eq!(record.enrollment_rate, Some(0.6));
    }

    #[test]
    fn test_column_set_is_the_union() {
        let joined = join(&course(), &section(), &instructor(), &department());
        assert_eq!(
            joined.table().columns(),
            &names(&[
                "course_id",
                "instructor_id",
                "department_id",
                "enrolled",
                "capacity",
                "term",
                "course_name",
                "department_id_course",
                "instructor_name",
                "department_name",
                "enrollment_rate",
            ])[..]
        );
    }

    #[test]
    fn test_empty_right_tables_keep_row_count() {
        let empty_course = Table::new(names(&["course_id", "course_name", "department_id"]));
        let empty_instructor = Table::new(names(&["instructor_id", "instructor_name"]));
        let empty_department = Table::new(names(&["department_id", "department_name"]));

        let joined = join(&empty_course, &section(), &empty_instructor, &empty_department);
        let record = &joined.records()[0];

        assert_eq!(joined.len(), section().len());
        assert_eq!(record.course_name, None);
        assert_eq!(record.instructor_name, None);
        assert_eq!(record.department_name, None);
        assert_eq!(record.enrolled, Some(30));
    }

    #[test]
    fn test_right_table_without_columns_keeps_rows() {
        let joined = join(&Table::default(), &section(), &Table::default(), &Table::default());
        assert_eq!(joined.len(), 1);
        assert_eq!(joined.records()[0].enrollment_rate, Some(0.6));
    }

    #[test]
    fn test_unmatched_keys_are_null_filled() {
        let mut section = section();
        section.push_row(vec![
            Value::Int(2),
            Value::Int(9),
            Value::Int(77),
            Value::Int(5),
            Value::Int(10),
            text("Spring"),
        ]);

        let joined = join(&course(), &section, &instructor(), &department());
        let records = joined.records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].course_name, None);
        assert_eq!(records[1].instructor_name, None);
        assert_eq!(records[1].department_name, None);
        assert_eq!(records[1].enrollment_rate, Some(0.5));
    }

    #[test]
    fn test_zero_capacity_rate_is_null() {
        let section = Table::from_columns(
            names(&["course_id", "enrolled", "capacity"]),
            vec![
                vec![Value::Int(1), Value::Int(1), Value::Int(1)],
                vec![Value::Int(0), Value::Int(4), Value::Int(0)],
                vec![Value::Int(0), Value::Null, Value::Int(8)],
            ],
        );
        let joined = join(&course(), &section, &instructor(), &department());
        let rates: Vec<_> = joined.records().iter().map(|r| r.enrollment_rate).collect();

        assert_eq!(rates, vec![None, None, Some(0.0)]);
    }

    #[test]
    fn test_duplicate_right_keys_first_row_wins() {
        let mut courses = course();
        courses.push_row(vec![Value::Int(1), text("CS101-dup"), Value::Int(10)]);

        let joined = join(&courses, &section(), &instructor(), &department());
        assert_eq!(joined.len(), 1);
        assert_eq!(joined.records()[0].course_name.as_deref(), Some("CS101"));
    }

    #[test]
    fn test_float_keys_match_integer_keys() {
        let section = Table::from_columns(
            names(&["course_id"]),
            vec![vec![Value::Float(1.0), Value::Text("1".into()), Value::Null]],
        );
        let joined = left_join(&section, &course(), "course_id", "course");

        assert_eq!(joined.get(0, "course_name"), Some(&text("CS101")));
        assert_eq!(joined.get(1, "course_name"), Some(&Value::Null));
        assert_eq!(joined.get(2, "course_name"), Some(&Value::Null));
    }

    #[test]
    fn test_department_via_course_when_section_lacks_it() {
        let section = Table::from_columns(
            names(&["course_id", "instructor_id", "enrolled", "capacity"]),
            vec![
                vec![Value::Int(1)],
                vec![Value::Int(1)],
                vec![Value::Int(30)],
                vec![Value::Int(50)],
            ],
        );
        let joined = join(&course(), &section, &instructor(), &department());
        assert_eq!(joined.records()[0].department_name.as_deref(), Some("CS"));
    }
}
