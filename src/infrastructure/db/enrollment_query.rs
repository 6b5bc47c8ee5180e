//! SQL rendition of the in-memory enrollment join.
//!
//! Same semantics as the in-memory engine: left joins from `section`, the
//! first row wins when a right table repeats a key, a zero or missing
//! capacity gives a NULL rate, and section order is kept.
//!
//! Key comparisons go through unary `+` so SQLite applies no column
//! affinity: `'1'` never matches `1`, while `1.0` still does.

/// Right-hand tables keep only the first row (lowest rowid) per key
fn first_per_key(table: &str, key: &str) -> String {
    format!(
        "(SELECT * FROM {table} WHERE rowid IN \
         (SELECT MIN(rowid) FROM {table} GROUP BY {key}))"
    )
}

/// Build the join query. When `section` has no `department_id` column the
/// department is reached through the course's `department_id` instead.
pub fn enrollment_query(section_has_department_id: bool) -> String {
    let (department_source, extra_columns) = if section_has_department_id {
        ("s", "")
    } else {
        ("c", "c.department_id, ")
    };

    format!(
        "SELECT s.*, {extra_columns}c.course_name, i.instructor_name, d.department_name, \
         CASE WHEN s.capacity IS NULL OR s.capacity = 0 OR s.enrolled IS NULL THEN NULL \
         ELSE CAST(s.enrolled AS REAL) / s.capacity END AS enrollment_rate \
         FROM section s \
         LEFT JOIN {course} c ON +c.course_id = +s.course_id \
         LEFT JOIN {instructor} i ON +i.instructor_id = +s.instructor_id \
         LEFT JOIN {department} d ON +d.department_id = +{department_source}.department_id \
         ORDER BY s.rowid",
        course = first_per_key("course", "course_id"),
        instructor = first_per_key("instructor", "instructor_id"),
        department = first_per_key("department", "department_id"),
    )
}
