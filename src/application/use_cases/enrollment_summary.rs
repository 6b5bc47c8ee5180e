// ============================================================
// ENROLLMENT SUMMARY USE CASE
// ============================================================

use tracing::debug;

use crate::domain::enrollment::{group_sum, top_n, EnrollmentTable, Summary};

/// Aggregate the joined table. Well defined on an empty table: zero totals,
/// no averages, empty groupings.
pub fn summarize(table: &EnrollmentTable) -> Summary {
    let records = table.records();

    let enrolled: Vec<i64> = records.iter().filter_map(|r| r.enrolled).collect();
    let total_enrollments = enrolled.iter().fold(0i64, |acc, n| acc.saturating_add(*n));
    let average_class_size = if enrolled.is_empty() {
        None
    } else {
        Some(total_enrollments as f64 / enrolled.len() as f64)
    };

    // Only rows with a real capacity count towards the fill rate
    let (filled, capacity) = records
        .iter()
        .filter_map(|r| match r.capacity {
            Some(c) if c > 0 => Some((r.enrolled.unwrap_or(0), c)),
            _ => None,
        })
        .fold((0i64, 0i64), |(e, c), (re, rc)| {
            (e.saturating_add(re), c.saturating_add(rc))
        });
    let overall_enrollment_rate = if capacity > 0 {
        Some(filled as f64 / capacity as f64 * 100.0)
    } else {
        None
    };

    let department_enrollments = group_sum(&records, |r| r.department_name.as_ref());
    let instructor_workload = group_sum(&records, |r| r.instructor_name.as_ref());
    let term_enrollments = group_sum(&records, |r| r.term.as_ref());
    let top_department = top_n(&department_enrollments, 1).into_iter().next();

    debug!(
        rows = records.len(),
        total_enrollments,
        departments = department_enrollments.len(),
        "Summarized enrollment"
    );

    Summary {
        total_enrollments,
        average_class_size,
        overall_enrollment_rate,
        department_enrollments,
        instructor_workload,
        term_enrollments,
        top_department,
    }
}
