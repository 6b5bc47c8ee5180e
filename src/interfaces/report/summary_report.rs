// ============================================================
// SUMMARY REPORT
// ============================================================

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::enrollment::Summary;
use crate::domain::error::{AppError, Result};

pub const SUMMARY_FILE: &str = "enrollment_summary.txt";

const NOT_AVAILABLE: &str = "N/A";

/// `1234567` as `1,234,567`
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn one_decimal(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}%", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn render_summary(summary: &Summary) -> String {
    let (top_name, top_total) = match &summary.top_department {
        Some((name, total)) => (name.clone(), thousands(*total)),
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    };

    format!(
        "Enrollment Summary\n\
         =================\n\n\
         Total Enrollments: {}\n\
         Average Class Size: {}\n\
         Overall Enrollment Rate: {}\n\
         Top Department: {}\n\
         Top Department Enrollment: {}\n",
        thousands(summary.total_enrollments),
        one_decimal(summary.average_class_size),
        percent(summary.overall_enrollment_rate),
        top_name,
        top_total,
    )
}

pub fn write_summary(summary: &Summary, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(SUMMARY_FILE);
    std::fs::write(&path, render_summary(summary))
        .map_err(|e| AppError::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
    info!(path = %path.display(), "Summary report saved");
    Ok(path)
}
