pub mod charts;
pub mod summary_report;

use std::path::{Path, PathBuf};

use crate::application::use_cases::enrollment_pipeline::ProcessedEnrollment;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::storage::ensure_output_dir;

pub use charts::{build_charts, enrollment_overview, write_charts, Chart};
pub use summary_report::{render_summary, write_summary};

/// Write the six charts, the combined overview and the summary text under
/// `output_dir`
pub fn generate_report(processed: &ProcessedEnrollment, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = ensure_output_dir(output_dir).map_err(|e| {
        AppError::IoError(format!("Failed to create {}: {}", output_dir.display(), e))
    })?;
    let mut charts = build_charts(&processed.enrollment);
    charts.push(enrollment_overview(&processed.enrollment.records()));
    let mut written = write_charts(&charts, &dir)?;
    written.push(write_summary(&processed.summary, &dir)?);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::enrollment_summary::summarize;
    use crate::domain::enrollment::EnrollmentTable;

    #[test]
    fn test_generate_report_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("visualizations");
        let enrollment = EnrollmentTable::default();
        let processed = ProcessedEnrollment {
            summary: summarize(&enrollment),
            enrollment,
        };

        let written = generate_report(&processed, &out).unwrap();
        assert_eq!(written.len(), 8);
        assert!(out.join("enrollment_summary.txt").is_file());
        assert!(out.join("enrollment_dashboard.html").is_file());
    }
}
