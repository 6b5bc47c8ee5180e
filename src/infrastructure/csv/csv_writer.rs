// ============================================================
// CSV WRITER
// ============================================================
// Export a table as comma-separated UTF-8 with a header row

use std::io::Write;
use std::path::Path;

use crate::domain::error::{AppError, Result};
use crate::domain::tabular::Table;

/// Write `table` to `path`, replacing any existing file
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| {
        AppError::IoError(format!("Failed to create {}: {}", path.display(), e))
    })?;
    write_table_to(file, table)
}

/// Write `table` to any sink
pub fn write_table_to<W: Write>(sink: W, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);

    writer
        .write_record(table.columns())
        .map_err(|e| AppError::IoError(format!("Failed to write CSV header: {}", e)))?;

    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(|e| AppError::IoError(format!("Failed to write CSV row: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::IoError(format!("Failed to flush CSV output: {}", e)))
}
