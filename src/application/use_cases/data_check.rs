// ============================================================
// DATA CHECK USE CASE
// ============================================================
// Per-file diagnostics: encoding guess, candidate attempts, preview

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::tabular::Table;
use crate::infrastructure::csv::{
    read_file, CsvParser, DelimitedParser, EncodingGuess, EncodingProber, LoadAttempt, TableLoader,
};
use crate::infrastructure::storage::list_data_files;

const PREVIEW_ROWS: usize = 2;

/// What the loader makes of one file
#[derive(Debug, Clone)]
pub struct FileCheck {
    pub path: PathBuf,
    pub guess: EncodingGuess,
    pub suggested_delimiter: Option<String>,
    pub attempts: Vec<LoadAttempt>,
}

impl FileCheck {
    /// The winning table, if any attempt succeeded
    pub fn table(&self) -> Option<&Table> {
        self.attempts
            .last()
            .and_then(|attempt| attempt.outcome.as_ref().ok())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Checking file: {}", self.path.display());
        let _ = writeln!(
            out,
            "Detected encoding: {} (confidence {:.2}{})",
            self.guess.label.unwrap_or("binary"),
            self.guess.confidence,
            if self.guess.bom { ", BOM" } else { "" }
        );
        if let Some(delimiter) = &self.suggested_delimiter {
            let _ = writeln!(out, "Suggested delimiter: {}", delimiter);
        }

        for attempt in &self.attempts {
            match &attempt.outcome {
                Ok(_) => {
                    let _ = writeln!(
                        out,
                        "Parsed with encoding {} and delimiter {}",
                        attempt.encoding, attempt.delimiter
                    );
                }
                Err(err) => {
                    let _ = writeln!(
                        out,
                        "Failed with encoding {} and delimiter {}: {}",
                        attempt.encoding, attempt.delimiter, err
                    );
                }
            }
        }

        match self.table() {
            Some(table) => {
                let _ = writeln!(out, "Shape: ({}, {})", table.len(), table.columns().len());
                let _ = writeln!(out, "Columns: {}", table.columns().join(", "));
                let _ = writeln!(out, "First {} rows:", PREVIEW_ROWS);
                for row in table.head(PREVIEW_ROWS).rows() {
                    let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                    let _ = writeln!(out, "  {}", cells.join(" | "));
                }
            }
            None => {
                let _ = writeln!(out, "Could not read file with any encoding or delimiter");
            }
        }
        out
    }
}

pub struct DataCheck<P = CsvParser> {
    loader: TableLoader<P>,
}

impl<P: DelimitedParser> DataCheck<P> {
    pub fn new(loader: TableLoader<P>) -> Self {
        Self { loader }
    }

    pub fn check_file(&self, path: &Path) -> Result<FileCheck> {
        let bytes = read_file(path)?;
        let guess = EncodingProber::detect_bytes(&bytes);
        let preview = String::from_utf8_lossy(&bytes);
        let suggested_delimiter =
            EncodingProber::suggest_delimiter(&preview, &self.loader.config().delimiters)
                .map(|d| d.to_string());
        let attempts = self.loader.attempts(&bytes);

        let check = FileCheck {
            path: path.to_path_buf(),
            guess,
            suggested_delimiter,
            attempts,
        };
        match check.table() {
            Some(table) => info!(
                path = %path.display(),
                rows = table.len(),
                columns = table.columns().len(),
                "File check passed"
            ),
            None => warn!(path = %path.display(), "File check found no readable interpretation"),
        }
        Ok(check)
    }

    /// Check every regular file directly under `data_dir`
    pub fn check_dir(&self, data_dir: &Path) -> Result<Vec<FileCheck>> {
        let files = list_data_files(data_dir).map_err(|e| {
            AppError::IoError(format!("Failed to list {}: {}", data_dir.display(), e))
        })?;
        files.iter().map(|path| self.check_file(path)).collect()
    }
}
