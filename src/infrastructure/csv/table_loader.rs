// ============================================================
// TABLE LOADER
// ============================================================
// Try every (encoding, delimiter) candidate in order; first parse wins

use std::path::Path;

use tracing::{debug, info, warn};

use super::csv_parser::{CsvParser, DelimitedParser, ParseAttemptError};
use crate::domain::error::{AppError, Result};
use crate::domain::tabular::{Delimiter, IngestConfig, Table, TextEncoding};

/// A parsed table together with the interpretation that produced it
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub encoding: TextEncoding,
    pub delimiter: Delimiter,
}

/// Outcome of one candidate, as reported by diagnostics
#[derive(Debug, Clone)]
pub struct LoadAttempt {
    pub encoding: TextEncoding,
    pub delimiter: Delimiter,
    pub outcome: std::result::Result<Table, ParseAttemptError>,
}

/// Format-tolerant loader over a fixed candidate order
pub struct TableLoader<P = CsvParser> {
    config: IngestConfig,
    parser: P,
}

impl TableLoader<CsvParser> {
    pub fn new(config: IngestConfig) -> Self {
        let parser = CsvParser::new().with_trim(config.trim);
        Self { config, parser }
    }
}

impl<P: DelimitedParser> TableLoader<P> {
    /// Use a custom parser, e.g. an instrumented one in tests
    pub fn with_parser(config: IngestConfig, parser: P) -> Self {
        Self { config, parser }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Load a file as a table, or fail with `UnreadableFile`
    pub fn load(&self, path: &Path) -> Result<Table> {
        self.load_detailed(path).map(|loaded| loaded.table)
    }

    /// Like `load`, also reporting the winning encoding and delimiter
    pub fn load_detailed(&self, path: &Path) -> Result<LoadedTable> {
        let bytes = read_file(path)?;
        self.load_bytes(path, &bytes)
    }

    /// Run the candidate loop over bytes already in memory.
    /// `path` only names the source in logs and errors.
    pub fn load_bytes(&self, path: &Path, bytes: &[u8]) -> Result<LoadedTable> {
        for (encoding, delimiter) in self.config.candidates() {
            match self.parser.parse(bytes, encoding, delimiter) {
                Ok(table) => {
                    info!(
                        path = %path.display(),
                        %encoding,
                        %delimiter,
                        rows = table.len(),
                        columns = table.columns().len(),
                        "Loaded table"
                    );
                    return Ok(LoadedTable {
                        table,
                        encoding,
                        delimiter,
                    });
                }
                Err(err) => {
                    debug!(
                        path = %path.display(),
                        %encoding,
                        %delimiter,
                        error = %err,
                        "Candidate rejected"
                    );
                }
            }
        }

        warn!(path = %path.display(), "No encoding/delimiter candidate parsed the file");
        Err(AppError::UnreadableFile(path.to_path_buf()))
    }

    /// Every attempt up to and including the first success
    pub fn attempts(&self, bytes: &[u8]) -> Vec<LoadAttempt> {
        let mut attempts = Vec::new();
        for (encoding, delimiter) in self.config.candidates() {
            let outcome = self.parser.parse(bytes, encoding, delimiter);
            let done = outcome.is_ok();
            attempts.push(LoadAttempt {
                encoding,
                delimiter,
                outcome,
            });
            if done {
                break;
            }
        }
        attempts
    }
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::NotFound(format!("File not found: {}", path.display()))
        }
        _ => AppError::IoError(format!("Failed to read {}: {}", path.display(), e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Write;

    /// Records every attempt and succeeds only on the configured pair
    struct RecordingParser {
        accept: Option<(TextEncoding, Delimiter)>,
        seen: RefCell<Vec<(TextEncoding, Delimiter)>>,
    }

    impl RecordingParser {
        fn accepting(accept: Option<(TextEncoding, Delimiter)>) -> Self {
            Self {
                accept,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl DelimitedParser for RecordingParser {
        fn parse(
            &self,
            _bytes: &[u8],
            encoding: TextEncoding,
            delimiter: Delimiter,
        ) -> std::result::Result<Table, ParseAttemptError> {
            self.seen.borrow_mut().push((encoding, delimiter));
            if self.accept == Some((encoding, delimiter)) {
                Ok(Table::new(vec!["x".into()]))
            } else {
                Err(ParseAttemptError::Structure("rejected".into()))
            }
        }
    }

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_candidates_are_tried_encoding_major() {
        let parser = RecordingParser::accepting(Some((TextEncoding::Latin1, Delimiter::SEMICOLON)));
        let loader = TableLoader::with_parser(IngestConfig::default(), parser);

        let loaded = loader.load_bytes(Path::new("course"), b"").unwrap();
        assert_eq!(loaded.encoding, TextEncoding::Latin1);
        assert_eq!(loaded.delimiter, Delimiter::SEMICOLON);

        let seen = loader.parser.seen.borrow();
        assert_eq!(
            *seen,
            vec![
                (TextEncoding::Utf8, Delimiter::COMMA),
                (TextEncoding::Utf8, Delimiter::TAB),
                (TextEncoding::Utf8, Delimiter::SEMICOLON),
                (TextEncoding::Utf8, Delimiter::PIPE),
                (TextEncoding::Latin1, Delimiter::COMMA),
                (TextEncoding::Latin1, Delimiter::TAB),
                (TextEncoding::Latin1, Delimiter::SEMICOLON),
            ]
        );
    }

    #[test]
    fn test_all_sixteen_candidates_then_unreadable() {
        let loader = TableLoader::with_parser(IngestConfig::default(), RecordingParser::accepting(None));

        let err = loader.load_bytes(Path::new("data/section"), b"").unwrap_err();
        assert!(matches!(err, AppError::UnreadableFile(ref p) if p == Path::new("data/section")));
        assert_eq!(loader.parser.seen.borrow().len(), 16);
    }

    #[test]
    fn test_injected_candidate_lists_are_respected() {
        let config = IngestConfig {
            encodings: vec![TextEncoding::Cp1252],
            delimiters: vec![Delimiter::PIPE, Delimiter::COMMA],
            trim: true,
        };
        let loader = TableLoader::with_parser(config, RecordingParser::accepting(None));
        let _ = loader.load_bytes(Path::new("x"), b"");

        assert_eq!(
            *loader.parser.seen.borrow(),
            vec![
                (TextEncoding::Cp1252, Delimiter::PIPE),
                (TextEncoding::Cp1252, Delimiter::COMMA),
            ]
        );
    }

    #[test]
    fn test_row_count_matches_data_lines() {
        let file = write_temp(b"section_id,course_id,enrolled\n1,1,30\n2,1,25\n3,2,40\n");
        let table = TableLoader::new(IngestConfig::default()).load(file.path()).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_utf8_wins_over_latin1_for_plain_text() {
        let file = write_temp(b"id,name\n1,CS\n");
        let loaded = TableLoader::new(IngestConfig::default())
            .load_detailed(file.path())
            .unwrap();
        assert_eq!(loaded.encoding, TextEncoding::Utf8);
        assert_eq!(loaded.delimiter, Delimiter::COMMA);
    }

    #[test]
    fn test_latin1_file_falls_through_utf8() {
        let file = write_temp(b"department_id;department_name\n10;Fran\xe7ais\n");
        let loaded = TableLoader::new(IngestConfig::default())
            .load_detailed(file.path())
            .unwrap();

        assert_eq!(loaded.encoding, TextEncoding::Latin1);
        // comma comes first and the file has no comma, so it is one wide column
        assert_eq!(loaded.delimiter, Delimiter::COMMA);
        assert_eq!(loaded.table.columns().len(), 1);
    }

    #[test]
    fn test_ragged_file_is_unreadable() {
        let file = write_temp(b"a\n1,2;3\t4|5\n");
        let err = TableLoader::new(IngestConfig::default())
            .load(file.path())
            .unwrap_err();
        match err {
            AppError::UnreadableFile(path) => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_file_is_unreadable() {
        let file = write_temp(b"");
        let err = TableLoader::new(IngestConfig::default())
            .load(file.path())
            .unwrap_err();
        assert!(matches!(err, AppError::UnreadableFile(_)));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = TableLoader::new(IngestConfig::default())
            .load(Path::new("/definitely/not/here/course"))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_attempts_stop_at_first_success() {
        let loader = TableLoader::new(IngestConfig::default());
        let attempts = loader.attempts(b"a\tb\n1\t2\n");

        // comma yields a single column "a\tb" and succeeds first
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].outcome.is_ok());

        let attempts = loader.attempts(b"a\n1,2;3\t4|5\n");
        assert_eq!(attempts.len(), 16);
        assert!(attempts.iter().all(|a| a.outcome.is_err()));
    }
}
