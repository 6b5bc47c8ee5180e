// ============================================================
// CSV PARSER
// ============================================================
// Decode raw bytes under one encoding and parse them with one delimiter

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use csv::{ReaderBuilder, Trim};
use encoding_rs::{UTF_8, WINDOWS_1252};

use crate::domain::tabular::{infer_column, Delimiter, Table, TextEncoding};

/// Bytes with no mapping in code page 1252
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Why a single (encoding, delimiter) attempt was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ParseAttemptError {
    /// The bytes are not valid text in this encoding
    Decode(TextEncoding),
    /// The text decoded but is not a well-formed delimited table
    Structure(String),
}

impl fmt::Display for ParseAttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAttemptError::Decode(encoding) => {
                write!(f, "bytes are not valid {}", encoding)
            }
            ParseAttemptError::Structure(msg) => write!(f, "{}", msg),
        }
    }
}

/// Parses one file's bytes under a fixed encoding and delimiter
pub trait DelimitedParser {
    fn parse(
        &self,
        bytes: &[u8],
        encoding: TextEncoding,
        delimiter: Delimiter,
    ) -> Result<Table, ParseAttemptError>;
}

/// Header-first delimited text parser
pub struct CsvParser {
    /// Whether to trim whitespace from values
    trim: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self { trim: true }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to trim whitespace
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Strictly decode `bytes`; `None` on any byte the encoding rejects
    pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Option<Cow<'_, str>> {
        match encoding {
            TextEncoding::Utf8 => {
                let (content, had_errors) = UTF_8.decode_with_bom_removal(bytes);
                if had_errors {
                    None
                } else {
                    Some(content)
                }
            }
            TextEncoding::Latin1 | TextEncoding::Iso8859_1 => {
                Some(encoding_rs::mem::decode_latin1(bytes))
            }
            TextEncoding::Cp1252 => {
                if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    None
                } else {
                    Some(WINDOWS_1252.decode_without_bom_handling(bytes).0)
                }
            }
        }
    }

    /// Parse decoded text into a typed table.
    ///
    /// The first record is the header. Records wider than the header are
    /// rejected; narrower ones are padded with nulls. A quoted field left
    /// open at end of input is rejected.
    pub fn parse_content(&self, content: &str, delimiter: Delimiter) -> Result<Table, String> {
        if let Some(line) = unterminated_quote(content.as_bytes(), delimiter.byte()) {
            return Err(format!("EOF inside string starting at line {}", line));
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter.byte())
            .has_headers(true)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| format!("Failed to read header row: {}", e))?
            .clone();

        if headers.is_empty() {
            return Err("No columns to parse from file".to_string());
        }

        let width = headers.len();
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); width];

        for result in reader.records() {
            let record = result.map_err(|e| format!("Failed to parse record: {}", e))?;

            if record.len() > width {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                return Err(format!(
                    "Expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                ));
            }

            for (idx, column) in cells.iter_mut().enumerate() {
                let value = record.get(idx).filter(|v| !v.is_empty());
                column.push(value.map(String::from));
            }
        }

        Ok(Table::from_columns(
            unique_headers(headers.iter()),
            cells.into_iter().map(infer_column).collect(),
        ))
    }
}

impl DelimitedParser for CsvParser {
    fn parse(
        &self,
        bytes: &[u8],
        encoding: TextEncoding,
        delimiter: Delimiter,
    ) -> Result<Table, ParseAttemptError> {
        let content = Self::decode(bytes, encoding).ok_or(ParseAttemptError::Decode(encoding))?;
        self.parse_content(&content, delimiter)
            .map_err(ParseAttemptError::Structure)
    }
}

/// Line of the quoted field still open at end of input, if any. Quotes only
/// open a field when they are its first byte, as in the csv reader.
fn unterminated_quote(bytes: &[u8], delimiter: u8) -> Option<usize> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        FieldStart,
        Unquoted,
        Quoted,
        QuoteInQuoted,
    }

    let mut state = State::FieldStart;
    let mut line = 1;
    let mut opened_at = 1;

    for &b in bytes {
        state = match (state, b) {
            (State::Quoted, b'"') => State::QuoteInQuoted,
            (State::Quoted, _) => State::Quoted,
            (State::QuoteInQuoted, b'"') => State::Quoted,
            (State::FieldStart, b'"') => {
                opened_at = line;
                State::Quoted
            }
            (_, b'\n' | b'\r') => State::FieldStart,
            (_, b) if b == delimiter => State::FieldStart,
            _ => State::Unquoted,
        };
        if b == b'\n' {
            line += 1;
        }
    }

    (state == State::Quoted).then_some(opened_at)
}

/// Repeated header names get `.1`, `.2`, ... suffixes
fn unique_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::new();

    for header in headers {
        let mut name = header.to_string();
        let mut n = 1;
        while taken.contains(&name) {
            name = format!("{}.{}", header, n);
            n += 1;
        }
        taken.insert(name.clone());
        names.push(name);
    }

    names
}
