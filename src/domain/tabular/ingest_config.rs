// ============================================================
// INGEST CONFIGURATION
// ============================================================
// Ordered encoding and delimiter candidates for the table loader

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text encodings the loader knows how to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Iso8859_1,
    Cp1252,
}

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Iso8859_1 => "iso-8859-1",
            TextEncoding::Cp1252 => "cp1252",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "latin1" | "latin-1" | "l1" => Ok(TextEncoding::Latin1),
            "iso-8859-1" | "iso8859-1" => Ok(TextEncoding::Iso8859_1),
            "cp1252" | "windows-1252" => Ok(TextEncoding::Cp1252),
            other => Err(format!("unsupported encoding '{}'", other)),
        }
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(value: TextEncoding) -> Self {
        value.label().to_string()
    }
}

/// Single-byte field delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Delimiter(u8);

impl Delimiter {
    pub const COMMA: Delimiter = Delimiter(b',');
    pub const TAB: Delimiter = Delimiter(b'\t');
    pub const SEMICOLON: Delimiter = Delimiter(b';');
    pub const PIPE: Delimiter = Delimiter(b'|');

    pub fn byte(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            b'\t' => f.write_str("\\t"),
            other => write!(f, "{}", other as char),
        }
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "\\t" | "tab" | "\t" => Ok(Delimiter::TAB),
            _ => match s.as_bytes() {
                [byte] if byte.is_ascii() && !byte.is_ascii_alphanumeric() && *byte != b'"' => {
                    Ok(Delimiter(*byte))
                }
                _ => Err(format!("delimiter must be a single ASCII symbol, got '{}'", s)),
            },
        }
    }
}

impl TryFrom<String> for Delimiter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Delimiter> for String {
    fn from(value: Delimiter) -> Self {
        match value.0 {
            b'\t' => "\\t".to_string(),
            other => (other as char).to_string(),
        }
    }
}

/// Candidate lists tried by the table loader, encoding-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Encodings in the order they are tried (outer loop)
    pub encodings: Vec<TextEncoding>,

    /// Delimiters in the order they are tried (inner loop)
    pub delimiters: Vec<Delimiter>,

    /// Trim whitespace around cell values
    pub trim: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            encodings: vec![
                TextEncoding::Utf8,
                TextEncoding::Latin1,
                TextEncoding::Iso8859_1,
                TextEncoding::Cp1252,
            ],
            delimiters: vec![
                Delimiter::COMMA,
                Delimiter::TAB,
                Delimiter::SEMICOLON,
                Delimiter::PIPE,
            ],
            trim: true,
        }
    }
}

impl IngestConfig {
    /// Every (encoding, delimiter) pair in try order
    pub fn candidates(&self) -> impl Iterator<Item = (TextEncoding, Delimiter)> + '_ {
        self.encodings
            .iter()
            .flat_map(move |&enc| self.delimiters.iter().map(move |&delim| (enc, delim)))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.encodings.is_empty() {
            return Err("at least one encoding must be configured".to_string());
        }
        if self.delimiters.is_empty() {
            return Err("at least one delimiter must be configured".to_string());
        }
        Ok(())
    }
}
