// ============================================================
// ENCODING PROBER
// ============================================================
// Advisory encoding guess from raw bytes (BOM, validity, byte frequency)

use std::path::Path;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, WINDOWS_1252};
use serde::Serialize;
use tracing::debug;

use crate::domain::error::{AppError, Result};
use crate::domain::tabular::Delimiter;

/// Best guess at a file's text encoding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingGuess {
    /// Encoding label, `None` when the bytes look binary
    pub label: Option<&'static str>,

    /// 0.0 (no idea) to 1.0 (certain)
    pub confidence: f32,

    /// Whether a byte-order mark decided the guess
    pub bom: bool,
}

impl EncodingGuess {
    fn new(label: Option<&'static str>, confidence: f32, bom: bool) -> Self {
        Self {
            label,
            confidence,
            bom,
        }
    }
}

/// Statistical encoding detector
pub struct EncodingProber;

impl EncodingProber {
    /// Read a file and guess its encoding
    pub fn detect(path: &Path) -> Result<EncodingGuess> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let guess = Self::detect_bytes(&bytes);
        debug!(
            path = %path.display(),
            encoding = guess.label.unwrap_or("binary"),
            confidence = guess.confidence,
            "Probed file encoding"
        );
        Ok(guess)
    }

    /// Guess the encoding of an in-memory buffer
    pub fn detect_bytes(bytes: &[u8]) -> EncodingGuess {
        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            let label = if encoding == UTF_16LE {
                "utf-16le"
            } else if encoding == UTF_16BE {
                "utf-16be"
            } else {
                "utf-8"
            };
            return EncodingGuess::new(Some(label), 1.0, true);
        }

        if bytes.contains(&0) {
            return EncodingGuess::new(None, 0.0, false);
        }

        if encoding_rs::mem::is_ascii(bytes) {
            return EncodingGuess::new(Some("ascii"), 1.0, false);
        }

        if Encoding::utf8_valid_up_to(bytes) == bytes.len() {
            // Lead bytes of multi-byte sequences
            let sequences = bytes.iter().filter(|&&b| b >= 0xC0).count();
            let confidence = (0.74 + 0.05 * sequences as f32).min(0.99);
            return EncodingGuess::new(Some("utf-8"), confidence, false);
        }

        Self::guess_single_byte(bytes)
    }

    /// Pick between windows-1252 and iso-8859-1 by how the high bytes are used
    fn guess_single_byte(bytes: &[u8]) -> EncodingGuess {
        let high: Vec<u8> = bytes.iter().copied().filter(|&b| b >= 0x80).collect();
        let c1 = high.iter().filter(|&&b| b <= 0x9F).count();
        let undefined = high
            .iter()
            .filter(|&&b| matches!(b, 0x81 | 0x8D | 0x8F | 0x90 | 0x9D))
            .count();

        let use_cp1252 = c1 > 0 && undefined == 0;
        let letters = high
            .iter()
            .filter(|&&b| {
                let ch = if use_cp1252 {
                    WINDOWS_1252
                        .decode_without_bom_handling(&[b])
                        .0
                        .chars()
                        .next()
                        .unwrap_or('\u{FFFD}')
                } else {
                    char::from(b)
                };
                ch.is_alphabetic()
            })
            .count();

        let ratio = letters as f32 / high.len().max(1) as f32;
        let confidence = 0.4 + 0.5 * ratio;
        let label = if use_cp1252 { "windows-1252" } else { "iso-8859-1" };
        EncodingGuess::new(Some(label), confidence, false)
    }

    /// Delimiter whose per-line count is highest and most consistent
    /// over the first lines of `content`
    pub fn suggest_delimiter(content: &str, candidates: &[Delimiter]) -> Option<Delimiter> {
        let sample_lines: Vec<_> = content.lines().take(10).collect();
        if sample_lines.is_empty() {
            return None;
        }

        let mut best: Option<(Delimiter, f32)> = None;

        for &delimiter in candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter.byte()).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;
            let score = avg / (1.0 + variance.sqrt());

            if score > 0.0 && best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((delimiter, score));
            }
        }

        best.map(|(delimiter, _)| delimiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bom_wins() {
        let guess = EncodingProber::detect_bytes(b"\xef\xbb\xbfid,name\n");
        assert_eq!(guess.label, Some("utf-8"));
        assert!(guess.bom);

        let guess = EncodingProber::detect_bytes(b"\xff\xfei\x00d\x00");
        assert_eq!(guess.label, Some("utf-16le"));
    }

    #[test]
    fn test_plain_ascii() {
        let guess = EncodingProber::detect_bytes(b"course_id,course_name\n1,CS101\n");
        assert_eq!(guess.label, Some("ascii"));
        assert_eq!(guess.confidence, 1.0);
    }

    #[test]
    fn test_multibyte_utf8() {
        let guess = EncodingProber::detect_bytes("name\nJosé Müller\n".as_bytes());
        assert_eq!(guess.label, Some("utf-8"));
        assert!(guess.confidence > 0.75 && guess.confidence < 1.0);
    }

    #[test]
    fn test_single_byte_encodings() {
        let latin = EncodingProber::detect_bytes(b"name\nJos\xe9 M\xfcller\n");
        assert_eq!(latin.label, Some("iso-8859-1"));

        let cp1252 = EncodingProber::detect_bytes(b"quote\n\x93hello\x94 \x80\n");
        assert_eq!(cp1252.label, Some("windows-1252"));
    }

    #[test]
    fn test_binary_has_no_label() {
        let guess = EncodingProber::detect_bytes(b"\x89PNG\x00\x00\x00");
        assert_eq!(guess.label, None);
    }

    #[test]
    fn test_detect_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b\n1,2\n").unwrap();
        let guess = EncodingProber::detect(file.path()).unwrap();
        assert_eq!(guess.label, Some("ascii"));
    }

    #[test]
    fn test_suggest_delimiter() {
        let candidates = [
            Delimiter::COMMA,
            Delimiter::TAB,
            Delimiter::SEMICOLON,
            Delimiter::PIPE,
        ];
        assert_eq!(
            EncodingProber::suggest_delimiter("a,b,c\nd,e,f", &candidates),
            Some(Delimiter::COMMA)
        );
        assert_eq!(
            EncodingProber::suggest_delimiter("a;b;c\nd;e;f", &candidates),
            Some(Delimiter::SEMICOLON)
        );
        assert_eq!(EncodingProber::suggest_delimiter("single", &candidates), None);
    }
}
