use async_trait::async_trait;
use encoding_rs::mem::decode_latin1;
use tracing::debug;

use super::{ExtractedText, TextExtractor, Toolbox};
use crate::error::ExtractError;
use crate::router::Strategy;
use crate::source::SourceFile;

/// Encoding a byte buffer was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

/// Decode as UTF-8, falling back to ISO-8859-1. Never fails: every byte
/// sequence is valid Latin-1.
pub fn decode_text(bytes: &[u8]) -> (String, TextEncoding) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), TextEncoding::Utf8),
        Err(_) => (decode_latin1(bytes).into_owned(), TextEncoding::Latin1),
    }
}

/// Reads `.txt` and `.md` files directly.
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        PlainTextExtractor
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(
        &self,
        source: &SourceFile,
        _toolbox: &Toolbox,
    ) -> Result<ExtractedText, ExtractError> {
        let bytes = tokio::fs::read(source.path()).await?;
        let (content, encoding) = decode_text(&bytes);
        if encoding == TextEncoding::Latin1 {
            debug!("{} is not UTF-8, decoded as Latin-1", source.path().display());
        }
        Ok(ExtractedText::new(content, self.name()))
    }

    fn strategy(&self) -> Strategy {
        Strategy::PlainText
    }

    fn name(&self) -> &'static str {
        "plain-text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::tests::toolbox;

    #[test]
    fn test_decode_utf8() {
        let (text, encoding) = decode_text("héllo wörld".as_bytes());
        assert_eq!(text, "héllo wörld");
        assert_eq!(encoding, TextEncoding::Utf8);
    }

    #[test]
    fn test_decode_latin1_fallback() {
        let (text, encoding) = decode_text(&[b'n', 0xE4, b'i', b'v', 0xE9]);
        assert_eq!(text, "näivé");
        assert_eq!(encoding, TextEncoding::Latin1);
    }

    #[test]
    fn test_decode_latin1_upper_range_is_not_windows_1252() {
        // 0x80 is '€' in windows-1252 but U+0080 in ISO-8859-1
        let (text, _) = decode_text(&[0x80, 0xFF]);
        assert_eq!(text, "\u{80}\u{FF}");
    }

    #[tokio::test]
    async fn test_reads_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, "# Title\n\nBody\r\n").unwrap();

        let source = SourceFile::open(&path).unwrap();
        let text = PlainTextExtractor::new()
            .extract(&source, &toolbox())
            .await
            .unwrap();
        assert_eq!(text.content, "# Title\n\nBody\r\n");
        assert_eq!(text.produced_by, "plain-text");
    }

    #[tokio::test]
    async fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let source = SourceFile::open(&path).unwrap();
        let text = PlainTextExtractor::new()
            .extract(&source, &toolbox())
            .await
            .unwrap();
        assert_eq!(text.content, "");
    }

    #[tokio::test]
    async fn test_latin1_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.txt");
        std::fs::write(&path, [b'c', b'a', b'f', 0xE9]).unwrap();

        let source = SourceFile::open(&path).unwrap();
        let text = PlainTextExtractor::new()
            .extract(&source, &toolbox())
            .await
            .unwrap();
        assert_eq!(text.content, "café");
    }
}
