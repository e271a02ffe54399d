use async_trait::async_trait;
use csv::ReaderBuilder;

use super::plaintext::decode_text;
use super::{ExtractedText, TextExtractor, Toolbox};
use crate::error::{AttemptFailure, ExtractError};
use crate::router::Strategy;
use crate::source::SourceFile;

pub const FIELD_SEPARATOR: &str = " | ";

/// Renders CSV as one line per row, fields joined by `" | "`.
///
/// Rows may have differing field counts. Quoted fields keep embedded
/// delimiters. Non-UTF-8 input is decoded as Latin-1 first.
pub struct CsvExtractor;

impl CsvExtractor {
    pub fn new() -> Self {
        CsvExtractor
    }

    pub fn render(data: &str) -> Result<String, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_bytes());

        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record?;
            lines.push(record.iter().collect::<Vec<_>>().join(FIELD_SEPARATOR));
        }
        Ok(lines.join("\n"))
    }
}

impl Default for CsvExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for CsvExtractor {
    async fn extract(
        &self,
        source: &SourceFile,
        _toolbox: &Toolbox,
    ) -> Result<ExtractedText, ExtractError> {
        let bytes = tokio::fs::read(source.path()).await?;
        let (data, _) = decode_text(&bytes);
        let content = Self::render(&data).map_err(|e| {
            ExtractError::single_failure(self.name(), AttemptFailure::Malformed(e.to_string()))
        })?;
        Ok(ExtractedText::new(content, self.name()))
    }

    fn strategy(&self) -> Strategy {
        Strategy::Tabular
    }

    fn name(&self) -> &'static str {
        "tabular"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::tests::toolbox;

    #[test]
    fn test_render_rows() {
        let out = CsvExtractor::render("name,age\nAda,36\nAlan,41\n").unwrap();
        assert_eq!(out, "name | age\nAda | 36\nAlan | 41");
    }

    #[test]
    fn test_render_ragged_rows() {
        let out = CsvExtractor::render("a,b,c\nd\ne,f\n").unwrap();
        assert_eq!(out, "a | b | c\nd\ne | f");
    }

    #[test]
    fn test_render_quoted_delimiters() {
        let out = CsvExtractor::render("\"Smith, J\",\"said \"\"hi\"\"\"\n").unwrap();
        assert_eq!(out, "Smith, J | said \"hi\"");
    }

    #[test]
    fn test_render_quoted_fields_in_either_column() {
        let out = CsvExtractor::render("\"a,b\",c\nx,\"y,z\"\n").unwrap();
        assert_eq!(out, "a,b | c\nx | y,z");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(CsvExtractor::render("").unwrap(), "");
    }

    #[tokio::test]
    async fn test_extract_latin1_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, b"city,country\nK\xf6ln,DE\n").unwrap();

        let source = SourceFile::open(&path).unwrap();
        let text = CsvExtractor::new().extract(&source, &toolbox()).await.unwrap();
        assert_eq!(text.content, "city | country\nKöln | DE");
        assert_eq!(text.produced_by, "tabular");
    }
}
