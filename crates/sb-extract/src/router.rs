//! Format Router: extension group -> strategy. No content sniffing.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::ExtractError;

/// Extraction strategy selected by extension group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    PlainText,
    Tabular,
    Pdf,
    PostScript,
    UniversalConvert,
    MediaDuration,
    MediaAudioExtract,
}

const PLAIN_TEXT: &[&str] = &["txt", "md"];
const TABULAR: &[&str] = &["csv"];
const PDF: &[&str] = &["pdf"];
const POSTSCRIPT: &[&str] = &["ps", "eps"];
const UNIVERSAL: &[&str] = &[
    // Microsoft Office
    "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    // OpenOffice
    "odt", "ods", "odp",
    // E-books and rich text
    "epub", "mobi", "rtf",
];
const MEDIA: &[&str] = &[
    // Audio
    "mp3", "wav", "m4a", "flac", "ogg", "aac",
    // Video
    "mp4", "avi", "mov", "mkv", "webm", "flv",
];

/// The routing table. Media files route to duration probing; audio
/// extraction is requested explicitly and shares the media group.
const ROUTES: &[(Strategy, &[&str])] = &[
    (Strategy::PlainText, PLAIN_TEXT),
    (Strategy::Tabular, TABULAR),
    (Strategy::Pdf, PDF),
    (Strategy::PostScript, POSTSCRIPT),
    (Strategy::UniversalConvert, UNIVERSAL),
    (Strategy::MediaDuration, MEDIA),
];

impl Strategy {
    pub fn id(&self) -> &'static str {
        match self {
            Strategy::PlainText => "plain-text",
            Strategy::Tabular => "tabular",
            Strategy::Pdf => "pdf",
            Strategy::PostScript => "postscript",
            Strategy::UniversalConvert => "universal-convert",
            Strategy::MediaDuration => "media-duration",
            Strategy::MediaAudioExtract => "media-audio-extract",
        }
    }

    /// Extensions (lowercase, no dot) handled by this strategy.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Strategy::PlainText => PLAIN_TEXT,
            Strategy::Tabular => TABULAR,
            Strategy::Pdf => PDF,
            Strategy::PostScript => POSTSCRIPT,
            Strategy::UniversalConvert => UNIVERSAL,
            Strategy::MediaDuration | Strategy::MediaAudioExtract => MEDIA,
        }
    }

    /// Extensions formatted with a leading dot, for messages.
    pub fn formats(&self) -> Vec<String> {
        self.extensions().iter().map(|e| format!(".{}", e)).collect()
    }

    pub fn is_media(&self) -> bool {
        matches!(self, Strategy::MediaDuration | Strategy::MediaAudioExtract)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Route an extension (with or without the leading dot, any case).
pub fn route(extension: &str) -> Result<Strategy, ExtractError> {
    let normalized = extension.trim_start_matches('.').to_lowercase();

    ROUTES
        .iter()
        .find(|(_, exts)| exts.contains(&normalized.as_str()))
        .map(|(strategy, _)| *strategy)
        .ok_or(ExtractError::UnsupportedFormat(normalized))
}

fn path_extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

pub fn is_supported(path: &Path) -> bool {
    route(path_extension(path)).is_ok()
}

pub fn is_document(path: &Path) -> bool {
    route(path_extension(path)).is_ok_and(|s| !s.is_media())
}

pub fn is_media(path: &Path) -> bool {
    route(path_extension(path)).is_ok_and(|s| s.is_media())
}

/// Every routable extension with its dot, sorted.
pub fn supported_extensions() -> Vec<String> {
    let mut all: Vec<String> = ROUTES
        .iter()
        .flat_map(|(_, exts)| exts.iter().map(|e| format!(".{}", e)))
        .collect();
    all.sort();
    all
}
