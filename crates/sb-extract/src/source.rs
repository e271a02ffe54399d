use std::path::{Path, PathBuf};

use crate::error::ExtractError;

/// An input file as seen by one extraction call.
///
/// The subsystem never deletes, renames or writes to the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    extension: String,
    exists: bool,
}

impl SourceFile {
    /// Build a source from a caller path. Relative paths are made absolute
    /// against the current directory when possible.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let exists = path.exists();

        SourceFile {
            path,
            extension,
            exists,
        }
    }

    /// Like [`SourceFile::new`], but fails with `NotFound` for a missing path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let source = Self::new(path);
        if !source.exists {
            return Err(ExtractError::NotFound(source.path));
        }
        Ok(source)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lowercase extension without the leading dot; empty if there is none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
