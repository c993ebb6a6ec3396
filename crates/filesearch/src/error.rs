use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FileSearchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid pattern {pattern:?}: {message}")]
    PatternSyntax { pattern: String, message: String },

    #[error("Malformed index file {path}: {message}")]
    IndexFormat { path: PathBuf, message: String },

    #[error("Index file error {path}: {message}")]
    IndexIo { path: PathBuf, message: String },

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FileSearchError>;

impl FileSearchError {
    pub(crate) fn index_format(path: &Path, message: impl Into<String>) -> Self {
        Self::IndexFormat {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn index_io(path: &Path, message: impl Into<String>) -> Self {
        Self::IndexIo {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Returns true for errors that mean "the pattern could not be compiled".
    pub fn is_pattern_error(&self) -> bool {
        matches!(self, Self::PatternSyntax { .. })
    }
}
