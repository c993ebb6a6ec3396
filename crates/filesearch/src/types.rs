//! Record and result types shared by the index, search and persistence layers.
//!
//! These are plain owned values: a search hands its `SearchResult` to the
//! caller by move, and nothing in it borrows from the published catalogue.

use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::index::IndexBuildState;

/// One filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRecord {
    /// Absolute path of the entry.
    pub full_path: String,
    /// Last component of `full_path`.
    pub file_name: String,
    /// Parent of `full_path`.
    pub directory: String,
    /// Byte length; always 0 for directories.
    pub size: u64,
    /// Seconds since the Unix epoch, 0 when unavailable.
    pub modify_time: u64,
    pub is_directory: bool,
}

impl FileRecord {
    /// Builds a record for `path` from metadata obtained without following symlinks.
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        let is_directory = metadata.file_type().is_dir();
        Self {
            full_path: path.to_string_lossy().into_owned(),
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            directory: path
                .parent()
                .map(|parent| parent.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: if is_directory { 0 } else { metadata.len() },
            modify_time: modified_secs(metadata),
            is_directory,
        }
    }
}

/// Modification time in whole seconds, or 0 if the platform cannot report it.
pub fn modified_secs(metadata: &Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|value| value.duration_since(UNIX_EPOCH).ok())
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

/// Result of a build request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// A new catalogue was published with this many records.
    Published { entries: usize },
    /// Another build was already running; nothing changed. Retry later.
    Declined,
}

impl BuildOutcome {
    pub fn is_declined(&self) -> bool {
        matches!(self, Self::Declined)
    }
}

/// Search results handed to the caller.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The pattern that was executed.
    pub pattern: String,
    /// Matching records, in traversal order.
    pub entries: Vec<FileRecord>,
    /// Number of entries returned.
    pub count: usize,
    /// Whether accumulation stopped at `max_results`.
    pub truncated: bool,
    /// Number of records (or walked entries, for quick search) examined.
    pub scanned: usize,
    /// State of the engine's index when the search ran.
    pub index_state: IndexBuildState,
    /// Set when an indexed search found no catalogue to query. Never set by quick search.
    pub index_missing: bool,
    /// Whether the exact-name lookup replaced the linear scan.
    pub used_name_index: bool,
}

impl SearchResult {
    pub(crate) fn empty(pattern: &str, index_state: IndexBuildState) -> Self {
        Self {
            pattern: pattern.to_string(),
            entries: Vec::new(),
            count: 0,
            truncated: false,
            scanned: 0,
            index_state,
            index_missing: false,
            used_name_index: false,
        }
    }

    /// True when the search ran against an empty catalogue, as opposed to a
    /// catalogue with no matching records.
    pub fn no_index(&self) -> bool {
        self.index_missing
    }
}

/// Index status information.
#[derive(Debug, Clone)]
pub struct IndexStatus {
    /// Current state of the index.
    pub state: IndexBuildState,
    /// Number of records in the published catalogue.
    pub indexed_entries: usize,
    /// Roots the published catalogue was built from (empty after a load).
    pub roots: Vec<String>,
    /// Number of files scanned by the last build.
    pub scanned_files: usize,
    /// Number of directories scanned by the last build.
    pub scanned_dirs: usize,
    /// Entries or roots skipped because they could not be read.
    pub errors: usize,
    /// Unix timestamp when the last build started.
    pub started_at: Option<u64>,
    /// Unix timestamp when the last build finished.
    pub finished_at: Option<u64>,
}
