//! Search options.

use serde::{Deserialize, Serialize};

/// Default head-truncation bound for a search.
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// Options that steer index builds and searches.
///
/// `include_hidden` and `case_sensitive` are also read at build time: hidden
/// entries are pruned during the walk, and the name index is keyed by folded
/// names unless the build ran case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    /// Whole-candidate equality instead of containment.
    pub whole_word: bool,
    pub use_regex: bool,
    /// Match against the full path instead of the file name.
    pub search_in_path: bool,
    pub include_hidden: bool,
    pub dirs_only: bool,
    pub files_only: bool,
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            whole_word: false,
            use_regex: false,
            search_in_path: false,
            include_hidden: false,
            dirs_only: false,
            files_only: false,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl SearchOptions {
    /// Applies the `dirs_only` / `files_only` type filters.
    ///
    /// With both flags set no entry passes.
    pub fn type_filter_passes(&self, is_directory: bool) -> bool {
        if self.dirs_only && !is_directory {
            return false;
        }
        if self.files_only && is_directory {
            return false;
        }
        true
    }
}
