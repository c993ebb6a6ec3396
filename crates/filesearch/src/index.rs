//! Filesystem indexing module.
//!
//! - `build` - Build state, the single-build lease and progress tracking
//! - `catalogue` - Record store plus derived `NameIndex`
//! - `fswalk` - Filesystem walking with pruning (build and quick search)
//! - `persistence` - Snapshot read/write operations

mod build;
mod catalogue;
mod fswalk;
mod persistence;

use std::path::Path;

use crate::types::FileRecord;

pub use build::{
    unix_now_secs, BuildLease, IndexBuildProgress, IndexBuildState, ProgressSnapshot,
};
pub use catalogue::{Catalogue, NameIndex};
pub use fswalk::{resolve_root, walk_root, walk_visit, EntryFilter, WalkData};
pub use persistence::{decode_records, encode_records, load_catalogue, save_catalogue};

/// Walks every root in order into one catalogue.
///
/// A root that cannot be walked is logged, counted as an error and skipped.
pub fn build_catalogue<P: AsRef<Path>>(
    roots: &[P],
    walk_data: &WalkData,
    case_sensitive: bool,
) -> Catalogue {
    let mut records: Vec<FileRecord> = Vec::new();
    let mut walked_roots = Vec::with_capacity(roots.len());

    for root in roots {
        let root = root.as_ref();
        match walk_root(root, walk_data) {
            Ok(root_records) => {
                log::debug!(
                    "indexed root={} entries={}",
                    root.display(),
                    root_records.len()
                );
                records.extend(root_records);
                walked_roots.push(root.to_string_lossy().into_owned());
            }
            Err(error) => {
                log::warn!("skipping index root {}: {error}", root.display());
                if let Some(progress) = walk_data.progress {
                    progress.record_error();
                }
            }
        }
    }

    Catalogue::new(records, case_sensitive).with_roots(walked_roots)
}
