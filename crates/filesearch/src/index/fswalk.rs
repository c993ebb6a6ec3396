//! Filesystem walking for index builds and quick search.
//!
//! Both walkers visit entries in the same order: depth-first preorder, with
//! each directory's children sorted by file name. A directory's record
//! precedes the records of its subtree. The root itself is never recorded.
//!
//! Symlinks are never followed. A symlink is reported as a non-directory entry
//! carrying the metadata of the link itself, so a cyclic tree cannot loop.

use std::fs::{self, DirEntry};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;

use super::build::IndexBuildProgress;
use crate::error::{FileSearchError, Result};
use crate::filter::FilterSet;
use crate::types::FileRecord;

/// Pruning rules shared by both walkers.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub filters: FilterSet,
    pub include_hidden: bool,
}

impl EntryFilter {
    pub fn new(filters: FilterSet, include_hidden: bool) -> Self {
        Self {
            filters,
            include_hidden,
        }
    }

    /// Returns true if the entry is recorded (and, for a directory, descended into).
    pub fn accepts(&self, name: &str, path: &str, is_dir: bool) -> bool {
        if !self.include_hidden && name.starts_with('.') {
            return false;
        }
        if is_dir {
            self.filters.should_include_directory(path)
        } else {
            self.filters.should_include_file(path, name)
        }
    }
}

/// Data passed to the build walker.
#[derive(Debug)]
pub struct WalkData<'a> {
    pub filter: &'a EntryFilter,
    /// Optional progress tracker.
    pub progress: Option<&'a IndexBuildProgress>,
}

impl<'a> WalkData<'a> {
    pub fn new(filter: &'a EntryFilter) -> Self {
        Self {
            filter,
            progress: None,
        }
    }

    /// Sets the progress tracker.
    pub fn with_progress(mut self, progress: &'a IndexBuildProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    fn record_error(&self) {
        if let Some(progress) = self.progress {
            progress.record_error();
        }
    }
}

/// Resolves `root` to an absolute directory path.
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(root)?;
    let metadata = fs::metadata(&absolute).map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            FileSearchError::PathNotFound(absolute.clone())
        } else {
            FileSearchError::Io(error)
        }
    })?;
    if !metadata.is_dir() {
        return Err(FileSearchError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("not a directory: {}", absolute.display()),
        )));
    }
    Ok(absolute)
}

/// Walks one root and returns its records in traversal order.
///
/// Fails only when the root itself cannot be used; unreadable entries below
/// it are skipped and counted as errors.
pub fn walk_root(root: &Path, walk_data: &WalkData) -> Result<Vec<FileRecord>> {
    let root = resolve_root(root)?;
    if !walk_data
        .filter
        .filters
        .should_include_directory(&root.to_string_lossy())
    {
        log::debug!("root {} is excluded by filters", root.display());
        return Ok(Vec::new());
    }
    Ok(walk_dir(&root, walk_data))
}

/// Core recursive walk: children are visited in parallel and reassembled in
/// name order.
fn walk_dir(dir: &Path, walk_data: &WalkData) -> Vec<FileRecord> {
    let read_dir = match fs::read_dir(dir) {
        Ok(iter) => iter,
        Err(error) => {
            log::debug!("skipping unreadable directory {}: {error}", dir.display());
            walk_data.record_error();
            return Vec::new();
        }
    };

    let mut entries: Vec<DirEntry> = read_dir
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(error) => {
                log::debug!("skipping entry in {}: {error}", dir.display());
                walk_data.record_error();
                None
            }
        })
        .collect();
    entries.sort_unstable_by_key(|entry| entry.file_name());

    let chunks: Vec<Vec<FileRecord>> = entries
        .into_par_iter()
        .filter_map(|entry| visit_entry(&entry, walk_data))
        .collect();

    chunks.into_iter().flatten().collect()
}

/// Records one entry and, for a directory, its whole subtree.
fn visit_entry(entry: &DirEntry, walk_data: &WalkData) -> Option<Vec<FileRecord>> {
    let file_name = entry.file_name();
    let name = file_name.to_string_lossy();
    if !walk_data.filter.include_hidden && name.starts_with('.') {
        return None;
    }

    let path = entry.path();
    let metadata = match fs::symlink_metadata(&path) {
        Ok(metadata) => metadata,
        Err(error) => {
            log::debug!("skipping {}: {error}", path.display());
            walk_data.record_error();
            return None;
        }
    };
    let is_dir = metadata.file_type().is_dir();
    if !walk_data
        .filter
        .accepts(&name, &path.to_string_lossy(), is_dir)
    {
        return None;
    }

    let record = FileRecord::from_metadata(&path, &metadata);
    if !is_dir {
        if let Some(progress) = walk_data.progress {
            progress.record_file();
        }
        return Some(vec![record]);
    }

    if let Some(progress) = walk_data.progress {
        progress.record_dir();
    }
    let mut records = vec![record];
    records.extend(walk_dir(&path, walk_data));
    Some(records)
}

/// Walks `root` sequentially in traversal order, handing every surviving
/// entry to `visit` until it breaks. Returns the number of entries visited.
pub fn walk_visit<F>(root: &Path, filter: &EntryFilter, mut visit: F) -> Result<usize>
where
    F: FnMut(&ignore::DirEntry) -> ControlFlow<()>,
{
    let root = resolve_root(root)?;
    if !filter.filters.should_include_directory(&root.to_string_lossy()) {
        return Ok(0);
    }

    let entry_filter = filter.clone();
    let walker = WalkBuilder::new(&root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().is_some_and(|file_type| file_type.is_dir());
            entry_filter.accepts(
                &entry.file_name().to_string_lossy(),
                &entry.path().to_string_lossy(),
                is_dir,
            )
        })
        .build();

    let mut visited = 0usize;
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(error) => {
                log::debug!("quick search skipped an entry: {error}");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        visited += 1;
        if visit(&entry).is_break() {
            break;
        }
    }
    Ok(visited)
}
