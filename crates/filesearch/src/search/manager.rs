//! FileSearchEngine - main API for building, persisting and searching an index.

use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use super::engine::{quick_search, search_catalogue};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::filter::FilterSet;
use crate::index::{
    build_catalogue, load_catalogue, save_catalogue, unix_now_secs, BuildLease, Catalogue,
    EntryFilter, IndexBuildProgress, IndexBuildState, WalkData,
};
use crate::options::SearchOptions;
use crate::types::{BuildOutcome, IndexStatus, SearchResult};

/// An explicit engine value owning the published catalogue, the active
/// options and filters, and the build state.
///
/// The catalogue is published as an `Arc` snapshot: a search clones the
/// handle once and keeps reading that catalogue even if a build swaps in a
/// new one meanwhile. At most one build runs at a time; a build requested
/// while another is running returns [`BuildOutcome::Declined`].
#[derive(Debug, Default)]
pub struct FileSearchEngine {
    catalogue: RwLock<Arc<Catalogue>>,
    options: RwLock<SearchOptions>,
    filters: RwLock<FilterSet>,
    build_state: AtomicU8,
    progress: IndexBuildProgress,
}

impl FileSearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the options and filters from `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        let engine = Self::new();
        engine.set_search_options(config.options.clone());
        *engine.filters.write() = config.filters.to_filter_set();
        engine
    }

    /// Drops the published index and resets filters and options to defaults.
    pub fn init(&self) {
        self.clear_index();
        self.clear_filters();
        self.set_search_options(SearchOptions::default());
        self.progress.reset();
    }

    /// Builds an index of `root` and publishes it.
    pub fn build_index(&self, root: impl AsRef<Path>) -> BuildOutcome {
        self.build_index_multiple(&[root])
    }

    /// Builds one index covering `roots`, in the given order, and publishes it.
    ///
    /// Roots that cannot be walked are logged and skipped. Options and filters
    /// are read once when the build starts.
    pub fn build_index_multiple<P: AsRef<Path>>(&self, roots: &[P]) -> BuildOutcome {
        let Some(lease) = self.build_lease() else {
            log::info!("index build declined: another build is running");
            return BuildOutcome::Declined;
        };

        let started = Instant::now();
        self.progress.reset_for_build(unix_now_secs());
        let options = self.search_options();
        let entry_filter = EntryFilter::new(self.filters(), options.include_hidden);
        let walk_data = WalkData::new(&entry_filter).with_progress(&self.progress);

        let catalogue = build_catalogue(roots, &walk_data, options.case_sensitive);
        let entries = catalogue.len();
        let root_count = catalogue.roots().len();
        *self.catalogue.write() = Arc::new(catalogue);

        self.progress
            .finished_at
            .store(unix_now_secs(), Ordering::Relaxed);
        lease.finish(IndexBuildState::Ready);

        let progress = self.progress.snapshot();
        log::info!(
            "index build complete roots={} entries={} files={} dirs={} errors={} elapsed_ms={}",
            root_count,
            entries,
            progress.scanned_files,
            progress.scanned_dirs,
            progress.errors,
            started.elapsed().as_millis(),
        );
        BuildOutcome::Published { entries }
    }

    /// Searches the published index with the engine's current options.
    pub fn search(&self, pattern: &str) -> Result<SearchResult> {
        let options = self.search_options();
        self.search_with_options(pattern, &options)
    }

    /// Searches the published index with explicit options.
    pub fn search_with_options(&self, pattern: &str, options: &SearchOptions) -> Result<SearchResult> {
        let started = Instant::now();
        let state = self.state();
        let catalogue = self.snapshot();
        let result = search_catalogue(&catalogue, pattern, options, state)?;
        if result.no_index() {
            log::info!(
                "search pattern={:?} found no index to query state={}",
                pattern,
                state.as_str()
            );
        }
        log::info!(
            "search complete pattern={:?} matches={} elapsed_ms={}",
            pattern,
            result.count,
            started.elapsed().as_millis(),
        );
        Ok(result)
    }

    /// Walks `root` and matches during the walk, without building or
    /// touching the published index. Uses the engine's options and filters.
    pub fn quick_search(&self, root: impl AsRef<Path>, pattern: &str) -> Result<SearchResult> {
        let root = root.as_ref();
        let started = Instant::now();
        let options = self.search_options();
        let filters = self.filters();

        let result = quick_search(root, pattern, &options, &filters, self.state())?;
        log::info!(
            "quick search complete root={} pattern={:?} matches={} elapsed_ms={}",
            root.display(),
            pattern,
            result.count,
            started.elapsed().as_millis(),
        );
        Ok(result)
    }

    /// Publishes an empty catalogue.
    pub fn clear_index(&self) {
        *self.catalogue.write() = Arc::new(Catalogue::empty());
        self.settle_state(IndexBuildState::Idle);
    }

    /// Number of records in the published catalogue.
    pub fn indexed_count(&self) -> usize {
        self.catalogue.read().len()
    }

    /// Writes the published catalogue to `path`; returns the record count.
    pub fn save_index(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let catalogue = self.snapshot();
        save_catalogue(&catalogue, path).inspect_err(|error| {
            log::warn!("index save to {} failed: {error}", path.display());
        })
    }

    /// Replaces the published catalogue with the one stored at `path`.
    ///
    /// The file is read and validated in full before anything is published;
    /// on failure the current catalogue stays in place.
    pub fn load_index(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let case_sensitive = self.options.read().case_sensitive;
        let catalogue = load_catalogue(path, case_sensitive).inspect_err(|error| {
            log::warn!("index load from {} failed: {error}", path.display());
        })?;
        let entries = catalogue.len();
        *self.catalogue.write() = Arc::new(catalogue);
        self.settle_state(IndexBuildState::Ready);
        Ok(entries)
    }

    pub fn add_include_extension(&self, extension: &str) {
        self.filters.write().add_include_extension(extension);
    }

    pub fn remove_include_extension(&self, extension: &str) -> bool {
        self.filters.write().remove_include_extension(extension)
    }

    pub fn add_exclude_extension(&self, extension: &str) {
        self.filters.write().add_exclude_extension(extension);
    }

    pub fn remove_exclude_extension(&self, extension: &str) -> bool {
        self.filters.write().remove_exclude_extension(extension)
    }

    /// Adds a path substring; directories whose path contains it are pruned.
    pub fn add_exclude_directory(&self, directory: &str) {
        self.filters.write().add_exclude_directory(directory);
    }

    pub fn remove_exclude_directory(&self, directory: &str) -> bool {
        self.filters.write().remove_exclude_directory(directory)
    }

    pub fn clear_filters(&self) {
        self.filters.write().clear();
    }

    /// Returns a copy of the active filters.
    pub fn filters(&self) -> FilterSet {
        self.filters.read().clone()
    }

    pub fn set_search_options(&self, options: SearchOptions) {
        *self.options.write() = options;
    }

    pub fn search_options(&self) -> SearchOptions {
        self.options.read().clone()
    }

    /// Returns the currently published catalogue.
    pub fn snapshot(&self) -> Arc<Catalogue> {
        self.catalogue.read().clone()
    }

    pub fn is_building(&self) -> bool {
        self.state() == IndexBuildState::Building
    }

    /// Returns the index status.
    pub fn index_status(&self) -> IndexStatus {
        let catalogue = self.snapshot();
        let progress = self.progress.snapshot();
        IndexStatus {
            state: self.state(),
            indexed_entries: catalogue.len(),
            roots: catalogue.roots().to_vec(),
            scanned_files: progress.scanned_files,
            scanned_dirs: progress.scanned_dirs,
            errors: progress.errors,
            started_at: progress.started_at,
            finished_at: progress.finished_at,
        }
    }

    pub(super) fn build_lease(&self) -> Option<BuildLease<'_>> {
        BuildLease::acquire(&self.build_state)
    }

    fn state(&self) -> IndexBuildState {
        IndexBuildState::load(&self.build_state)
    }

    /// Moves to `next` unless a build holds the state.
    fn settle_state(&self, next: IndexBuildState) {
        let _ = self
            .build_state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != IndexBuildState::Building as u8).then_some(next as u8)
            });
    }
}
