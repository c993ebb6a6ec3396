//! Search execution over a published catalogue or a live directory walk.

use std::ops::ControlFlow;
use std::path::Path;

use crate::error::Result;
use crate::filter::FilterSet;
use crate::index::{walk_visit, Catalogue, EntryFilter, IndexBuildState};
use crate::options::SearchOptions;
use crate::query::PatternMatcher;
use crate::types::{FileRecord, SearchResult};

/// Runs `pattern` against `catalogue`.
///
/// Matches are returned in catalogue order and truncated after
/// `options.max_results`. An invalid regular expression is reported as
/// `FileSearchError::PatternSyntax` before any record is examined.
pub fn search_catalogue(
    catalogue: &Catalogue,
    pattern: &str,
    options: &SearchOptions,
    index_state: IndexBuildState,
) -> Result<SearchResult> {
    let matcher = PatternMatcher::compile(pattern, options)?;

    let mut result = SearchResult::empty(pattern, index_state);
    if catalogue.is_empty() {
        result.index_missing = true;
        return Ok(result);
    }
    if options.max_results == 0 {
        return Ok(result);
    }

    if let Some(positions) = name_index_candidates(catalogue, &matcher, options) {
        result.used_name_index = true;
        for position in positions {
            let Some(record) = catalogue.get(position) else {
                continue;
            };
            result.scanned += 1;
            if !options.type_filter_passes(record.is_directory) {
                continue;
            }
            if push_bounded(&mut result, record, options.max_results) {
                break;
            }
        }
    } else {
        for record in catalogue.records() {
            result.scanned += 1;
            if !options.type_filter_passes(record.is_directory) {
                continue;
            }
            if !matcher.matches(candidate_text(record, options)) {
                continue;
            }
            if push_bounded(&mut result, record, options.max_results) {
                break;
            }
        }
    }

    result.count = result.entries.len();
    log::debug!(
        "search pattern={:?} matches={} scanned={} truncated={} name_index={}",
        pattern,
        result.count,
        result.scanned,
        result.truncated,
        result.used_name_index,
    );
    Ok(result)
}

/// Walks `root` without touching any index and returns matches in traversal
/// order, stopping as soon as `options.max_results` are found.
///
/// Hidden entries, exclude-directory substrings and extension filters prune
/// the walk exactly as they prune an index build.
pub fn quick_search(
    root: &Path,
    pattern: &str,
    options: &SearchOptions,
    filters: &FilterSet,
    index_state: IndexBuildState,
) -> Result<SearchResult> {
    let matcher = PatternMatcher::compile(pattern, options)?;
    let mut result = SearchResult::empty(pattern, index_state);
    if options.max_results == 0 {
        return Ok(result);
    }

    let entry_filter = EntryFilter::new(filters.clone(), options.include_hidden);
    let max_results = options.max_results;
    result.scanned = walk_visit(root, &entry_filter, |entry| {
        let is_directory = entry
            .file_type()
            .is_some_and(|file_type| file_type.is_dir());
        if !options.type_filter_passes(is_directory) {
            return ControlFlow::Continue(());
        }

        let matched = if options.search_in_path {
            matcher.matches(&entry.path().to_string_lossy())
        } else {
            matcher.matches(&entry.file_name().to_string_lossy())
        };
        if !matched {
            return ControlFlow::Continue(());
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(error) => {
                log::debug!("quick search could not stat {}: {error}", entry.path().display());
                return ControlFlow::Continue(());
            }
        };
        let record = FileRecord::from_metadata(entry.path(), &metadata);
        if push_bounded(&mut result, &record, max_results) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    result.count = result.entries.len();
    log::debug!(
        "quick search root={} pattern={:?} matches={} visited={}",
        root.display(),
        pattern,
        result.count,
        result.scanned,
    );
    Ok(result)
}

/// Positions from the exact-name index when it can stand in for a scan.
fn name_index_candidates(
    catalogue: &Catalogue,
    matcher: &PatternMatcher,
    options: &SearchOptions,
) -> Option<Vec<usize>> {
    if options.search_in_path {
        return None;
    }
    matcher.exact_term()?;
    catalogue.exact_name_positions(matcher.pattern(), matcher.case_sensitive())
}

fn candidate_text<'a>(record: &'a FileRecord, options: &SearchOptions) -> &'a str {
    if options.search_in_path {
        &record.full_path
    } else {
        &record.file_name
    }
}

/// Appends `record`; returns true once the bound has been reached.
fn push_bounded(result: &mut SearchResult, record: &FileRecord, max_results: usize) -> bool {
    result.entries.push(record.clone());
    if result.entries.len() >= max_results {
        result.truncated = true;
        return true;
    }
    false
}
