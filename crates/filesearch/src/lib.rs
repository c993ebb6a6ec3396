//! File name and path indexing and search library.
//!
//! This crate provides:
//! - Parallel filesystem walking into an in-memory catalogue with a name index
//! - Substring, wildcard, regex and whole-word matching
//! - Snapshot publishing so searches never observe a half-built index
//! - Quick search that matches during a walk without building an index
//! - A compact binary index file and a JSON engine config

pub mod config;
pub mod error;
pub mod filter;
pub mod index;
pub mod options;
pub mod query;
pub mod search;
pub mod sort;
pub mod types;

// Re-export main types
pub use config::{load_engine_config, load_or_default_config, write_engine_config, EngineConfig, FilterConfig};
pub use error::{FileSearchError, Result};
pub use filter::FilterSet;
pub use index::{Catalogue, IndexBuildState, NameIndex};
pub use options::{SearchOptions, DEFAULT_MAX_RESULTS};
pub use query::{matches, PatternMatcher};
pub use search::FileSearchEngine;
pub use sort::{sort_results, SortKey};
pub use types::{BuildOutcome, FileRecord, IndexStatus, SearchResult};
