//! Post-processing of result lists.

use std::cmp::Reverse;

use crate::types::FileRecord;

/// Ordering applied by [`sort_results`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Ascending by file name.
    Name,
    /// Largest first.
    Size,
    /// Most recently modified first.
    Date,
    /// Ascending by full path.
    Path,
}

impl SortKey {
    /// Parses `name`, `size`, `date` or `path`.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "size" => Some(Self::Size),
            "date" => Some(Self::Date),
            "path" => Some(Self::Path),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Size => "size",
            Self::Date => "date",
            Self::Path => "path",
        }
    }
}

/// Sorts `records` by the key named `key`. An unknown key leaves the order unchanged.
pub fn sort_results(records: &mut [FileRecord], key: &str) {
    match SortKey::parse(key) {
        Some(key) => sort_by_key(records, key),
        None => log::debug!("unknown sort key {key:?}, leaving results unsorted"),
    }
}

/// Stable sort: records that compare equal keep their relative order.
pub fn sort_by_key(records: &mut [FileRecord], key: SortKey) {
    match key {
        SortKey::Name => records.sort_by(|a, b| a.file_name.cmp(&b.file_name)),
        SortKey::Size => records.sort_by_key(|record| Reverse(record.size)),
        SortKey::Date => records.sort_by_key(|record| Reverse(record.modify_time)),
        SortKey::Path => records.sort_by(|a, b| a.full_path.cmp(&b.full_path)),
    }
}
