//! The in-memory catalogue of indexed entries.
//!
//! A `Catalogue` holds two structures:
//! 1. The record sequence, in traversal order
//! 2. `NameIndex` - file name to record positions
//!
//! The name index is derived from the records and rebuilt in full whenever a
//! catalogue is constructed. A catalogue is immutable once built; the engine
//! publishes it behind an `Arc` and replaces it wholesale.

use fnv::FnvHashMap;

use crate::query::fold_case;
use crate::types::FileRecord;

/// Maps file names to ascending record positions.
///
/// Keys are ASCII case-folded unless the index was built case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    positions: FnvHashMap<Box<str>, Vec<usize>>,
    case_sensitive: bool,
}

impl NameIndex {
    /// Builds the index for `records`.
    pub fn build(records: &[FileRecord], case_sensitive: bool) -> Self {
        let mut positions: FnvHashMap<Box<str>, Vec<usize>> = FnvHashMap::default();
        for (position, record) in records.iter().enumerate() {
            let key = fold_case(&record.file_name, case_sensitive);
            match positions.get_mut(key.as_ref()) {
                Some(existing) => existing.push(position),
                None => {
                    positions.insert(key.into_owned().into_boxed_str(), vec![position]);
                }
            }
        }
        Self {
            positions,
            case_sensitive,
        }
    }

    /// Whether keys were stored without case folding.
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions of records whose key equals `key`. `key` must already be in
    /// the index's folding.
    pub fn get(&self, key: &str) -> &[usize] {
        self.positions.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Ordered record store plus its derived name index.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    records: Vec<FileRecord>,
    name_index: NameIndex,
    roots: Vec<String>,
}

impl Catalogue {
    /// Creates an empty catalogue.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps `records` and derives the name index.
    pub fn new(records: Vec<FileRecord>, case_sensitive: bool) -> Self {
        let name_index = NameIndex::build(&records, case_sensitive);
        Self {
            records,
            name_index,
            roots: Vec::new(),
        }
    }

    /// Records the roots this catalogue was built from.
    pub fn with_roots(mut self, roots: Vec<String>) -> Self {
        self.roots = roots;
        self
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&FileRecord> {
        self.records.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn name_index(&self) -> &NameIndex {
        &self.name_index
    }

    /// Positions of records named exactly `name` under the requested case
    /// sensitivity, in catalogue order.
    ///
    /// Returns `None` when the index cannot answer: a case-insensitive lookup
    /// against case-sensitive keys would need every key variant.
    pub fn exact_name_positions(&self, name: &str, case_sensitive: bool) -> Option<Vec<usize>> {
        match (self.name_index.case_sensitive(), case_sensitive) {
            (true, true) => Some(self.name_index.get(name).to_vec()),
            (false, false) => Some(self.name_index.get(&fold_case(name, false)).to_vec()),
            (false, true) => Some(
                self.name_index
                    .get(&fold_case(name, false))
                    .iter()
                    .copied()
                    .filter(|position| self.records[*position].file_name == name)
                    .collect(),
            ),
            (true, false) => None,
        }
    }
}
