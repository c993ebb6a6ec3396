//! Extension and directory filters applied while walking.

use std::collections::BTreeSet;

/// Include/exclude extension sets and exclude-directory substrings.
///
/// Extensions are stored case-folded with their leading dot (`".txt"`).
/// The exclude set is consulted before the include set, so an extension in
/// both is excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    include_extensions: BTreeSet<String>,
    exclude_extensions: BTreeSet<String>,
    exclude_directories: BTreeSet<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an extension to the whitelist. Accepts `"txt"` or `".txt"`.
    pub fn add_include_extension(&mut self, extension: &str) {
        self.include_extensions.insert(normalize_extension(extension));
    }

    pub fn remove_include_extension(&mut self, extension: &str) -> bool {
        self.include_extensions
            .remove(&normalize_extension(extension))
    }

    /// Adds an extension to the blacklist. Accepts `"tmp"` or `".tmp"`.
    pub fn add_exclude_extension(&mut self, extension: &str) {
        self.exclude_extensions.insert(normalize_extension(extension));
    }

    pub fn remove_exclude_extension(&mut self, extension: &str) -> bool {
        self.exclude_extensions
            .remove(&normalize_extension(extension))
    }

    /// Adds every entry of a comma-separated list (`"cpp,cc,.cxx"`) to the whitelist.
    pub fn add_include_extensions_csv(&mut self, list: &str) {
        for extension in split_csv(list) {
            self.add_include_extension(extension);
        }
    }

    /// Adds every entry of a comma-separated list to the blacklist.
    pub fn add_exclude_extensions_csv(&mut self, list: &str) {
        for extension in split_csv(list) {
            self.add_exclude_extension(extension);
        }
    }

    /// Adds a substring; any directory or file whose absolute path contains it is skipped.
    pub fn add_exclude_directory(&mut self, directory: &str) {
        if !directory.is_empty() {
            self.exclude_directories.insert(directory.to_string());
        }
    }

    pub fn remove_exclude_directory(&mut self, directory: &str) -> bool {
        self.exclude_directories.remove(directory)
    }

    pub fn clear(&mut self) {
        self.include_extensions.clear();
        self.exclude_extensions.clear();
        self.exclude_directories.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.include_extensions.is_empty()
            && self.exclude_extensions.is_empty()
            && self.exclude_directories.is_empty()
    }

    pub fn include_extensions(&self) -> impl Iterator<Item = &str> {
        self.include_extensions.iter().map(String::as_str)
    }

    pub fn exclude_extensions(&self) -> impl Iterator<Item = &str> {
        self.exclude_extensions.iter().map(String::as_str)
    }

    pub fn exclude_directories(&self) -> impl Iterator<Item = &str> {
        self.exclude_directories.iter().map(String::as_str)
    }

    /// Returns true if `path` contains any exclude-directory substring.
    pub fn path_is_excluded(&self, path: &str) -> bool {
        self.exclude_directories
            .iter()
            .any(|excluded| path.contains(excluded.as_str()))
    }

    /// Returns true if a directory at `path` may be recorded and descended into.
    pub fn should_include_directory(&self, path: &str) -> bool {
        !self.path_is_excluded(path)
    }

    /// Returns true if a file at `path` named `name` survives the filters.
    pub fn should_include_file(&self, path: &str, name: &str) -> bool {
        if self.path_is_excluded(path) {
            return false;
        }
        let extension = extension_of_name(name);
        if self.exclude_extensions.contains(&extension) {
            return false;
        }
        if !self.include_extensions.is_empty() && !self.include_extensions.contains(&extension) {
            return false;
        }
        true
    }
}

/// Extension of a file name: the case-folded suffix starting at the last dot,
/// or the empty string when the name has no dot.
pub fn extension_of_name(name: &str) -> String {
    match name.rfind('.') {
        Some(split) => name[split..].to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Folds an extension to the stored form: lowercase with a leading dot.
pub fn normalize_extension(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.starts_with('.') {
        lowered
    } else {
        format!(".{lowered}")
    }
}

fn split_csv(list: &str) -> impl Iterator<Item = &str> {
    list.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
