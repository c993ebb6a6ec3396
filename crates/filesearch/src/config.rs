//! Engine configuration stored as JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FileSearchError, Result};
use crate::filter::FilterSet;
use crate::options::SearchOptions;

pub const ENGINE_CONFIG_FILENAME: &str = "filesearch.json";

/// Engine settings as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub options: SearchOptions,
    pub filters: FilterConfig,
    /// Roots a caller builds from when none are given explicitly.
    pub roots: Vec<PathBuf>,
    /// Where callers keep the saved index.
    pub index_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    pub include_extensions: Vec<String>,
    pub exclude_extensions: Vec<String>,
    pub exclude_directories: Vec<String>,
}

impl FilterConfig {
    /// Builds the filter set, normalizing every extension.
    pub fn to_filter_set(&self) -> FilterSet {
        let mut filters = FilterSet::new();
        for extension in &self.include_extensions {
            filters.add_include_extension(extension);
        }
        for extension in &self.exclude_extensions {
            filters.add_exclude_extension(extension);
        }
        for directory in &self.exclude_directories {
            filters.add_exclude_directory(directory);
        }
        filters
    }
}

impl From<&FilterSet> for FilterConfig {
    fn from(filters: &FilterSet) -> Self {
        Self {
            include_extensions: filters.include_extensions().map(str::to_string).collect(),
            exclude_extensions: filters.exclude_extensions().map(str::to_string).collect(),
            exclude_directories: filters.exclude_directories().map(str::to_string).collect(),
        }
    }
}

pub fn engine_config_path(dir: &Path) -> PathBuf {
    dir.join(ENGINE_CONFIG_FILENAME)
}

pub fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    let data = fs::read_to_string(path).map_err(|error| {
        FileSearchError::Config(format!(
            "failed to read engine config {}: {error}",
            path.display()
        ))
    })?;
    serde_json::from_str(&data).map_err(|error| {
        FileSearchError::Config(format!(
            "failed to parse engine config {}: {error}",
            path.display()
        ))
    })
}

/// Loads `path`, or returns the defaults if it does not exist.
pub fn load_or_default_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        log::debug!("engine config {} not found, using defaults", path.display());
        return Ok(EngineConfig::default());
    }
    load_engine_config(path)
}

pub fn write_engine_config(path: &Path, config: &EngineConfig) -> Result<()> {
    let data = serde_json::to_string_pretty(config).map_err(|error| {
        FileSearchError::Config(format!(
            "failed to serialize engine config {}: {error}",
            path.display()
        ))
    })?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);
    fs::write(&tmp_path, data).map_err(|error| {
        FileSearchError::Config(format!(
            "failed to write engine config {}: {error}",
            path.display()
        ))
    })?;
    fs::rename(&tmp_path, path).map_err(|error| {
        let _ = fs::remove_file(&tmp_path);
        FileSearchError::Config(format!(
            "failed to write engine config {}: {error}",
            path.display()
        ))
    })?;
    Ok(())
}
