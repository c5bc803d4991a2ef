//! Configuration File Loading
//!
//! Locates launcher config files under workspace roots and decodes them.
//! JSON is tried first; anything that is not a well-formed JSON object falls
//! back to the line-oriented format.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use super::{custom_format, json_format};
use super::DiscoverySettings;
use crate::error::{Error, Result};
use crate::models::TerminalLauncherConfig;

/// Directories never descended into while searching for config files
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules", "target"];

/// Encodings a launcher config can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// Structured JSON document
    Json,
    /// `[name]` sections with `key = value` lines
    Text,
}

impl ConfigFormat {
    /// Format to write for a given path, by extension
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Text,
        }
    }
}

/// A config file found under one of the workspace roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCandidate {
    pub path: PathBuf,
    /// Workspace root the file was found under
    pub root: PathBuf,
}

impl ConfigCandidate {
    /// Project directory of this config (its parent directory)
    pub fn project_dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.root)
    }
}

/// Configuration file loader
pub struct ConfigLoader {
    /// Workspace roots searched for config files, in priority order
    search_paths: Vec<PathBuf>,
    /// File names recognised as launcher configs
    file_names: Vec<String>,
    /// How deep below each root to look (1 = the root itself)
    max_depth: usize,
}

impl ConfigLoader {
    /// Create a loader over the given workspace roots
    pub fn new(search_paths: Vec<PathBuf>, discovery: &DiscoverySettings) -> Self {
        Self {
            search_paths,
            file_names: discovery.file_names.clone(),
            max_depth: discovery.max_depth.max(1),
        }
    }

    /// Decode config content, JSON first, line format as fallback.
    ///
    /// A JSON object is decoded field by field and returned without checking
    /// business fields; mistyped fields are dropped, not fatal. The fallback
    /// never fails.
    pub fn parse(content: &str) -> Result<TerminalLauncherConfig> {
        Ok(Self::parse_with_format(content).0)
    }

    /// Decode config content and report which encoding matched
    pub fn parse_with_format(content: &str) -> (TerminalLauncherConfig, ConfigFormat) {
        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(root)) => (json_format::from_object(&root), ConfigFormat::Json),
            Ok(_) => {
                debug!("JSON document is not an object, using line format");
                (custom_format::parse(content), ConfigFormat::Text)
            }
            Err(e) => {
                debug!("Not a JSON launcher config ({}), using line format", e);
                (custom_format::parse(content), ConfigFormat::Text)
            }
        }
    }

    /// Read and decode a config file
    pub fn load_file(path: &Path) -> Result<TerminalLauncherConfig> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let (config, format) = Self::parse_with_format(&content);
        info!(
            "Loaded {} terminal(s) from {} ({:?} format)",
            config.terminal_count(),
            path.display(),
            format
        );
        Ok(config)
    }

    /// Write a config to a path, encoding chosen by `format`
    pub fn save_to_path(
        config: &TerminalLauncherConfig,
        path: &Path,
        format: ConfigFormat,
    ) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = match format {
            ConfigFormat::Json => {
                let mut json = serde_json::to_string_pretty(config)?;
                json.push('\n');
                json
            }
            ConfigFormat::Text => custom_format::render(config),
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Find every config file under the search paths.
    ///
    /// Results keep root order, then file-name order within a root.
    pub fn discover(&self) -> Vec<ConfigCandidate> {
        let mut found = Vec::new();

        for root in &self.search_paths {
            if !root.is_dir() {
                debug!("Skipping missing workspace root {}", root.display());
                continue;
            }

            let walker = WalkDir::new(root)
                .min_depth(1)
                .max_depth(self.max_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| !is_skipped_dir(entry));

            for entry in walker.filter_map(|e| e.ok()) {
                if entry.file_type().is_file() && self.is_config_name(entry.file_name()) {
                    found.push(ConfigCandidate {
                        path: entry.into_path(),
                        root: root.clone(),
                    });
                }
            }
        }

        debug!("Discovered {} config file(s)", found.len());
        found
    }

    /// Whether a file name is one of the recognised config names
    pub fn is_config_name(&self, name: &std::ffi::OsStr) -> bool {
        name.to_str()
            .map(|n| self.file_names.iter().any(|f| f == n))
            .unwrap_or(false)
    }

    /// List all search paths
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIPPED_DIRS.contains(&name))
            .unwrap_or(false)
}
