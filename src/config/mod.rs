// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for orgpng
//!
//! Two layers: [`AppConfig`] holds tool-level knobs loaded from an optional
//! JSON file, and [`RunConfig`] is the immutable per-run record built once
//! from the command line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// External metadata tool settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Dashboard and summary settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Additional words excluded from frequency counting
    #[serde(default)]
    pub stop_words: StopWordConfig,

    /// Append-only error log; `null` disables it
    #[serde(default = "default_error_log")]
    pub error_log: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExtractorConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_live_top_k")]
    pub live_top_k: usize,
    #[serde(default = "default_summary_top_k")]
    pub summary_top_k: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct StopWordConfig {
    #[serde(default)]
    pub extra: Vec<String>,
}

// Default value functions
fn default_program() -> String { "exiftool".to_string() }
fn default_tag() -> String { "Generation_data".to_string() }
fn default_field() -> String { "prompt".to_string() }
fn default_timeout() -> u64 { 5 }
fn default_live_top_k() -> usize { 8 }
fn default_summary_top_k() -> usize { 10 }
fn default_error_log() -> Option<PathBuf> { Some(PathBuf::from("error.log")) }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            display: DisplayConfig::default(),
            stop_words: StopWordConfig::default(),
            error_log: default_error_log(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            tag: default_tag(),
            field: default_field(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            live_top_k: default_live_top_k(),
            summary_top_k: default_summary_top_k(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file, falling back to defaults when absent
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::OrgError::Config(format!("Failed to parse config {:?}: {}", path, e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }
}

/// Immutable record describing one run, produced once from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Absolute root directory to scan
    pub root: PathBuf,
    /// Literal substring to look for; `None` matches everything
    pub search: Option<String>,
    /// Destination subfolder name under `root`
    pub label: Option<String>,
    /// Minimum token length counted by the frequency tracker
    pub minimum: usize,
    /// Never move anything
    pub list_only: bool,
    /// Descend into subdirectories
    pub recursive: bool,
    pub live_top_k: usize,
    pub summary_top_k: usize,
}

impl RunConfig {
    /// Build a run record; a relative `root` is resolved against the working directory.
    pub fn new(root: &Path, display: &DisplayConfig) -> crate::Result<Self> {
        let root = std::path::absolute(root)?;
        Ok(Self {
            root,
            search: None,
            label: None,
            minimum: 0,
            list_only: false,
            recursive: false,
            live_top_k: display.live_top_k,
            summary_top_k: display.summary_top_k,
        })
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search;
        self
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn with_minimum(mut self, minimum: usize) -> Self {
        self.minimum = minimum;
        self
    }

    pub fn with_list_only(mut self, list_only: bool) -> Self {
        self.list_only = list_only;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Folder matches are moved into. `None` in list-only mode.
    pub fn destination(&self) -> Option<PathBuf> {
        if self.list_only {
            return None;
        }
        self.label.as_ref().map(|label| self.root.join(label))
    }
}
