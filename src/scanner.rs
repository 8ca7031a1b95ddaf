// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Candidate file enumeration

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory to scan and how
#[derive(Debug, Clone, PartialEq)]
pub struct ScanTarget {
    pub root: PathBuf,
    pub recursive: bool,
}

impl ScanTarget {
    pub fn new(root: PathBuf, recursive: bool) -> Self {
        Self { root, recursive }
    }

    /// Whether the root exists and is a directory
    pub fn is_valid(&self) -> bool {
        self.root.is_dir()
    }
}

/// A file picked up by enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub basename: String,
}

impl CandidateFile {
    pub fn new(path: PathBuf) -> Option<Self> {
        let basename = path.file_name()?.to_string_lossy().into_owned();
        Some(Self { path, basename })
    }
}

/// Check if a file name is hidden
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && is_hidden_name(&entry.file_name().to_string_lossy())
}

/// List regular, non-hidden files under the target root, sorted by path.
///
/// Hidden directories are not descended into. Entries that cannot be read
/// are logged and skipped.
pub fn enumerate_candidates(target: &ScanTarget) -> Vec<CandidateFile> {
    let max_depth = if target.recursive { usize::MAX } else { 1 };

    let mut files = Vec::new();
    for entry in WalkDir::new(&target.root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(candidate) = CandidateFile::new(entry.into_path()) {
            files.push(candidate);
        }
    }

    debug!("Found {} candidate files in {:?}", files.len(), target.root);
    files
}

/// Whether two paths name the same location, resolving symlinks where possible
pub fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
