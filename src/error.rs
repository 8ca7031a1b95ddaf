// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for orgpng

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for orgpng operations
pub type Result<T> = std::result::Result<T, OrgError>;

/// orgpng error types
#[derive(Error, Debug)]
pub enum OrgError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid directory: '{}'", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("Error creating directory '{}': {source}", path.display())]
    DestinationFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Error moving file '{}' to '{}': {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Display error: {0}")]
    Display(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OrgError {
    /// Whether the error must abort the run before any file is touched.
    ///
    /// Everything else is isolated to the file that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::InvalidDirectory(_) | Self::DestinationFolder { .. }
        )
    }
}
