// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! orgpng: sort generated images by their embedded prompt
//!
//! Scans a directory, reads each image's generation prompt through an
//! external metadata tool, tracks word frequencies across prompts and moves
//! files whose prompt contains a search string into a labelled subfolder.

pub mod classifier;
pub mod config;
pub mod driver;
pub mod error;
pub mod error_log;
pub mod extractor;
pub mod frequency;
pub mod reporter;
pub mod scanner;

pub use config::{AppConfig, RunConfig};
pub use driver::{Driver, RunState, RunSummary};
pub use error::{OrgError, Result};
