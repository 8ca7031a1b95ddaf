// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Append-only error log kept as a side channel for the run

use chrono::Local;
use std::error::Error as StdError;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::Result;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamped error log, open for the duration of a run.
///
/// A disabled log swallows every record so callers never need to branch on
/// whether logging was configured.
pub struct ErrorLog {
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
}

impl ErrorLog {
    /// Open (or create) the log file in append mode
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            writer: Some(BufWriter::new(file)),
        })
    }

    /// A log that records nothing
    pub fn disabled() -> Self {
        Self { path: None, writer: None }
    }

    /// Open the configured log, degrading to a disabled log if that fails
    pub fn open_or_disabled(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match Self::open(path) {
                Ok(log) => log,
                Err(e) => {
                    tracing::warn!("Cannot open error log {:?}: {}", path, e);
                    Self::disabled()
                }
            },
            None => Self::disabled(),
        }
    }

    /// Append an error line, plus a cause line when a source error is given
    pub fn record(&mut self, message: &str, cause: Option<&(dyn StdError + 'static)>) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };

        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let mut result = writeln!(writer, "[{}] ERROR: {}", timestamp, message);
        if let Some(cause) = cause {
            result = result.and_then(|()| writeln!(writer, "[{}] CAUSE: {}", timestamp, error_chain(cause)));
        }

        if let Err(e) = result.and_then(|()| writer.flush()) {
            tracing::warn!("Failed to write error log: {}", e);
        }
    }

    /// Flush and close the log
    pub fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::warn!("Failed to flush error log: {}", e);
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Get log file path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Drop for ErrorLog {
    fn drop(&mut self) {
        self.close();
    }
}

/// Render an error and all of its sources as `outer: inner: ...`
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        // thiserror messages often embed their source already
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        source = inner.source();
    }
    parts.join(": ")
}
