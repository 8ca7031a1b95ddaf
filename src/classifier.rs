// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Per-file classification: extract, count, match, relocate

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::extractor::MetadataExtractor;
use crate::frequency::{tokenize, StopWords, WordFrequencyTracker};
use crate::scanner::{same_location, CandidateFile};
use crate::{OrgError, Result};

/// Why a file was not considered for matching
#[derive(Debug)]
pub enum SkipReason {
    NoMetadata,
    ExtractionFailed(OrgError),
}

/// What happened to a matched file
#[derive(Debug)]
pub enum MatchAction {
    /// List-only mode; nothing moved
    Listed,
    Moved { to: PathBuf },
    /// Already inside the destination folder
    SkippedSamePath,
    MoveFailed(OrgError),
}

/// Result of classifying one file
#[derive(Debug)]
pub enum Outcome {
    Skipped(SkipReason),
    Unmatched,
    Matched(MatchAction),
}

impl Outcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Outcome plus the extracted text it was decided on
#[derive(Debug)]
pub struct Classification {
    pub outcome: Outcome,
    pub text: Option<String>,
}

/// Settings that stay fixed for every file in a run
#[derive(Debug, Clone, Default)]
pub struct ClassifierOptions {
    /// `None` matches every file with metadata
    pub search: Option<String>,
    pub minimum: usize,
    /// `None` in list-only mode
    pub destination: Option<PathBuf>,
}

/// Decides match/no-match for each file and moves matches
pub struct FileClassifier {
    extractor: Box<dyn MetadataExtractor>,
    stop_words: StopWords,
    search: Option<String>,
    minimum: usize,
    mover: Option<FileMover>,
}

impl FileClassifier {
    pub fn new(
        extractor: Box<dyn MetadataExtractor>,
        stop_words: StopWords,
        options: ClassifierOptions,
    ) -> Self {
        Self {
            extractor,
            stop_words,
            search: options.search,
            minimum: options.minimum,
            mover: options.destination.map(FileMover::new),
        }
    }

    /// Classify one file, feeding its words into `tracker`.
    ///
    /// Never fails: extraction problems become `Skipped` with the cause
    /// attached and move problems become `MoveFailed`.
    pub async fn process(
        &self,
        file: &CandidateFile,
        tracker: &mut WordFrequencyTracker,
    ) -> Classification {
        let text = match self.extractor.fetch(&file.path).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("No metadata: {:?}", file.path);
                return Classification {
                    outcome: Outcome::Skipped(SkipReason::NoMetadata),
                    text: None,
                };
            }
            Err(e) => {
                warn!("{} failed for {:?}: {}", self.extractor.name(), file.path, e);
                return Classification {
                    outcome: Outcome::Skipped(SkipReason::ExtractionFailed(e)),
                    text: None,
                };
            }
        };

        for word in tokenize(&text, &self.stop_words, self.minimum) {
            tracker.record(word);
        }

        if !self.matches(&text) {
            return Classification {
                outcome: Outcome::Unmatched,
                text: Some(text),
            };
        }

        let action = match &self.mover {
            None => MatchAction::Listed,
            Some(mover) => match mover.relocate(&file.path) {
                Ok(MoveResult::Moved(to)) => MatchAction::Moved { to },
                Ok(MoveResult::SamePath) => MatchAction::SkippedSamePath,
                Err(e) => MatchAction::MoveFailed(e),
            },
        };

        Classification {
            outcome: Outcome::Matched(action),
            text: Some(text),
        }
    }

    /// Literal, case-sensitive substring test
    fn matches(&self, text: &str) -> bool {
        self.search.as_deref().map_or(true, |needle| text.contains(needle))
    }
}

/// Result of a successful relocation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    Moved(PathBuf),
    SamePath,
}

/// Moves files into a single destination folder
#[derive(Debug, Clone)]
pub struct FileMover {
    destination: PathBuf,
}

impl FileMover {
    pub fn new(destination: PathBuf) -> Self {
        Self { destination }
    }

    /// Move `source` to `destination/basename(source)`.
    ///
    /// An existing file at the target is never overwritten.
    pub fn relocate(&self, source: &Path) -> Result<MoveResult> {
        let file_name = source.file_name().ok_or_else(|| OrgError::Move {
            from: source.to_path_buf(),
            to: self.destination.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
        let target = self.destination.join(file_name);

        if same_location(source, &target) {
            debug!("Source and destination are the same for {:?}", source);
            return Ok(MoveResult::SamePath);
        }

        let wrap = |e: io::Error| OrgError::Move {
            from: source.to_path_buf(),
            to: self.destination.clone(),
            source: e,
        };

        if target.symlink_metadata().is_ok() {
            return Err(wrap(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("'{}' already exists", target.display()),
            )));
        }

        match fs::rename(source, &target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                debug!("Cross-device move, copying {:?}", source);
                copy_then_delete(source, &target).map_err(wrap)?;
            }
            Err(e) => return Err(wrap(e)),
        }

        info!("Moved {:?} to {:?}", source, self.destination);
        Ok(MoveResult::Moved(target))
    }
}

/// Copy across volumes; the source is removed only once the copy is complete.
fn copy_then_delete(source: &Path, target: &Path) -> io::Result<()> {
    if let Err(e) = fs::copy(source, target) {
        let _ = fs::remove_file(target);
        return Err(e);
    }

    if let Err(e) = fs::remove_file(source) {
        // Keep exactly one copy
        let _ = fs::remove_file(target);
        return Err(e);
    }

    Ok(())
}
