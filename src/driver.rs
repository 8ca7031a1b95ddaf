// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Run orchestration
//!
//! `Validating -> Preparing -> Scanning -> Finalizing -> Done`, with a
//! `Failed` exit from the first two states. Nothing on disk is touched
//! before `Preparing`.

use std::error::Error as _;
use std::path::{Component, Path};
use tracing::{debug, error, info, warn};

use crate::classifier::{ClassifierOptions, FileClassifier, MatchAction, Outcome, SkipReason};
use crate::config::RunConfig;
use crate::error_log::ErrorLog;
use crate::extractor::MetadataExtractor;
use crate::frequency::{StopWords, TopKSnapshot, WordFrequencyTracker};
use crate::reporter::{FileReport, Progress, RunHeader, StatusReporter};
use crate::scanner::{enumerate_candidates, CandidateFile, ScanTarget};
use crate::{OrgError, Result};

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Validating,
    Preparing,
    Scanning,
    Finalizing,
    Done,
    Failed,
}

/// Totals for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Files handed to the classifier
    pub files_processed: u64,
    pub matched: u64,
    pub moved: u64,
    /// No usable metadata, including extraction failures
    pub skipped: u64,
    pub extraction_failures: u64,
    pub unmatched: u64,
    pub move_failures: u64,
    /// Requested size of `final_top_words`
    pub top_k: usize,
    pub final_top_words: TopKSnapshot,
}

impl RunSummary {
    fn tally(&mut self, outcome: &Outcome) {
        self.files_processed += 1;
        match outcome {
            Outcome::Skipped(reason) => {
                self.skipped += 1;
                if matches!(reason, SkipReason::ExtractionFailed(_)) {
                    self.extraction_failures += 1;
                }
            }
            Outcome::Unmatched => self.unmatched += 1,
            Outcome::Matched(action) => {
                self.matched += 1;
                match action {
                    MatchAction::Moved { .. } => self.moved += 1,
                    MatchAction::MoveFailed(_) => self.move_failures += 1,
                    MatchAction::Listed | MatchAction::SkippedSamePath => {}
                }
            }
        }
    }
}

/// Orchestrates a single scan
pub struct Driver {
    config: RunConfig,
    classifier: FileClassifier,
    tracker: WordFrequencyTracker,
    reporter: Box<dyn StatusReporter>,
    error_log: ErrorLog,
    state: RunState,
}

impl Driver {
    pub fn new(
        config: RunConfig,
        extractor: Box<dyn MetadataExtractor>,
        stop_words: StopWords,
        reporter: Box<dyn StatusReporter>,
        error_log: ErrorLog,
    ) -> Self {
        let classifier = FileClassifier::new(
            extractor,
            stop_words,
            ClassifierOptions {
                search: config.search.clone(),
                minimum: config.minimum,
                destination: config.destination(),
            },
        );

        Self {
            config,
            classifier,
            tracker: WordFrequencyTracker::new(),
            reporter,
            error_log,
            state: RunState::Validating,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute the run. Only configuration problems are returned as errors.
    pub async fn run(&mut self) -> Result<RunSummary> {
        self.transition(RunState::Validating);
        if let Err(e) = self.validate() {
            return Err(self.fail(e));
        }

        self.transition(RunState::Preparing);
        if let Some(destination) = self.config.destination() {
            if let Err(e) = prepare_destination(&destination) {
                return Err(self.fail(e));
            }
        }

        self.transition(RunState::Scanning);
        let summary = self.scan().await;

        self.transition(RunState::Finalizing);
        let summary = self.finalize(summary);

        self.transition(RunState::Done);
        Ok(summary)
    }

    fn validate(&self) -> Result<()> {
        if !self.config.list_only {
            match &self.config.label {
                Some(label) => validate_label(label)?,
                None => {
                    return Err(OrgError::Config(
                        "'--label' is required unless '--list' is specified".to_string(),
                    ))
                }
            }
        }

        let target = self.scan_target();
        if !target.is_valid() {
            return Err(OrgError::InvalidDirectory(target.root));
        }
        Ok(())
    }

    async fn scan(&mut self) -> RunSummary {
        info!("Processing files in {:?}", self.config.root);
        self.reporter.on_start(&RunHeader {
            root: self.config.root.clone(),
            search: self.config.search.clone(),
            label: self.config.label.clone(),
            recursive: self.config.recursive,
            list_only: self.config.list_only,
        });

        let files = enumerate_candidates(&self.scan_target());
        let total = files.len();
        let mut summary = RunSummary {
            top_k: self.config.summary_top_k,
            ..RunSummary::default()
        };

        for (i, file) in files.iter().enumerate() {
            self.reporter
                .on_progress(&Progress::new(i + 1, total, file.path.clone()));

            let classification = self.classifier.process(file, &mut self.tracker).await;
            summary.tally(&classification.outcome);

            if let Some(top_words) = self.tracker.refresh(self.config.live_top_k) {
                self.reporter.on_top_words_changed(&top_words);
            }

            self.log_outcome(file, &classification.outcome);
            self.reporter.on_file_outcome(&FileReport {
                file,
                classification: &classification,
            });
        }

        summary
    }

    fn finalize(&mut self, mut summary: RunSummary) -> RunSummary {
        summary.final_top_words = self.tracker.top_k(self.config.summary_top_k);
        info!(
            "Processed {} files: {} matched, {} moved, {} without metadata",
            summary.files_processed, summary.matched, summary.moved, summary.skipped
        );

        self.reporter.on_summary(&summary);
        self.reporter.finish();
        self.error_log.close();
        summary
    }

    /// Per-file problems go to the error log; they never stop the scan
    fn log_outcome(&mut self, file: &CandidateFile, outcome: &Outcome) {
        match outcome {
            Outcome::Skipped(SkipReason::ExtractionFailed(e)) => {
                let message = format!("Error fetching metadata for '{}'", file.path.display());
                self.error_log.record(&message, Some(e));
            }
            Outcome::Matched(MatchAction::SkippedSamePath) => {
                let message = format!(
                    "Move skipped: Source and destination paths are the same for '{}'.",
                    file.path.display()
                );
                warn!("{}", message);
                self.error_log.record(&message, None);
            }
            Outcome::Matched(MatchAction::MoveFailed(e)) => {
                error!("{}", e);
                self.error_log.record(&e.to_string(), e.source());
            }
            _ => {}
        }
    }

    /// Record a fatal error and leave the state machine
    fn fail(&mut self, e: OrgError) -> OrgError {
        self.transition(RunState::Failed);
        error!("{}", e);
        self.error_log.record(&e.to_string(), e.source());
        self.reporter.on_error(&e.to_string());
        self.reporter.finish();
        self.error_log.close();
        e
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn scan_target(&self) -> ScanTarget {
        ScanTarget::new(self.config.root.clone(), self.config.recursive)
    }
}

/// Labels name a folder directly under the root
fn validate_label(label: &str) -> Result<()> {
    let path = Path::new(label);
    let plain = !label.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if plain {
        Ok(())
    } else {
        Err(OrgError::Config(format!(
            "Invalid label '{}': must be a relative folder name",
            label
        )))
    }
}

/// Create the destination folder; an existing folder is fine
fn prepare_destination(path: &Path) -> Result<()> {
    if path.is_dir() {
        debug!("Destination folder exists: {:?}", path);
        return Ok(());
    }

    std::fs::create_dir_all(path).map_err(|source| OrgError::DestinationFolder {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Created destination folder: {:?}", path);
    Ok(())
}
