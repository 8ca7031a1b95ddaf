// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use orgpng::config::DisplayConfig;
use orgpng::error_log::ErrorLog;
use orgpng::extractor::MetadataExtractor;
use orgpng::frequency::{StopWords, TopKSnapshot};
use orgpng::reporter::{FileReport, Progress, RunHeader, StatusReporter};
use orgpng::{Driver, OrgError, RunConfig, RunSummary};

/// Returns canned prompts keyed by file name
pub struct FakeExtractor {
    prompts: HashMap<String, String>,
    failing: HashSet<String>,
}

impl FakeExtractor {
    pub fn new(prompts: &[(&str, &str)]) -> Self {
        Self {
            prompts: prompts
                .iter()
                .map(|(name, text)| ((*name).to_string(), (*text).to_string()))
                .collect(),
            failing: HashSet::new(),
        }
    }

    /// Make extraction fail for `name` the way a crashing tool would
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }
}

#[async_trait]
impl MetadataExtractor for FakeExtractor {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, path: &Path) -> orgpng::Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if self.failing.contains(name) {
            return Err(OrgError::Extraction(format!(
                "exiftool exited with exit status: 1: Error: File format error - {}",
                name
            )));
        }
        Ok(self.prompts.get(name).cloned())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Start(RunHeader),
    Progress(Progress),
    TopWords(Vec<(String, u64)>),
    Outcome {
        path: PathBuf,
        matched: bool,
        message: Option<String>,
    },
    Error(String),
    Summary(RunSummary),
    Finish,
}

/// Records every reporter call for later assertions
#[derive(Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn top_word_updates(&self) -> Vec<Vec<(String, u64)>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::TopWords(words) => Some(words),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Outcome { message, .. } => message,
                Event::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

fn pairs(snapshot: &TopKSnapshot) -> Vec<(String, u64)> {
    snapshot.iter().map(|w| (w.word.clone(), w.count)).collect()
}

impl StatusReporter for RecordingReporter {
    fn on_start(&mut self, header: &RunHeader) {
        self.push(Event::Start(header.clone()));
    }

    fn on_progress(&mut self, progress: &Progress) {
        self.push(Event::Progress(progress.clone()));
    }

    fn on_top_words_changed(&mut self, top_words: &TopKSnapshot) {
        self.push(Event::TopWords(pairs(top_words)));
    }

    fn on_file_outcome(&mut self, report: &FileReport<'_>) {
        self.push(Event::Outcome {
            path: report.file.path.clone(),
            matched: report.classification.outcome.is_match(),
            message: report.message(),
        });
    }

    fn on_error(&mut self, message: &str) {
        self.push(Event::Error(message.to_string()));
    }

    fn on_summary(&mut self, summary: &RunSummary) {
        self.push(Event::Summary(summary.clone()));
    }

    fn finish(&mut self) {
        self.push(Event::Finish);
    }
}

pub fn create_test_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, b"\x89PNG").unwrap();
    path
}

pub fn run_config(root: &Path) -> RunConfig {
    RunConfig::new(root, &DisplayConfig::default()).unwrap()
}

pub fn pair(word: &str, count: u64) -> (String, u64) {
    (word.to_string(), count)
}

/// Driver wired to a fake extractor, a recording reporter and an error log in `log_dir`
pub fn driver(
    config: RunConfig,
    extractor: FakeExtractor,
    log_dir: &Path,
) -> (Driver, RecordingReporter, PathBuf) {
    let reporter = RecordingReporter::default();
    let log_path = log_dir.join("error.log");
    let error_log = ErrorLog::open(&log_path).unwrap();
    let driver = Driver::new(
        config,
        Box::new(extractor),
        StopWords::builtin(),
        Box::new(reporter.clone()),
        error_log,
    );
    (driver, reporter, log_path)
}

pub fn read_log(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}
