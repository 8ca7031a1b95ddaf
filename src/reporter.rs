// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Progress and outcome reporting
//!
//! The driver calls a [`StatusReporter`] at fixed points of the run. Two
//! implementations ship: a plain line logger and a full-screen terminal
//! dashboard.

use std::io::{self, Stdout, Write};
use std::path::PathBuf;

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::classifier::{Classification, MatchAction, Outcome, SkipReason};
use crate::driver::RunSummary;
use crate::frequency::TopKSnapshot;
use crate::scanner::CandidateFile;
use crate::{OrgError, Result};

/// Rows reserved for the dashboard's top panel
const TOP_PANEL_HEIGHT: u16 = 11;

/// Bottom panel history kept in memory
const MAX_LOG_LINES: usize = 1000;

/// Describes the run; shown once at the start
#[derive(Debug, Clone, PartialEq)]
pub struct RunHeader {
    pub root: PathBuf,
    pub search: Option<String>,
    pub label: Option<String>,
    pub recursive: bool,
    pub list_only: bool,
}

impl RunHeader {
    /// `<search> => <label> <root> [recursive]`
    pub fn title(&self) -> String {
        let mut title = format!(
            "{} => {} {}",
            self.search.as_deref().unwrap_or("*"),
            self.label.as_deref().unwrap_or(if self.list_only { "(list)" } else { "-" }),
            self.root.display()
        );
        if self.recursive {
            title.push_str(" recursive");
        }
        title
    }
}

/// Position in the scan
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// 1-based index of the file about to be processed
    pub index: usize,
    pub total: usize,
    pub path: PathBuf,
    pub percent: f64,
}

impl Progress {
    pub fn new(index: usize, total: usize, path: PathBuf) -> Self {
        let percent = if total == 0 {
            100.0
        } else {
            ((index as f64 / total as f64) * 10000.0).round() / 100.0
        };
        Self {
            index,
            total,
            path,
            percent,
        }
    }
}

/// One classified file
#[derive(Debug)]
pub struct FileReport<'a> {
    pub file: &'a CandidateFile,
    pub classification: &'a Classification,
}

impl FileReport<'_> {
    /// User-facing line for this outcome, if it warrants one
    pub fn message(&self) -> Option<String> {
        let path = self.file.path.display();
        match &self.classification.outcome {
            Outcome::Skipped(SkipReason::ExtractionFailed(e)) => Some(format!(
                "Error fetching metadata for '{}': {}",
                path, e
            )),
            Outcome::Skipped(SkipReason::NoMetadata) | Outcome::Unmatched => None,
            Outcome::Matched(MatchAction::Listed) => Some(format!(
                "File: {} -> {:?}",
                path,
                self.classification.text.as_deref().unwrap_or_default()
            )),
            Outcome::Matched(MatchAction::Moved { to }) => {
                let folder = to.parent().unwrap_or(to);
                Some(format!("Moved '{}' to '{}'.", path, folder.display()))
            }
            Outcome::Matched(MatchAction::SkippedSamePath) => Some(format!(
                "Move skipped: Source and destination paths are the same for '{}'.",
                path
            )),
            Outcome::Matched(MatchAction::MoveFailed(e)) => Some(e.to_string()),
        }
    }
}

/// Receives run events from the driver
pub trait StatusReporter: Send {
    fn on_start(&mut self, header: &RunHeader);

    fn on_progress(&mut self, progress: &Progress);

    /// Called only when the visible top-K actually changed
    fn on_top_words_changed(&mut self, top_words: &TopKSnapshot);

    fn on_file_outcome(&mut self, report: &FileReport<'_>);

    fn on_error(&mut self, message: &str);

    fn on_summary(&mut self, summary: &RunSummary);

    /// Release any display resources. Called once at the end of the run.
    fn finish(&mut self) {}
}

/// Write the end-of-run summary block
pub fn write_summary<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Summary:")?;
    writeln!(out, "Total files processed: {}", summary.files_processed)?;
    writeln!(
        out,
        "Matched: {}, moved: {}, skipped: {} ({} extraction failures), move failures: {}",
        summary.matched,
        summary.moved,
        summary.skipped,
        summary.extraction_failures,
        summary.move_failures
    )?;
    writeln!(out, "Top {} most frequently occurring words:", summary.top_k)?;
    for (i, entry) in summary.final_top_words.iter().enumerate() {
        writeln!(out, "{}. '{}' - {}", i + 1, entry.word, entry.count)?;
    }
    Ok(())
}

/// Plain line-oriented reporter
pub struct LogReporter<W: Write + Send = Stdout> {
    out: W,
}

impl LogReporter<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> LogReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            warn!("Failed to write output: {}", e);
        }
    }
}

impl<W: Write + Send> StatusReporter for LogReporter<W> {
    fn on_start(&mut self, header: &RunHeader) {
        self.line(&format!("Processing files in '{}'...", header.root.display()));
    }

    fn on_progress(&mut self, progress: &Progress) {
        debug!(
            "[{}/{}] {:.2}% {:?}",
            progress.index, progress.total, progress.percent, progress.path
        );
    }

    fn on_top_words_changed(&mut self, top_words: &TopKSnapshot) {
        let words: Vec<String> = top_words
            .iter()
            .map(|w| format!("{}={}", w.word, w.count))
            .collect();
        debug!("Top words: {}", words.join(", "));
    }

    fn on_file_outcome(&mut self, report: &FileReport<'_>) {
        if let Some(message) = report.message() {
            self.line(&message);
        }
    }

    fn on_error(&mut self, message: &str) {
        self.line(message);
    }

    fn on_summary(&mut self, summary: &RunSummary) {
        if let Err(e) = write_summary(&mut self.out, summary) {
            warn!("Failed to write summary: {}", e);
        }
    }

    fn finish(&mut self) {
        let _ = self.out.flush();
    }
}

/// What the dashboard shows, independent of the terminal
#[derive(Debug, Default, Clone)]
pub struct DashboardState {
    pub title: String,
    pub top_words: Vec<String>,
    pub percent: f64,
    pub log: Vec<String>,
}

impl DashboardState {
    fn push_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > MAX_LOG_LINES {
            let excess = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..excess);
        }
    }
}

/// Draw the dashboard into a frame
pub fn render(f: &mut Frame, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(TOP_PANEL_HEIGHT), Constraint::Min(3)])
        .split(f.size());

    let mut top: Vec<Line> = state
        .top_words
        .iter()
        .map(|w| Line::from(w.as_str()))
        .collect();
    top.push(Line::from(format!("------ {:.2}%", state.percent)));

    let top_panel = Paragraph::new(top).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", state.title))
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    );
    f.render_widget(top_panel, chunks[0]);

    // Newest lines at the bottom, scrolled so the tail is visible
    let visible = usize::from(chunks[1].height.saturating_sub(2));
    let start = state.log.len().saturating_sub(visible);
    let log: Vec<Line> = state.log[start..]
        .iter()
        .map(|l| Line::from(l.as_str()))
        .collect();
    let bottom_panel =
        Paragraph::new(log).block(Block::default().borders(Borders::ALL).title(" Files "));
    f.render_widget(bottom_panel, chunks[1]);
}

/// Full-screen terminal dashboard.
///
/// Anything shown on the alternate screen is lost when it is left, so error
/// messages received while drawing are held back and written to `errors_out`
/// once the terminal is restored.
pub struct DashboardReporter<B: Backend + Send = CrosstermBackend<Stdout>> {
    terminal: Option<Terminal<B>>,
    state: DashboardState,
    summary: Option<RunSummary>,
    pending_errors: Vec<String>,
    errors_out: Box<dyn Write + Send>,
    owns_screen: bool,
}

impl DashboardReporter<CrosstermBackend<Stdout>> {
    /// Take over the terminal. Fails when stdout is not a usable terminal.
    pub fn new() -> Result<Self> {
        if !crossterm::tty::IsTty::is_tty(&io::stdout()) {
            return Err(OrgError::Display("stdout is not a terminal".to_string()));
        }

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)
            .map_err(|e| OrgError::Display(format!("cannot enter alternate screen: {}", e)))?;

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
                return Err(OrgError::Display(format!("cannot initialise terminal: {}", e)));
            }
        };

        Ok(Self {
            terminal: Some(terminal),
            state: DashboardState::default(),
            summary: None,
            pending_errors: Vec::new(),
            errors_out: Box::new(io::stderr()),
            owns_screen: true,
        })
    }
}

impl<B: Backend + Send> DashboardReporter<B> {
    /// Dashboard over an arbitrary backend, without touching the real screen
    pub fn with_backend(backend: B) -> Result<Self> {
        let terminal = Terminal::new(backend).map_err(|e| OrgError::Display(e.to_string()))?;
        Ok(Self {
            terminal: Some(terminal),
            state: DashboardState::default(),
            summary: None,
            pending_errors: Vec::new(),
            errors_out: Box::new(io::stderr()),
            owns_screen: false,
        })
    }

    /// Send error messages somewhere other than stderr
    pub fn with_errors_out<W: Write + Send + 'static>(mut self, out: W) -> Self {
        self.errors_out = Box::new(out);
        self
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn backend(&self) -> Option<&B> {
        self.terminal.as_ref().map(|t| t.backend())
    }

    fn draw(&mut self) {
        let Some(terminal) = self.terminal.as_mut() else {
            return;
        };
        let state = &self.state;
        let drawn = terminal.draw(|f| render(f, state)).map(|_| ());
        if let Err(e) = drawn {
            warn!("Dashboard draw failed, falling back to log output: {}", e);
            self.restore();
        }
    }

    fn write_error(&mut self, message: &str) {
        let written = writeln!(self.errors_out, "{}", message).and_then(|()| self.errors_out.flush());
        if let Err(e) = written {
            warn!("Failed to write error message: {}", e);
        }
    }

    /// Print errors held back while the dashboard owned the screen
    fn flush_errors(&mut self) {
        for message in std::mem::take(&mut self.pending_errors) {
            self.write_error(&message);
        }
    }

    fn restore(&mut self) {
        if let Some(mut terminal) = self.terminal.take() {
            if self.owns_screen {
                let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
            }
            let _ = terminal.show_cursor();
        }
    }
}

impl<B: Backend + Send> StatusReporter for DashboardReporter<B> {
    fn on_start(&mut self, header: &RunHeader) {
        self.state.title = header.title();
        self.state
            .push_log(format!("Processing files in '{}'...", header.root.display()));
        self.draw();
    }

    fn on_progress(&mut self, progress: &Progress) {
        self.state.percent = progress.percent;
        self.draw();
    }

    fn on_top_words_changed(&mut self, top_words: &TopKSnapshot) {
        self.state.top_words = top_words
            .iter()
            .map(|w| format!("'{}' with count: {}", w.word, w.count))
            .collect();
        self.draw();
    }

    fn on_file_outcome(&mut self, report: &FileReport<'_>) {
        if let Some(message) = report.message() {
            if self.terminal.is_none() {
                println!("{}", message);
            }
            self.state.push_log(message);
            self.draw();
        }
    }

    fn on_error(&mut self, message: &str) {
        if self.terminal.is_none() {
            self.write_error(message);
        } else {
            self.pending_errors.push(message.to_string());
        }
        self.state.push_log(message.to_string());
        self.draw();
    }

    fn on_summary(&mut self, summary: &RunSummary) {
        self.summary = Some(summary.clone());
    }

    fn finish(&mut self) {
        self.restore();
        self.flush_errors();
        if let Some(summary) = self.summary.take() {
            let mut stdout = io::stdout();
            if let Err(e) = write_summary(&mut stdout, &summary) {
                warn!("Failed to write summary: {}", e);
            }
        }
    }
}

impl<B: Backend + Send> Drop for DashboardReporter<B> {
    fn drop(&mut self) {
        self.restore();
        self.flush_errors();
    }
}
