// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! orgpng: sort generated images by their embedded prompt
//!
//! Reads each image's generation prompt with ExifTool, shows a live
//! word-frequency dashboard and moves matching images into a labelled folder.

use anyhow::Context;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::signal;
use tracing::{info, warn};

use orgpng::error_log::ErrorLog;
use orgpng::extractor::ExifToolExtractor;
use orgpng::frequency::StopWords;
use orgpng::reporter::{DashboardReporter, LogReporter, StatusReporter};
use orgpng::{AppConfig, Driver, RunConfig};

/// orgpng CLI - sort images by embedded prompt
#[derive(Parser, Debug)]
#[command(name = "orgpng")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Move images whose embedded prompt contains a search string into a labelled folder", long_about = None)]
struct Cli {
    /// Directory to scan
    directory: PathBuf,

    /// Substring to look for in each prompt (required unless --list)
    #[arg(long, value_name = "STRING", required_unless_present = "list")]
    search: Option<String>,

    /// Folder created under the directory to receive matches (required unless --list)
    #[arg(long, value_name = "STRING", required_unless_present = "list")]
    label: Option<String>,

    /// Minimal word length counted in the frequency table
    #[arg(long, value_name = "N", default_value_t = 0)]
    minimum: usize,

    /// List prompts without moving files
    #[arg(long, conflicts_with = "search")]
    list: bool,

    /// Process directories recursively
    #[arg(long)]
    recursive: bool,

    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "orgpng.json")]
    config: PathBuf,

    /// Plain line output instead of the terminal dashboard
    #[arg(long)]
    plain: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        if self.trace {
            "trace"
        } else if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    fn run_config(&self, app: &AppConfig) -> orgpng::Result<RunConfig> {
        Ok(RunConfig::new(&self.directory, &app.display)?
            .with_search(self.search.clone())
            .with_label(self.label.clone())
            .with_minimum(self.minimum)
            .with_list_only(self.list)
            .with_recursive(self.recursive))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // The dashboard owns the screen, so log lines must not reach it
    let (reporter, display_error) = select_reporter(cli.plain);
    let on_screen = display_error.is_some() || cli.plain;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_target(false);
    if on_screen {
        builder.with_writer(io::stderr).init();
    } else {
        builder.with_writer(io::sink).init();
    }

    if let Some(e) = display_error {
        warn!("Dashboard unavailable ({}), using plain output", e);
    }

    let app_config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;
    let run_config = cli
        .run_config(&app_config)
        .context("Failed to resolve directory")?;

    let extractor = ExifToolExtractor::new(&app_config.extractor);
    let stop_words = StopWords::with_extra(&app_config.stop_words.extra);
    let error_log = ErrorLog::open_or_disabled(app_config.error_log.as_deref());

    let mut driver = Driver::new(
        run_config,
        Box::new(extractor),
        stop_words,
        reporter,
        error_log,
    );

    let outcome = tokio::select! {
        result = driver.run() => Some(result),
        _ = signal::ctrl_c() => None,
    };

    match outcome {
        Some(Ok(summary)) => {
            info!("Done: {} files processed", summary.files_processed);
            Ok(ExitCode::SUCCESS)
        }
        // Already reported and logged by the driver
        Some(Err(_)) => Ok(ExitCode::FAILURE),
        None => {
            drop(driver);
            eprintln!("Interrupted.");
            Ok(ExitCode::from(130))
        }
    }
}

fn select_reporter(plain: bool) -> (Box<dyn StatusReporter>, Option<orgpng::OrgError>) {
    if plain {
        return (Box::new(LogReporter::stdout()), None);
    }

    match DashboardReporter::new() {
        Ok(dashboard) => (Box::new(dashboard), None),
        Err(e) => (Box::new(LogReporter::stdout()), Some(e)),
    }
}
