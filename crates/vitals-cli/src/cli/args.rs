//! CLI argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vitals",
    version,
    about = "Trend and anomaly analysis for end-to-end test logs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze a log file or a directory of e2e-*.log files
    Analyze(AnalyzeArgs),
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Path to a log file or to a directory scanned for e2e-*.log
    #[arg(default_value = "test-results")]
    pub log_path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout.
    /// Without a value, an e2e-analysis-<timestamp> name is generated.
    #[arg(long, num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,

    /// Basic counts only: skip baseline, anomaly, and flaky detection
    #[arg(long)]
    pub basic: bool,

    /// Do not record this run in the history store
    #[arg(long)]
    pub no_history: bool,

    /// Baseline window in days
    #[arg(long, default_value_t = vitals_core::baseline::DEFAULT_WINDOW_DAYS)]
    pub baseline_window: i64,

    /// Flaky-detection window in days
    #[arg(long, default_value_t = vitals_core::flaky::DEFAULT_WINDOW_DAYS)]
    pub flaky_window: i64,

    /// Analyze only the most recently modified log file
    #[arg(long)]
    pub latest: bool,

    /// Analyze only logs modified within the last 24 hours
    #[arg(short = 'r', long)]
    pub recent: bool,

    /// Read log content from standard input instead of a path
    #[arg(long, conflicts_with = "latest")]
    pub stdin: bool,

    /// Show only failed tests in the text report
    #[arg(short = 'f', long)]
    pub failures_only: bool,

    /// Include timing analysis in the text report
    #[arg(short = 't', long)]
    pub timing: bool,

    /// Include error-pattern analysis in the text report
    #[arg(short = 'p', long)]
    pub patterns: bool,

    /// Disable ANSI color in text output
    #[arg(long)]
    pub no_color: bool,
}
