//! Data model shared across the analysis pipeline.
//!
//! Everything that ends up in a report or in the history store lives here as
//! a plain serde struct; field names are part of the JSON contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one observed test execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// One test execution extracted from a log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: u64,
}

/// Statistics extracted from a single log file.
///
/// `passed + failed + skipped` equals the total tests observed in the file:
/// an authoritative run-summary line wins over the per-line tally when both
/// are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileStats {
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    /// Overall run duration in seconds, independent of per-test durations.
    pub duration_s: f64,
    pub api_errors: u64,
    pub timeout_errors: u64,
    pub assertion_errors: u64,
    pub connection_errors: u64,
    pub failures: Vec<String>,
    pub tests: Vec<TestRecord>,
}

impl FileStats {
    pub fn total(&self) -> u64 {
        self.passed + self.failed + self.skipped
    }
}

/// A parsed log file together with its source path.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedFile {
    pub path: PathBuf,
    pub stats: FileStats,
}

impl AnalyzedFile {
    /// Basename used as the key in per-file report sections.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Aggregate totals over every analyzed file in one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTotals {
    pub total_tests: u64,
    pub total_passed: u64,
    pub total_failed: u64,
    pub total_skipped: u64,
    /// Percentage; 0.0 when no tests were observed.
    pub success_rate: f64,
    pub api_errors: u64,
    pub timeout_errors: u64,
    pub assertion_errors: u64,
    pub connection_errors: u64,
    /// Sum of per-file run durations, in seconds.
    pub total_duration: f64,
    pub files_analyzed: usize,
    /// Failure description lines flattened across all files, in file order.
    pub failures: Vec<String>,
}

/// One persisted run summary in the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub total_tests: u64,
    pub total_passed: u64,
    pub total_failed: u64,
    pub total_skipped: u64,
    pub success_rate: f64,
    pub api_errors: u64,
    pub timeout_errors: u64,
    pub assertion_errors: u64,
    pub connection_errors: u64,
    pub total_duration: f64,
    pub files_analyzed: usize,
    #[serde(default)]
    pub failures: Vec<String>,
}

impl HistoryEntry {
    pub fn from_totals(totals: &RunTotals, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            total_tests: totals.total_tests,
            total_passed: totals.total_passed,
            total_failed: totals.total_failed,
            total_skipped: totals.total_skipped,
            success_rate: totals.success_rate,
            api_errors: totals.api_errors,
            timeout_errors: totals.timeout_errors,
            assertion_errors: totals.assertion_errors,
            connection_errors: totals.connection_errors,
            total_duration: totals.total_duration,
            files_analyzed: totals.files_analyzed,
            failures: totals.failures.clone(),
        }
    }
}

/// Rolling averages over the recent history window. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub success_rate: f64,
    pub api_errors: f64,
    pub timeout_errors: f64,
    pub assertion_errors: f64,
    pub connection_errors: f64,
    pub duration: f64,
    /// Number of history entries the means were computed from.
    pub sample_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    SuccessRateDrop,
    ApiErrorsSpike,
    TimeoutErrorsSpike,
    AssertionErrorsSpike,
    ConnectionErrorsSpike,
    DurationIncrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

/// A flagged deviation of the current run from the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub message: String,
    pub current: f64,
    pub baseline: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increase_pct: Option<f64>,
}

/// A test whose recent failure rate sits in the flaky band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlakyTest {
    pub test: String,
    /// Number of windowed runs in which the test failed.
    pub failures: u64,
    pub total_runs: usize,
    /// Percentage of windowed runs with a failure.
    pub failure_rate: f64,
    pub severity: Severity,
}
