//! Flaky Test Detector: tests that fail in some, but not all, recent runs.
//!
//! Test names are recovered from stored failure description strings by
//! taking the first path-like token. Differently-parameterized instances of
//! the same test file collapse onto one name; that precision loss is a
//! known property of the heuristic, kept as-is.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

use crate::model::{FlakyTest, HistoryEntry, Severity};

pub const DEFAULT_WINDOW_DAYS: i64 = 7;
/// Minimum history entries (overall and inside the window) before flaky
/// analysis is meaningful.
pub const MIN_RUNS: usize = 3;

const FLAKY_RATE_MIN: f64 = 0.2;
const FLAKY_RATE_MAX: f64 = 0.8;
const FLAKY_RATE_HIGH: f64 = 0.5;

static TEST_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w@.-]+(?:/[\w@.-]+)+").expect("static test path pattern"));

/// First path-like token of a failure description, if any.
pub fn test_name(failure: &str) -> Option<&str> {
    TEST_PATH.find(failure).map(|m| m.as_str())
}

pub fn detect(entries: &[HistoryEntry], window_days: i64, now: DateTime<Utc>) -> Vec<FlakyTest> {
    if entries.len() < MIN_RUNS {
        return Vec::new();
    }
    let cutoff = now - Duration::days(window_days);
    let windowed: Vec<&HistoryEntry> = entries.iter().filter(|e| e.timestamp > cutoff).collect();
    if windowed.len() < MIN_RUNS {
        return Vec::new();
    }

    let total_runs = windowed.len();
    let mut failed_runs: HashMap<&str, u64> = HashMap::new();
    for entry in &windowed {
        // A test counts once per run no matter how many failure lines it
        // produced in that run.
        let names: BTreeSet<&str> = entry.failures.iter().filter_map(|f| test_name(f)).collect();
        for name in names {
            *failed_runs.entry(name).or_insert(0) += 1;
        }
    }

    let mut flaky: Vec<FlakyTest> = failed_runs
        .into_iter()
        .filter_map(|(test, failures)| {
            let rate = failures as f64 / total_runs as f64;
            if !(FLAKY_RATE_MIN..=FLAKY_RATE_MAX).contains(&rate) {
                return None;
            }
            Some(FlakyTest {
                test: test.to_string(),
                failures,
                total_runs,
                failure_rate: rate * 100.0,
                severity: if rate >= FLAKY_RATE_HIGH {
                    Severity::High
                } else {
                    Severity::Medium
                },
            })
        })
        .collect();
    flaky.sort_by(|a, b| {
        b.failure_rate
            .partial_cmp(&a.failure_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.test.cmp(&b.test))
    });
    flaky
}
