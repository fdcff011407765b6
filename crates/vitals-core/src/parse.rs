//! Log Parser: turns one raw test-run log into a [`FileStats`].
//!
//! Extraction is driven by an ordered list of named line matchers; the first
//! matcher that hits a line wins and matchers are mutually exclusive per
//! line. Error-pattern counters and the run-duration line are scanned
//! independently of the matcher list, so a single line may increment several
//! error categories. Unmatched or malformed lines are ignored; parsing
//! never fails once the file is open.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{trace, warn};

use crate::model::{FileStats, TestRecord, TestStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    /// `Tests  <failed> failed | <passed> passed | <skipped> skipped`,
    /// authoritative counts; the last such line wins.
    Summary,
    /// `✓ <name> (<duration>)`
    Passed,
    /// `✗ <name> (<duration>)`
    Failed,
    /// `FAIL <name>`, a failure report without a duration.
    FailReport,
    /// `↓ <name> ...`, a skipped marker.
    Skipped,
}

struct LineMatcher {
    name: &'static str,
    kind: MatchKind,
    pattern: Regex,
}

static LINE_MATCHERS: Lazy<Vec<LineMatcher>> = Lazy::new(|| {
    let matcher = |name, kind, pattern: &str| LineMatcher {
        name,
        kind,
        pattern: Regex::new(pattern).expect("static line pattern"),
    };
    vec![
        matcher(
            "summary",
            MatchKind::Summary,
            r"Tests\s+(\d+)\s+failed\s+\|\s+(\d+)\s+passed\s+\|\s+(\d+)\s+skipped",
        ),
        matcher("passed", MatchKind::Passed, r"^\s*[✓✔]\s+(\S+)\s+\(([^)]+)\)"),
        matcher("failed", MatchKind::Failed, r"^\s*[✗✘]\s+(\S+)\s+\(([^)]+)\)"),
        matcher(
            "fail_report",
            MatchKind::FailReport,
            r"^\s*FAIL(?:ED)?\s+((?:[\w@.-]+/)+[\w@.-]+)",
        ),
        matcher("skipped", MatchKind::Skipped, r"^\s*↓\s+(\S+)"),
    ]
});

static DURATION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Duration:?\s+(\d+(?:\.\d+)?)s\b").expect("static duration pattern"));

/// Normalize a duration token to milliseconds.
///
/// A trailing `ms` is taken literally, a trailing bare `s` is multiplied by
/// 1000, and anything unparsable yields 0 rather than an error.
pub fn duration_to_ms(token: &str) -> u64 {
    let token = token.trim();
    let (digits, factor) = if let Some(rest) = token.strip_suffix("ms") {
        (rest, 1.0)
    } else if let Some(rest) = token.strip_suffix('s') {
        (rest, 1000.0)
    } else {
        return 0;
    };
    digits
        .trim()
        .parse::<f64>()
        .map(|v| (v * factor).max(0.0).round() as u64)
        .unwrap_or(0)
}

#[derive(Default)]
struct ParseState {
    stats: FileStats,
    /// (failed, passed, skipped) from the latest authoritative summary line.
    summary: Option<(u64, u64, u64)>,
}

fn apply_line(state: &mut ParseState, line: &str) {
    for m in LINE_MATCHERS.iter() {
        let Some(caps) = m.pattern.captures(line) else {
            continue;
        };
        trace!(matcher = m.name, "line matched");
        match m.kind {
            MatchKind::Summary => {
                let field = |i: usize| caps[i].parse::<u64>().unwrap_or(0);
                state.summary = Some((field(1), field(2), field(3)));
            }
            MatchKind::Passed => {
                state.stats.tests.push(TestRecord {
                    name: caps[1].to_string(),
                    status: TestStatus::Passed,
                    duration_ms: duration_to_ms(&caps[2]),
                });
            }
            MatchKind::Failed => {
                state.stats.tests.push(TestRecord {
                    name: caps[1].to_string(),
                    status: TestStatus::Failed,
                    duration_ms: duration_to_ms(&caps[2]),
                });
                state.stats.failures.push(line.trim().to_string());
            }
            MatchKind::FailReport => {
                state.stats.tests.push(TestRecord {
                    name: caps[1].to_string(),
                    status: TestStatus::Failed,
                    duration_ms: 0,
                });
                state.stats.failures.push(line.trim().to_string());
            }
            MatchKind::Skipped => {
                state.stats.tests.push(TestRecord {
                    name: caps[1].to_string(),
                    status: TestStatus::Skipped,
                    duration_ms: 0,
                });
            }
        }
        break; // first match wins
    }

    if let Some(caps) = DURATION_LINE.captures(line) {
        state.stats.duration_s = caps[1].parse::<f64>().unwrap_or(0.0);
    }

    count_error_patterns(line, &mut state.stats);
}

/// Error-category triggers, independent of test extraction. A single line
/// may increment several categories.
fn count_error_patterns(line: &str, stats: &mut FileStats) {
    let lower = line.to_lowercase();
    if line.contains("API") && lower.contains("error") {
        stats.api_errors += 1;
    }
    if lower.contains("timeout") {
        stats.timeout_errors += 1;
    }
    if line.contains("AssertionError") {
        stats.assertion_errors += 1;
    }
    if line.contains("ECONNREFUSED") {
        stats.connection_errors += 1;
    }
}

fn finish(state: ParseState) -> FileStats {
    let mut stats = state.stats;
    match state.summary {
        Some((failed, passed, skipped)) => {
            stats.failed = failed;
            stats.passed = passed;
            stats.skipped = skipped;
        }
        None => {
            for t in &stats.tests {
                match t.status {
                    TestStatus::Passed => stats.passed += 1,
                    TestStatus::Failed => stats.failed += 1,
                    TestStatus::Skipped => stats.skipped += 1,
                }
            }
        }
    }
    stats
}

/// Parse a log given as in-memory text. Never fails.
pub fn parse_log_text(text: &str) -> FileStats {
    let mut state = ParseState::default();
    for line in text.lines() {
        apply_line(&mut state, line);
    }
    finish(state)
}

/// Parse one log file. A missing or unreadable file yields `None`; the
/// caller excludes it from aggregation and the run continues.
pub fn parse_log_file(path: &Path) -> Option<FileStats> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(err) => {
            warn!("log file not readable, skipping {}: {err}", path.display());
            return None;
        }
    };
    let mut state = ParseState::default();
    for line in BufReader::new(file).lines() {
        match line {
            Ok(line) => apply_line(&mut state, &line),
            Err(err) => {
                warn!("read error, skipping {}: {err}", path.display());
                return None;
            }
        }
    }
    Some(finish(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_tokens_normalize_to_ms() {
        assert_eq!(duration_to_ms("1500ms"), 1500);
        assert_eq!(duration_to_ms("2.5s"), 2500);
        assert_eq!(duration_to_ms("garbage"), 0);
        assert_eq!(duration_to_ms(" 3s "), 3000);
        assert_eq!(duration_to_ms("ms"), 0);
        assert_eq!(duration_to_ms("-1s"), 0);
    }

    #[test]
    fn summary_line_wins_over_tally() {
        let stats = parse_log_text(
            "✓ test/a.spec.ts (1.2s)\n\
             ✗ test/b.spec.ts (850ms)\n\
             Tests  1 failed | 9 passed | 0 skipped (10)\n",
        );
        assert_eq!(stats.passed, 9);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.skipped, 0);
        // Per-test records are extracted independently of the counts.
        assert_eq!(stats.tests.len(), 2);
    }

    #[test]
    fn counts_fall_back_to_tallying_records() {
        let stats = parse_log_text(
            "✓ test/a.spec.ts (1.2s)\n\
             ✓ test/b.spec.ts (300ms)\n\
             ✗ test/c.spec.ts (2s)\n\
             ↓ test/d.spec.ts (skipped)\n",
        );
        assert_eq!(stats.passed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.total(), stats.tests.len() as u64);
    }

    #[test]
    fn passed_record_carries_duration() {
        let stats = parse_log_text("✓ test/a.spec.ts (1.5s)\n");
        assert_eq!(stats.tests[0].name, "test/a.spec.ts");
        assert_eq!(stats.tests[0].status, TestStatus::Passed);
        assert_eq!(stats.tests[0].duration_ms, 1500);
    }

    #[test]
    fn fail_report_line_defaults_duration_to_zero() {
        let stats = parse_log_text("FAIL test/system/export.spec.ts\n");
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.tests[0].duration_ms, 0);
        assert_eq!(stats.failures.len(), 1);
        // Prose starting with FAILED is not a failure report.
        let none = parse_log_text("FAILED to connect to server\n");
        assert_eq!(none.failed, 0);
        assert!(none.tests.is_empty());
    }

    #[test]
    fn failed_lines_are_collected_as_failure_descriptions() {
        let stats = parse_log_text("  ✗ test/auth/login.spec.ts (850ms)\n");
        assert_eq!(stats.failures, vec!["✗ test/auth/login.spec.ts (850ms)"]);
    }

    #[test]
    fn run_duration_line_is_extracted() {
        let stats = parse_log_text("Duration 42.5s\n");
        assert!((stats.duration_s - 42.5).abs() < f64::EPSILON);
        let with_colon = parse_log_text("Duration: 7s\n");
        assert!((with_colon.duration_s - 7.0).abs() < f64::EPSILON);
        let absent = parse_log_text("✓ test/a.spec.ts (1s)\n");
        assert_eq!(absent.duration_s, 0.0);
    }

    #[test]
    fn one_line_can_hit_multiple_error_categories() {
        let stats = parse_log_text("API request error: timeout after 30s\n");
        assert_eq!(stats.api_errors, 1);
        assert_eq!(stats.timeout_errors, 1);
        assert_eq!(stats.assertion_errors, 0);

        let stats = parse_log_text(
            "AssertionError: expected 200\n\
             connect ECONNREFUSED 127.0.0.1:8065\n",
        );
        assert_eq!(stats.assertion_errors, 1);
        assert_eq!(stats.connection_errors, 1);
    }

    #[test]
    fn error_triggers_follow_original_case_rules() {
        // "api" lowercase does not trip the API counter.
        let stats = parse_log_text("api error in handler\n");
        assert_eq!(stats.api_errors, 0);
        // "Timeout" any case does.
        let stats = parse_log_text("Timeout waiting for selector\n");
        assert_eq!(stats.timeout_errors, 1);
    }

    #[test]
    fn unmatched_lines_are_ignored() {
        let stats = parse_log_text("random noise\n\n   \n=== run start ===\n");
        assert_eq!(stats, FileStats::default());
    }

    #[test]
    fn missing_file_yields_none() {
        assert!(parse_log_file(Path::new("/nonexistent/e2e-x.log")).is_none());
    }

    #[test]
    fn file_and_text_parsing_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("e2e-run.log");
        let content = "✓ test/a.spec.ts (1s)\nTests  0 failed | 1 passed | 0 skipped (1)\n";
        std::fs::write(&path, content).unwrap();
        assert_eq!(parse_log_file(&path).unwrap(), parse_log_text(content));
    }
}
