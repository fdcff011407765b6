//! Aggregator: pure reduction of per-file statistics into run totals.

use crate::model::{AnalyzedFile, RunTotals};

/// Success rate as a percentage; 0.0 when no tests were observed.
pub fn success_rate(passed: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    }
}

/// Sum every numeric field across the analyzed files and flatten the
/// failure lists. No side effects, no failure modes.
pub fn totals(files: &[AnalyzedFile]) -> RunTotals {
    let mut t = RunTotals {
        files_analyzed: files.len(),
        ..RunTotals::default()
    };
    for f in files {
        t.total_passed += f.stats.passed;
        t.total_failed += f.stats.failed;
        t.total_skipped += f.stats.skipped;
        t.api_errors += f.stats.api_errors;
        t.timeout_errors += f.stats.timeout_errors;
        t.assertion_errors += f.stats.assertion_errors;
        t.connection_errors += f.stats.connection_errors;
        t.total_duration += f.stats.duration_s;
        t.failures.extend(f.stats.failures.iter().cloned());
    }
    t.total_tests = t.total_passed + t.total_failed + t.total_skipped;
    t.success_rate = success_rate(t.total_passed, t.total_tests);
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileStats;
    use std::path::PathBuf;

    fn file(passed: u64, failed: u64, skipped: u64) -> AnalyzedFile {
        AnalyzedFile {
            path: PathBuf::from(format!("e2e-{passed}-{failed}.log")),
            stats: FileStats {
                passed,
                failed,
                skipped,
                duration_s: 10.0,
                api_errors: 1,
                failures: if failed > 0 {
                    vec!["✗ test/x.spec.ts (1s)".into()]
                } else {
                    Vec::new()
                },
                ..FileStats::default()
            },
        }
    }

    #[test]
    fn sums_every_field() {
        let files = vec![file(9, 1, 0), file(10, 0, 0)];
        let t = totals(&files);
        assert_eq!(t.total_passed, 19);
        assert_eq!(t.total_failed, 1);
        assert_eq!(t.total_skipped, 0);
        assert_eq!(t.total_tests, 20);
        assert_eq!(t.files_analyzed, 2);
        assert_eq!(t.api_errors, 2);
        assert!((t.total_duration - 20.0).abs() < f64::EPSILON);
        assert_eq!(t.failures.len(), 1);
        assert!((t.success_rate - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn aggregation_is_idempotent_over_unmutated_input() {
        let files = vec![file(3, 2, 1), file(0, 0, 0)];
        assert_eq!(totals(&files), totals(&files));
    }

    #[test]
    fn zero_tests_means_zero_success_rate() {
        let t = totals(&[file(0, 0, 0)]);
        assert_eq!(t.success_rate, 0.0);
        assert_eq!(success_rate(0, 0), 0.0);
    }
}
