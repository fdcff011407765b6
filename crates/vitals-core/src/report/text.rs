//! Human-readable report, section by section.

use std::fmt::Write;

use crate::model::{Severity, TestRecord};
use crate::report::{Analysis, RenderOptions, MAX_LIST_ITEMS};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

fn paint(enabled: bool, code: &str, text: &str) -> String {
    if enabled {
        format!("{code}{text}{RESET}")
    } else {
        text.to_string()
    }
}

fn severity_tag(opts: &RenderOptions, severity: Severity) -> String {
    let code = match severity {
        Severity::High => RED,
        Severity::Medium => YELLOW,
    };
    paint(opts.color, code, &format!("[{}]", severity.label()))
}

fn more_line(out: &mut String, shown: usize, total: usize) {
    if total > shown {
        let _ = writeln!(out, "  ...and {} more", total - shown);
    }
}

pub fn render(analysis: &Analysis<'_>, opts: &RenderOptions) -> String {
    let t = analysis.totals;
    let mut out = String::new();

    let _ = writeln!(out, "📈 Summary Report");
    let _ = writeln!(out, "=================");
    let _ = writeln!(out, "Files analyzed: {}", t.files_analyzed);
    let _ = writeln!(out, "Total tests: {}", t.total_tests);
    let _ = writeln!(out, "✅ Passed: {}", t.total_passed);
    let failed = t.total_failed.to_string();
    let failed = if t.total_failed > 0 {
        paint(opts.color, RED, &failed)
    } else {
        failed
    };
    let _ = writeln!(out, "❌ Failed: {}", failed);
    let _ = writeln!(out, "⏸ Skipped: {}", t.total_skipped);
    let _ = writeln!(out, "🎯 Success rate: {:.2}%", t.success_rate);

    if opts.timing {
        let _ = writeln!(out, "\n⏱ Timing Analysis");
        let _ = writeln!(out, "=================");
        let _ = writeln!(out, "Total execution time: {:.1}s", t.total_duration);
        let avg = if t.files_analyzed > 0 {
            t.total_duration / t.files_analyzed as f64
        } else {
            0.0
        };
        let _ = writeln!(out, "Average per file: {:.2}s", avg);
        let slowest_file = analysis
            .files
            .iter()
            .max_by(|a, b| a.stats.duration_s.total_cmp(&b.stats.duration_s));
        if let Some(f) = slowest_file {
            let _ = writeln!(out, "Slowest file: {} ({:.1}s)", f.file_name(), f.stats.duration_s);
        }
        let mut slowest: Vec<&TestRecord> =
            analysis.files.iter().flat_map(|f| f.stats.tests.iter()).collect();
        slowest.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms));
        if !slowest.is_empty() {
            let _ = writeln!(out, "Slowest tests:");
            for (i, test) in slowest.iter().take(MAX_LIST_ITEMS).enumerate() {
                let _ = writeln!(out, "  {}. {} ({}ms)", i + 1, test.name, test.duration_ms);
            }
            more_line(&mut out, MAX_LIST_ITEMS.min(slowest.len()), slowest.len());
        }
    }

    if opts.patterns {
        let _ = writeln!(out, "\n🔍 Error Patterns Analysis");
        let _ = writeln!(out, "==========================");
        let _ = writeln!(out, "🌐 API errors: {}", t.api_errors);
        let _ = writeln!(out, "⏱ Timeout errors: {}", t.timeout_errors);
        let _ = writeln!(out, "🔍 Assertion errors: {}", t.assertion_errors);
        let _ = writeln!(out, "🔌 Connection errors: {}", t.connection_errors);
    }

    if opts.failures_only && t.total_failed > 0 {
        let _ = writeln!(out, "\n❌ Failed Test Details");
        let _ = writeln!(out, "=====================");
        for f in analysis.files {
            if f.stats.failed == 0 {
                continue;
            }
            let _ = writeln!(out, "\n📁 {}", f.file_name());
            for failure in f.stats.failures.iter().take(MAX_LIST_ITEMS) {
                let _ = writeln!(out, "  {}", failure);
            }
            more_line(
                &mut out,
                MAX_LIST_ITEMS.min(f.stats.failures.len()),
                f.stats.failures.len(),
            );
        }
    }

    if analysis.trends {
        let _ = writeln!(out, "\n📊 Trend Analysis");
        let _ = writeln!(out, "=================");
        match analysis.baseline {
            Some(b) => {
                let _ = writeln!(
                    out,
                    "Baseline: {:.1}% success rate over {} recent runs",
                    b.success_rate, b.sample_size
                );
            }
            None => {
                let _ = writeln!(out, "No baseline yet: the history window has no runs.");
            }
        }

        if analysis.anomalies.is_empty() {
            if analysis.baseline.is_some() {
                let _ = writeln!(out, "No anomalies against the baseline.");
            }
        } else {
            let _ = writeln!(out, "⚠ Anomalies:");
            for a in analysis.anomalies {
                let _ = writeln!(out, "  {} {}", severity_tag(opts, a.severity), a.message);
            }
        }

        if analysis.flaky.is_empty() {
            let _ = writeln!(out, "No flaky tests detected.");
        } else {
            let _ = writeln!(out, "🤔 Flaky tests:");
            for f in analysis.flaky.iter().take(MAX_LIST_ITEMS) {
                let _ = writeln!(
                    out,
                    "  {} {} failed {} of {} recent runs ({:.1}%)",
                    severity_tag(opts, f.severity),
                    f.test,
                    f.failures,
                    f.total_runs,
                    f.failure_rate
                );
            }
            more_line(
                &mut out,
                MAX_LIST_ITEMS.min(analysis.flaky.len()),
                analysis.flaky.len(),
            );
        }
    }

    out
}
