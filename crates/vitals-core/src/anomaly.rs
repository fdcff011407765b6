//! Anomaly Detector: fixed-threshold comparison of the current run against
//! the rolling baseline.
//!
//! Every check is independent, so several anomalies may fire in one run.
//! Findings are informational only and never affect control flow.

use serde::{Deserialize, Serialize};

use crate::model::{Anomaly, AnomalyKind, Baseline, RunTotals, Severity};

/// Detection thresholds. The defaults are the tuned heuristics this tool
/// has always shipped with; they are a config surface, not hard truths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Success-rate drop, in percentage points, that flags an anomaly.
    pub success_rate_drop: f64,
    /// Drop beyond which the anomaly is High instead of Medium.
    pub success_rate_drop_high: f64,
    /// Percentage increase over the baseline mean per error category.
    pub api_errors_pct: f64,
    pub timeout_errors_pct: f64,
    pub assertion_errors_pct: f64,
    pub connection_errors_pct: f64,
    /// Error-spike increase beyond which severity is High.
    pub spike_high_pct: f64,
    /// Duration increase that flags an anomaly.
    pub duration_pct: f64,
    /// Duration increase at or beyond which severity is High.
    pub duration_high_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            success_rate_drop: 15.0,
            success_rate_drop_high: 25.0,
            api_errors_pct: 100.0,
            timeout_errors_pct: 100.0,
            assertion_errors_pct: 50.0,
            connection_errors_pct: 200.0,
            spike_high_pct: 200.0,
            duration_pct: 50.0,
            duration_high_pct: 100.0,
        }
    }
}

pub fn detect(totals: &RunTotals, baseline: &Baseline, th: &Thresholds) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    let drop = baseline.success_rate - totals.success_rate;
    if drop > th.success_rate_drop {
        anomalies.push(Anomaly {
            kind: AnomalyKind::SuccessRateDrop,
            severity: if drop > th.success_rate_drop_high {
                Severity::High
            } else {
                Severity::Medium
            },
            message: format!(
                "Success rate dropped {:.1} points below the baseline ({:.1}% -> {:.1}%)",
                drop, baseline.success_rate, totals.success_rate
            ),
            current: totals.success_rate,
            baseline: baseline.success_rate,
            increase_pct: None,
        });
    }

    let categories: [(AnomalyKind, &str, u64, f64, f64); 4] = [
        (
            AnomalyKind::ApiErrorsSpike,
            "API errors",
            totals.api_errors,
            baseline.api_errors,
            th.api_errors_pct,
        ),
        (
            AnomalyKind::TimeoutErrorsSpike,
            "Timeout errors",
            totals.timeout_errors,
            baseline.timeout_errors,
            th.timeout_errors_pct,
        ),
        (
            AnomalyKind::AssertionErrorsSpike,
            "Assertion errors",
            totals.assertion_errors,
            baseline.assertion_errors,
            th.assertion_errors_pct,
        ),
        (
            AnomalyKind::ConnectionErrorsSpike,
            "Connection errors",
            totals.connection_errors,
            baseline.connection_errors,
            th.connection_errors_pct,
        ),
    ];
    for (kind, label, current, mean, threshold) in categories {
        if mean <= 0.0 {
            continue; // no baseline signal for this category
        }
        let increase = (current as f64 - mean) / mean * 100.0;
        if increase > threshold {
            anomalies.push(Anomaly {
                kind,
                severity: if increase > th.spike_high_pct {
                    Severity::High
                } else {
                    Severity::Medium
                },
                message: format!(
                    "{label} up {increase:.0}% over the baseline ({mean:.1} -> {current})"
                ),
                current: current as f64,
                baseline: mean,
                increase_pct: Some(increase),
            });
        }
    }

    if baseline.duration > 0.0 {
        let increase = (totals.total_duration - baseline.duration) / baseline.duration * 100.0;
        if increase > th.duration_pct {
            anomalies.push(Anomaly {
                kind: AnomalyKind::DurationIncrease,
                severity: if increase < th.duration_high_pct {
                    Severity::Medium
                } else {
                    Severity::High
                },
                message: format!(
                    "Run duration up {increase:.0}% over the baseline ({:.1}s -> {:.1}s)",
                    baseline.duration, totals.total_duration
                ),
                current: totals.total_duration,
                baseline: baseline.duration,
                increase_pct: Some(increase),
            });
        }
    }

    anomalies
}
