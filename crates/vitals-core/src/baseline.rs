//! Baseline Calculator: rolling averages over the recent history window.

use chrono::{DateTime, Duration, Utc};

use crate::model::{Baseline, HistoryEntry};

pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Mean of each tracked metric over entries newer than `now - window_days`.
/// `None` when no entry falls inside the window: "no comparison possible",
/// not an error.
pub fn calculate(
    entries: &[HistoryEntry],
    window_days: i64,
    now: DateTime<Utc>,
) -> Option<Baseline> {
    let cutoff = now - Duration::days(window_days);
    let recent: Vec<&HistoryEntry> = entries.iter().filter(|e| e.timestamp > cutoff).collect();
    if recent.is_empty() {
        return None;
    }
    let n = recent.len() as f64;
    let mean = |metric: fn(&HistoryEntry) -> f64| recent.iter().map(|e| metric(e)).sum::<f64>() / n;
    Some(Baseline {
        success_rate: mean(|e| e.success_rate),
        api_errors: mean(|e| e.api_errors as f64),
        timeout_errors: mean(|e| e.timeout_errors as f64),
        assertion_errors: mean(|e| e.assertion_errors as f64),
        connection_errors: mean(|e| e.connection_errors as f64),
        duration: mean(|e| e.total_duration),
        sample_size: recent.len(),
    })
}
