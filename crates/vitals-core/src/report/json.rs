//! Machine-readable report document.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::report::Analysis;

/// Build the report document. The summary shape matches what downstream
/// tooling already consumes; trend fields are only present in enhanced
/// mode, and `baseline` is absent (not null) when no baseline exists.
pub fn render(analysis: &Analysis<'_>, generated_at: DateTime<Utc>) -> anyhow::Result<Value> {
    let t = analysis.totals;

    let mut file_details = Map::new();
    for f in analysis.files {
        file_details.insert(f.file_name(), serde_json::to_value(&f.stats)?);
    }

    let mut doc = json!({
        "analysis_timestamp": generated_at.to_rfc3339(),
        "files_analyzed": t.files_analyzed,
        "summary": {
            "total_tests": t.total_tests,
            "total_passed": t.total_passed,
            "total_failed": t.total_failed,
            "total_skipped": t.total_skipped,
            "success_rate": format!("{:.2}%", t.success_rate),
        },
        "error_patterns": {
            "api_errors": t.api_errors,
            "timeout_errors": t.timeout_errors,
            "assertion_errors": t.assertion_errors,
            "connection_errors": t.connection_errors,
        },
        "file_details": Value::Object(file_details),
    });

    if analysis.trends {
        if let Some(b) = analysis.baseline {
            doc["baseline"] = serde_json::to_value(b)?;
        }
        doc["anomalies"] = serde_json::to_value(analysis.anomalies)?;
        doc["flaky_tests"] = serde_json::to_value(analysis.flaky)?;
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalyzedFile, Baseline, FileStats};
    use std::path::PathBuf;

    fn files() -> Vec<AnalyzedFile> {
        vec![
            AnalyzedFile {
                path: PathBuf::from("test-results/e2e-a.log"),
                stats: FileStats {
                    passed: 9,
                    failed: 1,
                    ..FileStats::default()
                },
            },
            AnalyzedFile {
                path: PathBuf::from("test-results/e2e-b.log"),
                stats: FileStats {
                    passed: 10,
                    ..FileStats::default()
                },
            },
        ]
    }

    #[test]
    fn summary_shape_and_formatted_success_rate() {
        let files = files();
        let totals = crate::aggregate::totals(&files);
        let analysis = Analysis {
            files: &files,
            totals: &totals,
            baseline: None,
            anomalies: &[],
            flaky: &[],
            trends: false,
        };
        let doc = render(&analysis, Utc::now()).unwrap();
        assert_eq!(doc["files_analyzed"], 2);
        assert_eq!(doc["summary"]["total_passed"], 19);
        assert_eq!(doc["summary"]["total_failed"], 1);
        assert_eq!(doc["summary"]["total_skipped"], 0);
        assert_eq!(doc["summary"]["total_tests"], 20);
        assert_eq!(doc["summary"]["success_rate"], "95.00%");
        assert!(doc["file_details"]["e2e-a.log"].is_object());
        // Basic mode: no trend fields at all.
        assert!(doc.get("baseline").is_none());
        assert!(doc.get("anomalies").is_none());
        assert!(doc.get("flaky_tests").is_none());
    }

    #[test]
    fn trend_fields_present_in_enhanced_mode() {
        let files = files();
        let totals = crate::aggregate::totals(&files);
        let baseline = Baseline {
            success_rate: 96.0,
            api_errors: 0.0,
            timeout_errors: 0.0,
            assertion_errors: 0.0,
            connection_errors: 0.0,
            duration: 30.0,
            sample_size: 4,
        };
        let analysis = Analysis {
            files: &files,
            totals: &totals,
            baseline: Some(&baseline),
            anomalies: &[],
            flaky: &[],
            trends: true,
        };
        let doc = render(&analysis, Utc::now()).unwrap();
        assert_eq!(doc["baseline"]["sample_size"], 4);
        assert!(doc["anomalies"].as_array().unwrap().is_empty());
        assert!(doc["flaky_tests"].as_array().unwrap().is_empty());
    }

    #[test]
    fn missing_baseline_key_is_absent_even_in_enhanced_mode() {
        let files = files();
        let totals = crate::aggregate::totals(&files);
        let analysis = Analysis {
            files: &files,
            totals: &totals,
            baseline: None,
            anomalies: &[],
            flaky: &[],
            trends: true,
        };
        let doc = render(&analysis, Utc::now()).unwrap();
        assert!(doc.get("baseline").is_none());
        assert!(doc.get("anomalies").is_some());
    }
}
