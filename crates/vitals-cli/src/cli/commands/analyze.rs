//! `vitals analyze`: parse logs, aggregate, update history, detect trends,
//! render the report.

use anyhow::Context;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use vitals_core::anomaly::{self, Thresholds};
use vitals_core::model::{AnalyzedFile, HistoryEntry};
use vitals_core::report::{self, Analysis, RenderOptions};
use vitals_core::{aggregate, baseline, flaky, history, parse};

use super::super::args::{AnalyzeArgs, OutputFormat};
use crate::exit_codes;

const LOG_PREFIX: &str = "e2e-";
const LOG_SUFFIX: &str = ".log";
const RECENT_WINDOW_HOURS: u64 = 24;

pub fn run(args: AnalyzeArgs) -> anyhow::Result<i32> {
    let now = Utc::now();

    // Stdin content is spooled to a temp file that is removed when the
    // handle drops at the end of the run. Stdin runs have no log directory,
    // so history persistence is skipped for them.
    let mut _stdin_log = None;
    let (log_files, history_dir) = if args.stdin {
        let tmp = spool_stdin()?;
        let path = tmp.path().to_path_buf();
        _stdin_log = Some(tmp);
        (vec![path], None)
    } else {
        collect_log_files(&args)
    };

    let files: Vec<AnalyzedFile> = log_files
        .iter()
        .filter_map(|path| {
            parse::parse_log_file(path).map(|stats| AnalyzedFile {
                path: path.clone(),
                stats,
            })
        })
        .collect();

    if files.is_empty() {
        println!("No log files found to analyze.");
        return Ok(exit_codes::SUCCESS);
    }

    let totals = aggregate::totals(&files);

    // Per the pipeline contract the new run is recorded first; detectors
    // then read the updated store (which includes this run).
    let entries = match history_dir.as_deref() {
        Some(dir) if !args.no_history => {
            match history::save(dir, HistoryEntry::from_totals(&totals, now), now) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("history store not updated: {err:#}");
                    history::load(dir)
                }
            }
        }
        Some(dir) => history::load(dir),
        None => Vec::new(),
    };

    let trends = !args.basic;
    let bl = if trends {
        baseline::calculate(&entries, args.baseline_window, now)
    } else {
        None
    };
    let anomalies = bl
        .as_ref()
        .map(|b| anomaly::detect(&totals, b, &Thresholds::default()))
        .unwrap_or_default();
    let flaky_tests = if trends {
        flaky::detect(&entries, args.flaky_window, now)
    } else {
        Vec::new()
    };

    let analysis = Analysis {
        files: &files,
        totals: &totals,
        baseline: bl.as_ref(),
        anomalies: &anomalies,
        flaky: &flaky_tests,
        trends,
    };

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report::json::render(&analysis, now)?)?,
        OutputFormat::Text => report::text::render(
            &analysis,
            &RenderOptions {
                color: !args.no_color,
                timing: args.timing,
                patterns: args.patterns,
                failures_only: args.failures_only,
            },
        ),
    };

    match &args.export {
        Some(explicit) => {
            let path = explicit
                .clone()
                .unwrap_or_else(|| default_export_name(args.format, now));
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating report directory {}", parent.display()))?;
            }
            fs::write(&path, &output)
                .with_context(|| format!("writing report to {}", path.display()))?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => println!("{output}"),
    }

    Ok(if totals.total_failed > 0 {
        exit_codes::TEST_FAILURES
    } else {
        exit_codes::SUCCESS
    })
}

/// Resolve the input path to concrete log files plus the directory that
/// owns the history store. A missing path is an input error, not a fatal
/// one: it yields no files and the caller reports "nothing to analyze".
fn collect_log_files(args: &AnalyzeArgs) -> (Vec<PathBuf>, Option<PathBuf>) {
    let path = &args.log_path;
    if path.is_file() {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        return (vec![path.clone()], Some(dir));
    }
    if path.is_dir() {
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("log directory not readable {}: {err}", path.display());
                return (Vec::new(), None);
            }
        };
        let mut files = Vec::new();
        for entry in entries.flatten() {
            let candidate = entry.path();
            let Some(name) = candidate.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !(name.starts_with(LOG_PREFIX) && name.ends_with(LOG_SUFFIX)) {
                continue;
            }
            if args.recent && !modified_within(&candidate, RECENT_WINDOW_HOURS) {
                continue;
            }
            files.push(candidate);
        }
        files.sort();
        if args.latest && files.len() > 1 {
            files = files
                .into_iter()
                .max_by_key(|p| fs::metadata(p).and_then(|m| m.modified()).ok())
                .map(|p| vec![p])
                .unwrap_or_default();
        }
        return (files, Some(path.clone()));
    }
    warn!("log path not found: {}", path.display());
    (Vec::new(), None)
}

fn modified_within(path: &Path, hours: u64) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    let Ok(modified) = meta.modified() else {
        return false;
    };
    match modified.elapsed() {
        Ok(age) => age <= Duration::from_secs(hours * 3600),
        // A modification time in the future counts as recent.
        Err(_) => true,
    }
}

fn spool_stdin() -> anyhow::Result<tempfile::NamedTempFile> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("reading log from stdin")?;
    let mut tmp = tempfile::NamedTempFile::new().context("creating temp file for stdin log")?;
    tmp.write_all(content.as_bytes())
        .context("spooling stdin log to temp file")?;
    tmp.flush().context("flushing stdin log temp file")?;
    Ok(tmp)
}

fn default_export_name(format: OutputFormat, now: DateTime<Utc>) -> PathBuf {
    let ext = match format {
        OutputFormat::Json => "json",
        OutputFormat::Text => "md",
    };
    PathBuf::from(format!("e2e-analysis-{}.{ext}", now.format("%Y%m%d-%H%M%S")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_export_names_carry_timestamp_and_extension() {
        let now = "2024-03-01T12:30:45Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(
            default_export_name(OutputFormat::Json, now),
            PathBuf::from("e2e-analysis-20240301-123045.json")
        );
        assert_eq!(
            default_export_name(OutputFormat::Text, now),
            PathBuf::from("e2e-analysis-20240301-123045.md")
        );
    }

    #[test]
    fn collect_scans_directory_for_convention_named_logs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("e2e-a.log"), "x").unwrap();
        fs::write(dir.path().join("e2e-b.log"), "x").unwrap();
        fs::write(dir.path().join("other.log"), "x").unwrap();
        fs::write(dir.path().join("e2e-notes.txt"), "x").unwrap();

        let args = args_for(dir.path());
        let (files, history_dir) = collect_log_files(&args);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["e2e-a.log", "e2e-b.log"]);
        assert_eq!(history_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn collect_of_single_file_uses_parent_for_history() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("e2e-a.log");
        fs::write(&log, "x").unwrap();

        let args = args_for(&log);
        let (files, history_dir) = collect_log_files(&args);
        assert_eq!(files, vec![log]);
        assert_eq!(history_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn missing_path_yields_no_files() {
        let args = args_for(Path::new("/nonexistent/test-results"));
        let (files, history_dir) = collect_log_files(&args);
        assert!(files.is_empty());
        assert!(history_dir.is_none());
    }

    #[test]
    fn latest_keeps_only_one_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("e2e-a.log"), "x").unwrap();
        fs::write(dir.path().join("e2e-b.log"), "x").unwrap();

        let mut args = args_for(dir.path());
        args.latest = true;
        let (files, _) = collect_log_files(&args);
        assert_eq!(files.len(), 1);
    }

    fn args_for(path: &Path) -> AnalyzeArgs {
        AnalyzeArgs {
            log_path: path.to_path_buf(),
            format: OutputFormat::Text,
            export: None,
            basic: false,
            no_history: false,
            baseline_window: 7,
            flaky_window: 7,
            latest: false,
            recent: false,
            stdin: false,
            failures_only: false,
            timing: false,
            patterns: false,
            no_color: false,
        }
    }
}
