//! Report Renderer: formatting only, never recomputation.

pub mod json;
pub mod text;

use crate::model::{AnalyzedFile, Anomaly, Baseline, FlakyTest, RunTotals};

/// Long lists (slowest tests, failure details, flaky findings) are capped
/// at this many items with an explicit "...and N more" indicator.
pub const MAX_LIST_ITEMS: usize = 10;

/// Everything the renderers need, borrowed from the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Analysis<'a> {
    pub files: &'a [AnalyzedFile],
    pub totals: &'a RunTotals,
    pub baseline: Option<&'a Baseline>,
    pub anomalies: &'a [Anomaly],
    pub flaky: &'a [FlakyTest],
    /// False in basic mode: trend sections are omitted entirely.
    pub trends: bool,
}

/// Text-rendering switches. Color travels here instead of global state.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub color: bool,
    pub timing: bool,
    pub patterns: bool,
    pub failures_only: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: true,
            timing: false,
            patterns: false,
            failures_only: false,
        }
    }
}
