//! Unified exit codes for the vitals CLI.
//! These are part of the public contract: CI pipelines branch on them.

pub const SUCCESS: i32 = 0;
pub const TEST_FAILURES: i32 = 1; // Analyzed run contained failed tests
pub const FATAL_ERROR: i32 = 2; // Report could not be produced (I/O or invocation error)
