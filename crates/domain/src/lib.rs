//! Shared types for the cronlint workspace.
//!
//! Holds the diagnostic model every check produces, the job records the
//! crontab readers hand to the validator, configuration, and the structured
//! trace events emitted across crates.

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod job;
pub mod trace;

pub use diagnostic::{DiagnosticCode, Issue, Severity, ValidationResult};
pub use error::{Error, Result};
pub use job::{CrontabEntry, Job};
