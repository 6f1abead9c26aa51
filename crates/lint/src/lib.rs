//! Lint engine for cron schedules and crontab files.
//!
//! [`Validator`] is the entry point. It reads jobs from a [`JobSource`],
//! parses each schedule through `cl-schedule`, and runs the semantic,
//! frequency, command hygiene and overlap checks, collecting everything
//! into a [`ValidationResult`](cl_domain::ValidationResult).

pub mod frequency;
pub mod hygiene;
pub mod overlap;
pub mod source;
pub mod validator;

pub use frequency::FrequencyAnalyzer;
pub use overlap::{Overlap, OverlapAnalyzer, OverlapJob, OverlapReport, OverlapStats};
pub use source::{parse_crontab, CrontabFile, JobSource, Stdin, UserCrontab};
pub use validator::Validator;
