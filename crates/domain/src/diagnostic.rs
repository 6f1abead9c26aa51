//! Diagnostic model shared by every check.
//!
//! Each issue category has a stable `CRON-NNN` code with one fixed default
//! [`Severity`] and one fixed remediation hint. Consumers (text/JSON
//! reports, exit codes) key off these codes, so they never change meaning.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Severity
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Ordered severity: `Info < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a severity string is not one of the accepted spellings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity '{0}' (expected info, warn, warning or error)")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            _ => Err(UnknownSeverity(s.to_owned())),
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Diagnostic codes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    DomDowConflict,
    EmptySchedule,
    ParseError,
    SourceReadError,
    InvalidStructure,
    RedundantPattern,
    ExcessiveRuns,
    MissingAbsolutePath,
    MissingRedirection,
    PercentCharacter,
    QuotingIssue,
    OverlapDetected,
}

impl DiagnosticCode {
    pub const ALL: [DiagnosticCode; 12] = [
        DiagnosticCode::DomDowConflict,
        DiagnosticCode::EmptySchedule,
        DiagnosticCode::ParseError,
        DiagnosticCode::SourceReadError,
        DiagnosticCode::InvalidStructure,
        DiagnosticCode::RedundantPattern,
        DiagnosticCode::ExcessiveRuns,
        DiagnosticCode::MissingAbsolutePath,
        DiagnosticCode::MissingRedirection,
        DiagnosticCode::PercentCharacter,
        DiagnosticCode::QuotingIssue,
        DiagnosticCode::OverlapDetected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::DomDowConflict => "CRON-001",
            DiagnosticCode::EmptySchedule => "CRON-002",
            DiagnosticCode::ParseError => "CRON-003",
            DiagnosticCode::SourceReadError => "CRON-004",
            DiagnosticCode::InvalidStructure => "CRON-005",
            DiagnosticCode::RedundantPattern => "CRON-006",
            DiagnosticCode::ExcessiveRuns => "CRON-007",
            DiagnosticCode::MissingAbsolutePath => "CRON-008",
            DiagnosticCode::MissingRedirection => "CRON-009",
            DiagnosticCode::PercentCharacter => "CRON-010",
            DiagnosticCode::QuotingIssue => "CRON-011",
            DiagnosticCode::OverlapDetected => "CRON-012",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::EmptySchedule
            | DiagnosticCode::ParseError
            | DiagnosticCode::SourceReadError
            | DiagnosticCode::InvalidStructure => Severity::Error,
            DiagnosticCode::MissingAbsolutePath | DiagnosticCode::MissingRedirection => {
                Severity::Info
            }
            DiagnosticCode::DomDowConflict
            | DiagnosticCode::RedundantPattern
            | DiagnosticCode::ExcessiveRuns
            | DiagnosticCode::PercentCharacter
            | DiagnosticCode::QuotingIssue
            | DiagnosticCode::OverlapDetected => Severity::Warn,
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            DiagnosticCode::DomDowConflict => {
                "Cron may run the job when EITHER day-of-month OR day-of-week matches; set one of them to '*' if you meant AND"
            }
            DiagnosticCode::EmptySchedule => {
                "Check that the day-of-month exists in the selected months (e.g. Feb 30 never occurs)"
            }
            DiagnosticCode::ParseError => {
                "Use five fields: minute hour day-of-month month day-of-week, or an alias such as @daily"
            }
            DiagnosticCode::SourceReadError => {
                "Check that the crontab exists and is readable by the current user"
            }
            DiagnosticCode::InvalidStructure => {
                "A crontab job line needs five schedule fields followed by a command"
            }
            DiagnosticCode::RedundantPattern => "A step of '/1' is the same as no step; drop it",
            DiagnosticCode::ExcessiveRuns => {
                "Consider running less often or moving the work into a long-lived service"
            }
            DiagnosticCode::MissingAbsolutePath => {
                "Cron runs with a minimal PATH; use an absolute path such as /usr/bin/..."
            }
            DiagnosticCode::MissingRedirection => {
                "Redirect output (e.g. '>> /var/log/job.log 2>&1') so it is not mailed or lost"
            }
            DiagnosticCode::PercentCharacter => {
                "Cron turns '%' into a newline; escape it as '\\%'"
            }
            DiagnosticCode::QuotingIssue => "Balance the quotes in the command",
            DiagnosticCode::OverlapDetected => {
                "Stagger the schedules or add locking (e.g. flock) if the jobs share resources"
            }
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DiagnosticCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DiagnosticCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DiagnosticCode::ALL
            .into_iter()
            .find(|c| c.as_str() == raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown diagnostic code '{raw}'")))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Issue
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single diagnostic.
///
/// `line_number` is 0 and `expression` empty when not applicable; a crontab
/// level caller stamps them after the check produced the issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub code: DiagnosticCode,
    #[serde(default)]
    pub line_number: usize,
    #[serde(default)]
    pub expression: String,
    pub message: String,
    pub hint: String,
}

impl Issue {
    /// Build an issue with the code's default severity and hint.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            line_number: 0,
            expression: String::new(),
            message: message.into(),
            hint: code.hint().to_owned(),
        }
    }

    pub fn with_line(mut self, line_number: usize) -> Self {
        self.line_number = line_number;
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        };
        if self.line_number > 0 {
            write!(f, "[{tag}] {} line {}: {}", self.code, self.line_number, self.message)
        } else {
            write!(f, "[{tag}] {}: {}", self.code, self.message)
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation result
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Outcome of one validation call.
///
/// `issues` keeps check order. `valid` only ever goes from true to false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<Issue>,
    pub total_jobs: usize,
    pub valid_jobs: usize,
    pub invalid_jobs: usize,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
            total_jobs: 0,
            valid_jobs: 0,
            invalid_jobs: 0,
        }
    }

    /// A result for a job source that could not be read at all.
    pub fn read_failure(issue: Issue) -> Self {
        Self {
            valid: false,
            issues: vec![issue],
            total_jobs: 0,
            valid_jobs: 0,
            invalid_jobs: 0,
        }
    }

    /// Append an issue; an error-severity issue invalidates the result.
    pub fn push(&mut self, issue: Issue) {
        if issue.severity >= Severity::Error {
            self.valid = false;
        }
        self.issues.push(issue);
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}
