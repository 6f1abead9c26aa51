use serde::{Deserialize, Serialize};

/// One scheduled job as produced by a crontab reader (or supplied directly
/// by a caller).
///
/// `valid` records the reader's own verdict on the line; the validator
/// re-parses regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub line_number: usize,
    pub expression: String,
    #[serde(default)]
    pub command: String,
    #[serde(default = "d_true")]
    pub valid: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl Job {
    /// A job the reader considers well formed.
    pub fn new(
        line_number: usize,
        expression: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            line_number,
            expression: expression.into(),
            command: command.into(),
            valid: true,
            error: None,
        }
    }

    /// A job the reader rejected, with the reader's explanation.
    pub fn invalid(
        line_number: usize,
        expression: impl Into<String>,
        command: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            line_number,
            expression: expression.into(),
            command: command.into(),
            valid: false,
            error: Some(error.into()),
        }
    }

    /// Identifier used when reporting this job in overlap windows.
    /// `index` is the job's position in its set, used when no line number
    /// is known.
    pub fn label(&self, index: usize) -> String {
        if self.line_number > 0 {
            format!("line {}", self.line_number)
        } else {
            format!("job #{}", index + 1)
        }
    }
}

/// One classified crontab line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CrontabEntry {
    Job(Job),
    Comment { line_number: usize, text: String },
    EnvVar {
        line_number: usize,
        name: String,
        value: String,
    },
    Empty { line_number: usize },
}

impl CrontabEntry {
    pub fn line_number(&self) -> usize {
        match self {
            CrontabEntry::Job(job) => job.line_number,
            CrontabEntry::Comment { line_number, .. }
            | CrontabEntry::EnvVar { line_number, .. }
            | CrontabEntry::Empty { line_number } => *line_number,
        }
    }

    pub fn as_job(&self) -> Option<&Job> {
        match self {
            CrontabEntry::Job(job) => Some(job),
            _ => None,
        }
    }
}

fn d_true() -> bool {
    true
}
