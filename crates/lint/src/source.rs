//! Job sources: where crontab text comes from and how it is split into
//! entries.
//!
//! A [`JobSource`] only fetches text; [`parse_crontab`] classifies each line
//! and marks jobs the oracle rejects, so every source feeds the validator
//! identically.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use cl_domain::error::{Error, Result};
use cl_domain::{CrontabEntry, Job};
use cl_schedule::Oracle;

/// Something crontab text can be read from.
pub trait JobSource {
    /// Human-readable name used in diagnostics ("crontab file /etc/...").
    fn name(&self) -> String;
    fn read_text(&self) -> Result<String>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sources
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A crontab file on disk.
#[derive(Debug, Clone)]
pub struct CrontabFile {
    path: PathBuf,
}

impl CrontabFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl JobSource for CrontabFile {
    fn name(&self) -> String {
        format!("crontab file {}", self.path.display())
    }

    fn read_text(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|e| Error::Source {
            source_name: self.name(),
            message: e.to_string(),
        })
    }
}

/// Crontab text piped on standard input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stdin;

impl JobSource for Stdin {
    fn name(&self) -> String {
        "standard input".into()
    }

    fn read_text(&self) -> Result<String> {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    }
}

/// The per-user crontab, read with `crontab -l`.
#[derive(Debug, Clone, Default)]
pub struct UserCrontab {
    user: Option<String>,
}

impl UserCrontab {
    pub fn new(user: Option<&str>) -> Self {
        Self {
            user: user.map(str::to_owned),
        }
    }
}

impl JobSource for UserCrontab {
    fn name(&self) -> String {
        match &self.user {
            Some(user) => format!("crontab for user {user}"),
            None => "user crontab".into(),
        }
    }

    fn read_text(&self) -> Result<String> {
        let mut cmd = Command::new("crontab");
        if let Some(user) = &self.user {
            cmd.arg("-u").arg(user);
        }
        cmd.arg("-l");

        let output = cmd.output().map_err(|e| Error::Source {
            source_name: self.name(),
            message: format!("running crontab -l: {e}"),
        })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_missing_crontab(&stderr) {
            tracing::debug!(source = %self.name(), "no crontab installed");
            return Ok(String::new());
        }
        Err(Error::Source {
            source_name: self.name(),
            message: stderr.trim().to_owned(),
        })
    }
}

/// Whether a failed `crontab -l` only reports that no crontab is installed.
/// An absent crontab is an empty one, not a failure.
fn is_missing_crontab(stderr: &str) -> bool {
    stderr.contains("no crontab for")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Line decomposition
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Split crontab text into classified entries. Line numbers start at 1.
pub fn parse_crontab(text: &str, oracle: &dyn Oracle) -> Vec<CrontabEntry> {
    text.lines()
        .enumerate()
        .map(|(i, line)| parse_line(i + 1, line, oracle))
        .collect()
}

fn parse_line(line_number: usize, line: &str, oracle: &dyn Oracle) -> CrontabEntry {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return CrontabEntry::Empty { line_number };
    }
    if let Some(text) = trimmed.strip_prefix('#') {
        return CrontabEntry::Comment {
            line_number,
            text: text.trim().to_owned(),
        };
    }
    if let Some((name, value)) = env_assignment(trimmed) {
        return CrontabEntry::EnvVar {
            line_number,
            name,
            value,
        };
    }

    let field_count = if trimmed.starts_with('@') { 1 } else { 5 };
    let (fields, command) = split_fields(trimmed, field_count);
    let expression = fields.join(" ");

    if fields.len() < field_count {
        return CrontabEntry::Job(Job::invalid(
            line_number,
            expression,
            "",
            format!("expected 5 fields, got {}", fields.len()),
        ));
    }
    if let Err(e) = oracle.validate(&expression) {
        return CrontabEntry::Job(Job::invalid(line_number, expression, command, e.to_string()));
    }
    if command.is_empty() {
        return CrontabEntry::Job(Job::invalid(
            line_number,
            expression,
            "",
            "missing command after schedule",
        ));
    }

    CrontabEntry::Job(Job::new(line_number, expression, command))
}

/// `NAME=value` (spaces around `=` allowed, value quotes stripped).
fn env_assignment(line: &str) -> Option<(String, String)> {
    let (name, value) = line.split_once('=')?;
    let name = name.trim();
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }

    let value = value.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q)?.strip_suffix(*q))
        .unwrap_or(value);
    Some((name.to_owned(), unquoted.to_owned()))
}

/// Take up to `n` whitespace-separated tokens; the rest of the line
/// (trimmed, inner spacing preserved) is the command.
fn split_fields(line: &str, n: usize) -> (Vec<&str>, &str) {
    let mut fields = Vec::with_capacity(n);
    let mut rest = line.trim_start();
    while fields.len() < n && !rest.is_empty() {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        fields.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    (fields, rest.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cl_schedule::CronOracle;

    fn parse(text: &str) -> Vec<CrontabEntry> {
        parse_crontab(text, &CronOracle::default())
    }

    #[test]
    fn classifies_each_line_kind() {
        let entries = parse(
            "# nightly jobs\n\nMAILTO=ops@example.com\n0 2 * * * /usr/bin/backup > /dev/null\n",
        );
        assert_eq!(entries.len(), 4);
        assert!(matches!(
            &entries[0],
            CrontabEntry::Comment { text, .. } if text == "nightly jobs"
        ));
        assert!(matches!(entries[1], CrontabEntry::Empty { line_number: 2 }));
        assert!(matches!(
            &entries[2],
            CrontabEntry::EnvVar { name, value, .. }
                if name == "MAILTO" && value == "ops@example.com"
        ));
        let job = entries[3].as_job().unwrap();
        assert_eq!(job.line_number, 4);
        assert_eq!(job.expression, "0 2 * * *");
        assert_eq!(job.command, "/usr/bin/backup > /dev/null");
        assert!(job.valid);
    }

    #[test]
    fn every_line_keeps_its_number() {
        let entries = parse("# a\n\nX=1\n0 0 * * * /bin/true\n61 * * * * /bin/true");
        let numbers: Vec<usize> = entries.iter().map(CrontabEntry::line_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn command_spacing_is_preserved() {
        let entries = parse("*/5  *\t* * *   echo  'a  b'   ");
        let job = entries[0].as_job().unwrap();
        assert_eq!(job.expression, "*/5 * * * *");
        assert_eq!(job.command, "echo  'a  b'");
    }

    #[test]
    fn aliases_take_one_field() {
        let entries = parse("@daily /usr/bin/true");
        let job = entries[0].as_job().unwrap();
        assert_eq!(job.expression, "@daily");
        assert_eq!(job.command, "/usr/bin/true");
        assert!(job.valid);
    }

    #[test]
    fn quoted_env_values_are_unquoted() {
        let entries = parse("PATH = \"/usr/bin:/bin\"");
        assert!(matches!(
            &entries[0],
            CrontabEntry::EnvVar { name, value, .. } if name == "PATH" && value == "/usr/bin:/bin"
        ));
    }

    #[test]
    fn env_like_text_inside_a_job_is_not_an_assignment() {
        let entries = parse("0 * * * * FOO=bar /usr/bin/run");
        assert!(entries[0].as_job().is_some());
    }

    #[test]
    fn rejected_schedules_are_marked_invalid() {
        let entries = parse("61 * * * * /bin/true\n* * * /bin/true\n0 0 * * *\n@reboot /bin/true");
        let jobs: Vec<&Job> = entries.iter().filter_map(CrontabEntry::as_job).collect();
        assert_eq!(jobs.len(), 4);
        assert!(jobs.iter().all(|j| !j.valid));
        assert!(jobs[0].error.as_deref().unwrap().starts_with("value out of range"));
        assert!(jobs[1].error.as_deref().unwrap().contains("expected 5 fields"));
        assert_eq!(jobs[2].error.as_deref(), Some("missing command after schedule"));
        assert!(jobs[3].error.as_deref().unwrap().contains("unrecognized alias"));
    }

    #[test]
    fn absent_user_crontab_is_recognized() {
        assert!(is_missing_crontab("no crontab for alice\n"));
        assert!(is_missing_crontab("crontab: no crontab for root"));
        assert!(!is_missing_crontab("crontab: user `bob' unknown"));
        assert!(!is_missing_crontab("must be privileged to use -u"));
        assert!(!is_missing_crontab(""));
    }

    #[test]
    fn missing_file_is_a_source_error() {
        let err = CrontabFile::new("/nonexistent/crontab").read_text().unwrap_err();
        assert!(matches!(err, Error::Source { .. }));
        assert!(err.to_string().starts_with("crontab file /nonexistent/crontab"));
    }
}
