//! Lexical heuristics over a job's shell command.
//!
//! These are deliberately shallow: substring and parity checks, not a shell
//! parser. Escaped quotes are mis-counted and that is accepted.

use cl_domain::{DiagnosticCode, Issue};

/// Directories whose binaries count as "called by absolute path" even when
/// the command starts with something else (`env`, `nice`, a variable...).
const ABSOLUTE_PREFIXES: [&str; 5] = ["/usr/bin/", "/bin/", "/sbin/", "/usr/local/bin/", "/opt/"];

const REDIRECTIONS: [&str; 5] = [">", ">>", "2>", "&>", "2>>"];

/// Run every command heuristic, in a fixed order.
pub fn check_command(command: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    if !uses_absolute_path(command) {
        let program = command.split_whitespace().next().unwrap_or_default();
        issues.push(Issue::new(
            DiagnosticCode::MissingAbsolutePath,
            format!("Command '{program}' is not called by absolute path"),
        ));
    }

    if !has_redirection(command) {
        issues.push(Issue::new(
            DiagnosticCode::MissingRedirection,
            "Command output is not redirected",
        ));
    }

    if has_percent(command) {
        issues.push(Issue::new(
            DiagnosticCode::PercentCharacter,
            "Command contains '%', which cron treats as a newline",
        ));
    }

    let (single, double) = unbalanced_quotes(command);
    if single {
        issues.push(Issue::new(
            DiagnosticCode::QuotingIssue,
            "Command has unclosed single quotes",
        ));
    }
    if double {
        issues.push(Issue::new(
            DiagnosticCode::QuotingIssue,
            "Command has unclosed double quotes",
        ));
    }

    issues
}

pub fn uses_absolute_path(command: &str) -> bool {
    command.trim().starts_with('/')
        || command
            .split_whitespace()
            .any(|token| ABSOLUTE_PREFIXES.iter().any(|p| token.starts_with(p)))
}

pub fn has_redirection(command: &str) -> bool {
    REDIRECTIONS.iter().any(|r| command.contains(r))
}

pub fn has_percent(command: &str) -> bool {
    command.contains('%')
}

/// `(single, double)`: whether each quote kind appears an odd number of times.
pub fn unbalanced_quotes(command: &str) -> (bool, bool) {
    let single = command.matches('\'').count();
    let double = command.matches('"').count();
    (single % 2 == 1, double % 2 == 1)
}
