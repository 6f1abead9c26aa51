//! Text and JSON rendering of validation and overlap results.

use cl_domain::{Severity, ValidationResult};
use cl_lint::OverlapReport;

use crate::cli::Format;

pub fn render_result(result: &ValidationResult, format: Format) -> anyhow::Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(result)?),
        Format::Text => Ok(result_text(result)),
    }
}

pub fn render_overlaps(
    report: &OverlapReport,
    window_hours: i64,
    format: Format,
) -> anyhow::Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(report)?),
        Format::Text => Ok(overlaps_text(report, window_hours)),
    }
}

fn result_text(result: &ValidationResult) -> String {
    let mut lines = Vec::new();

    for issue in &result.issues {
        lines.push(issue.to_string());
        if !issue.expression.is_empty() {
            lines.push(format!("    expression: {}", issue.expression));
        }
        lines.push(format!("    hint: {}", issue.hint));
    }
    if !result.issues.is_empty() {
        lines.push(String::new());
    }

    lines.push(format!(
        "{} job(s): {} valid, {} invalid",
        result.total_jobs, result.valid_jobs, result.invalid_jobs
    ));
    lines.push(format!(
        "{} error(s), {} warning(s), {} info",
        result.count(Severity::Error),
        result.count(Severity::Warn),
        result.count(Severity::Info)
    ));
    lines.push(if result.valid { "Result: OK" } else { "Result: FAIL" }.to_owned());

    lines.join("\n")
}

fn overlaps_text(report: &OverlapReport, window_hours: i64) -> String {
    let stats = &report.stats;
    if stats.total_windows == 0 {
        return format!("No overlapping runs in the next {window_hours}h");
    }

    let mut lines = vec![format!(
        "{} overlapping minute(s) in the next {window_hours}h, at most {} jobs at once",
        stats.total_windows, stats.max_concurrent
    )];
    lines.push("Most problematic:".to_owned());
    for overlap in &stats.most_problematic {
        lines.push(format!(
            "  {}  {} jobs  {}",
            overlap.time.format("%Y-%m-%d %H:%M UTC"),
            overlap.count,
            overlap.job_ids.join(", ")
        ));
    }
    lines.join("\n")
}
