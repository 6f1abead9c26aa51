//! Runners for the validation subcommands. Each prints its report and
//! returns whether the run should exit successfully.

use anyhow::Context;

use cl_domain::{CrontabEntry, Job};
use cl_lint::{parse_crontab, CrontabFile, JobSource, Stdin, Validator};

use crate::cli::Format;
use crate::report;

/// A crontab path argument; "-" means standard input.
pub fn source_for(path: &str) -> Box<dyn JobSource> {
    if path == "-" {
        Box::new(Stdin)
    } else {
        Box::new(CrontabFile::new(path))
    }
}

pub fn check(validator: &Validator, expression: &str, format: Format) -> anyhow::Result<bool> {
    let result = validator.validate_expression(expression);
    println!("{}", report::render_result(&result, format)?);
    Ok(result.valid)
}

pub fn lint(validator: &Validator, path: &str, format: Format) -> anyhow::Result<bool> {
    let result = validator.validate_source(source_for(path).as_ref());
    println!("{}", report::render_result(&result, format)?);
    Ok(result.valid)
}

pub fn user(validator: &Validator, name: Option<&str>, format: Format) -> anyhow::Result<bool> {
    let result = validator.validate_user_crontab(name);
    println!("{}", report::render_result(&result, format)?);
    Ok(result.valid)
}

/// Overlap report over the crontab's valid jobs. A read failure is fatal.
pub fn overlaps(validator: &Validator, path: &str, format: Format) -> anyhow::Result<bool> {
    let source = source_for(path);
    let text = source
        .read_text()
        .with_context(|| format!("reading {}", source.name()))?;

    let entries = parse_crontab(&text, validator.parser().oracle().as_ref());
    let jobs: Vec<Job> = entries
        .iter()
        .filter_map(CrontabEntry::as_job)
        .cloned()
        .collect();
    tracing::debug!(jobs = jobs.len(), "projecting overlaps");

    let report = validator.analyze_overlaps(&jobs);
    println!(
        "{}",
        report::render_overlaps(&report, validator.overlap_window().num_hours(), format)?
    );
    Ok(true)
}
