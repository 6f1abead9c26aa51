//! The validation facade.
//!
//! Every entry point (single expression, crontab file, caller-supplied
//! jobs, user crontab) funnels into [`Validator::validate_jobs`], and each
//! job goes through the same [`Validator::check_job`] sequence, so results
//! never depend on where a job came from.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};

use cl_domain::config::{Config, LintConfig, MAX_OVERLAP_WINDOW_HOURS};
use cl_domain::error::Error;
use cl_domain::trace::TraceEvent;
use cl_domain::{CrontabEntry, DiagnosticCode, Issue, Job, ValidationResult};
use cl_schedule::{CronOracle, LocaleTable, Oracle, Schedule, ScheduleParser};

use crate::frequency::{has_redundant_step, suggest_without_redundant_step, FrequencyAnalyzer};
use crate::hygiene;
use crate::overlap::{OverlapAnalyzer, OverlapJob, OverlapReport};
use crate::source::{parse_crontab, CrontabFile, JobSource, UserCrontab};

/// How far ahead the empty-schedule check looks.
const EMPTY_HORIZON_MONTHS: u32 = 24;

pub struct Validator {
    parser: Arc<ScheduleParser>,
    oracle: Arc<dyn Oracle>,
    frequency: FrequencyAnalyzer,
    overlap: OverlapAnalyzer,
    config: LintConfig,
    now: Option<DateTime<Utc>>,
}

impl Validator {
    pub fn new(parser: Arc<ScheduleParser>, config: LintConfig) -> Self {
        let oracle = parser.oracle().clone();
        let hours = config.overlap_window_hours.min(MAX_OVERLAP_WINDOW_HOURS);
        let overlap =
            OverlapAnalyzer::new(oracle.clone()).with_window(Duration::hours(i64::from(hours)));
        Self {
            frequency: FrequencyAnalyzer::new(oracle.clone()),
            overlap,
            parser,
            oracle,
            config,
            now: None,
        }
    }

    /// Build the full stack (locale, oracle, parser) from configuration.
    ///
    /// `locale` overrides `config.locale.default` when given.
    pub fn from_config(config: &Config, locale: Option<&str>) -> Self {
        let table = LocaleTable::from_config(&config.locale);
        let lookup = table.lookup(locale.unwrap_or(&config.locale.default));
        let tz = cl_schedule::oracle::parse_tz(&config.oracle.timezone);

        tracing::debug!(
            locale = %lookup.locale,
            fell_back = lookup.fell_back,
            tz = %tz,
            "validator configured"
        );

        let oracle: Arc<dyn Oracle> =
            Arc::new(CronOracle::new(lookup.registry.clone()).with_timezone(tz));
        let parser = Arc::new(ScheduleParser::new(oracle, lookup.registry));
        Self::new(parser, config.lint.clone())
    }

    /// Pin "now" for the empty-schedule and overlap checks.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn parser(&self) -> &ScheduleParser {
        &self.parser
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// The look-ahead used for overlap analysis, capped at one year.
    pub fn overlap_window(&self) -> Duration {
        self.overlap.window()
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    // ── Entry points ────────────────────────────────────────────────────

    /// Validate one ad-hoc expression (no command, no overlap analysis).
    pub fn validate_expression(&self, expression: &str) -> ValidationResult {
        self.validate_jobs(&[Job::new(0, expression, "")])
    }

    /// Validate the jobs among already-classified crontab entries.
    pub fn validate_entries(&self, entries: &[CrontabEntry]) -> ValidationResult {
        let jobs: Vec<Job> = entries
            .iter()
            .filter_map(CrontabEntry::as_job)
            .cloned()
            .collect();
        self.validate_jobs(&jobs)
    }

    pub fn validate_file(&self, path: impl AsRef<Path>) -> ValidationResult {
        self.validate_source(&CrontabFile::new(path))
    }

    pub fn validate_user_crontab(&self, user: Option<&str>) -> ValidationResult {
        self.validate_source(&UserCrontab::new(user))
    }

    /// Read a source and validate its jobs. A read failure yields a single
    /// CRON-004 issue and no per-job checks.
    pub fn validate_source(&self, source: &dyn JobSource) -> ValidationResult {
        match source.read_text() {
            Ok(text) => self.validate_entries(&parse_crontab(&text, self.oracle.as_ref())),
            Err(e) => {
                tracing::warn!(source = %source.name(), error = %e, "failed to read job source");
                TraceEvent::SourceReadFailed {
                    source_name: source.name(),
                    error: e.to_string(),
                }
                .emit();
                let detail = match e {
                    Error::Source { message, .. } => message,
                    other => other.to_string(),
                };
                let result = ValidationResult::read_failure(Issue::new(
                    DiagnosticCode::SourceReadError,
                    format!("Failed to read {}: {detail}", source.name()),
                ));
                completed(&result);
                result
            }
        }
    }

    /// Validate a set of jobs, then look for overlaps among the survivors.
    pub fn validate_jobs(&self, jobs: &[Job]) -> ValidationResult {
        let mut result = ValidationResult::new();
        let mut candidates = Vec::new();

        for (index, job) in jobs.iter().enumerate() {
            if let Some(schedule) = self.check_job(job, &mut result) {
                candidates.push(OverlapJob::new(job.label(index), schedule.normalized()));
            }
        }

        if self.config.check_overlaps && candidates.len() >= 2 {
            let report = self.overlap.analyze(&candidates, self.now());
            for overlap in report
                .stats
                .most_problematic
                .iter()
                .take(self.config.overlap_issue_limit)
            {
                result.push(Issue::new(
                    DiagnosticCode::OverlapDetected,
                    format!(
                        "{} jobs scheduled at {} UTC: {}",
                        overlap.count,
                        overlap.time.format("%Y-%m-%d %H:%M"),
                        overlap.job_ids.join(", ")
                    ),
                ));
            }
        }

        completed(&result);
        result
    }

    /// Overlap report for the renderer: valid jobs only, full top-10 view.
    pub fn analyze_overlaps(&self, jobs: &[Job]) -> OverlapReport {
        let candidates: Vec<OverlapJob> = jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| job.valid)
            .filter_map(|(index, job)| {
                let schedule = self.parser.parse(&job.expression).ok()?;
                Some(OverlapJob::new(job.label(index), schedule.normalized()))
            })
            .collect();
        self.overlap.analyze(&candidates, self.now())
    }

    // ── Per-job checks ──────────────────────────────────────────────────

    /// Run every per-job check, updating counts as it goes. Returns the
    /// schedule when the job is still counted valid at the end.
    fn check_job(&self, job: &Job, result: &mut ValidationResult) -> Option<Arc<Schedule>> {
        result.total_jobs += 1;
        let expression = job.expression.as_str();
        let stamp = |issue: Issue| issue.with_line(job.line_number).with_expression(expression);
        let issues_before = result.issues.len();

        let schedule = match self.parser.parse(expression) {
            Ok(schedule) => schedule,
            Err(e) => {
                result.push(stamp(Issue::new(
                    DiagnosticCode::ParseError,
                    format!("Invalid cron expression: {e}"),
                )));
                result.invalid_jobs += 1;
                job_checked(job, result, issues_before, true);
                return None;
            }
        };

        if !job.valid {
            // The schedule itself is fine, so the line is malformed.
            let detail = job.error.as_deref().unwrap_or("malformed crontab line");
            result.push(stamp(Issue::new(
                DiagnosticCode::InvalidStructure,
                format!("Invalid crontab entry: {detail}"),
            )));
            result.invalid_jobs += 1;
            job_checked(job, result, issues_before, true);
            return None;
        }

        result.valid_jobs += 1;
        let mut demoted = false;
        let raw = schedule.raw_fields();

        if !schedule.day_of_month().is_every() && !schedule.day_of_week().is_every() {
            result.push(stamp(Issue::new(
                DiagnosticCode::DomDowConflict,
                format!(
                    "Both day-of-month ('{}') and day-of-week ('{}') are restricted; cron may run the job when either one matches",
                    raw[2], raw[4]
                ),
            )));
        }

        if self.is_empty_schedule(&schedule) {
            result.push(stamp(Issue::new(
                DiagnosticCode::EmptySchedule,
                "Schedule never runs: no occurrence within the next 2 years",
            )));
            result.valid_jobs = result.valid_jobs.saturating_sub(1);
            result.invalid_jobs += 1;
            demoted = true;
        }

        if has_redundant_step(&raw) {
            result.push(stamp(Issue::new(
                DiagnosticCode::RedundantPattern,
                format!(
                    "Redundant '/1' step in '{}'; use '{}'",
                    expression,
                    suggest_without_redundant_step(expression)
                ),
            )));
        }

        match self.frequency.runs_per_day(&schedule.normalized()) {
            Ok(runs) if runs > self.config.max_runs_per_day => {
                result.push(stamp(Issue::new(
                    DiagnosticCode::ExcessiveRuns,
                    format!(
                        "Schedule runs {runs} times per day, above the threshold of {}",
                        self.config.max_runs_per_day
                    ),
                )));
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(expression, error = %e, "frequency projection failed"),
        }

        if self.config.check_commands && !job.command.trim().is_empty() {
            for issue in hygiene::check_command(&job.command) {
                result.push(stamp(issue));
            }
        }

        job_checked(job, result, issues_before, demoted);
        (!demoted).then_some(schedule)
    }

    /// Heuristic: no occurrence within two years of now counts as never.
    fn is_empty_schedule(&self, schedule: &Schedule) -> bool {
        let now = self.now();
        let horizon = now
            .checked_add_months(Months::new(EMPTY_HORIZON_MONTHS))
            .unwrap_or(now);
        match self.oracle.next(&schedule.normalized(), now, 1) {
            Ok(times) => times.first().map_or(true, |first| *first > horizon),
            Err(_) => true,
        }
    }
}

fn job_checked(job: &Job, result: &ValidationResult, issues_before: usize, demoted: bool) {
    let issues = result.issues.len() - issues_before;
    tracing::debug!(
        line = job.line_number,
        expression = %job.expression,
        issues,
        demoted,
        "job checked"
    );
    TraceEvent::JobChecked {
        line_number: job.line_number,
        expression: job.expression.clone(),
        issues,
        demoted,
    }
    .emit();
}

fn completed(result: &ValidationResult) {
    tracing::info!(
        valid = result.valid,
        total_jobs = result.total_jobs,
        issues = result.issues.len(),
        "validation completed"
    );
    TraceEvent::ValidationCompleted {
        valid: result.valid,
        total_jobs: result.total_jobs,
        valid_jobs: result.valid_jobs,
        invalid_jobs: result.invalid_jobs,
        issues: result.issues.len(),
    }
    .emit();
}
