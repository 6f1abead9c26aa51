//! Execution frequency projection and redundant step detection.
//!
//! Counts are taken over a fixed reference day so they do not depend on
//! the wall clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use cl_schedule::{Oracle, OracleError};

/// Covers one run per minute (1440/day) with margin.
const DAY_REQUEST_CAP: usize = 2000;
/// Covers one run per minute (60/hour) with margin.
const HOUR_REQUEST_CAP: usize = 100;

/// Start of the reference window: Monday 2024-01-01 00:00 UTC.
pub fn reference_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

pub struct FrequencyAnalyzer {
    oracle: Arc<dyn Oracle>,
    reference: DateTime<Utc>,
}

impl FrequencyAnalyzer {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            reference: reference_start(),
        }
    }

    pub fn with_reference(mut self, reference: DateTime<Utc>) -> Self {
        self.reference = reference;
        self
    }

    /// Projected runs during the 24 hours of the reference day.
    pub fn runs_per_day(&self, expression: &str) -> Result<usize, OracleError> {
        self.count_in_window(expression, Duration::days(1), DAY_REQUEST_CAP)
    }

    /// Projected runs during the first hour of the reference day.
    pub fn runs_per_hour(&self, expression: &str) -> Result<usize, OracleError> {
        self.count_in_window(expression, Duration::hours(1), HOUR_REQUEST_CAP)
    }

    fn count_in_window(
        &self,
        expression: &str,
        window: Duration,
        cap: usize,
    ) -> Result<usize, OracleError> {
        let start = self.reference;
        let end = start + window;
        // Start one second early so a run exactly at `start` is included.
        let occurrences = self.oracle.next(expression, start - Duration::seconds(1), cap)?;

        Ok(occurrences
            .into_iter()
            .take_while(|t| *t < end)
            .filter(|t| *t >= start)
            .count())
    }
}

/// Whether any raw field carries a step of exactly 1.
pub fn has_redundant_step(raw_fields: &[&str]) -> bool {
    raw_fields.iter().any(|f| f.ends_with("/1"))
}

/// Replace every field ending in `/1` with `*`. Expressions that are not
/// exactly five whitespace separated tokens come back unchanged.
pub fn suggest_without_redundant_step(expression: &str) -> String {
    let tokens: Vec<&str> = expression.split_whitespace().collect();
    if tokens.len() != 5 {
        return expression.to_owned();
    }
    tokens
        .into_iter()
        .map(|t| if t.ends_with("/1") { "*" } else { t })
        .collect::<Vec<_>>()
        .join(" ")
}
