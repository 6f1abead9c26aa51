mod lint;
mod locale;
mod oracle;

pub use lint::*;
pub use locale::*;
pub use oracle::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub lint: LintConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.lint.max_runs_per_day == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "lint.max_runs_per_day".into(),
                message: "threshold must be greater than 0".into(),
            });
        } else if self.lint.max_runs_per_day > 1440 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "lint.max_runs_per_day".into(),
                message: format!(
                    "threshold {} exceeds 1440 (one run per minute); the check can never fire",
                    self.lint.max_runs_per_day
                ),
            });
        }

        if self.lint.overlap_window_hours == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "lint.overlap_window_hours".into(),
                message: "window must be at least 1 hour".into(),
            });
        } else if self.lint.overlap_window_hours > MAX_OVERLAP_WINDOW_HOURS {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "lint.overlap_window_hours".into(),
                message: format!(
                    "window {}h exceeds the maximum of {MAX_OVERLAP_WINDOW_HOURS}h",
                    self.lint.overlap_window_hours
                ),
            });
        }

        if self.lint.overlap_issue_limit == 0 && self.lint.check_overlaps {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "lint.overlap_issue_limit".into(),
                message: "overlap checks are enabled but no windows will be reported".into(),
            });
        }

        if self.oracle.timezone.parse::<chrono_tz::Tz>().is_err() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "oracle.timezone".into(),
                message: format!(
                    "invalid timezone '{}'; use IANA names like 'America/New_York' or 'UTC'",
                    self.oracle.timezone
                ),
            });
        }

        if self.locale.default.trim().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "locale.default".into(),
                message: "locale must not be empty".into(),
            });
        }

        for (id, symbols) in &self.locale.custom {
            for (name, value) in &symbols.days {
                if *value > 6 {
                    errors.push(ConfigError {
                        severity: ConfigSeverity::Error,
                        field: format!("locale.custom.{id}.days.{name}"),
                        message: format!("day value {value} out of range 0..=6"),
                    });
                }
            }
            for (name, value) in &symbols.months {
                if !(1..=12).contains(value) {
                    errors.push(ConfigError {
                        severity: ConfigSeverity::Error,
                        field: format!("locale.custom.{id}.months.{name}"),
                        message: format!("month value {value} out of range 1..=12"),
                    });
                }
            }
        }

        errors
    }
}
