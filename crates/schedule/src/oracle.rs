//! Occurrence oracle: the trusted "when does this run next" primitive.
//!
//! [`Oracle`] is the capability the parser and analyzers depend on.
//! [`CronOracle`] is the calendar implementation, timezone-aware
//! (5-field: min hour dom month dow, plus the `@` aliases).

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::parser::ALIASES;
use crate::symbols::SymbolRegistry;

/// How far ahead a single occurrence search looks before giving up.
const MAX_SEARCH_DAYS: i64 = 5 * 366;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("expected 5 fields, got {got}")]
    FieldCount { got: usize },
    #[error("value out of range: {field} value {value} not in {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("unrecognized alias '{0}'")]
    UnknownAlias(String),
    #[error("{field}: {reason}")]
    Syntax {
        field: &'static str,
        reason: String,
    },
}

/// Computes future occurrence instants for a cron expression.
pub trait Oracle: Send + Sync {
    /// Up to `count` instants strictly after `from`, ascending. Fewer are
    /// returned when the schedule has no further occurrence within the
    /// search horizon.
    fn next(
        &self,
        expression: &str,
        from: DateTime<Utc>,
        count: usize,
    ) -> Result<Vec<DateTime<Utc>>, OracleError>;

    /// Grammar and range check without projecting anything.
    fn validate(&self, expression: &str) -> Result<(), OracleError> {
        self.next(expression, DateTime::<Utc>::default(), 0).map(|_| ())
    }

    /// Every instant strictly after `from` and before `until`, fetched from
    /// [`Oracle::next`] in pages of `page` occurrences.
    fn next_within(
        &self,
        expression: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        page: usize,
    ) -> Result<Vec<DateTime<Utc>>, OracleError> {
        let page = page.max(1);
        let mut found = Vec::new();
        let mut cursor = from;

        loop {
            let batch = self.next(expression, cursor, page)?;
            let full = batch.len() == page;
            let before = cursor;
            for t in batch {
                if t >= until {
                    return Ok(found);
                }
                if t > cursor {
                    cursor = t;
                    found.push(t);
                }
            }
            // A short page means the horizon ran out; no progress means the
            // oracle is not advancing.
            if !full || cursor == before {
                return Ok(found);
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Compiled expression
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone, Copy)]
enum Names {
    None,
    Days,
    Months,
}

struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    names: Names,
}

const SPECS: [FieldSpec; 5] = [
    FieldSpec {
        name: "minute",
        min: 0,
        max: 59,
        names: Names::None,
    },
    FieldSpec {
        name: "hour",
        min: 0,
        max: 23,
        names: Names::None,
    },
    FieldSpec {
        name: "day-of-month",
        min: 1,
        max: 31,
        names: Names::None,
    },
    FieldSpec {
        name: "month",
        min: 1,
        max: 12,
        names: Names::Months,
    },
    FieldSpec {
        name: "day-of-week",
        min: 0,
        max: 6,
        names: Names::Days,
    },
];

/// Per-field bitsets; bit `n` set means value `n` matches.
struct Compiled {
    minutes: u64,
    hours: u64,
    days: u64,
    months: u64,
    weekdays: u64,
    dom_restricted: bool,
    dow_restricted: bool,
}

fn bit(set: u64, value: u32) -> bool {
    set & (1u64 << value) != 0
}

impl Compiled {
    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = bit(self.days, date.day());
        let dow = bit(self.weekdays, date.weekday().num_days_from_sunday());
        // Vixie cron: when both day fields are restricted either may match.
        if self.dom_restricted && self.dow_restricted {
            dom || dow
        } else {
            dom && dow
        }
    }

    /// First matching local minute strictly after `after`, no later than
    /// `horizon`.
    fn next_after(&self, after: NaiveDateTime, horizon: NaiveDateTime) -> Option<NaiveDateTime> {
        let mut t = after.with_second(0)?.with_nanosecond(0)? + Duration::minutes(1);

        while t <= horizon {
            let date = t.date();
            if !bit(self.months, date.month()) {
                let (y, m) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                t = NaiveDate::from_ymd_opt(y, m, 1)?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !self.day_matches(date) {
                t = date.succ_opt()?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !bit(self.hours, t.hour()) {
                t = date.and_hms_opt(t.hour(), 0, 0)? + Duration::hours(1);
                continue;
            }
            if !bit(self.minutes, t.minute()) {
                t += Duration::minutes(1);
                continue;
            }
            return Some(t);
        }
        None
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CronOracle
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parse a timezone string into a `chrono_tz::Tz`, falling back to UTC.
pub fn parse_tz(tz: &str) -> chrono_tz::Tz {
    tz.parse::<chrono_tz::Tz>().unwrap_or(chrono_tz::UTC)
}

/// Calendar-backed oracle evaluating expressions in one timezone.
///
/// **DST handling:**
/// - Spring-forward gaps: local times that don't exist are skipped.
/// - Fall-back overlaps: the earliest (pre-transition) mapping is chosen.
pub struct CronOracle {
    symbols: Arc<SymbolRegistry>,
    tz: chrono_tz::Tz,
}

impl Default for CronOracle {
    fn default() -> Self {
        Self::new(Arc::new(SymbolRegistry::english()))
    }
}

impl CronOracle {
    pub fn new(symbols: Arc<SymbolRegistry>) -> Self {
        Self {
            symbols,
            tz: chrono_tz::UTC,
        }
    }

    pub fn with_timezone(mut self, tz: chrono_tz::Tz) -> Self {
        self.tz = tz;
        self
    }

    pub fn timezone(&self) -> chrono_tz::Tz {
        self.tz
    }

    fn compile(&self, expression: &str) -> Result<Compiled, OracleError> {
        let trimmed = expression.trim();
        let expanded = if trimmed.starts_with('@') {
            let lower = trimmed.to_lowercase();
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == lower)
                .map(|(_, fields)| *fields)
                .ok_or_else(|| OracleError::UnknownAlias(trimmed.to_owned()))?
        } else {
            trimmed
        };

        let fields: Vec<&str> = expanded.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(OracleError::FieldCount { got: fields.len() });
        }

        let mut sets = [0u64; 5];
        for (i, field) in fields.iter().enumerate() {
            sets[i] = self.compile_field(field, &SPECS[i])?;
        }

        Ok(Compiled {
            minutes: sets[0],
            hours: sets[1],
            days: sets[2],
            months: sets[3],
            weekdays: sets[4],
            dom_restricted: !fields[2].starts_with('*'),
            dow_restricted: !fields[4].starts_with('*'),
        })
    }

    fn compile_field(&self, field: &str, spec: &FieldSpec) -> Result<u64, OracleError> {
        let syntax = |reason: String| OracleError::Syntax {
            field: spec.name,
            reason,
        };

        let mut set = 0u64;
        for part in field.split(',') {
            if part.is_empty() {
                return Err(syntax(format!("empty list member in '{field}'")));
            }

            let (base, step) = match part.split_once('/') {
                Some((base, step_s)) => {
                    let n: u32 = step_s
                        .parse()
                        .map_err(|_| syntax(format!("invalid step '{step_s}'")))?;
                    if n == 0 || n > spec.max {
                        return Err(OracleError::OutOfRange {
                            field: spec.name,
                            value: n,
                            min: 1,
                            max: spec.max,
                        });
                    }
                    (base, Some(n))
                }
                None => (part, None),
            };

            let (lo, hi) = if base == "*" {
                (spec.min, spec.max)
            } else if let Some((start_s, end_s)) = base.split_once('-') {
                let start = self.value(start_s, spec)?;
                let end = self.value(end_s, spec)?;
                if start > end {
                    return Err(syntax(format!("range start {start} > end {end}")));
                }
                (start, end)
            } else {
                let v = self.value(base, spec)?;
                match step {
                    Some(_) => (v, spec.max),
                    None => (v, v),
                }
            };

            for v in (lo..=hi).step_by(step.unwrap_or(1) as usize) {
                set |= 1u64 << v;
            }
        }
        Ok(set)
    }

    fn value(&self, token: &str, spec: &FieldSpec) -> Result<u32, OracleError> {
        let n = match token.parse::<u32>() {
            Ok(n) => n,
            Err(_) => {
                let named = match spec.names {
                    Names::None => None,
                    Names::Days => self.symbols.resolve_day(token),
                    Names::Months => self.symbols.resolve_month(token),
                };
                named.ok_or_else(|| OracleError::Syntax {
                    field: spec.name,
                    reason: format!("invalid value '{token}'"),
                })?
            }
        };
        if n < spec.min || n > spec.max {
            return Err(OracleError::OutOfRange {
                field: spec.name,
                value: n,
                min: spec.min,
                max: spec.max,
            });
        }
        Ok(n)
    }
}

impl Oracle for CronOracle {
    fn next(
        &self,
        expression: &str,
        from: DateTime<Utc>,
        count: usize,
    ) -> Result<Vec<DateTime<Utc>>, OracleError> {
        let compiled = self.compile(expression)?;

        let mut results = Vec::with_capacity(count.min(2048));
        let mut cursor = from.with_timezone(&self.tz).naive_local();
        let mut last = from;

        while results.len() < count {
            let horizon = cursor + Duration::days(MAX_SEARCH_DAYS);
            let Some(local) = compiled.next_after(cursor, horizon) else {
                break;
            };
            cursor = local;

            let utc = match self.tz.from_local_datetime(&local) {
                chrono::LocalResult::Single(dt) => dt.with_timezone(&Utc),
                chrono::LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
                // DST gap: this local minute doesn't exist.
                chrono::LocalResult::None => continue,
            };
            if utc > last {
                results.push(utc);
                last = utc;
            }
        }

        Ok(results)
    }
}
