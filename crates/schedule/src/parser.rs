//! Expression → [`Schedule`] parsing.
//!
//! The oracle is the authority on grammar and bounds: the parser only builds
//! the structured fields after the oracle accepted the normalized
//! expression, so a partial `Schedule` is never returned.

use std::sync::Arc;

use cl_domain::trace::TraceEvent;
use serde::Serialize;

use crate::cache::{ExpressionCache, RwLockCache};
use crate::field::{parse_field, Field, FieldError};
use crate::oracle::{Oracle, OracleError};
use crate::symbols::SymbolRegistry;

/// The six standard aliases and their canonical fields.
pub const ALIASES: [(&str, &str); 6] = [
    ("@yearly", "0 0 1 1 *"),
    ("@annually", "0 0 1 1 *"),
    ("@monthly", "0 0 1 * *"),
    ("@weekly", "0 0 * * 0"),
    ("@daily", "0 0 * * *"),
    ("@hourly", "0 * * * *"),
];

/// Name and inclusive bounds of each field, in expression order.
pub const FIELD_BOUNDS: [(&str, u32, u32); 5] = [
    ("minute", 0, 59),
    ("hour", 0, 23),
    ("day-of-month", 1, 31),
    ("month", 1, 12),
    ("day-of-week", 0, 6),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,
    #[error("unrecognized alias '{0}'")]
    UnknownAlias(String),
    #[error("expected 5 fields, got {0}")]
    FieldCount(usize),
    #[error("value out of range: {0}")]
    OutOfRange(String),
    #[error("{field}: {source}")]
    Field {
        field: &'static str,
        source: FieldError,
    },
    #[error("rejected: {0}")]
    Rejected(String),
}

impl From<OracleError> for ParseError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::FieldCount { got } => ParseError::FieldCount(got),
            OracleError::OutOfRange {
                field,
                value,
                min,
                max,
            } => ParseError::OutOfRange(format!("{field} value {value} not in {min}..={max}")),
            OracleError::UnknownAlias(alias) => ParseError::UnknownAlias(alias),
            other @ OracleError::Syntax { .. } => ParseError::Rejected(other.to_string()),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Schedule
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A fully parsed expression: the original text plus its five fields.
///
/// Only [`ScheduleParser`] builds these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    expression: String,
    fields: [Field; 5],
}

impl Schedule {
    /// The expression exactly as supplied by the caller.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn fields(&self) -> &[Field; 5] {
        &self.fields
    }

    pub fn minute(&self) -> &Field {
        &self.fields[0]
    }

    pub fn hour(&self) -> &Field {
        &self.fields[1]
    }

    pub fn day_of_month(&self) -> &Field {
        &self.fields[2]
    }

    pub fn month(&self) -> &Field {
        &self.fields[3]
    }

    pub fn day_of_week(&self) -> &Field {
        &self.fields[4]
    }

    /// Raw text of each field after normalization (uppercased, aliases
    /// expanded).
    pub fn raw_fields(&self) -> [&str; 5] {
        [
            self.fields[0].raw(),
            self.fields[1].raw(),
            self.fields[2].raw(),
            self.fields[3].raw(),
            self.fields[4].raw(),
        ]
    }

    /// The normalized five-field form the oracle accepted.
    pub fn normalized(&self) -> String {
        self.raw_fields().join(" ")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Parser
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct ScheduleParser {
    oracle: Arc<dyn Oracle>,
    symbols: Arc<SymbolRegistry>,
    cache: Arc<dyn ExpressionCache>,
}

impl ScheduleParser {
    pub fn new(oracle: Arc<dyn Oracle>, symbols: Arc<SymbolRegistry>) -> Self {
        Self {
            oracle,
            symbols,
            cache: Arc::new(RwLockCache::new()),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ExpressionCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn oracle(&self) -> &Arc<dyn Oracle> {
        &self.oracle
    }

    pub fn cache(&self) -> &Arc<dyn ExpressionCache> {
        &self.cache
    }

    /// Parse `expression`, returning the memoized schedule when the exact
    /// same string was parsed before.
    pub fn parse(&self, expression: &str) -> Result<Arc<Schedule>, ParseError> {
        if let Some(hit) = self.cache.get(expression) {
            TraceEvent::ScheduleCacheHit {
                expression: expression.to_owned(),
            }
            .emit();
            return Ok(hit);
        }

        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }

        let alias = trimmed.starts_with('@');
        let normalized = if alias {
            let lower = trimmed.to_lowercase();
            ALIASES
                .iter()
                .find(|(name, _)| *name == lower)
                .map(|(_, fields)| (*fields).to_owned())
                .ok_or_else(|| ParseError::UnknownAlias(trimmed.to_owned()))?
        } else {
            let upper = trimmed.to_uppercase();
            let tokens: Vec<&str> = upper.split_whitespace().collect();
            if tokens.len() != 5 {
                return Err(ParseError::FieldCount(tokens.len()));
            }
            tokens.join(" ")
        };

        self.oracle.validate(&normalized)?;

        let mut fields = Vec::with_capacity(5);
        for (token, (name, min, max)) in normalized.split_whitespace().zip(FIELD_BOUNDS) {
            let field =
                parse_field(token, min, max, &self.symbols).map_err(|source| ParseError::Field {
                    field: name,
                    source,
                })?;
            fields.push(field);
        }
        let count = fields.len();
        let fields: [Field; 5] = fields
            .try_into()
            .map_err(|_| ParseError::FieldCount(count))?;

        let schedule = Arc::new(Schedule {
            expression: expression.to_owned(),
            fields,
        });

        TraceEvent::ScheduleParsed {
            expression: expression.to_owned(),
            alias,
        }
        .emit();

        self.cache.insert(expression.to_owned(), schedule.clone());
        Ok(schedule)
    }
}
