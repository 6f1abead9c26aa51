//! Cron expression model for cronlint.
//!
//! Decomposes a 5-field expression (or one of the standard `@` aliases)
//! into a [`Schedule`] of typed [`Field`]s, resolving day and month names
//! through a locale-scoped [`SymbolRegistry`]. Grammar and range checking
//! is delegated to an injected [`Oracle`], which also projects future
//! occurrences for the analyzers.

pub mod cache;
pub mod field;
pub mod oracle;
pub mod parser;
pub mod symbols;

pub use cache::{ExpressionCache, NoopCache, RwLockCache};
pub use field::{parse_field, Field, FieldError, Part, PartKind};
pub use oracle::{CronOracle, Oracle, OracleError};
pub use parser::{ParseError, Schedule, ScheduleParser, ALIASES, FIELD_BOUNDS};
pub use symbols::{LocaleLookup, LocaleTable, SymbolRegistry};
