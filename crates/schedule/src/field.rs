//! Structured model of a single cron field.
//!
//! A [`Field`] is a non-empty, ordered list of [`Part`]s (the comma
//! separated members of the raw text). Every boolean query is derived from
//! that shape, so a field can never claim to be both "every" and a range.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::symbols::SymbolRegistry;

/// The grammar atom of one comma-separated member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartKind {
    Every,
    Single { value: u32 },
    Range { start: u32, end: u32 },
}

/// One comma-separated member of a field. `step == 1` means no `/N` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Part {
    pub kind: PartKind,
    pub step: u32,
}

impl Part {
    pub fn has_step(&self) -> bool {
        self.step > 1
    }

    /// Values this part matches within `min..=max`.
    fn values(&self, min: u32, max: u32) -> impl Iterator<Item = u32> {
        let (lo, hi) = match self.kind {
            PartKind::Every => (min, max),
            // `5/15` runs from 5 to the field maximum.
            PartKind::Single { value } if self.has_step() => (value, max),
            PartKind::Single { value } => (value, value),
            PartKind::Range { start, end } => (start, end),
        };
        (lo..=hi).step_by(self.step.max(1) as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("empty list member in '{0}'")]
    EmptyPart(String),
    #[error("invalid step '{0}'")]
    InvalidStep(String),
    #[error("unresolved value '{0}'")]
    Unresolved(String),
}

/// A parsed cron field together with its original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    raw: String,
    parts: Vec<Part>,
    min: u32,
    max: u32,
}

impl Field {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn bounds(&self) -> (u32, u32) {
        (self.min, self.max)
    }

    /// Exactly one un-stepped `*`.
    pub fn is_every(&self) -> bool {
        matches!(
            self.parts.as_slice(),
            [Part { kind: PartKind::Every, step }] if *step <= 1
        )
    }

    pub fn is_step(&self) -> bool {
        self.step_value().is_some()
    }

    /// Step of the first part that has one.
    pub fn step_value(&self) -> Option<u32> {
        self.parts.iter().find(|p| p.has_step()).map(|p| p.step)
    }

    pub fn is_range(&self) -> bool {
        self.range_bounds().is_some()
    }

    /// Bounds of the field's only part, when that part is a range.
    pub fn range_bounds(&self) -> Option<(u32, u32)> {
        match self.parts.as_slice() {
            [Part {
                kind: PartKind::Range { start, end },
                ..
            }] => Some((*start, *end)),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        self.parts.len() > 1
    }

    /// Every integer this field matches, ascending and de-duplicated.
    ///
    /// Diagnostic use only; scheduling goes through the oracle.
    pub fn expanded_values(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self
            .parts
            .iter()
            .flat_map(|p| p.values(self.min, self.max))
            .collect();
        set.into_iter().collect()
    }
}

/// Parse one raw field into a [`Field`].
///
/// Bounds are not enforced here; the oracle has already rejected
/// out-of-range values before a field is built.
pub fn parse_field(
    raw: &str,
    min: u32,
    max: u32,
    registry: &SymbolRegistry,
) -> Result<Field, FieldError> {
    let mut parts = Vec::new();

    for member in raw.split(',') {
        if member.is_empty() {
            return Err(FieldError::EmptyPart(raw.to_owned()));
        }

        let (base, step) = match member.split_once('/') {
            Some((base, step_s)) => {
                let step: u32 = step_s
                    .parse()
                    .map_err(|_| FieldError::InvalidStep(step_s.to_owned()))?;
                if step == 0 {
                    return Err(FieldError::InvalidStep(step_s.to_owned()));
                }
                (base, step)
            }
            None => (member, 1),
        };

        let kind = if base == "*" {
            PartKind::Every
        } else if let Some((start_s, end_s)) = base.split_once('-') {
            PartKind::Range {
                start: parse_value(start_s, registry)?,
                end: parse_value(end_s, registry)?,
            }
        } else {
            PartKind::Single {
                value: parse_value(base, registry)?,
            }
        };

        parts.push(Part { kind, step });
    }

    Ok(Field {
        raw: raw.to_owned(),
        parts,
        min,
        max,
    })
}

/// Integer first, then symbol lookup. Anything else is an error, never 0.
pub fn parse_value(token: &str, registry: &SymbolRegistry) -> Result<u32, FieldError> {
    token
        .parse::<u32>()
        .ok()
        .or_else(|| registry.resolve(token))
        .ok_or_else(|| FieldError::Unresolved(token.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(raw: &str, min: u32, max: u32) -> Field {
        parse_field(raw, min, max, &SymbolRegistry::english()).unwrap()
    }

    #[test]
    fn every() {
        let f = field("*", 0, 59);
        assert!(f.is_every());
        assert!(!f.is_step());
        assert!(!f.is_range());
        assert!(!f.is_list());
        assert_eq!(f.expanded_values().len(), 60);
        assert_eq!(f.raw(), "*");
    }

    #[test]
    fn stepped_every_is_not_every() {
        let f = field("*/15", 0, 59);
        assert!(!f.is_every());
        assert_eq!(f.step_value(), Some(15));
        assert_eq!(f.expanded_values(), vec![0, 15, 30, 45]);
    }

    #[test]
    fn explicit_step_of_one_counts_as_every() {
        let f = field("*/1", 0, 59);
        assert!(f.is_every());
        assert!(!f.is_step());
        assert_eq!(f.raw(), "*/1");
    }

    #[test]
    fn single_value_expands_to_itself() {
        let f = field("7", 0, 23);
        assert_eq!(f.expanded_values(), vec![7]);
        assert!(!f.is_every());
        assert!(!f.is_list());
    }

    #[test]
    fn range() {
        let f = field("9-17", 0, 23);
        assert_eq!(f.range_bounds(), Some((9, 17)));
        assert_eq!(f.expanded_values(), (9..=17).collect::<Vec<_>>());
    }

    #[test]
    fn stepped_range() {
        let f = field("0-30/10", 0, 59);
        assert!(f.is_range());
        assert!(f.is_step());
        assert_eq!(f.expanded_values(), vec![0, 10, 20, 30]);
        assert_eq!(f.raw(), "0-30/10");
    }

    #[test]
    fn single_with_step_runs_to_max() {
        let f = field("5/20", 0, 59);
        assert_eq!(f.expanded_values(), vec![5, 25, 45]);
    }

    #[test]
    fn list_of_ranges_and_values() {
        let f = field("1-3,10,20-22", 0, 59);
        assert!(f.is_list());
        assert!(!f.is_range());
        assert_eq!(f.parts().len(), 3);
        assert_eq!(f.expanded_values(), vec![1, 2, 3, 10, 20, 21, 22]);
    }

    #[test]
    fn overlapping_list_members_are_deduplicated() {
        let f = field("1-5,3,4-6", 1, 31);
        assert_eq!(f.expanded_values(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn symbolic_names_resolve() {
        let f = field("MON-FRI", 0, 6);
        assert_eq!(f.range_bounds(), Some((1, 5)));
        let f = field("JAN,JUL", 1, 12);
        assert_eq!(f.expanded_values(), vec![1, 7]);
    }

    #[test]
    fn unresolved_symbol_is_an_error_not_zero() {
        let err = parse_field("FOO", 0, 6, &SymbolRegistry::english()).unwrap_err();
        assert_eq!(err, FieldError::Unresolved("FOO".into()));
        let err = parse_field("MONDAY-FRI", 0, 6, &SymbolRegistry::english()).unwrap_err();
        assert_eq!(err, FieldError::Unresolved("MONDAY".into()));
    }

    #[test]
    fn bad_steps_and_empty_members_fail() {
        let reg = SymbolRegistry::english();
        assert!(matches!(parse_field("*/0", 0, 59, &reg), Err(FieldError::InvalidStep(_))));
        assert!(matches!(parse_field("*/x", 0, 59, &reg), Err(FieldError::InvalidStep(_))));
        assert!(matches!(parse_field("1,,2", 0, 59, &reg), Err(FieldError::EmptyPart(_))));
    }
}
