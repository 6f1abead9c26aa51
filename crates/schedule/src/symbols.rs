//! Locale-scoped day and month names.
//!
//! A [`SymbolRegistry`] maps names such as `MON` or `JAN` to their numeric
//! field values. A [`LocaleTable`] is the read-only set of registries known
//! to the process, built once and handed to the parser and the oracle.

use std::collections::HashMap;
use std::sync::Arc;

use cl_domain::config::{LocaleConfig, LocaleSymbols};
use cl_domain::trace::TraceEvent;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Registry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const EN_DAYS: [(&str, u32); 7] = [
    ("SUN", 0),
    ("MON", 1),
    ("TUE", 2),
    ("WED", 3),
    ("THU", 4),
    ("FRI", 5),
    ("SAT", 6),
];

const EN_MONTHS: [(&str, u32); 12] = [
    ("JAN", 1),
    ("FEB", 2),
    ("MAR", 3),
    ("APR", 4),
    ("MAY", 5),
    ("JUN", 6),
    ("JUL", 7),
    ("AUG", 8),
    ("SEP", 9),
    ("OCT", 10),
    ("NOV", 11),
    ("DEC", 12),
];

/// Name → value lookup for one locale. Keys are stored uppercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolRegistry {
    days: HashMap<String, u32>,
    months: HashMap<String, u32>,
}

impl SymbolRegistry {
    /// The default English abbreviations (`SUN`..`SAT`, `JAN`..`DEC`).
    pub fn english() -> Self {
        Self {
            days: EN_DAYS.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect(),
            months: EN_MONTHS.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect(),
        }
    }

    pub fn from_symbols(symbols: &LocaleSymbols) -> Self {
        Self {
            days: symbols
                .days
                .iter()
                .map(|(k, v)| (k.to_uppercase(), *v))
                .collect(),
            months: symbols
                .months
                .iter()
                .map(|(k, v)| (k.to_uppercase(), *v))
                .collect(),
        }
    }

    /// Resolve a name in either table. Day names win over month names.
    ///
    /// Only exact (case-insensitive) names match: no trimming, no prefix or
    /// full-name matching.
    pub fn resolve(&self, name: &str) -> Option<u32> {
        let key = name.to_uppercase();
        self.days
            .get(&key)
            .or_else(|| self.months.get(&key))
            .copied()
    }

    pub fn resolve_day(&self, name: &str) -> Option<u32> {
        self.days.get(&name.to_uppercase()).copied()
    }

    pub fn resolve_month(&self, name: &str) -> Option<u32> {
        self.months.get(&name.to_uppercase()).copied()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Locale table
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const DEFAULT_LOCALE: &str = "en";

/// Result of looking up a locale.
#[derive(Debug, Clone)]
pub struct LocaleLookup {
    pub registry: Arc<SymbolRegistry>,
    /// The locale id that actually answered.
    pub locale: String,
    /// True when the requested locale was unknown and the default was used.
    pub fell_back: bool,
}

/// Read-only registry of registries, keyed by lowercase locale id.
#[derive(Debug, Clone)]
pub struct LocaleTable {
    registries: HashMap<String, Arc<SymbolRegistry>>,
}

impl Default for LocaleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LocaleTable {
    /// A table holding only the English registry.
    pub fn builtin() -> Self {
        let mut registries = HashMap::new();
        registries.insert(DEFAULT_LOCALE.to_owned(), Arc::new(SymbolRegistry::english()));
        Self { registries }
    }

    /// The built-in table plus any `[locale.custom.*]` entries.
    pub fn from_config(config: &LocaleConfig) -> Self {
        config
            .custom
            .iter()
            .fold(Self::builtin(), |table, (id, symbols)| {
                table.with_locale(id, SymbolRegistry::from_symbols(symbols))
            })
    }

    pub fn with_locale(mut self, id: &str, registry: SymbolRegistry) -> Self {
        self.registries.insert(id.to_lowercase(), Arc::new(registry));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.registries.contains_key(&id.to_lowercase())
    }

    /// Look up a locale by exact id, then by its language prefix
    /// (`en_US.UTF-8` → `en`). Unknown locales resolve to the English
    /// registry with `fell_back` set.
    pub fn lookup(&self, id: &str) -> LocaleLookup {
        let wanted = id.trim().to_lowercase();
        let language = wanted
            .split(['_', '.', '-'])
            .next()
            .unwrap_or_default()
            .to_owned();

        for candidate in [&wanted, &language] {
            if let Some(registry) = self.registries.get(candidate.as_str()) {
                return LocaleLookup {
                    registry: registry.clone(),
                    locale: candidate.clone(),
                    fell_back: false,
                };
            }
        }

        tracing::warn!(requested = %id, fallback = DEFAULT_LOCALE, "unknown locale");
        TraceEvent::LocaleFallback {
            requested: id.to_owned(),
            fallback: DEFAULT_LOCALE.to_owned(),
        }
        .emit();

        let registry = self
            .registries
            .get(DEFAULT_LOCALE)
            .cloned()
            .unwrap_or_else(|| Arc::new(SymbolRegistry::english()));
        LocaleLookup {
            registry,
            locale: DEFAULT_LOCALE.to_owned(),
            fell_back: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_english_abbreviations() {
        let reg = SymbolRegistry::english();
        assert_eq!(reg.resolve("MON"), Some(1));
        assert_eq!(reg.resolve("sun"), Some(0));
        assert_eq!(reg.resolve("Jan"), Some(1));
        assert_eq!(reg.resolve("DEC"), Some(12));
    }

    #[test]
    fn rejects_full_partial_and_padded_names() {
        let reg = SymbolRegistry::english();
        assert_eq!(reg.resolve("MONDAY"), None);
        assert_eq!(reg.resolve("MO"), None);
        assert_eq!(reg.resolve(" MON"), None);
        assert_eq!(reg.resolve("MON "), None);
        assert_eq!(reg.resolve(""), None);
    }

    #[test]
    fn day_names_win_over_month_names() {
        let mut symbols = LocaleSymbols::default();
        symbols.days.insert("MAR".into(), 2);
        symbols.months.insert("MAR".into(), 3);
        let reg = SymbolRegistry::from_symbols(&symbols);
        assert_eq!(reg.resolve("mar"), Some(2));
        assert_eq!(reg.resolve_month("mar"), Some(3));
    }

    #[test]
    fn field_specific_lookups_do_not_cross() {
        let reg = SymbolRegistry::english();
        assert_eq!(reg.resolve_day("JAN"), None);
        assert_eq!(reg.resolve_month("MON"), None);
    }

    #[test]
    fn unknown_locale_falls_back_with_flag() {
        let table = LocaleTable::builtin();
        let lookup = table.lookup("xx_YY");
        assert!(lookup.fell_back);
        assert_eq!(lookup.locale, "en");
        assert_eq!(lookup.registry.resolve("MON"), Some(1));
    }

    #[test]
    fn requested_english_is_not_a_fallback() {
        let table = LocaleTable::builtin();
        assert!(!table.lookup("en").fell_back);
        assert!(!table.lookup("en_US.UTF-8").fell_back);
        assert!(!table.lookup("EN").fell_back);
    }

    #[test]
    fn custom_locales_are_registered_from_config() {
        let mut config = LocaleConfig::default();
        let mut fr = LocaleSymbols::default();
        fr.days.insert("lun".into(), 1);
        config.custom.insert("fr".into(), fr);

        let table = LocaleTable::from_config(&config);
        assert!(table.contains("fr"));
        let lookup = table.lookup("fr_FR");
        assert!(!lookup.fell_back);
        assert_eq!(lookup.registry.resolve("LUN"), Some(1));
        assert_eq!(lookup.registry.resolve("MON"), None);
    }
}
