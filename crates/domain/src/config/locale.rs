use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which symbol registry the parser resolves day/month names with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Locale identifier, e.g. `en` or `en_US.UTF-8`.
    #[serde(default = "d_locale")]
    pub default: String,
    /// Additional registries keyed by locale id.
    #[serde(default)]
    pub custom: BTreeMap<String, LocaleSymbols>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default: d_locale(),
            custom: BTreeMap::new(),
        }
    }
}

/// Name → value tables for one locale. Names are matched case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocaleSymbols {
    /// Day names, 0 = Sunday.
    #[serde(default)]
    pub days: BTreeMap<String, u32>,
    /// Month names, 1 = January.
    #[serde(default)]
    pub months: BTreeMap<String, u32>,
}

fn d_locale() -> String {
    "en".into()
}
