use serde::{Deserialize, Serialize};

/// Settings for the occurrence oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// IANA timezone the cron fields are evaluated in.
    #[serde(default = "d_utc")]
    pub timezone: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self { timezone: d_utc() }
    }
}

fn d_utc() -> String {
    "UTC".into()
}
