use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Lint checks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Longest accepted overlap window: one year.
pub const MAX_OVERLAP_WINDOW_HOURS: u32 = 8760;

/// Tunables for the diagnostic checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Projected runs per day above which CRON-007 fires.
    #[serde(default = "d_1000")]
    pub max_runs_per_day: usize,
    /// How far ahead of "now" overlap analysis projects occurrences.
    #[serde(default = "d_24")]
    pub overlap_window_hours: u32,
    /// Maximum number of overlap windows reported as individual issues.
    #[serde(default = "d_5")]
    pub overlap_issue_limit: usize,
    #[serde(default = "d_true")]
    pub check_overlaps: bool,
    /// Run the command hygiene heuristics on job commands.
    #[serde(default = "d_true")]
    pub check_commands: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            max_runs_per_day: 1000,
            overlap_window_hours: 24,
            overlap_issue_limit: 5,
            check_overlaps: true,
            check_commands: true,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_1000() -> usize {
    1000
}
fn d_24() -> u32 {
    24
}
fn d_5() -> usize {
    5
}
fn d_true() -> bool {
    true
}
