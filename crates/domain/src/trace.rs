use serde::Serialize;

/// Structured trace events emitted across all cronlint crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    ScheduleParsed {
        expression: String,
        alias: bool,
    },
    ScheduleCacheHit {
        expression: String,
    },
    JobChecked {
        line_number: usize,
        expression: String,
        issues: usize,
        demoted: bool,
    },
    OverlapAnalyzed {
        jobs: usize,
        windows: usize,
        max_concurrent: usize,
    },
    LocaleFallback {
        requested: String,
        fallback: String,
    },
    SourceReadFailed {
        source_name: String,
        error: String,
    },
    ValidationCompleted {
        valid: bool,
        total_jobs: usize,
        valid_jobs: usize,
        invalid_jobs: usize,
        issues: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "cl_event");
    }
}
