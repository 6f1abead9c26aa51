//! Inter-job overlap detection.
//!
//! Projects every job's occurrences over a window, truncates them to the
//! minute and groups them across jobs. A minute claimed by two or more
//! distinct jobs is an [`Overlap`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::Serialize;

use cl_domain::trace::TraceEvent;
use cl_schedule::Oracle;

/// Occurrences fetched per oracle call while paging through the window.
const OCCURRENCE_PAGE: usize = 2000;
/// Length of the ranked `most_problematic` list.
pub const MOST_PROBLEMATIC_LIMIT: usize = 10;

/// A job to project: an identifier for reporting plus its expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapJob {
    pub id: String,
    pub expression: String,
}

impl OverlapJob {
    pub fn new(id: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expression: expression.into(),
        }
    }
}

/// One minute at which several distinct jobs are due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlap {
    pub time: DateTime<Utc>,
    pub count: usize,
    pub job_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OverlapStats {
    pub total_windows: usize,
    pub max_concurrent: usize,
    /// Top overlaps by count (descending), ties by time (ascending).
    pub most_problematic: Vec<Overlap>,
}

/// Full analysis output: the time-ordered overlaps plus their statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OverlapReport {
    pub overlaps: Vec<Overlap>,
    pub stats: OverlapStats,
}

pub struct OverlapAnalyzer {
    oracle: Arc<dyn Oracle>,
    window: Duration,
}

impl OverlapAnalyzer {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            window: Duration::hours(24),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn analyze(&self, jobs: &[OverlapJob], now: DateTime<Utc>) -> OverlapReport {
        let Some(until) = now.checked_add_signed(self.window) else {
            tracing::warn!(
                window_hours = self.window.num_hours(),
                "overlap window out of range, skipping analysis"
            );
            return OverlapReport::default();
        };
        let mut by_minute: BTreeMap<DateTime<Utc>, Vec<&str>> = BTreeMap::new();

        for job in jobs {
            let times = match self
                .oracle
                .next_within(&job.expression, now, until, OCCURRENCE_PAGE)
            {
                Ok(times) => times,
                Err(e) => {
                    tracing::warn!(job = %job.id, error = %e, "skipping job in overlap analysis");
                    continue;
                }
            };
            for t in times {
                let minute = truncate_to_minute(t);
                by_minute.entry(minute).or_default().push(&job.id);
            }
        }

        let overlaps: Vec<Overlap> = by_minute
            .into_iter()
            .filter_map(|(time, ids)| {
                let mut job_ids: Vec<String> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !job_ids.iter().any(|seen| seen == id) {
                        job_ids.push(id.to_owned());
                    }
                }
                (job_ids.len() >= 2).then(|| Overlap {
                    time,
                    count: job_ids.len(),
                    job_ids,
                })
            })
            .collect();

        let stats = stats_for(&overlaps);

        TraceEvent::OverlapAnalyzed {
            jobs: jobs.len(),
            windows: stats.total_windows,
            max_concurrent: stats.max_concurrent,
        }
        .emit();

        OverlapReport { overlaps, stats }
    }
}

/// Derive statistics from a time-ordered overlap list.
pub fn stats_for(overlaps: &[Overlap]) -> OverlapStats {
    let mut ranked = overlaps.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.time.cmp(&b.time)));
    ranked.truncate(MOST_PROBLEMATIC_LIMIT);

    OverlapStats {
        total_windows: overlaps.len(),
        max_concurrent: overlaps.iter().map(|o| o.count).max().unwrap_or(0),
        most_problematic: ranked,
    }
}

fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use cl_schedule::{CronOracle, OracleError};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap()
    }

    fn analyzer(hours: i64) -> OverlapAnalyzer {
        OverlapAnalyzer::new(Arc::new(CronOracle::default())).with_window(Duration::hours(hours))
    }

    #[test]
    fn identical_hourly_jobs_overlap_every_hour() {
        let jobs = [OverlapJob::new("a", "0 * * * *"), OverlapJob::new("b", "0 * * * *")];
        let report = analyzer(24).analyze(&jobs, now());
        // 11:00 today through 09:00 tomorrow; the window end is exclusive.
        assert_eq!(report.overlaps.len(), 23);
        assert!(report.overlaps.iter().all(|o| o.count == 2));
        assert_eq!(report.stats.max_concurrent, 2);
        assert_eq!(report.stats.total_windows, 23);
        assert_eq!(report.stats.most_problematic.len(), MOST_PROBLEMATIC_LIMIT);
    }

    #[test]
    fn frequent_jobs_are_projected_across_the_whole_window() {
        let jobs = [
            OverlapJob::new("minutely", "* * * * *"),
            OverlapJob::new("evening", "30 20 * * *"),
        ];
        let analyzer = analyzer(48);
        assert_eq!(analyzer.window(), Duration::hours(48));

        let report = analyzer.analyze(&jobs, now());
        let times: Vec<DateTime<Utc>> = report.overlaps.iter().map(|o| o.time).collect();
        assert_eq!(
            times,
            vec![
                Utc.with_ymd_and_hms(2024, 6, 15, 20, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 6, 16, 20, 30, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn window_past_the_calendar_end_is_skipped() {
        let jobs = [OverlapJob::new("a", "0 * * * *"), OverlapJob::new("b", "0 * * * *")];
        let report = analyzer(3_000_000_000).analyze(&jobs, now());
        assert_eq!(report, OverlapReport::default());
    }

    #[test]
    fn staggered_jobs_do_not_overlap() {
        let jobs = [OverlapJob::new("a", "0 * * * *"), OverlapJob::new("b", "30 * * * *")];
        let report = analyzer(1).analyze(&jobs, now());
        assert!(report.overlaps.is_empty());
        assert_eq!(report.stats, OverlapStats::default());
    }

    #[test]
    fn duplicate_ids_are_counted_once() {
        let jobs = [OverlapJob::new("a", "0 * * * *"), OverlapJob::new("a", "0 * * * *")];
        let report = analyzer(24).analyze(&jobs, now());
        assert!(report.overlaps.is_empty());
    }

    #[test]
    fn overlaps_are_time_ordered_and_ranked_by_count() {
        let jobs = [
            OverlapJob::new("every15", "*/15 * * * *"),
            OverlapJob::new("half", "*/30 * * * *"),
            OverlapJob::new("hourly", "0 * * * *"),
        ];
        let report = analyzer(2).analyze(&jobs, now());
        assert!(report.overlaps.windows(2).all(|w| w[0].time < w[1].time));

        let top = &report.stats.most_problematic[0];
        assert_eq!(top.count, 3);
        assert_eq!(top.time, Utc.with_ymd_and_hms(2024, 6, 15, 11, 0, 0).unwrap());
        assert_eq!(top.job_ids, vec!["every15", "half", "hourly"]);
        assert_eq!(report.stats.max_concurrent, 3);
        // 10:30, 11:00 and 11:30 are shared; 10:00 and 12:00 fall outside.
        assert_eq!(report.stats.total_windows, 3);
        assert!(report.stats.most_problematic[1].count <= top.count);
    }

    #[test]
    fn broken_jobs_are_skipped() {
        let jobs = [
            OverlapJob::new("a", "0 * * * *"),
            OverlapJob::new("bad", "99 * * * *"),
            OverlapJob::new("b", "0 * * * *"),
        ];
        let report = analyzer(3).analyze(&jobs, now());
        assert_eq!(report.overlaps.len(), 2);
        assert!(report.overlaps.iter().all(|o| o.job_ids == vec!["a", "b"]));
    }

    /// Returns fixed instants with seconds set, to exercise truncation.
    struct SecondsOracle;

    impl Oracle for SecondsOracle {
        fn next(
            &self,
            expression: &str,
            _from: DateTime<Utc>,
            _count: usize,
        ) -> Result<Vec<DateTime<Utc>>, OracleError> {
            let secs = expression.parse::<u32>().unwrap_or(0);
            Ok(vec![Utc.with_ymd_and_hms(2024, 6, 15, 10, 5, secs).unwrap()])
        }
    }

    #[test]
    fn occurrences_are_grouped_by_truncated_minute() {
        let analyzer = OverlapAnalyzer::new(Arc::new(SecondsOracle));
        let jobs = [OverlapJob::new("a", "5"), OverlapJob::new("b", "40")];
        let report = analyzer.analyze(&jobs, now());
        assert_eq!(report.overlaps.len(), 1);
        assert_eq!(report.overlaps[0].time, Utc.with_ymd_and_hms(2024, 6, 15, 10, 5, 0).unwrap());
    }
}
