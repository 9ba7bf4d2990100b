//! Per-date run accounting.

use std::time::Duration;

use tracing::info;

/// Request/success counts for one collected execute date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateStat {
    /// Execute date the counts belong to (`YYYY-MM-DD`).
    pub date: String,
    /// Deduplicated requests issued for the date.
    pub url_count: usize,
    /// Requests that returned a decodable payload within the retry budget.
    pub success_count: usize,
}

impl DateStat {
    /// Success ratio in percent; a date with no requests reads as 0.
    pub fn success_rate(&self) -> f64 {
        if self.url_count == 0 {
            return 0.0;
        }
        self.success_count as f64 / self.url_count as f64 * 100.0
    }
}

/// Emit the end-of-run summary, one line per collected date.
pub fn log_summary(stats: &[DateStat], elapsed: Duration) {
    for stat in stats {
        info!(
            date = %stat.date,
            urls = stat.url_count,
            succeeded = stat.success_count,
            rate = %format!("{:.1}%", stat.success_rate()),
            "collection result"
        );
    }
    info!(elapsed_secs = elapsed.as_secs(), "run finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_is_a_percentage() {
        let stat = DateStat {
            date: "2025-05-20".into(),
            url_count: 8,
            success_count: 6,
        };
        assert_eq!(stat.success_rate(), 75.0);
    }

    #[test]
    fn empty_date_reads_as_zero_rate() {
        let stat = DateStat {
            date: "2025-05-20".into(),
            url_count: 0,
            success_count: 0,
        };
        assert_eq!(stat.success_rate(), 0.0);
    }
}
