//! Windowed date filtering of refresh metadata.

use chrono::{Days, NaiveDate};

use crate::models::{CatalogEntry, PeriodCode, RefreshMeta};

/// Closed date interval `[execute_date - days_back, execute_date]`.
///
/// Bounds are held as ISO `YYYY-MM-DD` strings; for that format a
/// lexical compare equals a chronological compare, which is how the
/// upstream metadata dates are matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionWindow {
    start: String,
    end: String,
}

impl CollectionWindow {
    pub fn ending_at(execute_date: NaiveDate, days_back: u64) -> Self {
        let start = execute_date
            .checked_sub_days(Days::new(days_back))
            .unwrap_or(NaiveDate::MIN);
        Self {
            start: start.format("%Y-%m-%d").to_string(),
            end: execute_date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: &str) -> bool {
        let date = date.trim();
        date >= self.start.as_str() && date <= self.end.as_str()
    }
}

/// One metadata row that survived the window and period-code mapping.
#[derive(Debug, Clone)]
pub struct FilteredMeta {
    pub entry: CatalogEntry,
    pub period: PeriodCode,
    pub period_timestamp: Option<String>,
}

/// Keep rows whose refresh date falls inside the window and whose
/// period label maps through the fixed vocabulary. A label outside the
/// vocabulary rejects the row with an error log; the run continues.
pub fn filter_metas(window: &CollectionWindow, metas: Vec<RefreshMeta>) -> Vec<FilteredMeta> {
    metas
        .into_iter()
        .filter_map(|meta| {
            if !window.contains(&meta.last_updated) {
                return None;
            }
            let label = meta.period_label.as_deref().unwrap_or("");
            match PeriodCode::from_label(label) {
                Ok(period) => Some(FilteredMeta {
                    entry: meta.entry,
                    period,
                    period_timestamp: meta.period_timestamp,
                }),
                Err(e) => {
                    tracing::error!(
                        "rejecting metadata row for {}: {}",
                        meta.entry.tbl_id,
                        e
                    );
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn meta(tbl: &str, last_updated: &str, label: &str) -> RefreshMeta {
        RefreshMeta {
            entry: CatalogEntry {
                org_id: "101".to_string(),
                tbl_id: tbl.to_string(),
                url_code: "X".to_string(),
            },
            last_updated: last_updated.to_string(),
            period_label: Some(label.to_string()),
            period_timestamp: Some("202504".to_string()),
        }
    }

    #[test]
    fn window_is_inclusive_on_both_boundaries() {
        let window = CollectionWindow::ending_at(date("2025-05-20"), 6);
        assert_eq!(window.start(), "2025-05-14");
        assert_eq!(window.end(), "2025-05-20");

        assert!(window.contains("2025-05-14"));
        assert!(window.contains("2025-05-20"));
        assert!(window.contains("2025-05-17"));
        assert!(!window.contains("2025-05-13"));
        assert!(!window.contains("2025-05-21"));
    }

    #[test]
    fn zero_days_back_is_a_single_day_window() {
        let window = CollectionWindow::ending_at(date("2025-05-21"), 0);
        assert!(window.contains("2025-05-21"));
        assert!(!window.contains("2025-05-20"));
        assert!(!window.contains("2025-05-22"));
    }

    #[test]
    fn filter_keeps_in_window_rows_and_maps_periods() {
        let window = CollectionWindow::ending_at(date("2025-05-21"), 6);
        let filtered = filter_metas(
            &window,
            vec![
                meta("DT_1", "2025-05-21", "월"),
                meta("DT_2", "2025-05-15", "분기"),
                meta("DT_3", "2025-05-01", "월"),
            ],
        );
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].entry.tbl_id, "DT_1");
        assert_eq!(filtered[0].period, PeriodCode::Monthly);
        assert_eq!(filtered[1].period, PeriodCode::Quarterly);
    }

    #[test]
    fn unrecognized_period_label_rejects_the_row() {
        let window = CollectionWindow::ending_at(date("2025-05-21"), 6);
        let filtered = filter_metas(
            &window,
            vec![meta("DT_1", "2025-05-21", "주"), meta("DT_2", "2025-05-21", "년")],
        );
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].entry.tbl_id, "DT_2");
    }
}
