//! Fetch-request descriptors.

use std::collections::HashSet;

use crate::models::{CatalogEntry, PeriodCode};

/// Everything needed to fetch one table's observations for one period.
///
/// The descriptor is the unit of deduplication: two requests equal in
/// all fields collapse to one before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub org_id: String,
    pub tbl_id: String,
    pub url_code: String,
    pub period: PeriodCode,
    /// Used as both start and end of the requested range; this is a
    /// point-in-time snapshot fetch, not a range fetch.
    pub period_timestamp: String,
}

impl FetchRequest {
    /// Build the request for one filtered metadata row. Rows without a
    /// recorded period timestamp cannot be fetched and yield none.
    pub fn build(
        entry: &CatalogEntry,
        period: PeriodCode,
        period_timestamp: &str,
    ) -> Option<Self> {
        let timestamp = period_timestamp.trim();
        if timestamp.is_empty() {
            return None;
        }
        Some(Self {
            org_id: entry.org_id.clone(),
            tbl_id: entry.tbl_id.clone(),
            url_code: entry.url_code.clone(),
            period,
            period_timestamp: timestamp.to_string(),
        })
    }

    /// userStatsId path segment: `<id>/<org>/<tbl>/2/2/<urlCode>`.
    pub fn user_stats_id(&self, registered_id: &str) -> String {
        format!(
            "{}/{}/{}/2/2/{}",
            registered_id, self.org_id, self.tbl_id, self.url_code
        )
    }
}

/// Collapse duplicate descriptors, preserving first-seen order.
pub fn dedup_requests(requests: Vec<FetchRequest>) -> Vec<FetchRequest> {
    let mut seen = HashSet::new();
    requests
        .into_iter()
        .filter(|request| seen.insert(request.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(org: &str, tbl: &str, url: &str) -> CatalogEntry {
        CatalogEntry {
            org_id: org.to_string(),
            tbl_id: tbl.to_string(),
            url_code: url.to_string(),
        }
    }

    #[test]
    fn builds_user_stats_id_segment() {
        let request =
            FetchRequest::build(&entry("101", "DT_1EA1201", "X7"), PeriodCode::Monthly, "202504")
                .unwrap();
        assert_eq!(
            request.user_stats_id("myid"),
            "myid/101/DT_1EA1201/2/2/X7"
        );
        assert_eq!(request.period_timestamp, "202504");
    }

    #[test]
    fn empty_period_timestamp_builds_no_request() {
        let e = entry("101", "DT_1", "X");
        assert!(FetchRequest::build(&e, PeriodCode::Yearly, "").is_none());
        assert!(FetchRequest::build(&e, PeriodCode::Yearly, "   ").is_none());
    }

    #[test]
    fn dedup_is_by_full_descriptor_equality() {
        let a = FetchRequest::build(&entry("101", "DT_1", "X"), PeriodCode::Monthly, "202504")
            .unwrap();
        let same = a.clone();
        // Same table, different period - distinct request.
        let b = FetchRequest::build(&entry("101", "DT_1", "X"), PeriodCode::Monthly, "202503")
            .unwrap();
        // Same table, different organization - distinct request.
        let c = FetchRequest::build(&entry("202", "DT_1", "X"), PeriodCode::Monthly, "202504")
            .unwrap();

        let deduped = dedup_requests(vec![a.clone(), same, b.clone(), c.clone()]);
        assert_eq!(deduped, vec![a, b, c]);
    }
}
