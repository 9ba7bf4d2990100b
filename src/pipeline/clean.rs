//! Row cleaning and audit stamping.

use chrono::{DateTime, Utc};

use crate::models::{AuditColumns, ObservationRow, RawObservation};

/// Observed values that mean "no data" upstream.
const SENTINELS: [&str; 2] = ["-", "..."];

/// Concatenate the fetched payloads and apply the row-drop rules in
/// order: missing observed value, sentinel value, non-numeric value,
/// missing table id. Surviving rows get the audit columns stamped with
/// fill-if-absent semantics. Idempotent on already-clean input.
pub fn clean(payloads: Vec<Vec<RawObservation>>, now: DateTime<Utc>) -> Vec<ObservationRow> {
    let mut rows = Vec::new();

    for raw in payloads.into_iter().flatten() {
        let Some(value) = raw.obs_value.as_deref().map(str::trim) else {
            continue;
        };
        if value.is_empty() || SENTINELS.contains(&value) {
            continue;
        }
        let Ok(obs_value) = value.parse::<f64>() else {
            continue;
        };
        let Some(tbl_id) = raw.tbl_id.filter(|t| !t.trim().is_empty()) else {
            continue;
        };

        let mut row = ObservationRow {
            tbl_id,
            time_period: raw.time_period,
            freq: raw.freq,
            itm_id: raw.itm_id,
            c1: raw.c1,
            c2: raw.c2,
            c3: raw.c3,
            c4: raw.c4,
            c5: raw.c5,
            c6: raw.c6,
            c7: raw.c7,
            c8: raw.c8,
            obs_value,
            audit: AuditColumns::default(),
        };
        row.audit.fill_absent(now);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AUDIT_ACTOR;

    fn raw(tbl: Option<&str>, value: Option<&str>) -> RawObservation {
        RawObservation {
            tbl_id: tbl.map(str::to_string),
            time_period: Some("202504".to_string()),
            freq: Some("M".to_string()),
            obs_value: value.map(str::to_string),
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        "2025-05-21T09:00:00Z".parse().unwrap()
    }

    #[test]
    fn drops_missing_sentinel_and_non_numeric_values() {
        let rows = clean(
            vec![vec![
                raw(Some("DT_1"), Some("12.5")),
                raw(Some("DT_1"), Some("-")),
                raw(Some("DT_1"), Some("...")),
                raw(Some("DT_1"), None),
                raw(Some("DT_1"), Some("abc")),
                raw(Some("DT_1"), Some("")),
            ]],
            now(),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].obs_value, 12.5);
    }

    #[test]
    fn drops_rows_without_a_table_id() {
        let rows = clean(
            vec![vec![raw(None, Some("1.0")), raw(Some(""), Some("2.0"))]],
            now(),
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn concatenates_payloads_and_stamps_audit_columns() {
        let rows = clean(
            vec![
                vec![raw(Some("DT_1"), Some("1"))],
                vec![raw(Some("DT_2"), Some("2"))],
            ],
            now(),
        );
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.audit.created_at, Some(now()));
            assert_eq!(row.audit.modified_at, Some(now()));
            assert_eq!(row.audit.created_by.as_deref(), Some(AUDIT_ACTOR));
        }
    }

    #[test]
    fn cleaning_is_idempotent_on_clean_input() {
        let once = clean(
            vec![vec![
                raw(Some("DT_1"), Some("12.5")),
                raw(Some("DT_1"), Some("-")),
                raw(Some("DT_2"), Some("3.25")),
            ]],
            now(),
        );

        // Feed the clean output back through as raw rows.
        let as_raw: Vec<RawObservation> = once
            .iter()
            .map(|row| RawObservation {
                tbl_id: Some(row.tbl_id.clone()),
                time_period: row.time_period.clone(),
                freq: row.freq.clone(),
                obs_value: Some(row.obs_value.to_string()),
                ..Default::default()
            })
            .collect();
        let twice = clean(vec![as_raw], now());

        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.tbl_id, b.tbl_id);
            assert_eq!(a.obs_value, b.obs_value);
        }
    }
}
