//! Diesel row records bridging domain models and the schema.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::models::ObservationRow;
use crate::schema::kostat_observations;

fn rfc3339_or_empty(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339()).unwrap_or_default()
}

/// Insertable observation record; all 21 target columns.
#[derive(Insertable)]
#[diesel(table_name = kostat_observations)]
pub struct NewObservation {
    pub tbl_id: String,
    pub time_period: Option<String>,
    pub freq: Option<String>,
    pub itm_id: Option<String>,
    pub c1: Option<String>,
    pub c2: Option<String>,
    pub c3: Option<String>,
    pub c4: Option<String>,
    pub c5: Option<String>,
    pub c6: Option<String>,
    pub c7: Option<String>,
    pub c8: Option<String>,
    pub obs_value: f64,
    pub created_at: String,
    pub created_by: String,
    pub created_screen: String,
    pub created_system: String,
    pub modified_at: String,
    pub modified_by: String,
    pub modified_screen: String,
    pub modified_system: String,
}

impl From<&ObservationRow> for NewObservation {
    fn from(row: &ObservationRow) -> Self {
        // Rows reaching persistence have been audit-stamped by the
        // cleaner, so the unwraps below only paper over empty strings.
        let audit = &row.audit;
        Self {
            tbl_id: row.tbl_id.clone(),
            time_period: row.time_period.clone(),
            freq: row.freq.clone(),
            itm_id: row.itm_id.clone(),
            c1: row.c1.clone(),
            c2: row.c2.clone(),
            c3: row.c3.clone(),
            c4: row.c4.clone(),
            c5: row.c5.clone(),
            c6: row.c6.clone(),
            c7: row.c7.clone(),
            c8: row.c8.clone(),
            obs_value: row.obs_value,
            created_at: rfc3339_or_empty(audit.created_at),
            created_by: audit.created_by.clone().unwrap_or_default(),
            created_screen: audit.created_screen.clone().unwrap_or_default(),
            created_system: audit.created_system.clone().unwrap_or_default(),
            modified_at: rfc3339_or_empty(audit.modified_at),
            modified_by: audit.modified_by.clone().unwrap_or_default(),
            modified_screen: audit.modified_screen.clone().unwrap_or_default(),
            modified_system: audit.modified_system.clone().unwrap_or_default(),
        }
    }
}

/// Completion-flag row as stored.
#[derive(Debug, Clone, Queryable)]
pub struct CompletionFlagRecord {
    pub collect_date: String,
    pub complete_flag: String,
    pub created_at: String,
    pub created_by: String,
    pub modified_at: String,
    pub modified_by: String,
}
