//! Domain types shared across the collection pipeline.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Actor recorded in the audit columns of every persisted row.
pub const AUDIT_ACTOR: &str = "bok";
/// Screen identifier recorded in the audit columns.
pub const AUDIT_SCREEN: &str = "batch";
/// System identifier recorded in the audit columns.
pub const AUDIT_SYSTEM: &str = "kosis-collector";

/// One trackable statistical table from the request-map registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogEntry {
    pub org_id: String,
    pub tbl_id: String,
    /// User-stats URL code embedded in the fetch request.
    pub url_code: String,
}

/// Reporting-frequency vocabulary used by KOSIS metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodCode {
    Monthly,
    Semiannual,
    Yearly,
    Quarterly,
}

/// A period label outside the fixed four-entry vocabulary.
///
/// Treated as a validation error: the offending metadata row is
/// rejected rather than propagated with an empty period type.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized period label: {0:?}")]
pub struct UnknownPeriodLabel(pub String);

impl PeriodCode {
    /// Map the Korean metadata label (수록주기).
    pub fn from_label(label: &str) -> Result<Self, UnknownPeriodLabel> {
        match label.trim() {
            "월" => Ok(Self::Monthly),
            "반기" => Ok(Self::Semiannual),
            "년" => Ok(Self::Yearly),
            "분기" => Ok(Self::Quarterly),
            other => Err(UnknownPeriodLabel(other.to_string())),
        }
    }

    /// Single-letter request code (prdSe).
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Monthly => "M",
            Self::Semiannual => "S",
            Self::Yearly => "Y",
            Self::Quarterly => "Q",
        }
    }
}

/// Raw refresh-metadata row from the getMeta (자료갱신일) call, before
/// the originating catalog entry is attached.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaRow {
    /// 자료갱신일 - date the table was last refreshed (`YYYY-MM-DD`).
    #[serde(rename = "SEND_DE", default)]
    pub last_updated: Option<String>,
    /// 수록주기 - Korean reporting-frequency label.
    #[serde(rename = "PRD_SE", default)]
    pub period_label: Option<String>,
    /// 수록시점 - latest recorded period (e.g. `202504`).
    #[serde(rename = "PRD_DE", default)]
    pub period_timestamp: Option<String>,
}

/// Refresh metadata joined back onto its catalog entry.
#[derive(Debug, Clone)]
pub struct RefreshMeta {
    pub entry: CatalogEntry,
    pub last_updated: String,
    pub period_label: Option<String>,
    pub period_timestamp: Option<String>,
}

/// One observation object from the statisticsData getList payload,
/// reindexed to the fixed 13-column layout through serde renames.
/// Dimensions the table does not use come back as `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawObservation {
    #[serde(rename = "TBL_ID", default)]
    pub tbl_id: Option<String>,
    #[serde(rename = "PRD_DE", default)]
    pub time_period: Option<String>,
    #[serde(rename = "PRD_SE", default)]
    pub freq: Option<String>,
    #[serde(rename = "ITM_ID", default)]
    pub itm_id: Option<String>,
    #[serde(rename = "C1", default)]
    pub c1: Option<String>,
    #[serde(rename = "C2", default)]
    pub c2: Option<String>,
    #[serde(rename = "C3", default)]
    pub c3: Option<String>,
    #[serde(rename = "C4", default)]
    pub c4: Option<String>,
    #[serde(rename = "C5", default)]
    pub c5: Option<String>,
    #[serde(rename = "C6", default)]
    pub c6: Option<String>,
    #[serde(rename = "C7", default)]
    pub c7: Option<String>,
    #[serde(rename = "C8", default)]
    pub c8: Option<String>,
    #[serde(rename = "DT", default)]
    pub obs_value: Option<String>,
}

/// The eight shared audit columns carried by every persisted row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditColumns {
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub created_screen: Option<String>,
    pub created_system: Option<String>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<String>,
    pub modified_screen: Option<String>,
    pub modified_system: Option<String>,
}

impl AuditColumns {
    /// Fill every absent column; values already populated by an
    /// earlier partial write are left untouched.
    pub fn fill_absent(&mut self, now: DateTime<Utc>) {
        self.created_at.get_or_insert(now);
        self.created_by.get_or_insert_with(|| AUDIT_ACTOR.to_string());
        self.created_screen
            .get_or_insert_with(|| AUDIT_SCREEN.to_string());
        self.created_system
            .get_or_insert_with(|| AUDIT_SYSTEM.to_string());
        self.modified_at.get_or_insert(now);
        self.modified_by.get_or_insert_with(|| AUDIT_ACTOR.to_string());
        self.modified_screen
            .get_or_insert_with(|| AUDIT_SCREEN.to_string());
        self.modified_system
            .get_or_insert_with(|| AUDIT_SYSTEM.to_string());
    }
}

/// Cleaned, persistable observation. `tbl_id` is guaranteed non-empty
/// and `obs_value` numeric by the cleaner.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
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
    pub audit: AuditColumns,
}
