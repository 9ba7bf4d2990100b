//! Per-table refresh-metadata lookup with retry.

use std::time::Duration;

use crate::kosis::KosisClient;
use crate::models::{CatalogEntry, RefreshMeta};
use crate::retry::RetryPolicy;

const META_ATTEMPTS: u32 = 5;
const META_BACKOFF_STEP: Duration = Duration::from_secs(2);

/// Fetch refresh metadata for every catalog entry.
///
/// Each lookup gets its own retry budget; an entry whose budget is
/// spent is skipped with a warning and contributes no metadata. No
/// error escapes this function - the run continues with whatever was
/// obtained.
pub async fn check_refresh(client: &KosisClient, entries: &[CatalogEntry]) -> Vec<RefreshMeta> {
    let policy = RetryPolicy::linear(META_ATTEMPTS, META_BACKOFF_STEP);
    let total = entries.len();
    let mut metas = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        tracing::debug!(
            "metadata request [{}/{}]: org={} tbl={}",
            index + 1,
            total,
            entry.org_id,
            entry.tbl_id
        );

        let result = policy
            .run(|attempt| async move {
                match client.refresh_meta(&entry.org_id, &entry.tbl_id).await {
                    Ok(rows) => Ok(rows),
                    Err(e) => {
                        tracing::warn!(
                            "metadata attempt {} failed for {}: {}",
                            attempt,
                            entry.tbl_id,
                            e
                        );
                        Err(e)
                    }
                }
            })
            .await;

        match result {
            Ok(rows) => {
                for row in rows {
                    match row.last_updated {
                        Some(last_updated) if !last_updated.trim().is_empty() => {
                            metas.push(RefreshMeta {
                                entry: entry.clone(),
                                last_updated,
                                period_label: row.period_label,
                                period_timestamp: row.period_timestamp,
                            });
                        }
                        _ => {
                            tracing::warn!(
                                "metadata row without a refresh date for {}",
                                entry.tbl_id
                            );
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    "skipping {} after {} metadata attempts: {}",
                    entry.tbl_id,
                    e.attempts,
                    e.last
                );
            }
        }
    }

    metas
}
