//! End-to-end collection pipeline.
//!
//! A run walks one or more execute dates through the same stages:
//! catalog resolution, refresh-metadata check, window filtering,
//! request building, bounded-concurrency fetch, cleaning, and chunked
//! persistence. The whole run is bracketed by the completion flag.

pub mod catalog;
pub mod clean;
pub mod fetch;
pub mod metadata;
pub mod stats;
pub mod window;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::time::Instant;
use tracing::{info, warn};

use crate::kosis::{dedup_requests, FetchRequest, KosisClient};
use crate::repository::{
    AsyncSqlitePool, CatalogRepository, CompletionFlagRepository, ObservationRepository,
};

pub use stats::DateStat;
pub use window::CollectionWindow;

/// Owns the repositories and API client for one batch run.
pub struct Collector {
    pool: AsyncSqlitePool,
    client: KosisClient,
    catalog: CatalogRepository,
    observations: ObservationRepository,
    completion: CompletionFlagRepository,
}

/// Tuning knobs for a run, resolved from config and CLI flags.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Window width in days behind each execute date.
    pub days_back: u64,
    /// Concurrent fetch workers.
    pub max_workers: usize,
    /// Restrict the catalog to these table ids; empty means all.
    pub tbl_ids: Vec<String>,
}

impl Collector {
    pub fn new(pool: AsyncSqlitePool, client: KosisClient) -> Self {
        let catalog = CatalogRepository::new(pool.clone());
        let observations = ObservationRepository::new(pool.clone());
        let completion = CompletionFlagRepository::new(pool.clone());
        Self {
            pool,
            client,
            catalog,
            observations,
            completion,
        }
    }

    /// Collect every execute date in order under one completion-flag
    /// bracket keyed by today's run date. Database unreachability and
    /// flag initialization failure are fatal; a finalization failure
    /// only logs, since the data is already persisted at that point.
    pub async fn run(
        &self,
        execute_dates: &[NaiveDate],
        options: &RunOptions,
    ) -> Result<Vec<DateStat>> {
        self.pool
            .acquire_with_retry()
            .await
            .context("database is unreachable")?;

        let run_date = Utc::now().format("%Y%m%d").to_string();
        self.completion
            .init(&run_date)
            .await
            .context("failed to initialize the completion flag")?;

        let started = Instant::now();
        let mut collected = Vec::new();
        for date in execute_dates {
            if let Some(stat) = self.collect_date(*date, options).await? {
                collected.push(stat);
            }
        }

        stats::log_summary(&collected, started.elapsed());

        if let Err(e) = self.completion.finalize(&run_date).await {
            tracing::error!("failed to finalize the completion flag: {}", e);
        }

        Ok(collected)
    }

    /// One execute date, start to finish. Returns `None` when the date
    /// produced no requests at all - nothing refreshed inside the
    /// window is a normal outcome, not an error.
    async fn collect_date(
        &self,
        execute_date: NaiveDate,
        options: &RunOptions,
    ) -> Result<Option<DateStat>> {
        let date = execute_date.format("%Y-%m-%d").to_string();
        info!("collecting for execute date {}", date);

        let entries = self
            .catalog
            .trackable_entries(&options.tbl_ids)
            .await
            .context("failed to read the request-map registry")?;
        let entries = catalog::resolve(entries);
        info!("tracking {} catalog entries", entries.len());
        for entry in &entries {
            info!("collection target: org={} tbl={}", entry.org_id, entry.tbl_id);
        }

        let metas = metadata::check_refresh(&self.client, &entries).await;
        if metas.is_empty() {
            warn!("no refresh metadata obtained for {}", date);
            return Ok(None);
        }

        let window = CollectionWindow::ending_at(execute_date, options.days_back);
        info!("collection window {} ~ {}", window.start(), window.end());
        let filtered = window::filter_metas(&window, metas);
        if filtered.is_empty() {
            warn!("nothing refreshed inside the window for {}", date);
            return Ok(None);
        }

        let requests: Vec<FetchRequest> = filtered
            .iter()
            .filter_map(|meta| {
                FetchRequest::build(
                    &meta.entry,
                    meta.period,
                    meta.period_timestamp.as_deref().unwrap_or(""),
                )
            })
            .collect();
        let requests = dedup_requests(requests);
        let url_count = requests.len();
        info!("{} fetch requests after dedup", url_count);

        let payloads = fetch::fetch_all(&self.client, requests, options.max_workers).await;
        let success_count = payloads.len();

        let rows = clean::clean(payloads, Utc::now());
        if rows.is_empty() {
            warn!("no persistable rows for {}", date);
        } else {
            self.observations
                .insert_chunked(&rows)
                .await
                .context("failed to persist observation rows")?;
        }

        Ok(Some(DateStat {
            date,
            url_count,
            success_count,
        }))
    }
}
