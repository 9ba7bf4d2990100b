//! Bounded-concurrency fetch engine.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::kosis::{FetchRequest, KosisClient};
use crate::models::RawObservation;
use crate::retry::RetryPolicy;

const FETCH_ATTEMPTS: u32 = 10;
const FETCH_BACKOFF_STEP: Duration = Duration::from_secs(2);

/// Execute the deduplicated request set under a bounded worker pool.
///
/// Each request retries independently; one exhausted request never
/// aborts its siblings. Payloads are gathered as they complete - no
/// ordering across requests is guaranteed or needed downstream.
pub async fn fetch_all(
    client: &KosisClient,
    requests: Vec<FetchRequest>,
    max_workers: usize,
) -> Vec<Vec<RawObservation>> {
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut tasks: JoinSet<Option<Vec<RawObservation>>> = JoinSet::new();

    for request in requests {
        let client = client.clone();
        let semaphore = semaphore.clone();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            fetch_one(&client, &request).await
        });
    }

    let mut payloads = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some(rows)) => payloads.push(rows),
            Ok(None) => {}
            Err(e) => tracing::error!("fetch task panicked: {}", e),
        }
    }
    payloads
}

/// One request, retried to exhaustion. Returns `None` when every
/// attempt failed; that request simply contributes nothing.
async fn fetch_one(client: &KosisClient, request: &FetchRequest) -> Option<Vec<RawObservation>> {
    let policy = RetryPolicy::linear(FETCH_ATTEMPTS, FETCH_BACKOFF_STEP);

    let result = policy
        .run(|attempt| async move {
            tracing::info!(
                "fetch attempt {}: {} ({})",
                attempt,
                request.tbl_id,
                request.period_timestamp
            );
            match client.observations(request).await {
                Ok(rows) => Ok(rows),
                Err(e) => {
                    tracing::warn!(
                        "fetch attempt {} failed for {}: {}",
                        attempt,
                        request.tbl_id,
                        e
                    );
                    Err(e)
                }
            }
        })
        .await;

    match result {
        Ok(rows) => {
            tracing::info!("fetched {} rows for {}", rows.len(), request.tbl_id);
            Some(rows)
        }
        Err(e) => {
            tracing::error!(
                "all {} fetch attempts failed for {}: {}",
                e.attempts,
                request.tbl_id,
                e.last
            );
            None
        }
    }
}
