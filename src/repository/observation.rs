//! Bulk persistence of cleaned observation rows.

use diesel_async::{AsyncConnection, RunQueryDsl};

use super::pool::{AsyncSqlitePool, DieselError};
use super::records::NewObservation;
use crate::models::ObservationRow;
use crate::schema::kostat_observations;

/// Rows per transaction. Bounds transaction size and isolates a failed
/// batch from the rest of the dataset.
pub const CHUNK_SIZE: usize = 1000;

#[derive(Clone)]
pub struct ObservationRepository {
    pool: AsyncSqlitePool,
}

impl ObservationRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Insert rows in fixed-size chunks, one transaction per chunk.
    ///
    /// A failed chunk is rolled back and logged as an error; later
    /// chunks still run. Returns the number of rows actually persisted,
    /// which on partial failure is less than `rows.len()`.
    pub async fn insert_chunked(&self, rows: &[ObservationRow]) -> Result<usize, DieselError> {
        let mut conn = self.pool.get().await?;
        let mut saved = 0usize;

        for (chunk_index, chunk) in rows.chunks(CHUNK_SIZE).enumerate() {
            let start = chunk_index * CHUNK_SIZE;
            let end = start + chunk.len() - 1;
            let records: Vec<NewObservation> = chunk.iter().map(NewObservation::from).collect();

            // SQLite takes one row per INSERT; the transaction still
            // makes the chunk all-or-nothing.
            let result = conn
                .transaction::<_, DieselError, _>(|conn| {
                    Box::pin(async move {
                        for record in &records {
                            diesel::insert_into(kostat_observations::table)
                                .values(record)
                                .execute(conn)
                                .await?;
                        }
                        Ok(())
                    })
                })
                .await;

            match result {
                Ok(()) => {
                    saved += chunk.len();
                    tracing::info!("persisted rows {} ~ {}", start, end);
                }
                Err(e) => {
                    tracing::error!("insert failed (rows {} ~ {}): {}", start, end, e);
                }
            }
        }

        tracing::info!("total persisted rows: {}", saved);
        Ok(saved)
    }
}
