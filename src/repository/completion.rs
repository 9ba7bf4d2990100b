//! Completion-flag state machine, one row per collection date.
//!
//! `UNINITIALIZED -> N (in progress) -> Y (complete)`. Initialization
//! failure is fatal to a run and propagates; a finalization problem is
//! the caller's choice to log.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::pool::{AsyncSqlitePool, DieselError};
use super::records::CompletionFlagRecord;
use crate::models::AUDIT_ACTOR;
use crate::schema::collection_status;

#[derive(Clone)]
pub struct CompletionFlagRepository {
    pool: AsyncSqlitePool,
}

impl CompletionFlagRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Reset the flag for `date` to `N`: delete any existing record,
    /// then insert a fresh one, in a single transaction.
    pub async fn init(&self, date: &str) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let date = date.to_string();
        let now = Utc::now().to_rfc3339();

        conn.transaction::<_, DieselError, _>(|conn| {
            let date = date.clone();
            let now = now.clone();
            Box::pin(async move {
                diesel::delete(
                    collection_status::table.filter(collection_status::collect_date.eq(&date)),
                )
                .execute(conn)
                .await?;

                diesel::insert_into(collection_status::table)
                    .values((
                        collection_status::collect_date.eq(&date),
                        collection_status::complete_flag.eq("N"),
                        collection_status::created_at.eq(&now),
                        collection_status::created_by.eq(AUDIT_ACTOR),
                        collection_status::modified_at.eq(&now),
                        collection_status::modified_by.eq(AUDIT_ACTOR),
                    ))
                    .execute(conn)
                    .await?;

                Ok(())
            })
        })
        .await?;

        tracing::info!("completion flag initialized to N for {}", date);
        Ok(())
    }

    /// Flip the flag for `date` to `Y` in place. Zero matched rows is
    /// state divergence (finalize without init): logged as a warning,
    /// not an error.
    pub async fn finalize(&self, date: &str) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();

        let updated =
            diesel::update(collection_status::table.filter(collection_status::collect_date.eq(date)))
                .set((
                    collection_status::complete_flag.eq("Y"),
                    collection_status::modified_at.eq(&now),
                ))
                .execute(&mut conn)
                .await?;

        if updated == 0 {
            tracing::warn!("no completion flag row to finalize for {}", date);
        } else {
            tracing::info!("completion flag set to Y for {}", date);
        }
        Ok(())
    }

    /// Current flag row for `date`, if one exists.
    pub async fn get(&self, date: &str) -> Result<Option<CompletionFlagRecord>, DieselError> {
        let mut conn = self.pool.get().await?;

        collection_status::table
            .find(date)
            .first::<CompletionFlagRecord>(&mut conn)
            .await
            .optional()
    }
}
