//! Read-only access to the request-map registry.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::CatalogEntry;
use crate::schema::kosis_request_map;

#[derive(Clone)]
pub struct CatalogRepository {
    pool: AsyncSqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// All registry entries with a non-null fetch URL, optionally
    /// restricted to an allow-list of table ids.
    pub async fn trackable_entries(
        &self,
        allow: &[String],
    ) -> Result<Vec<CatalogEntry>, DieselError> {
        let mut conn = self.pool.get().await?;

        let mut query = kosis_request_map::table
            .select((
                kosis_request_map::org_id,
                kosis_request_map::tbl_id,
                kosis_request_map::url,
            ))
            .filter(kosis_request_map::url.is_not_null())
            .order(kosis_request_map::id.asc())
            .into_boxed();

        if !allow.is_empty() {
            query = query.filter(kosis_request_map::tbl_id.eq_any(allow));
        }

        let rows: Vec<(String, String, Option<String>)> = query.load(&mut conn).await?;

        Ok(rows
            .into_iter()
            .filter_map(|(org_id, tbl_id, url)| {
                url.map(|url_code| CatalogEntry {
                    org_id,
                    tbl_id,
                    url_code,
                })
            })
            .collect())
    }
}
