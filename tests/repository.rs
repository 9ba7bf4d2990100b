//! Repository integration tests against a fresh on-disk SQLite file.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tempfile::TempDir;

use kosis_collector::models::{AuditColumns, ObservationRow};
use kosis_collector::repository::{
    migrations, AsyncSqlitePool, CatalogRepository, CompletionFlagRepository,
    ObservationRepository, CHUNK_SIZE,
};
use kosis_collector::schema::{kosis_request_map, kostat_observations};

async fn fresh_pool(dir: &TempDir) -> AsyncSqlitePool {
    let path = dir.path().join("collector.db");
    let pool = AsyncSqlitePool::from_path(&path);
    migrations::run_migrations(pool.database_url())
        .await
        .expect("migrations should apply to a fresh database");
    pool
}

async fn seed_catalog(pool: &AsyncSqlitePool, rows: &[(&str, &str, Option<&str>)]) {
    let mut conn = pool.get().await.unwrap();
    for (org, tbl, url) in rows {
        diesel::insert_into(kosis_request_map::table)
            .values((
                kosis_request_map::org_id.eq(org.to_string()),
                kosis_request_map::tbl_id.eq(tbl.to_string()),
                kosis_request_map::url.eq(url.map(str::to_string)),
            ))
            .execute(&mut conn)
            .await
            .unwrap();
    }
}

fn observation(tbl: &str, period: &str, value: f64) -> ObservationRow {
    let mut audit = AuditColumns::default();
    audit.fill_absent(Utc::now());
    ObservationRow {
        tbl_id: tbl.to_string(),
        time_period: Some(period.to_string()),
        freq: Some("M".to_string()),
        itm_id: Some("T10".to_string()),
        c1: Some("A01".to_string()),
        c2: None,
        c3: None,
        c4: None,
        c5: None,
        c6: None,
        c7: None,
        c8: None,
        obs_value: value,
        audit,
    }
}

#[tokio::test]
async fn completion_flag_walks_n_to_y() {
    let dir = TempDir::new().unwrap();
    let pool = fresh_pool(&dir).await;
    let completion = CompletionFlagRepository::new(pool);

    completion.init("20250521").await.unwrap();
    let record = completion.get("20250521").await.unwrap().unwrap();
    assert_eq!(record.complete_flag, "N");

    completion.finalize("20250521").await.unwrap();
    let record = completion.get("20250521").await.unwrap().unwrap();
    assert_eq!(record.complete_flag, "Y");
}

#[tokio::test]
async fn finalize_without_init_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let pool = fresh_pool(&dir).await;
    let completion = CompletionFlagRepository::new(pool);

    // State divergence is logged, not raised.
    completion.finalize("20250101").await.unwrap();
    assert!(completion.get("20250101").await.unwrap().is_none());
}

#[tokio::test]
async fn init_resets_a_finished_flag() {
    let dir = TempDir::new().unwrap();
    let pool = fresh_pool(&dir).await;
    let completion = CompletionFlagRepository::new(pool);

    completion.init("20250521").await.unwrap();
    completion.finalize("20250521").await.unwrap();

    // A rerun on the same date starts over at N.
    completion.init("20250521").await.unwrap();
    let record = completion.get("20250521").await.unwrap().unwrap();
    assert_eq!(record.complete_flag, "N");
}

#[tokio::test]
async fn chunked_insert_persists_every_row() {
    let dir = TempDir::new().unwrap();
    let pool = fresh_pool(&dir).await;
    let observations = ObservationRepository::new(pool);

    // Two full chunks plus a remainder.
    let rows: Vec<ObservationRow> = (0..CHUNK_SIZE * 2 + 500)
        .map(|i| observation("DT_1EA1201", "202504", i as f64))
        .collect();

    let saved = observations.insert_chunked(&rows).await.unwrap();
    assert_eq!(saved, rows.len());
}

#[tokio::test]
async fn failed_chunk_does_not_block_later_chunks() {
    let dir = TempDir::new().unwrap();
    let pool = fresh_pool(&dir).await;

    // Abort any insert for the poisoned table id, so exactly the chunk
    // that contains it rolls back.
    {
        let mut conn = pool.get().await.unwrap();
        diesel::sql_query(
            "CREATE TRIGGER reject_poisoned BEFORE INSERT ON kostat_observations
             WHEN NEW.tbl_id = 'DT_POISON'
             BEGIN SELECT RAISE(ABORT, 'poisoned row'); END",
        )
        .execute(&mut conn)
        .await
        .unwrap();
    }

    // Three chunks; the poisoned row lands in the middle one.
    let mut rows: Vec<ObservationRow> = (0..CHUNK_SIZE * 2 + 300)
        .map(|i| observation("DT_1EA1201", "202504", i as f64))
        .collect();
    rows[CHUNK_SIZE + 10] = observation("DT_POISON", "202504", 0.0);

    let observations = ObservationRepository::new(pool.clone());
    let saved = observations.insert_chunked(&rows).await.unwrap();

    // First and last chunks persist; the middle chunk is rolled back
    // wholesale.
    assert_eq!(saved, rows.len() - CHUNK_SIZE);

    let mut conn = pool.get().await.unwrap();
    let stored: i64 = kostat_observations::table
        .count()
        .get_result(&mut conn)
        .await
        .unwrap();
    assert_eq!(stored as usize, saved);
}

#[tokio::test]
async fn catalog_skips_rows_without_a_url() {
    let dir = TempDir::new().unwrap();
    let pool = fresh_pool(&dir).await;
    seed_catalog(
        &pool,
        &[
            ("101", "DT_1EA1201", Some("X7")),
            ("101", "DT_1EA1202", None),
            ("301", "DT_200Y001", Some("Z2")),
        ],
    )
    .await;
    let catalog = CatalogRepository::new(pool);

    let entries = catalog.trackable_entries(&[]).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].tbl_id, "DT_1EA1201");
    assert_eq!(entries[0].url_code, "X7");
    assert_eq!(entries[1].org_id, "301");
}

#[tokio::test]
async fn catalog_honors_the_allow_list() {
    let dir = TempDir::new().unwrap();
    let pool = fresh_pool(&dir).await;
    seed_catalog(
        &pool,
        &[
            ("101", "DT_1EA1201", Some("X7")),
            ("301", "DT_200Y001", Some("Z2")),
        ],
    )
    .await;
    let catalog = CatalogRepository::new(pool);

    let entries = catalog
        .trackable_entries(&["DT_200Y001".to_string()])
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].tbl_id, "DT_200Y001");
}
