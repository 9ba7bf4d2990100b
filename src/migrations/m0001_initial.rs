use cetane::prelude::*;

pub fn migration() -> Migration {
    Migration::new("0001_initial")
        .operation(RunSql::portable().for_backend(
            "sqlite",
            r#"CREATE TABLE kosis_request_map (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    org_id TEXT NOT NULL,
    tbl_id TEXT NOT NULL,
    url TEXT
)"#,
        ))
        .operation(RunSql::portable().for_backend(
            "sqlite",
            "CREATE INDEX idx_request_map_tbl ON kosis_request_map(tbl_id)",
        ))
        .operation(RunSql::portable().for_backend(
            "sqlite",
            r#"CREATE TABLE kostat_observations (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    tbl_id TEXT NOT NULL,
    time_period TEXT,
    freq TEXT,
    itm_id TEXT,
    c1 TEXT,
    c2 TEXT,
    c3 TEXT,
    c4 TEXT,
    c5 TEXT,
    c6 TEXT,
    c7 TEXT,
    c8 TEXT,
    obs_value DOUBLE NOT NULL,
    created_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    created_screen TEXT NOT NULL,
    created_system TEXT NOT NULL,
    modified_at TEXT NOT NULL,
    modified_by TEXT NOT NULL,
    modified_screen TEXT NOT NULL,
    modified_system TEXT NOT NULL
)"#,
        ))
        .operation(RunSql::portable().for_backend(
            "sqlite",
            "CREATE INDEX idx_observations_tbl_period ON kostat_observations(tbl_id, time_period)",
        ))
        .operation(RunSql::portable().for_backend(
            "sqlite",
            r#"CREATE TABLE collection_status (
    collect_date TEXT PRIMARY KEY NOT NULL,
    complete_flag TEXT NOT NULL DEFAULT 'N',
    created_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    modified_at TEXT NOT NULL,
    modified_by TEXT NOT NULL
)"#,
        ))
}
