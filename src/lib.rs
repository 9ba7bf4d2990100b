//! KOSIS statistical-table batch collector.
//!
//! Resolves trackable tables from a request-map registry, checks each
//! table's refresh metadata against a sliding date window, fetches the
//! refreshed observations under a bounded worker pool, cleans them, and
//! persists them in chunked transactions. Each run is bracketed by a
//! completion flag so downstream jobs can tell a finished load from a
//! partial one.

pub mod cli;
pub mod config;
pub mod kosis;
pub mod logging;
pub mod migrations;
pub mod models;
pub mod pipeline;
pub mod repository;
pub mod retry;
pub mod schema;
