//! KOSIS OpenAPI client and request descriptors.

mod client;
mod request;

pub use client::{KosisClient, KosisError, CONNECT_TIMEOUT, READ_TIMEOUT};
pub use request::{dedup_requests, FetchRequest};
