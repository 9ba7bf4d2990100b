//! KOSIS OpenAPI client.
//!
//! Two call families against `statisticsData.do`: refresh metadata
//! (`getMeta`, the 자료갱신일 service) and observation data (`getList`
//! over a registered userStatsId).

use std::time::Duration;

use reqwest::StatusCode;

use super::request::FetchRequest;
use crate::models::{MetaRow, RawObservation};

/// Connection-phase timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(120);
/// Read-phase timeout.
pub const READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Typed failure of a single KOSIS call. Retry decisions live with the
/// caller; every variant is considered transient there.
#[derive(Debug, thiserror::Error)]
pub enum KosisError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },
    #[error("malformed payload from {url}: {source}")]
    Payload {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone)]
pub struct KosisClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    user_stats_id: String,
}

impl KosisClient {
    /// Build a client for the KOSIS endpoint.
    ///
    /// Certificate validation is disabled: the upstream terminates TLS
    /// with a chain many trust stores reject, and the API is treated as
    /// trusted regardless.
    pub fn new(
        base_url: &str,
        api_key: &str,
        user_stats_id: &str,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            user_stats_id: user_stats_id.to_string(),
        })
    }

    /// Refresh metadata (자료갱신일) for one table.
    pub async fn refresh_meta(
        &self,
        org_id: &str,
        tbl_id: &str,
    ) -> Result<Vec<MetaRow>, KosisError> {
        let url = format!("{}/statisticsData.do", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("method", "getMeta"),
                ("type", "DTM"),
                ("apiKey", self.api_key.as_str()),
                ("orgId", org_id),
                ("tblId", tbl_id),
                ("format", "json"),
                ("jsonVD", "Y"),
            ])
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Observation rows for one fetch request (point-in-time snapshot:
    /// the period timestamp bounds both ends of the range).
    pub async fn observations(
        &self,
        request: &FetchRequest,
    ) -> Result<Vec<RawObservation>, KosisError> {
        let url = format!("{}/statisticsData.do", self.base_url);
        let user_stats_id = request.user_stats_id(&self.user_stats_id);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("method", "getList"),
                ("apiKey", self.api_key.as_str()),
                ("format", "json"),
                ("jsonVD", "Y"),
                ("userStatsId", user_stats_id.as_str()),
                ("prdSe", request.period.as_code()),
                ("startPrdDe", request.period_timestamp.as_str()),
                ("endPrdDe", request.period_timestamp.as_str()),
            ])
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Check the status line, then decode the body as a JSON array.
    /// KOSIS signals errors with a JSON object instead of an array, so
    /// those surface as a malformed payload.
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Vec<T>, KosisError> {
        let status = response.status();
        let url = response.url().to_string();

        if !status.is_success() {
            return Err(KosisError::Status { status, url });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| KosisError::Payload { url, source })
    }
}
