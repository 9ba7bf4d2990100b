//! TOML configuration with environment fallbacks for secrets.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;

/// Top-level settings, one section per concern.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub collector: CollectorSettings,
    pub kosis: KosisSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorSettings {
    /// Execute date to collect for; defaults to yesterday at runtime.
    pub execute_date: Option<NaiveDate>,
    /// Window width in days behind the execute date.
    pub days_back: u64,
    /// Concurrent fetch workers.
    pub max_workers: usize,
    /// Restrict collection to these table ids; empty means all.
    pub tbl_id: Vec<String>,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            execute_date: None,
            days_back: 6,
            max_workers: 15,
            tbl_id: Vec::new(),
        }
    }
}

impl CollectorSettings {
    /// The configured execute date, or yesterday when unset. Batch runs
    /// collect for the day that has fully elapsed.
    pub fn execute_date_or_default(&self) -> NaiveDate {
        self.execute_date.unwrap_or_else(|| {
            Utc::now()
                .date_naive()
                .checked_sub_days(Days::new(1))
                .unwrap_or(NaiveDate::MIN)
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KosisSettings {
    pub base_url: String,
    /// Falls back to `KOSIS_API_KEY` when absent from the file.
    pub api_key: Option<String>,
    /// Registered userStatsId prefix; falls back to
    /// `KOSIS_USER_STATS_ID`.
    pub user_stats_id: Option<String>,
}

impl Default for KosisSettings {
    fn default() -> Self {
        Self {
            base_url: "https://kosis.kr/openapi".to_string(),
            api_key: None,
            user_stats_id: None,
        }
    }
}

impl KosisSettings {
    pub fn api_key(&self) -> Result<String> {
        resolve_secret(self.api_key.as_deref(), "KOSIS_API_KEY")
    }

    pub fn user_stats_id(&self) -> Result<String> {
        resolve_secret(self.user_stats_id.as_deref(), "KOSIS_USER_STATS_ID")
    }
}

fn resolve_secret(configured: Option<&str>, env_key: &str) -> Result<String> {
    if let Some(value) = configured {
        if !value.trim().is_empty() {
            return Ok(value.to_string());
        }
    }
    std::env::var(env_key)
        .with_context(|| format!("missing secret: set it in the config file or via {env_key}"))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "kosis.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Directory the rolling log files are written into.
    pub dir: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_an_empty_document() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.collector.days_back, 6);
        assert_eq!(settings.collector.max_workers, 15);
        assert!(settings.collector.tbl_id.is_empty());
        assert_eq!(settings.database.url, "kosis.db");
        assert_eq!(settings.kosis.base_url, "https://kosis.kr/openapi");
        assert_eq!(settings.logging.dir, "logs");
    }

    #[test]
    fn sections_parse_from_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [collector]
            execute_date = "2025-05-20"
            days_back = 3
            max_workers = 4
            tbl_id = ["DT_1EA1201"]

            [kosis]
            api_key = "k"
            user_stats_id = "myid"

            [database]
            url = "sqlite:collect.db"

            [logging]
            dir = "var/log"
            "#,
        )
        .unwrap();

        assert_eq!(
            settings.collector.execute_date,
            Some("2025-05-20".parse().unwrap())
        );
        assert_eq!(settings.collector.days_back, 3);
        assert_eq!(settings.collector.tbl_id, vec!["DT_1EA1201".to_string()]);
        assert_eq!(settings.kosis.api_key().unwrap(), "k");
        assert_eq!(settings.database.url, "sqlite:collect.db");
        assert_eq!(settings.logging.dir, "var/log");
    }

    #[test]
    fn default_execute_date_is_yesterday() {
        let settings = CollectorSettings::default();
        let expected = Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(1))
            .unwrap();
        assert_eq!(settings.execute_date_or_default(), expected);
    }
}
