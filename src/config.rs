//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section has defaults, so an empty file yields a working setup
//! against the public ESPN endpoints.

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;

use crate::window::{TimeWindow, DEFAULT_LOOKAHEAD_DAYS, DEFAULT_LOOKBACK_DAYS};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// ESPN core API root (league catalog, odds).
    #[serde(default = "default_core_base_url")]
    pub core_base_url: String,
    /// ESPN site API root (scoreboards).
    #[serde(default = "default_site_base_url")]
    pub site_base_url: String,
    #[serde(default = "default_sport")]
    pub sport: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Leagues kept from the head of the catalog.
    #[serde(default = "default_catalog_limit")]
    pub catalog_limit: usize,
    /// Cap on concurrent fetches per fan-out. Unset means unbounded.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WindowConfig {
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    /// Seconds between timer-driven cycles. 0 disables the timer;
    /// cycles then only run at startup and on manual trigger.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_core_base_url() -> String {
    "https://sports.core.api.espn.com/v2".to_string()
}
fn default_site_base_url() -> String {
    "https://site.api.espn.com/apis/site/v2".to_string()
}
fn default_sport() -> String {
    "soccer".to_string()
}
fn default_request_timeout_secs() -> u64 {
    15
}
fn default_user_agent() -> String {
    "MATCHDAY/0.1.0".to_string()
}
fn default_catalog_limit() -> usize {
    26
}
fn default_lookback_days() -> i64 {
    DEFAULT_LOOKBACK_DAYS
}
fn default_lookahead_days() -> i64 {
    DEFAULT_LOOKAHEAD_DAYS
}
fn default_interval_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}
fn default_port() -> u16 {
    8080
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            core_base_url: default_core_base_url(),
            site_base_url: default_site_base_url(),
            sport: default_sport(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            catalog_limit: default_catalog_limit(),
            max_concurrency: None,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            lookahead_days: default_lookahead_days(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_port(),
        }
    }
}

/// Upper bound for either side of the event window.
pub const MAX_WINDOW_DAYS: i64 = 3650;

impl WindowConfig {
    /// Both sides must be non-negative and small enough that
    /// `now ± days` stays representable.
    pub fn validate(&self) -> Result<()> {
        for (name, days) in [
            ("lookback_days", self.lookback_days),
            ("lookahead_days", self.lookahead_days),
        ] {
            ensure!(
                (0..=MAX_WINDOW_DAYS).contains(&days),
                "window.{name} must be between 0 and {MAX_WINDOW_DAYS}, got {days}"
            );
        }
        Ok(())
    }

    pub fn time_window(&self) -> TimeWindow {
        TimeWindow::from_days(self.lookback_days, self.lookahead_days)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.window.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.pipeline.catalog_limit, 26);
        assert!(cfg.pipeline.max_concurrency.is_none());
        assert_eq!(cfg.window.lookback_days, 4);
        assert_eq!(cfg.window.lookahead_days, 8);
        assert_eq!(cfg.upstream.sport, "soccer");
        assert!(cfg.dashboard.enabled);
    }

    #[test]
    fn test_partial_override() {
        let cfg = AppConfig::from_toml(
            r#"
            [pipeline]
            max_concurrency = 8

            [window]
            lookahead_days = 3

            [dashboard]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.pipeline.max_concurrency, Some(8));
        assert_eq!(cfg.pipeline.catalog_limit, 26);
        assert_eq!(cfg.window.lookback_days, 4);
        assert_eq!(cfg.window.lookahead_days, 3);
        assert_eq!(cfg.dashboard.port, 9000);
    }

    #[test]
    fn test_time_window_from_config() {
        let w = WindowConfig { lookback_days: 1, lookahead_days: 2 }.time_window();
        assert_eq!(w, TimeWindow::from_days(1, 2));
    }

    #[test]
    fn test_window_days_out_of_range_rejected() {
        let err = AppConfig::from_toml("[window]\nlookback_days = -1").unwrap_err();
        assert!(err.to_string().contains("window.lookback_days"));

        let err = AppConfig::from_toml("[window]\nlookahead_days = 9223372036854775807").unwrap_err();
        assert!(err.to_string().contains("window.lookahead_days"));

        let cfg = AppConfig::from_toml("[window]\nlookback_days = 0\nlookahead_days = 3650").unwrap();
        assert_eq!(cfg.window.lookahead_days, MAX_WINDOW_DAYS);
    }

    #[test]
    fn test_missing_file_errors() {
        let err = AppConfig::load("/nonexistent/matchday.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
