//! Configuration types for orderflow

use crate::depth::{DhanConfig, Segment};
use crate::flow::FlowConfig;
use crate::history::HistoryConfig;
use crate::signal::ClassifierConfig;
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::time::Duration;

/// Environment variable overriding `broker.client_id`
pub const CLIENT_ID_ENV: &str = "DHAN_CLIENT_ID";
/// Environment variable overriding `broker.access_token`
pub const ACCESS_TOKEN_ENV: &str = "DHAN_ACCESS_TOKEN";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub broker: BrokerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub signal: ClassifierConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    pub telemetry: TelemetryConfig,
}

/// Broker quote API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DhanConfig::default().base_url
}
fn default_timeout_secs() -> u64 {
    10
}

impl BrokerConfig {
    /// Client configuration for the quote API
    pub fn dhan_config(&self) -> DhanConfig {
        DhanConfig {
            base_url: self.base_url.clone(),
            client_id: self.client_id.clone(),
            access_token: self.access_token.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Access token with all but the last four characters hidden
    pub fn masked_token(&self) -> String {
        let len = self.access_token.chars().count();
        if len <= 4 {
            return "*".repeat(len);
        }
        let visible: String = self.access_token.chars().skip(len - 4).collect();
        format!("****{}", visible)
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Defaults applied to start requests that omit them
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_segment")]
    pub default_segment: Segment,
    #[serde(default = "default_interval_secs")]
    pub default_interval_secs: u64,
}

fn default_segment() -> Segment {
    Segment::NseFno
}
fn default_interval_secs() -> u64 {
    2
}

impl MonitorConfig {
    pub fn default_interval(&self) -> Duration {
        Duration::from_secs(self.default_interval_secs)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            default_segment: default_segment(),
            default_interval_secs: default_interval_secs(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Prometheus exporter port, 0 disables it
    pub metrics_port: u16,
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Replace broker credentials with non-empty values from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(client_id) = lookup(CLIENT_ID_ENV).filter(|v| !v.is_empty()) {
            self.broker.client_id = client_id;
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.broker.access_token = token;
        }
    }
}
