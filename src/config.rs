use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, bail};
use tracing::trace;

use crate::history::HISTORY_CAPACITY;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitoring: MonitoringConfig,

    #[serde(alias = "websites")]
    pub targets: Vec<Target>,

    /// Alert channels notified for every failing probe
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitoringConfig {
    /// Seconds between two probe rounds
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Per-probe deadline in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Number of outcomes kept per target
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

impl MonitoringConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            timeout: default_timeout(),
            history_size: default_history_size(),
        }
    }
}

/// A single endpoint under observation
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Target {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
}

impl Target {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method: HttpMethod::default(),
            expected_status: default_expected_status(),
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    Slack(Slack),
    Discord(Discord),
    Webhook(Webhook),
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Slack {
    pub webhook_url: String,
    pub channel: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Discord {
    pub url: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Webhook {
    pub url: String,
}

fn default_interval() -> u64 {
    30
}

fn default_timeout() -> u64 {
    10
}

fn default_history_size() -> usize {
    HISTORY_CAPACITY
}

fn default_expected_status() -> u16 {
    200
}

impl Config {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.monitoring.interval == 0 {
            bail!("monitoring interval must be positive");
        }

        if self.monitoring.timeout == 0 {
            bail!("monitoring timeout must be positive");
        }

        if self.monitoring.history_size == 0 {
            bail!("history size must be at least 1");
        }

        if self.targets.is_empty() {
            bail!("at least one target must be configured");
        }

        let mut names = HashSet::new();
        for (i, target) in self.targets.iter().enumerate() {
            if target.name.trim().is_empty() {
                bail!("target {i}: name is required");
            }
            if target.url.trim().is_empty() {
                bail!("target {i} ({}): url is required", target.name);
            }
            if !(100..=599).contains(&target.expected_status) {
                bail!(
                    "target {i} ({}): invalid expected status {}",
                    target.name,
                    target.expected_status
                );
            }
            if !names.insert(target.name.as_str()) {
                bail!("duplicate target name: {}", target.name);
            }
        }

        Ok(())
    }
}

pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    let config: Config =
        serde_json::from_str(content).context("Invalid configuration file provided!")?;
    config.validate().context("invalid configuration")?;
    trace!("loaded config: {config:?}");
    Ok(config)
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {path}"))?;
    parse_config(&file_content)
}
