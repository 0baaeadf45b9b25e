use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::config::{Alert, Webhook};
use crate::discord::DiscordManager;
use crate::monitors::Outcome;
use crate::slack::SlackManager;

/// Upper bound for a single alert request
pub const DEFAULT_ALERT_TIMEOUT: Duration = Duration::from_secs(10);

/// Receives failing outcomes.
///
/// Implementations are best-effort: delivery problems are logged, never
/// returned to the caller.
#[async_trait]
pub trait Alerter: Send + Sync {
    async fn notify(&self, outcome: &Outcome);
}

/// Sends alerts to every configured channel
#[derive(Debug, Clone)]
pub struct AlertManager {
    client: Client,
    channels: Vec<Alert>,
    discord_manager: DiscordManager,
    slack_manager: SlackManager,
}

impl AlertManager {
    pub fn new(channels: Vec<Alert>) -> anyhow::Result<Self> {
        Self::with_timeout(channels, DEFAULT_ALERT_TIMEOUT)
    }

    /// Every channel request is abandoned after `timeout`
    pub fn with_timeout(channels: Vec<Alert>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build alert HTTP client")?;

        Ok(Self {
            discord_manager: DiscordManager::new(client.clone()),
            slack_manager: SlackManager::new(client.clone()),
            client,
            channels,
        })
    }

    pub fn channels(&self) -> &[Alert] {
        &self.channels
    }

    async fn send_to(&self, channel: &Alert, outcome: &Outcome) {
        match channel {
            Alert::Slack(slack) => self.slack_manager.send_outcome(slack, outcome).await,
            Alert::Discord(discord) => {
                let message = self.discord_manager.build_outcome_message(discord, outcome);
                self.discord_manager.send_message(discord, &message).await;
            }
            Alert::Webhook(webhook) => self.send_webhook_alert(webhook, outcome).await,
        }
    }

    #[instrument(skip(self, webhook, outcome), fields(target = %outcome.target.name))]
    async fn send_webhook_alert(&self, webhook: &Webhook, outcome: &Outcome) {
        let payload = json!({
            "message": format!("🔴 **Target DOWN**: `{}` ({})", outcome.target.name, outcome.error),
            "target": outcome.target.name,
            "url": outcome.target.url,
            "status_code": outcome.status_code,
            "error": outcome.error,
            "response_time_ms": u64::try_from(outcome.response_time.as_millis()).unwrap_or(u64::MAX),
            "timestamp": outcome.timestamp.to_rfc3339()
        });

        match self.client.post(&webhook.url).json(&payload).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    info!("Successfully sent webhook alert");
                } else {
                    error!("Webhook alert failed with status: {}", response.status());
                }
            }
            Err(e) => {
                error!("Failed to send webhook alert: {}", e);
            }
        }
    }
}

#[async_trait]
impl Alerter for AlertManager {
    /// Fan out to all channels at once; one slow channel does not hold back the others.
    async fn notify(&self, outcome: &Outcome) {
        if self.channels.is_empty() {
            debug!("no alert channels configured, dropping alert for {}", outcome.target.name);
            return;
        }

        join_all(
            self.channels
                .iter()
                .map(|channel| self.send_to(channel, outcome)),
        )
        .await;
    }
}
