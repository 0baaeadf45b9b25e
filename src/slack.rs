use anyhow::{Context, bail};
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::config::Slack;
use crate::monitors::Outcome;

#[derive(Debug, Clone, Serialize)]
pub struct SlackPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub text: String,
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlackAttachment {
    pub color: String,
    pub fields: Vec<SlackField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlackField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl SlackField {
    fn new(title: &str, value: impl ToString, short: bool) -> Self {
        Self {
            title: title.to_string(),
            value: value.to_string(),
            short,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SlackManager {
    client: Client,
}

impl SlackManager {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn build_payload(&self, slack: &Slack, outcome: &Outcome) -> SlackPayload {
        SlackPayload {
            channel: slack.channel.clone(),
            text: format!("🚨 ALERT: {} is DOWN", outcome.target.name),
            attachments: vec![SlackAttachment {
                color: "danger".to_string(),
                fields: vec![
                    SlackField::new("Website", &outcome.target.name, true),
                    SlackField::new("URL", &outcome.target.url, true),
                    SlackField::new("Status Code", outcome.status_code, true),
                    SlackField::new("Response Time", format!("{:?}", outcome.response_time), true),
                    SlackField::new("Error", &outcome.error, false),
                    SlackField::new("Timestamp", outcome.timestamp.to_rfc3339(), false),
                ],
            }],
        }
    }

    /// Post an outcome to the Slack webhook, logging the result.
    #[instrument(skip_all, fields(target = %outcome.target.name))]
    pub async fn send_outcome(&self, slack: &Slack, outcome: &Outcome) {
        let payload = self.build_payload(slack, outcome);
        match self.send_payload(slack, &payload).await {
            Ok(()) => info!("Slack alert sent for {}", outcome.target.name),
            Err(e) => error!("Failed to send Slack alert: {e:#}"),
        }
    }

    async fn send_payload(&self, slack: &Slack, payload: &SlackPayload) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&slack.webhook_url)
            .json(payload)
            .send()
            .await
            .context("slack webhook request failed")?;

        if !response.status().is_success() {
            bail!("slack webhook returned status {}", response.status());
        }

        Ok(())
    }
}
