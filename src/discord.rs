use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::config::Discord;
use crate::monitors::Outcome;

const COLOR_RED: u32 = 15158332;

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Default)]
pub struct MessageBuilder {
    content: Option<String>,
    embeds: Vec<Embed>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl ToString) -> Self {
        self.content = Some(content.to_string());
        self
    }

    pub fn add_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn build(self) -> Message {
        Message {
            content: self.content,
            embeds: self.embeds,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscordManager {
    client: Client,
}

impl DiscordManager {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn build_outcome_embed(&self, outcome: &Outcome) -> Embed {
        let status_code = if outcome.status_code == 0 {
            "no response".to_string()
        } else {
            outcome.status_code.to_string()
        };

        Embed {
            title: Some("🔴 Target Down".to_string()),
            description: Some(format!("**{}** failed its health check", outcome.target.name)),
            color: Some(COLOR_RED),
            fields: vec![
                EmbedField {
                    name: "🌐 URL".to_string(),
                    value: outcome.target.url.clone(),
                    inline: false,
                },
                EmbedField {
                    name: "📟 Status Code".to_string(),
                    value: status_code,
                    inline: true,
                },
                EmbedField {
                    name: "⏱️ Response Time".to_string(),
                    value: format!("{:?}", outcome.response_time),
                    inline: true,
                },
                EmbedField {
                    name: "❗ Error".to_string(),
                    value: outcome.error.clone(),
                    inline: false,
                },
            ],
            footer: Some(EmbedFooter {
                text: format!("Target: {}", outcome.target.name),
            }),
            timestamp: Some(outcome.timestamp.to_rfc3339()),
        }
    }

    pub fn build_outcome_message(&self, discord: &Discord, outcome: &Outcome) -> Message {
        let mut builder = MessageBuilder::new().add_embed(self.build_outcome_embed(outcome));
        if let Some(user_id) = &discord.user_id {
            builder = builder.content(format!("🔴 Target: `{}` <@{user_id}>", outcome.target.name));
        }
        builder.build()
    }

    #[instrument(skip(self, discord, message))]
    pub async fn send_message(&self, discord: &Discord, message: &Message) {
        match self.client.post(&discord.url).json(message).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    info!("Successfully sent Discord message");
                } else {
                    error!("Discord message failed with status: {}", response.status());
                    if let Ok(error_text) = response.text().await {
                        error!("Discord API error response: {}", error_text);
                    }
                }
            }
            Err(e) => {
                error!("Failed to send Discord message: {}", e);
            }
        }
    }
}
