//! Release announcements to a chat channel.
//!
//! - `mrkdwn` - Pure transforms from release notes to Slack markup
//! - This module - Channel configuration and the Slack poster

pub mod mrkdwn;

use crate::error::{GitflowError, Result};
use crate::host::{Release, RepoSlug};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::info;

/// Slack Web API method used to post announcements
pub const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Icon shown next to every announcement
pub const ANNOUNCEMENT_ICON: &str = ":rocket:";

/// Channel settings from the `slack` input
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelConfig {
    pub channel: String,
    /// GitHub username -> Slack user id
    #[serde(default)]
    pub username_mapping: HashMap<String, String>,
}

impl ChannelConfig {
    /// Parse the JSON `slack` input
    pub fn parse(input: &str) -> Result<Self> {
        let config: ChannelConfig = serde_json::from_str(input)
            .map_err(|e| GitflowError::config_parse(format!("slack input: {}", e)))?;

        if config.channel.trim().is_empty() {
            return Err(GitflowError::config_parse("slack input: channel is empty"));
        }
        Ok(config)
    }
}

/// Something that tells people a release was published
#[async_trait]
pub trait ReleaseAnnouncer: Send + Sync {
    async fn announce(&self, release: &Release) -> Result<()>;
}

/// Compose the announcement text: linked header, repository, converted notes
pub fn compose_message(
    release: &Release,
    repo: &RepoSlug,
    username_mapping: &HashMap<String, String>,
) -> String {
    let header = format!(
        "*<{}|{}>*",
        release.html_url,
        mrkdwn::escape(release.display_name())
    );
    let body = mrkdwn::transform(release.body.as_deref().unwrap_or_default(), username_mapping);

    if body.is_empty() {
        format!("{}\n{}", header, repo)
    } else {
        format!("{}\n{}\n\n{}", header, repo, body)
    }
}

/// Posts announcements with the Slack Web API
pub struct SlackAnnouncer {
    token: String,
    config: ChannelConfig,
    repo: RepoSlug,
    api_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackAnnouncer {
    /// Build an announcer from the raw `slack` input and the messaging token
    ///
    /// # Returns
    /// * `Err(ConfigParse)` - The input is not a valid channel configuration
    /// * `Err(CredentialMissing)` - No token was provided
    pub fn from_input(input: &str, token: Option<String>, repo: RepoSlug) -> Result<Self> {
        let config = ChannelConfig::parse(input)?;
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GitflowError::credential_missing("SLACK_TOKEN is not set"))?;

        Ok(SlackAnnouncer {
            token,
            config,
            repo,
            api_url: SLACK_POST_MESSAGE_URL.to_string(),
            client: reqwest::Client::new(),
        })
    }

    /// Post to a different endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[async_trait]
impl ReleaseAnnouncer for SlackAnnouncer {
    async fn announce(&self, release: &Release) -> Result<()> {
        let text = compose_message(release, &self.repo, &self.config.username_mapping);
        let payload = json!({
            "channel": self.config.channel,
            "text": text,
            "icon_emoji": ANNOUNCEMENT_ICON,
            "unfurl_links": false,
            "unfurl_media": false,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitflowError::api(
                status.as_u16(),
                format!("Slack request failed with HTTP {}", status.as_u16()),
            ));
        }

        let reply: SlackResponse = response.json().await?;
        if !reply.ok {
            return Err(GitflowError::api(
                status.as_u16(),
                format!(
                    "Slack rejected the message: {}",
                    reply.error.unwrap_or_else(|| "unknown error".to_string())
                ),
            ));
        }

        info!(channel = %self.config.channel, tag = %release.tag_name, "announced release");
        Ok(())
    }
}
