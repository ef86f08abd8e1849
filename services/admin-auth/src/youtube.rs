//! Video platform client used to confirm channel ownership

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::{
    config::AppConfig,
    error::{ChannelError, error_message},
    models::ChannelInfo,
};

/// Lookup of the channel owned by the holder of a provider token
#[async_trait]
pub trait ChannelDirectory: Send + Sync {
    async fn fetch_own_channel(&self, provider_token: &str) -> Result<ChannelInfo, ChannelError>;
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: String,
    #[serde(default)]
    snippet: Option<ChannelSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelSnippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    custom_url: Option<String>,
}

impl From<ChannelItem> for ChannelInfo {
    fn from(item: ChannelItem) -> Self {
        let handle = item.snippet.and_then(|snippet| {
            snippet
                .custom_url
                .filter(|url| !url.is_empty())
                .or(snippet.title)
        });
        ChannelInfo {
            channel_id: item.id,
            handle,
        }
    }
}

/// YouTube Data API client
#[derive(Clone)]
pub struct YouTubeClient {
    http: Client,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(http: Client, config: &AppConfig) -> Self {
        Self {
            http,
            base_url: config.youtube_api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ChannelDirectory for YouTubeClient {
    async fn fetch_own_channel(&self, provider_token: &str) -> Result<ChannelInfo, ChannelError> {
        info!("Fetching channel for provider token");

        let response = self
            .http
            .get(format!("{}/channels", self.base_url))
            .query(&[("part", "snippet"), ("mine", "true")])
            .bearer_auth(provider_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let list: ChannelListResponse = response.json().await?;
        list.items
            .into_iter()
            .next()
            .map(ChannelInfo::from)
            .ok_or(ChannelError::NoChannel)
    }
}
