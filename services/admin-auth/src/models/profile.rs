//! Profile model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ChannelInfo;

/// Row of the `profiles` table, keyed by user id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub is_verified: bool,
    pub youtube_channel_id: Option<String>,
    pub youtube_handle: Option<String>,
    pub youtube_channel_url: Option<String>,
    pub auth_provider: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Profile of a creator whose channel ownership was confirmed through the
    /// provider token
    pub fn verified(
        user_id: Uuid,
        channel: &ChannelInfo,
        auth_provider: &str,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: user_id,
            is_verified: true,
            youtube_channel_id: Some(channel.channel_id.clone()),
            youtube_handle: channel.handle.clone(),
            youtube_channel_url: Some(channel.url()),
            auth_provider: Some(auth_provider.to_string()),
            updated_at,
        }
    }
}
