//! Video-platform channel metadata

use serde::{Deserialize, Serialize};

/// Channel identity of the signed-in creator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelInfo {
    pub channel_id: String,
    pub handle: Option<String>,
}

impl ChannelInfo {
    /// Public URL of the channel
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/channel/{}", self.channel_id)
    }
}
