//! JSON message dumps and the directory built from them.

use crate::error::Error;
use scrollback_core::model::Message;
use scrollback_core::ports::{FetchStatus, RecipientDirectory};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelInfo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_subscribed")]
    pub subscribed: bool,
}

fn default_subscribed() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: u64,
    pub full_name: String,
    #[serde(default)]
    pub muted: bool,
}

/// A conversation snapshot: metadata plus messages in any order.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDump {
    #[serde(default)]
    pub channels: Vec<ChannelInfo>,
    #[serde(default)]
    pub users: Vec<UserInfo>,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub found_oldest: bool,
    #[serde(default)]
    pub found_newest: bool,
}

impl MessageDump {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let dump: Self = serde_json::from_str(&contents)?;
        tracing::debug!(
            target: "scrollback.dump",
            "Loaded {} messages from {}",
            dump.messages.len(),
            path.display()
        );
        Ok(dump)
    }

    /// Messages in list order.
    pub fn sorted_messages(&self) -> Vec<Arc<Message>> {
        let mut messages: Vec<Arc<Message>> =
            self.messages.iter().cloned().map(Arc::new).collect();
        messages.sort_by_key(|m| m.id);
        messages
    }

    pub fn fetch_status(&self) -> FetchStatus {
        FetchStatus {
            found_oldest: self.found_oldest,
            found_newest: self.found_newest,
        }
    }

    pub fn directory(&self) -> DumpDirectory {
        DumpDirectory {
            channels: self.channels.iter().map(|c| (c.id, c.clone())).collect(),
            users: self.users.iter().map(|u| (u.id, u.clone())).collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DumpDirectory {
    channels: HashMap<u64, ChannelInfo>,
    users: HashMap<u64, UserInfo>,
}

impl RecipientDirectory for DumpDirectory {
    fn channel_name(&self, channel_id: u64) -> Option<String> {
        self.channels.get(&channel_id).map(|c| c.name.clone())
    }

    fn channel_color(&self, channel_id: u64) -> Option<String> {
        self.channels.get(&channel_id).and_then(|c| c.color.clone())
    }

    fn is_subscribed(&self, channel_id: u64) -> bool {
        self.channels.get(&channel_id).is_none_or(|c| c.subscribed)
    }

    fn user_full_name(&self, user_id: u64) -> Option<String> {
        self.users.get(&user_id).map(|u| u.full_name.clone())
    }

    fn is_sender_muted(&self, user_id: u64) -> bool {
        self.users.get(&user_id).is_some_and(|u| u.muted)
    }
}
