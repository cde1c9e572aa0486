//! Message data model consumed by the engine.
//!
//! Messages are owned by the host's message store. The engine only holds
//! shared `Arc<Message>` handles while a message is materialized.

pub mod container;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub use container::{
    EditStatus, GroupHeader, GroupId, GroupIdAllocator, MentionClass, MessageContainer,
    MessageGroup, SubscriptionMarker, SubscriptionMarkerKind,
};

/// Identifier of a message in the store.
///
/// Server-assigned ids have `local == 0`. Messages echoed locally before the
/// server acknowledged them carry a provisional id such as `103.01`, which
/// sorts after the server message it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId {
    base: u64,
    local: u32,
}

impl MessageId {
    pub const fn server(id: u64) -> Self {
        Self { base: id, local: 0 }
    }

    pub const fn local(base: u64, seq: u32) -> Self {
        Self { base, local: seq }
    }

    pub fn is_local(&self) -> bool {
        self.local != 0
    }

    pub fn base(&self) -> u64 {
        self.base
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        Self::server(id)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.local == 0 {
            write!(f, "{}", self.base)
        } else {
            write!(f, "{}.{:02}", self.base, self.local)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid message id: {0:?}")]
pub struct ParseMessageIdError(String);

impl FromStr for MessageId {
    type Err = ParseMessageIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (base, local) = match s.split_once('.') {
            Some((base, frac)) => (base, Some(frac)),
            None => (s, None),
        };
        let base = base
            .parse::<u64>()
            .map_err(|_| ParseMessageIdError(s.to_string()))?;
        let local = match local {
            Some(frac) if !frac.is_empty() => frac
                .parse::<u32>()
                .map_err(|_| ParseMessageIdError(s.to_string()))?,
            Some(_) => return Err(ParseMessageIdError(s.to_string())),
            None => 0,
        };
        Ok(Self { base, local })
    }
}

impl Serialize for MessageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.local == 0 {
            serializer.serialize_u64(self.base)
        } else {
            serializer.collect_str(self)
        }
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self::server(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Where a message was sent. Two messages with equal recipients may share a
/// recipient header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recipient {
    Channel { channel_id: u64, topic: String },
    Direct { user_ids: BTreeSet<u64> },
    #[serde(other)]
    Unknown,
}

impl Recipient {
    pub fn channel(channel_id: u64, topic: impl Into<String>) -> Self {
        Self::Channel {
            channel_id,
            topic: topic.into(),
        }
    }

    pub fn direct(user_ids: impl IntoIterator<Item = u64>) -> Self {
        Self::Direct {
            user_ids: user_ids.into_iter().collect(),
        }
    }

    pub fn channel_id(&self) -> Option<u64> {
        match self {
            Self::Channel { channel_id, .. } => Some(*channel_id),
            _ => None,
        }
    }

    /// Recipient equality used for grouping. `Unknown` never matches, so a
    /// message without a usable recipient always forms its own group.
    pub fn same_as(&self, other: &Recipient) -> bool {
        match (self, other) {
            (
                Self::Channel {
                    channel_id: a,
                    topic: topic_a,
                },
                Self::Channel {
                    channel_id: b,
                    topic: topic_b,
                },
            ) => a == b && topic_a.eq_ignore_ascii_case(topic_b),
            (Self::Direct { user_ids: a }, Self::Direct { user_ids: b }) => a == b,
            _ => false,
        }
    }
}

/// One entry of a message's edit history, newest entries last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EditHistoryEntry {
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_channel_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    pub recipient: Recipient,
    pub sender_id: u64,
    #[serde(default)]
    pub sender_full_name: String,
    /// Sent while the viewer was not subscribed to the channel
    #[serde(default)]
    pub historical: bool,
    #[serde(default)]
    pub is_me_message: bool,
    #[serde(default)]
    pub mentioned: bool,
    #[serde(default)]
    pub mentioned_me_directly: bool,
    #[serde(default)]
    pub edit_history: Vec<EditHistoryEntry>,
}

impl Message {
    pub fn same_sender(&self, other: &Message) -> bool {
        self.sender_id == other.sender_id
    }
}

/// Display-only state the engine tracks per message, outside the message
/// record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayFlags {
    pub collapsed: bool,
    /// `None` until the viewer (or the host) chose a condensed state
    pub condensed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ids_sort_after_their_server_base() {
        let server = MessageId::server(103);
        let local: MessageId = "103.01".parse().unwrap();
        assert!(local.is_local());
        assert!(server < local);
        assert!(local < MessageId::server(104));
        assert_eq!(local.to_string(), "103.01");
    }

    #[test]
    fn test_message_id_rejects_garbage() {
        assert!("abc".parse::<MessageId>().is_err());
        assert!("12.".parse::<MessageId>().is_err());
        assert!("12.x".parse::<MessageId>().is_err());
    }

    #[test]
    fn test_message_id_serde_accepts_numbers_and_strings() {
        let ids: Vec<MessageId> = serde_json::from_str(r#"[7, "8.02"]"#).unwrap();
        assert_eq!(ids, vec![MessageId::server(7), MessageId::local(8, 2)]);
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[7,"8.02"]"#);
    }

    #[test]
    fn test_unknown_recipient_never_matches() {
        assert!(!Recipient::Unknown.same_as(&Recipient::Unknown));
        assert!(!Recipient::Unknown.same_as(&Recipient::channel(1, "a")));
    }

    #[test]
    fn test_topic_comparison_ignores_case() {
        assert!(Recipient::channel(1, "Lunch").same_as(&Recipient::channel(1, "lunch")));
        assert!(!Recipient::channel(1, "lunch").same_as(&Recipient::channel(2, "lunch")));
    }

    #[test]
    fn test_recipient_without_known_type_deserializes_as_unknown() {
        let r: Recipient = serde_json::from_str(r#"{"type":"broadcast"}"#).unwrap();
        assert_eq!(r, Recipient::Unknown);
        let r: Recipient =
            serde_json::from_str(r#"{"type":"direct","user_ids":[3,1]}"#).unwrap();
        assert_eq!(r, Recipient::direct([1, 3]));
    }
}
