//! Derived display records: message containers and recipient groups.

use super::{Message, MessageId};
use crate::dates::DateLabel;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Stable key of a rendered recipient group.
///
/// A group keeps its id across incremental updates of the same logical
/// group, so the presentation layer can replace it in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupId(u64);

impl GroupId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message_group_{}", self.0)
    }
}

/// Hands out group ids; one allocator per message list view.
#[derive(Debug, Default)]
pub struct GroupIdAllocator {
    next: u64,
}

impl GroupIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> GroupId {
        let id = GroupId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionClass {
    Mentioned,
    GroupMentioned,
}

impl MentionClass {
    pub fn css_class(&self) -> &'static str {
        match self {
            MentionClass::Mentioned => "direct_mention",
            MentionClass::GroupMentioned => "group_mention",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditStatus {
    #[default]
    None,
    Edited {
        timestamp: i64,
    },
    Moved {
        timestamp: i64,
    },
}

/// One message plus everything computed for displaying it.
#[derive(Debug, Clone, Serialize)]
pub struct MessageContainer {
    #[serde(rename = "message_id")]
    #[serde(serialize_with = "serialize_message_id")]
    pub msg: Arc<Message>,
    pub timestr: String,
    /// First message of a run from one sender; carries the sender line
    pub include_sender: bool,
    pub is_hidden: bool,
    pub mention_class: Option<MentionClass>,
    /// `/me` style status message
    pub status_message: bool,
    pub edit_status: EditStatus,
    pub want_date_divider: bool,
    pub date_divider_label: Option<DateLabel>,
    pub collapsed: bool,
    pub condensed: Option<bool>,
}

fn serialize_message_id<S: serde::Serializer>(
    msg: &Arc<Message>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    msg.id.serialize(serializer)
}

impl MessageContainer {
    pub fn id(&self) -> MessageId {
        self.msg.id
    }

    pub fn set_date_divider(&mut self, label: Option<DateLabel>) {
        self.want_date_divider = label.is_some();
        self.date_divider_label = label;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionMarkerKind {
    /// Messages after the marker were sent while the viewer was subscribed
    Subscribed,
    /// Messages after the marker were sent after the viewer left
    Unsubscribed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionMarker {
    pub channel_name: String,
    pub kind: SubscriptionMarkerKind,
}

/// Recipient bar contents for a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupHeader {
    Channel {
        channel_id: u64,
        channel_name: String,
        color: String,
        topic: String,
        topic_is_resolved: bool,
        topic_url: Option<String>,
        is_subscribed: bool,
    },
    Direct {
        user_ids: Vec<u64>,
        display_recipient: String,
    },
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageGroup {
    pub id: GroupId,
    pub header: GroupHeader,
    pub message_containers: Vec<MessageContainer>,
    /// Date shown in the recipient bar, taken from the first message
    pub date_label: Option<DateLabel>,
    /// The recipient bar date equals the previous group's date
    pub date_unchanged: bool,
    pub subscription_marker: Option<SubscriptionMarker>,
}

impl MessageGroup {
    pub fn first(&self) -> Option<&MessageContainer> {
        self.message_containers.first()
    }

    pub fn last(&self) -> Option<&MessageContainer> {
        self.message_containers.last()
    }

    pub fn len(&self) -> usize {
        self.message_containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.message_containers.is_empty()
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.message_containers.iter().any(|c| c.id() == id)
    }

    pub fn message_ids(&self) -> impl Iterator<Item = MessageId> + '_ {
        self.message_containers.iter().map(MessageContainer::id)
    }
}
