//! Partition an ordered message run into recipient groups.

use crate::config::EngineConfig;
use crate::dates::{self, Clock};
use crate::display::DisplayState;
use crate::edits;
use crate::model::{
    GroupHeader, GroupId, GroupIdAllocator, MentionClass, Message, MessageContainer, MessageGroup,
    Recipient, SubscriptionMarker, SubscriptionMarkerKind,
};
use crate::ports::{DEFAULT_CHANNEL_COLOR, RecipientDirectory};
use std::sync::Arc;
use tracing::trace;

/// Everything grouping decisions depend on, borrowed for one pass.
#[derive(Clone, Copy)]
pub struct GroupContext<'a> {
    pub config: &'a EngineConfig,
    pub directory: &'a dyn RecipientDirectory,
    pub clock: &'a dyn Clock,
    pub display: &'a DisplayState,
    /// Channel the view is filtered to, if it shows exactly one
    pub narrowed_channel: Option<u64>,
}

impl<'a> GroupContext<'a> {
    /// Two adjacent messages may share a recipient header.
    pub fn can_join(&self, prev: &Message, curr: &Message) -> bool {
        self.config.collapse_messages
            && prev.historical == curr.historical
            && self.directory.same_recipient(prev, curr)
    }

    /// Container with group-independent attributes filled in. The caller
    /// links it to its predecessor afterwards.
    pub fn build_container(&self, msg: Arc<Message>) -> MessageContainer {
        let flags = self.display.flags(msg.id);
        let is_hidden = self.config.hide_muted_senders
            && self.directory.is_sender_muted(msg.sender_id)
            && !self.display.is_revealed(msg.id);
        let mention_class = if is_hidden {
            None
        } else if msg.mentioned_me_directly {
            Some(MentionClass::Mentioned)
        } else if msg.mentioned {
            Some(MentionClass::GroupMentioned)
        } else {
            None
        };

        MessageContainer {
            timestr: dates::format_time(
                msg.timestamp,
                self.config.zone,
                self.config.twenty_four_hour_time,
            ),
            include_sender: true,
            is_hidden,
            mention_class,
            status_message: msg.is_me_message,
            edit_status: edits::edit_status(&msg.edit_history),
            want_date_divider: false,
            date_divider_label: None,
            collapsed: flags.collapsed,
            condensed: flags.condensed,
            msg,
        }
    }

    /// Apply the in-group rules to `curr`, which directly follows `prev`
    /// inside the same group.
    pub fn link_within_group(&self, prev: &MessageContainer, curr: &mut MessageContainer) {
        let same_day = dates::same_day(prev.msg.timestamp, curr.msg.timestamp, self.config.zone);
        curr.include_sender = !(same_day
            && !prev.status_message
            && self.directory.same_sender(&prev.msg, &curr.msg));
        let divider = dates::divider(Some(&prev.msg), &curr.msg, self.config.zone, self.clock);
        curr.set_date_divider(divider.label);
    }

    /// Recompute the boundary attributes of `group` given the message that
    /// precedes it in the list (the last message of the previous group).
    pub fn link_group_to_previous(&self, group: &mut MessageGroup, prev: Option<&Message>) {
        let Some(first) = group.message_containers.first_mut() else {
            return;
        };
        first.include_sender = true;
        first.set_date_divider(None);

        let first_msg = Arc::clone(&first.msg);
        group.date_label = Some(dates::render_date(
            first_msg.timestamp,
            prev.map(|p| p.timestamp),
            self.config.zone,
            self.clock,
        ));
        group.date_unchanged = prev
            .is_some_and(|p| dates::same_day(p.timestamp, first_msg.timestamp, self.config.zone));
        group.subscription_marker = self.subscription_marker(prev, &first_msg);
    }

    fn subscription_marker(
        &self,
        prev: Option<&Message>,
        first: &Message,
    ) -> Option<SubscriptionMarker> {
        let narrowed = self.narrowed_channel?;
        let prev = prev?;
        if first.recipient.channel_id() != Some(narrowed) || prev.historical == first.historical {
            return None;
        }
        let kind = if first.historical {
            SubscriptionMarkerKind::Unsubscribed
        } else {
            SubscriptionMarkerKind::Subscribed
        };
        Some(SubscriptionMarker {
            channel_name: self.channel_name(narrowed),
            kind,
        })
    }

    fn channel_name(&self, channel_id: u64) -> String {
        self.directory
            .channel_name(channel_id)
            .unwrap_or_else(|| format!("channel {channel_id}"))
    }

    fn header_for(&self, msg: &Message) -> GroupHeader {
        match &msg.recipient {
            Recipient::Channel { channel_id, topic } => GroupHeader::Channel {
                channel_id: *channel_id,
                channel_name: self.channel_name(*channel_id),
                color: self
                    .directory
                    .channel_color(*channel_id)
                    .unwrap_or_else(|| DEFAULT_CHANNEL_COLOR.to_string()),
                topic: topic.clone(),
                topic_is_resolved: edits::is_topic_resolved(topic),
                topic_url: self.directory.topic_url(*channel_id, topic),
                is_subscribed: self.directory.is_subscribed(*channel_id),
            },
            Recipient::Direct { user_ids } => {
                let names: Vec<String> = user_ids
                    .iter()
                    .map(|id| {
                        self.directory
                            .user_full_name(*id)
                            .unwrap_or_else(|| "Unknown user".to_string())
                    })
                    .collect();
                GroupHeader::Direct {
                    user_ids: user_ids.iter().copied().collect(),
                    display_recipient: names.join(", "),
                }
            }
            Recipient::Unknown => GroupHeader::Unknown,
        }
    }

    fn start_group(
        &self,
        id: GroupId,
        first: MessageContainer,
        prev: Option<&Message>,
    ) -> MessageGroup {
        let mut group = MessageGroup {
            id,
            header: self.header_for(&first.msg),
            message_containers: vec![first],
            date_label: None,
            date_unchanged: false,
            subscription_marker: None,
        };
        self.link_group_to_previous(&mut group, prev);
        group
    }

    /// Group `messages`, which must be in list order. The first group is
    /// built as if nothing preceded it; merging with already rendered groups
    /// fixes up that boundary.
    pub fn build_message_groups(
        &self,
        ids: &mut GroupIdAllocator,
        messages: &[Arc<Message>],
    ) -> Vec<MessageGroup> {
        let mut groups: Vec<MessageGroup> = Vec::new();

        for msg in messages {
            let mut container = self.build_container(Arc::clone(msg));
            let prev = groups.last().and_then(MessageGroup::last);

            match prev {
                Some(prev) if self.can_join(&prev.msg, msg) => {
                    self.link_within_group(prev, &mut container);
                    if let Some(current) = groups.last_mut() {
                        current.message_containers.push(container);
                    }
                }
                _ => {
                    let prev_msg = prev.map(|p| Arc::clone(&p.msg));
                    let id = ids.next_id();
                    groups.push(self.start_group(id, container, prev_msg.as_deref()));
                }
            }
        }

        trace!(
            target: "scrollback.grouping",
            "Grouped {} messages into {} groups",
            messages.len(),
            groups.len()
        );
        groups
    }

    /// Rebuild a group from fresh message records while keeping its id.
    /// Returns `None` when the messages no longer form a single group.
    pub fn rebuild_group(
        &self,
        id: GroupId,
        messages: &[Arc<Message>],
        prev: Option<&Message>,
    ) -> Option<MessageGroup> {
        let mut ids = GroupIdAllocator::new();
        let mut groups = self.build_message_groups(&mut ids, messages);
        if groups.len() != 1 {
            return None;
        }
        let mut group = groups.pop()?;
        group.id = id;
        self.link_group_to_previous(&mut group, prev);
        Some(group)
    }
}
