//! Reconcile freshly grouped messages with the groups already rendered.

use crate::dates;
use crate::error::{Error, Result};
use crate::grouping::GroupContext;
use crate::model::{GroupId, MessageContainer, MessageGroup};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error};

/// Edge of the rendered list new groups attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Top,
    Bottom,
}

/// Minimal set of changes the presentation layer must apply.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderingPlan {
    pub append_groups: Vec<MessageGroup>,
    pub prepend_groups: Vec<MessageGroup>,
    /// Already rendered groups to replace in place, matched by id
    pub rerender_groups: Vec<MessageGroup>,
    /// New rows to add at the end of `append_messages_to`
    pub append_messages: Vec<MessageContainer>,
    pub append_messages_to: Option<GroupId>,
}

impl RenderingPlan {
    pub fn is_empty(&self) -> bool {
        self.append_groups.is_empty()
            && self.prepend_groups.is_empty()
            && self.rerender_groups.is_empty()
            && self.append_messages.is_empty()
    }
}

/// Move the containers of `second` onto the end of `first` when the two
/// groups may share a header. `second` directly follows `first`.
pub fn join_message_groups(
    ctx: &GroupContext<'_>,
    first: &mut MessageGroup,
    second: &MessageGroup,
) -> bool {
    let (Some(last), Some(head)) = (first.last(), second.first()) else {
        return false;
    };
    if !ctx.can_join(&last.msg, &head.msg) {
        return false;
    }

    let mut incoming = second.message_containers.clone();
    if let Some(head) = incoming.first_mut() {
        ctx.link_within_group(last, head);
    }
    first.message_containers.extend(incoming);
    true
}

fn validate_ids(materialized: &[MessageGroup], new_groups: &[MessageGroup]) -> Result<()> {
    let mut seen = HashSet::with_capacity(materialized.len() + new_groups.len());
    for group in materialized.iter().chain(new_groups) {
        if !seen.insert(group.id) {
            return Err(Error::InvalidOperation(format!(
                "duplicate message group id {}",
                group.id
            )));
        }
        if group.is_empty() {
            return Err(Error::InvalidOperation(format!(
                "message group {} has no messages",
                group.id
            )));
        }
    }
    Ok(())
}

/// Merge `new_groups` into `materialized` at `side` and describe the
/// resulting DOM work.
///
/// On an invariant violation nothing is modified.
pub fn merge_message_groups(
    ctx: &GroupContext<'_>,
    materialized: &mut Vec<MessageGroup>,
    new_groups: Vec<MessageGroup>,
    side: Side,
) -> Result<RenderingPlan> {
    if let Err(e) = validate_ids(materialized, &new_groups) {
        error!(target: "scrollback.planner", "Refusing to merge groups: {}", e);
        return Err(e);
    }

    let plan = match side {
        Side::Top => merge_top(ctx, materialized, new_groups),
        Side::Bottom => merge_bottom(ctx, materialized, new_groups),
    };

    debug!(
        target: "scrollback.planner",
        "Merged at {}: {} appended, {} prepended, {} rerendered, {} rows appended",
        side,
        plan.append_groups.len(),
        plan.prepend_groups.len(),
        plan.rerender_groups.len(),
        plan.append_messages.len()
    );
    Ok(plan)
}

fn merge_top(
    ctx: &GroupContext<'_>,
    materialized: &mut Vec<MessageGroup>,
    mut new_groups: Vec<MessageGroup>,
) -> RenderingPlan {
    let mut plan = RenderingPlan::default();

    if materialized.is_empty() || new_groups.is_empty() {
        plan.prepend_groups.clone_from(&new_groups);
        materialized.splice(0..0, new_groups);
        return plan;
    }
    let (Some(existing_first), Some(mut boundary)) = (materialized.first_mut(), new_groups.pop())
    else {
        return plan;
    };

    if join_message_groups(ctx, &mut boundary, existing_first) {
        // The rendered group grows upwards; it keeps its id so it is
        // replaced in place.
        boundary.id = existing_first.id;
        *existing_first = boundary.clone();
        plan.rerender_groups.push(boundary);
    } else {
        let prev = boundary.last().map(|c| Arc::clone(&c.msg));
        if let (Some(prev), Some(first)) = (prev, existing_first.first()) {
            let zone = ctx.config.zone;
            let day_changed = !dates::same_day(prev.timestamp, first.msg.timestamp, zone);
            let mut relinked = existing_first.clone();
            ctx.link_group_to_previous(&mut relinked, Some(&prev));
            let marker_changed = relinked.subscription_marker != existing_first.subscription_marker;
            // The model always takes the relinked boundary; only visible
            // changes are sent to the sink.
            *existing_first = relinked;
            if day_changed || marker_changed {
                plan.rerender_groups.push(existing_first.clone());
            }
        }
        new_groups.push(boundary);
    }

    plan.prepend_groups.clone_from(&new_groups);
    materialized.splice(0..0, new_groups);
    plan
}

fn merge_bottom(
    ctx: &GroupContext<'_>,
    materialized: &mut Vec<MessageGroup>,
    new_groups: Vec<MessageGroup>,
) -> RenderingPlan {
    let mut plan = RenderingPlan::default();
    if materialized.is_empty() || new_groups.is_empty() {
        plan.append_groups.clone_from(&new_groups);
        materialized.extend(new_groups);
        return plan;
    }

    let mut incoming = new_groups.into_iter();
    let (Some(existing_last), Some(mut boundary)) = (materialized.last_mut(), incoming.next())
    else {
        return plan;
    };

    let rendered_rows = existing_last.len();
    let mut appended = Vec::new();
    if join_message_groups(ctx, existing_last, &boundary) {
        plan.append_messages = existing_last.message_containers[rendered_rows..].to_vec();
        plan.append_messages_to = Some(existing_last.id);
    } else {
        let prev = existing_last.last().map(|c| Arc::clone(&c.msg));
        ctx.link_group_to_previous(&mut boundary, prev.as_deref());
        appended.push(boundary);
    }
    appended.extend(incoming);

    plan.append_groups.clone_from(&appended);
    materialized.extend(appended);
    plan
}
