//! Read-side helpers over a conversation snapshot.
//!
//! Everything here is a pure function: no mutation, no caching beyond what
//! the snapshot already holds.

use crate::{Conversation, Message, MessagingError, Participant, Result, UserId};
use chrono::NaiveDate;

/// Sum of per-conversation unread counters across the whole snapshot.
pub fn total_unread_count(snapshot: &[Conversation]) -> usize {
    snapshot.iter().map(|c| c.unread_count).sum()
}

/// First participant whose id differs from the current user.
///
/// Every conversation is required to have at least one such participant, so
/// the error path is a defensive assertion rather than an expected outcome.
pub fn other_participant<'a>(
    conversation: &'a Conversation,
    current_user: &UserId,
) -> Result<&'a Participant> {
    conversation
        .participants
        .iter()
        .find(|p| p.id != *current_user)
        .ok_or(MessagingError::NotFound(conversation.id, *current_user))
}

/// Case-insensitive substring match over participant names and message text.
pub fn matches_query(conversation: &Conversation, query: &str) -> bool {
    let needle = query.to_lowercase();
    conversation
        .participants
        .iter()
        .any(|p| p.name.to_lowercase().contains(&needle))
        || conversation
            .messages
            .iter()
            .any(|m| m.text.to_lowercase().contains(&needle))
}

/// A contiguous run of messages falling on the same calendar day.
#[derive(Debug, Clone)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub messages: Vec<Message>,
}

/// Partition a message sequence into contiguous same-day runs, preserving
/// order. Used for rendering date separators; never persisted.
pub fn group_by_date(messages: &[Message]) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    for message in messages {
        let date = message.sent_at.date_naive();
        match groups.last_mut() {
            Some(group) if group.date == date => group.messages.push(message.clone()),
            _ => groups.push(DayGroup {
                date,
                messages: vec![message.clone()],
            }),
        }
    }
    groups
}
