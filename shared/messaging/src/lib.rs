//! Conversation and message models shared across Vaga clients.

pub mod query;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier assigned to a logical conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a platform user (candidate, company or admin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role a participant plays on the job board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    Candidate,
    Company,
    Admin,
}

/// One side of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub kind: ParticipantKind,
}

impl Participant {
    pub fn new(name: impl Into<String>, kind: ParticipantKind) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            avatar_url: None,
            kind,
        }
    }
}

/// Client-local delivery approximation. There is no receipt protocol behind
/// this; `Read` is set when the current user opens the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

/// File reference carried by a message. These are transient object
/// references; nothing in this subsystem uploads or stores the bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub url: String,
    pub name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// A single chat message. Messages are append-only: no edit or delete
/// operation exists anywhere in this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub status: MessageStatus,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub is_system: bool,
}

impl Message {
    pub fn new(
        conversation_id: ConversationId,
        sender_id: UserId,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            sender_id,
            text: text.into(),
            sent_at: Utc::now(),
            status: MessageStatus::Sent,
            attachments: Vec::new(),
            is_system: false,
        }
    }

    /// Platform-generated message (e.g. "your application was viewed").
    /// System messages count towards unread but never trigger alerts.
    pub fn system(
        conversation_id: ConversationId,
        sender_id: UserId,
        text: impl Into<String>,
    ) -> Self {
        let mut message = Self::new(conversation_id, sender_id, text);
        message.is_system = true;
        message
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// External entity a conversation is about. Lookup only; the conversation
/// does not own the referenced record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversationContext {
    JobApplication { application_id: Uuid },
    JobPosting { job_id: Uuid },
}

impl ConversationContext {
    /// Short label for the conversation list.
    pub fn label(&self) -> &'static str {
        match self {
            ConversationContext::JobApplication { .. } => "Application",
            ConversationContext::JobPosting { .. } => "Job",
        }
    }
}

/// A persisted thread of messages between the current user and at least one
/// other participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: Vec<Participant>,
    pub messages: Vec<Message>,
    pub unread_count: usize,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub context: Option<ConversationContext>,
}

impl Conversation {
    pub fn new(participants: Vec<Participant>, context: Option<ConversationContext>) -> Self {
        Self {
            id: ConversationId::new(),
            participants,
            messages: Vec::new(),
            unread_count: 0,
            last_message_at: None,
            context,
        }
    }

    /// Append a message, keeping `last_message_at` and the unread counter in
    /// sync. Only messages from someone other than `current_user` count as
    /// unread; system messages still do (they are only excluded from
    /// notification triggers, not from the counter).
    pub fn push_message(&mut self, message: Message, current_user: &UserId) {
        self.last_message_at = Some(message.sent_at);
        if message.sender_id != *current_user {
            self.unread_count += 1;
        }
        self.messages.push(message);
    }
}

/// Model-level errors.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("conversation {0} has no participant other than {1}")]
    NotFound(ConversationId, UserId),
}

pub type Result<T> = std::result::Result<T, MessagingError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn two_party() -> (Conversation, UserId, UserId) {
        let me = Participant::new("Ana", ParticipantKind::Candidate);
        let them = Participant::new("TechCorp RH", ParticipantKind::Company);
        let (my_id, their_id) = (me.id, them.id);
        let conversation = Conversation::new(vec![me, them], None);
        (conversation, my_id, their_id)
    }

    #[test]
    fn push_message_tracks_last_activity_and_unread() {
        let (mut conversation, my_id, their_id) = two_party();
        assert_eq!(conversation.unread_count, 0);
        assert!(conversation.last_message_at.is_none());

        let incoming = Message::new(conversation.id, their_id, "Olá");
        let sent_at = incoming.sent_at;
        conversation.push_message(incoming, &my_id);
        assert_eq!(conversation.unread_count, 1);
        assert_eq!(conversation.last_message_at, Some(sent_at));

        // Own messages never count as unread.
        let outgoing = Message::new(conversation.id, my_id, "Oi!");
        conversation.push_message(outgoing, &my_id);
        assert_eq!(conversation.unread_count, 1);
        assert_eq!(conversation.messages.len(), 2);
    }

    #[test]
    fn system_messages_count_towards_unread() {
        let (mut conversation, my_id, their_id) = two_party();
        let system = Message::system(conversation.id, their_id, "Application viewed");
        conversation.push_message(system, &my_id);
        assert_eq!(conversation.unread_count, 1);
        assert!(conversation.messages[0].is_system);
    }

    #[test]
    fn unread_accumulates_per_incoming_message() {
        let (mut conversation, my_id, their_id) = two_party();
        for i in 0..3 {
            let message = Message::new(conversation.id, their_id, format!("msg {i}"));
            conversation.push_message(message, &my_id);
        }
        assert_eq!(conversation.unread_count, 3);
        assert_eq!(conversation.messages.len(), 3);
    }

    #[test]
    fn stored_shape_tolerates_missing_optional_fields() {
        // Older snapshots may predate attachments/is_system/context; they
        // must still deserialize.
        let conversation_id = ConversationId::new();
        let sender_id = UserId::new();
        let raw = serde_json::json!({
            "id": conversation_id,
            "participants": [
                { "id": sender_id, "name": "TechCorp RH", "kind": "company" }
            ],
            "messages": [{
                "id": MessageId::new(),
                "conversation_id": conversation_id,
                "sender_id": sender_id,
                "text": "Olá",
                "sent_at": "2026-01-05T12:00:00Z",
                "status": "sent"
            }],
            "unread_count": 1
        });

        let conversation: Conversation = serde_json::from_value(raw).unwrap();
        assert!(conversation.context.is_none());
        assert!(conversation.messages[0].attachments.is_empty());
        assert!(!conversation.messages[0].is_system);
    }
}
