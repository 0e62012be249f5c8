//! Locally persisted conversation store.
//!
//! One JSON snapshot file per signed-in user. Every read goes back to disk
//! and every mutation rewrites the whole snapshot, so a poll always observes
//! the latest persisted state, including writes made by another process
//! between ticks.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use vaga_messaging::{
    query, Conversation, ConversationContext, ConversationId, Message, Participant, UserId,
};

/// Store-level errors surfaced to UI event handlers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("conversation not found: {0}")]
    NotFound(ConversationId),
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot serialization failure: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of reading the persisted snapshot. `Reset` marks the corruption
/// recovery path: the file existed but could not be parsed, so the store
/// starts over from empty rather than refusing to load.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Vec<Conversation>),
    Reset(String),
}

impl LoadOutcome {
    pub fn into_snapshot(self) -> Vec<Conversation> {
        match self {
            LoadOutcome::Loaded(snapshot) => snapshot,
            LoadOutcome::Reset(_) => Vec::new(),
        }
    }
}

/// Single authoritative source of chat state for one signed-in user.
#[derive(Clone)]
pub struct ConversationStore {
    data_dir: PathBuf,
    current_user: UserId,
}

impl ConversationStore {
    pub fn open(data_dir: impl AsRef<Path>, current_user: UserId) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            current_user,
        }
    }

    pub fn current_user(&self) -> UserId {
        self.current_user
    }

    fn snapshot_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("conversations_{}.json", self.current_user))
    }

    /// Read the persisted snapshot. A missing file is ordinary first-run
    /// state; an unparseable file is recovered by resetting to empty.
    pub fn load(&self) -> LoadOutcome {
        let path = self.snapshot_path();
        if !path.exists() {
            return LoadOutcome::Loaded(Vec::new());
        }

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable snapshot, resetting");
                return LoadOutcome::Reset(e.to_string());
            }
        };

        match serde_json::from_str::<Vec<Conversation>>(&raw) {
            Ok(conversations) => LoadOutcome::Loaded(conversations),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt snapshot, resetting");
                LoadOutcome::Reset(e.to_string())
            }
        }
    }

    /// Current snapshot, most recently active conversation first.
    pub fn get_all(&self) -> Vec<Conversation> {
        let mut conversations = self.load().into_snapshot();
        conversations.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        conversations
    }

    /// Append a message to an existing conversation and persist the whole
    /// snapshot. Fails with `NotFound` for an unknown conversation id.
    pub fn append_message(
        &self,
        conversation_id: ConversationId,
        message: Message,
    ) -> Result<Conversation> {
        let mut conversations = self.load().into_snapshot();
        let conversation = conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or(StoreError::NotFound(conversation_id))?;

        conversation.push_message(message, &self.current_user);
        let updated = conversation.clone();
        self.persist(&conversations)?;
        Ok(updated)
    }

    /// Zero the unread counter and mark other participants' messages as
    /// read (the client-local read-receipt approximation).
    pub fn mark_read(&self, conversation_id: ConversationId) -> Result<()> {
        let mut conversations = self.load().into_snapshot();
        let conversation = conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or(StoreError::NotFound(conversation_id))?;

        conversation.unread_count = 0;
        for message in &mut conversation.messages {
            if message.sender_id != self.current_user {
                message.status = vaga_messaging::MessageStatus::Read;
            }
        }
        self.persist(&conversations)
    }

    /// Insert an empty conversation and persist it immediately.
    pub fn create(
        &self,
        participants: Vec<Participant>,
        context: Option<ConversationContext>,
    ) -> Result<Conversation> {
        let mut conversations = self.load().into_snapshot();
        let conversation = Conversation::new(participants, context);
        conversations.push(conversation.clone());
        self.persist(&conversations)?;
        Ok(conversation)
    }

    /// Conversations matching `query` (case-insensitive, participant names
    /// and message text), most recently active first.
    pub fn search(&self, query: &str) -> Vec<Conversation> {
        let mut matches: Vec<Conversation> = self
            .load()
            .into_snapshot()
            .into_iter()
            .filter(|c| query::matches_query(c, query))
            .collect();
        matches.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        matches
    }

    fn persist(&self, conversations: &[Conversation]) -> Result<()> {
        let json = serde_json::to_string_pretty(conversations)?;
        fs::write(self.snapshot_path(), json)?;
        Ok(())
    }
}
