//! Poll-tick notification dispatcher.
//!
//! The watcher compares the previous snapshot to the current one and decides
//! which conversations deserve a user-visible alert. The diff is a plain
//! length comparison per conversation: messages are append-only, never
//! reordered or deleted, so anything past the previous length is new.

use vaga_messaging::{query, Conversation, ConversationId, UserId};

/// One alert per conversation with new messages, carrying the
/// chronologically last new message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub conversation_id: ConversationId,
    pub sender_name: String,
    pub body: String,
}

/// Tick-to-tick state for the dispatcher.
pub struct MessageWatcher {
    previous_total_unread: usize,
    previous: Vec<Conversation>,
}

impl MessageWatcher {
    /// Baseline against the current snapshot so pre-existing unread
    /// messages never alert when polling activates.
    pub fn baseline(snapshot: &[Conversation]) -> Self {
        Self {
            previous_total_unread: query::total_unread_count(snapshot),
            previous: snapshot.to_vec(),
        }
    }

    /// Re-sync after polling was disabled and re-enabled.
    pub fn rebaseline(&mut self, snapshot: &[Conversation]) {
        self.previous_total_unread = query::total_unread_count(snapshot);
        self.previous = snapshot.to_vec();
    }

    /// One dispatcher tick. The baseline always advances, whether or not
    /// any alert fires.
    pub fn observe(
        &mut self,
        snapshot: &[Conversation],
        current_user: &UserId,
        on_messages_route: bool,
    ) -> Vec<Alert> {
        let total_unread = query::total_unread_count(snapshot);
        let previous_total = self.previous_total_unread;
        self.previous_total_unread = total_unread;

        if total_unread <= previous_total || on_messages_route {
            self.previous = snapshot.to_vec();
            return Vec::new();
        }

        let mut alerts = Vec::new();
        for conversation in snapshot {
            // A conversation absent from the previous snapshot has nothing
            // to diff against, so its first batch of messages never alerts.
            let previous_len = match self.previous.iter().find(|c| c.id == conversation.id) {
                Some(previous) => previous.messages.len(),
                None => conversation.messages.len(),
            };

            let last_new = conversation.messages[previous_len.min(conversation.messages.len())..]
                .iter()
                .filter(|m| m.sender_id != *current_user && !m.is_system)
                .last();

            if let Some(message) = last_new {
                let sender_name = conversation
                    .participants
                    .iter()
                    .find(|p| p.id == message.sender_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Someone".to_string());
                alerts.push(Alert {
                    conversation_id: conversation.id,
                    sender_name,
                    body: message.text.clone(),
                });
            }
        }

        self.previous = snapshot.to_vec();
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaga_messaging::{Message, Participant, ParticipantKind};

    struct Fixture {
        my_id: UserId,
        their_id: UserId,
        snapshot: Vec<Conversation>,
    }

    impl Fixture {
        fn new() -> Self {
            let me = Participant::new("Ana", ParticipantKind::Candidate);
            let them = Participant::new("TechCorp RH", ParticipantKind::Company);
            let my_id = me.id;
            let their_id = them.id;
            let conversation = Conversation::new(vec![me, them], None);
            Self {
                my_id,
                their_id,
                snapshot: vec![conversation],
            }
        }

        fn append_from_them(&mut self, text: &str) {
            let conversation = &mut self.snapshot[0];
            let message = Message::new(conversation.id, self.their_id, text);
            let my_id = self.my_id;
            conversation.push_message(message, &my_id);
        }

        fn append_from_me(&mut self, text: &str) {
            let conversation = &mut self.snapshot[0];
            let message = Message::new(conversation.id, self.my_id, text);
            let my_id = self.my_id;
            conversation.push_message(message, &my_id);
        }

        fn append_system(&mut self, text: &str) {
            let conversation = &mut self.snapshot[0];
            let message = Message::system(conversation.id, self.their_id, text);
            let my_id = self.my_id;
            conversation.push_message(message, &my_id);
        }
    }

    #[test]
    fn baseline_suppresses_preexisting_unread() {
        let mut fixture = Fixture::new();
        fixture.append_from_them("old news");

        let mut watcher = MessageWatcher::baseline(&fixture.snapshot);
        let alerts = watcher.observe(&fixture.snapshot, &fixture.my_id, false);
        assert!(alerts.is_empty());
    }

    #[test]
    fn new_incoming_message_alerts_with_sender_and_body() {
        let mut fixture = Fixture::new();
        fixture.append_from_them("first");
        let mut watcher = MessageWatcher::baseline(&fixture.snapshot);

        fixture.append_from_them("Olá");
        let alerts = watcher.observe(&fixture.snapshot, &fixture.my_id, false);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].sender_name, "TechCorp RH");
        assert_eq!(alerts[0].body, "Olá");
        assert_eq!(alerts[0].conversation_id, fixture.snapshot[0].id);
    }

    #[test]
    fn messages_route_suppresses_but_advances_baseline() {
        let mut fixture = Fixture::new();
        let mut watcher = MessageWatcher::baseline(&fixture.snapshot);

        fixture.append_from_them("while reading");
        let alerts = watcher.observe(&fixture.snapshot, &fixture.my_id, true);
        assert!(alerts.is_empty());

        // Baseline advanced: the same message does not alert later either.
        let alerts = watcher.observe(&fixture.snapshot, &fixture.my_id, false);
        assert!(alerts.is_empty());
    }

    #[test]
    fn own_and_system_messages_never_alert() {
        let mut fixture = Fixture::new();
        let mut watcher = MessageWatcher::baseline(&fixture.snapshot);

        fixture.append_from_me("mine");
        let alerts = watcher.observe(&fixture.snapshot, &fixture.my_id, false);
        assert!(alerts.is_empty());

        fixture.append_system("Application viewed");
        let alerts = watcher.observe(&fixture.snapshot, &fixture.my_id, false);
        assert!(alerts.is_empty());
    }

    #[test]
    fn alert_carries_only_the_last_new_message_per_conversation() {
        let mut fixture = Fixture::new();
        let mut watcher = MessageWatcher::baseline(&fixture.snapshot);

        fixture.append_from_them("one");
        fixture.append_from_them("two");
        fixture.append_from_them("three");
        let alerts = watcher.observe(&fixture.snapshot, &fixture.my_id, false);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].body, "three");
    }

    #[test]
    fn repoll_without_changes_is_idempotent() {
        let mut fixture = Fixture::new();
        let mut watcher = MessageWatcher::baseline(&fixture.snapshot);

        fixture.append_from_them("ping");
        let first = watcher.observe(&fixture.snapshot, &fixture.my_id, false);
        assert_eq!(first.len(), 1);

        let second = watcher.observe(&fixture.snapshot, &fixture.my_id, false);
        assert!(second.is_empty());
    }

    #[test]
    fn new_conversation_does_not_alert_on_first_tick() {
        let mut fixture = Fixture::new();
        let mut watcher = MessageWatcher::baseline(&fixture.snapshot);

        // Bump unread in the known conversation so the total-unread
        // short-circuit does not mask the per-conversation edge case.
        fixture.append_from_them("existing thread");

        let stranger = Participant::new("Nova Empresa", ParticipantKind::Company);
        let stranger_id = stranger.id;
        let mut fresh = Conversation::new(
            vec![
                Participant::new("Ana", ParticipantKind::Candidate),
                stranger,
            ],
            None,
        );
        let message = Message::new(fresh.id, stranger_id, "brand new");
        let my_id = fixture.my_id;
        fresh.push_message(message, &my_id);
        fixture.snapshot.push(fresh);

        let alerts = watcher.observe(&fixture.snapshot, &fixture.my_id, false);
        // Only the pre-existing conversation alerts; the brand-new one has
        // no previous entry to diff against.
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].body, "existing thread");

        // The next message in the new conversation does alert.
        let fresh_id = fixture.snapshot[1].id;
        let followup = Message::new(fresh_id, stranger_id, "follow-up");
        fixture.snapshot[1].push_message(followup, &my_id);
        let alerts = watcher.observe(&fixture.snapshot, &fixture.my_id, false);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].body, "follow-up");
    }

    #[test]
    fn unread_decrease_never_alerts() {
        let mut fixture = Fixture::new();
        fixture.append_from_them("pending");
        let mut watcher = MessageWatcher::baseline(&fixture.snapshot);

        // Simulate mark-read between ticks.
        fixture.snapshot[0].unread_count = 0;
        let alerts = watcher.observe(&fixture.snapshot, &fixture.my_id, false);
        assert!(alerts.is_empty());
    }
}
