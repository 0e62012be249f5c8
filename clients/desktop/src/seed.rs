//! Demo conversations for first runs with `VAGA_SEED` set.
//!
//! Stands in for the platform's "start conversation" flow (a recruiter
//! reaching out about an application) until a real backend feeds the store.

use uuid::Uuid;

use crate::conversation_store::{ConversationStore, Result};
use vaga_messaging::{
    ConversationContext, Message, Participant, ParticipantKind,
};

pub fn seed_demo_conversations(store: &ConversationStore, me: &Participant) -> Result<()> {
    let recruiter = Participant::new("Marina Souza · TechCorp RH", ParticipantKind::Company);
    let recruiter_id = recruiter.id;
    let application = store.create(
        vec![me.clone(), recruiter],
        Some(ConversationContext::JobApplication {
            application_id: Uuid::new_v4(),
        }),
    )?;
    store.append_message(
        application.id,
        Message::system(application.id, recruiter_id, "Your application was viewed"),
    )?;
    store.append_message(
        application.id,
        Message::new(
            application.id,
            recruiter_id,
            "Olá! Vi seu perfil e gostaria de conversar sobre a vaga de backend.",
        ),
    )?;

    let support = Participant::new("Vaga Support", ParticipantKind::Admin);
    let support_id = support.id;
    let welcome = store.create(vec![me.clone(), support], None)?;
    store.append_message(
        welcome.id,
        Message::new(
            welcome.id,
            support_id,
            "Welcome to Vaga! Companies will message you here about your applications.",
        ),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaga_messaging::query;

    #[test]
    fn seeding_creates_persisted_conversations() {
        let dir = tempfile::tempdir().unwrap();
        let me = Participant::new("Ana", ParticipantKind::Candidate);
        let store = ConversationStore::open(dir.path(), me.id);

        seed_demo_conversations(&store, &me).unwrap();

        let all = store.get_all();
        assert_eq!(all.len(), 2);
        assert!(query::total_unread_count(&all) >= 2);
        assert!(all
            .iter()
            .any(|c| matches!(c.context, Some(ConversationContext::JobApplication { .. }))));
        // Every seeded conversation has someone to talk to.
        for conversation in &all {
            assert!(query::other_participant(conversation, &me.id).is_ok());
        }
    }
}
