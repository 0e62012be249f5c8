//! Vaga desktop client: messaging and notifications for the job board.

mod config;
mod conversation_store;
mod notifier;
mod seed;
mod theme;
mod watcher;

use config::ClientConfig;
use conversation_store::ConversationStore;
use vaga_messaging::{
    query, Conversation, ConversationId, Message as ChatMessage, MessageStatus, Participant,
    ParticipantKind,
};
use watcher::MessageWatcher;

use iced::widget::{button, column, container, row, scrollable, text, text_input, Space};
use iced::{Application, Command, Element, Length, Settings, Subscription, Theme};
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Main application state
pub struct VagaDesktop {
    config: ClientConfig,
    profile: Participant,
    store: ConversationStore,
    watcher: MessageWatcher,
    /// Snapshot rendered by the views; refreshed on every tick and after
    /// every mutation.
    conversations: Vec<Conversation>,
    /// Bumped on every synchronous refresh. A tick's snapshot read is
    /// stamped with the generation it started from and discarded if a user
    /// mutation landed while it was in flight.
    snapshot_generation: u64,
    route: Route,
    active_conversation_id: Option<ConversationId>,
    scroll_id: scrollable::Id,
    message_input: String,
    search_input: String,
    /// Whether the OS window currently has input focus. Focus only gates
    /// the native notification; in-app alerts always show.
    window_focused: bool,
    /// Runtime polling switch; flipping it on re-baselines the watcher.
    polling_enabled: bool,
    toast: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Messages,
}

#[derive(Debug, Clone)]
pub enum Message {
    Navigate(Route),
    SelectConversation(ConversationId),
    MessageInputChanged(String),
    SendMessage,
    SearchInputChanged(String),
    StartConversation,
    PollTick,
    SnapshotLoaded(u64, Option<Vec<Conversation>>),
    TogglePolling,
    WindowFocusChanged(bool),
    NotificationDispatched(bool),
    DismissToast,
}

impl Application for VagaDesktop {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = ClientConfig;

    fn new(config: ClientConfig) -> (Self, Command<Message>) {
        let profile = config::load_or_create_profile(&config.data_dir).unwrap_or_else(|e| {
            warn!(error = %e, "profile unavailable, using ephemeral identity");
            Participant::new("Candidate", ParticipantKind::Candidate)
        });
        let store = ConversationStore::open(&config.data_dir, profile.id);

        match store.load() {
            conversation_store::LoadOutcome::Loaded(snapshot) => {
                info!(conversations = snapshot.len(), "conversation store loaded");
            }
            conversation_store::LoadOutcome::Reset(reason) => {
                warn!(%reason, "conversation store reset to empty");
            }
        }

        if config.seed_demo && store.get_all().is_empty() {
            if let Err(e) = seed::seed_demo_conversations(&store, &profile) {
                error!(error = %e, "failed to seed demo conversations");
            }
        }

        let conversations = store.get_all();
        // Baseline before the first tick so pre-existing unread messages
        // never notify on startup.
        let watcher = MessageWatcher::baseline(&conversations);
        let polling_enabled = config.polling_enabled;

        (
            Self {
                config,
                profile,
                store,
                watcher,
                conversations,
                snapshot_generation: 0,
                route: Route::Home,
                active_conversation_id: None,
                scroll_id: scrollable::Id::unique(),
                message_input: String::new(),
                search_input: String::new(),
                window_focused: true,
                polling_enabled,
                toast: None,
            },
            Command::none(),
        )
    }

    fn title(&self) -> String {
        let unread = query::total_unread_count(&self.conversations);
        if unread > 0 {
            format!("({unread}) Vaga")
        } else {
            "Vaga".to_string()
        }
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::Navigate(route) => {
                self.route = route;
                Command::none()
            }
            Message::SelectConversation(id) => {
                self.route = Route::Messages;
                self.active_conversation_id = Some(id);
                // Opening a conversation resets its unread counter.
                if let Err(e) = self.store.mark_read(id) {
                    error!(error = %e, "mark_read failed");
                    self.toast = Some(e.to_string());
                }
                self.refresh();
                self.snap_to_bottom()
            }
            Message::MessageInputChanged(value) => {
                self.message_input = value;
                Command::none()
            }
            Message::SendMessage => {
                if self.message_input.trim().is_empty() {
                    return Command::none();
                }
                let Some(conversation_id) = self.active_conversation_id else {
                    return Command::none();
                };
                let text = std::mem::take(&mut self.message_input);
                let outgoing = ChatMessage::new(conversation_id, self.profile.id, text);
                match self.store.append_message(conversation_id, outgoing) {
                    Ok(_) => {
                        self.refresh();
                        self.snap_to_bottom()
                    }
                    Err(e) => {
                        error!(error = %e, "send failed");
                        self.toast = Some(e.to_string());
                        Command::none()
                    }
                }
            }
            Message::SearchInputChanged(value) => {
                self.search_input = value;
                Command::none()
            }
            Message::StartConversation => {
                let support = Participant::new("Vaga Support", ParticipantKind::Admin);
                match self.store.create(vec![self.profile.clone(), support], None) {
                    Ok(conversation) => {
                        self.refresh();
                        self.route = Route::Messages;
                        self.active_conversation_id = Some(conversation.id);
                    }
                    Err(e) => {
                        error!(error = %e, "create failed");
                        self.toast = Some(e.to_string());
                    }
                }
                Command::none()
            }
            Message::PollTick => {
                // Reads go through a blocking task so a slow disk never
                // stalls the UI thread.
                let store = self.store.clone();
                let generation = self.snapshot_generation;
                Command::perform(
                    async move {
                        match tokio::task::spawn_blocking(move || store.get_all()).await {
                            Ok(snapshot) => Some(snapshot),
                            Err(e) => {
                                warn!(error = %e, "snapshot read task failed");
                                None
                            }
                        }
                    },
                    move |snapshot| Message::SnapshotLoaded(generation, snapshot),
                )
            }
            Message::SnapshotLoaded(_, None) => Command::none(),
            Message::SnapshotLoaded(generation, Some(snapshot)) => {
                // A user mutation refreshed the view after this read
                // started; the read is stale, the next tick will catch up.
                if generation != self.snapshot_generation {
                    return Command::none();
                }
                let alerts = self.watcher.observe(
                    &snapshot,
                    &self.profile.id,
                    self.route == Route::Messages,
                );
                self.conversations = snapshot;

                if alerts.is_empty() {
                    return Command::none();
                }

                // In-app signal always fires; the native notification is
                // held back while the window has focus.
                let latest = &alerts[alerts.len() - 1];
                self.toast = Some(format!("{}: {}", latest.sender_name, latest.body));

                if !self.window_focused && self.config.notifications_enabled {
                    Command::batch(alerts.into_iter().map(|alert| {
                        Command::perform(
                            async move { notifier::notify(&alert.sender_name, &alert.body).await },
                            Message::NotificationDispatched,
                        )
                    }))
                } else {
                    Command::none()
                }
            }
            Message::TogglePolling => {
                self.polling_enabled = !self.polling_enabled;
                if self.polling_enabled {
                    // Re-sync so messages that arrived while paused do not
                    // retroactively notify.
                    self.refresh();
                    self.watcher.rebaseline(&self.conversations);
                }
                Command::none()
            }
            Message::WindowFocusChanged(focused) => {
                self.window_focused = focused;
                Command::none()
            }
            Message::NotificationDispatched(_) => Command::none(),
            Message::DismissToast => {
                self.toast = None;
                Command::none()
            }
        }
    }

    fn view(&self) -> Element<Message> {
        let content: Element<Message> = match self.route {
            Route::Home => self.view_home(),
            Route::Messages => row![
                container(self.view_sidebar())
                    .width(Length::Fixed(280.0))
                    .height(Length::Fill)
                    .style(sidebar_style()),
                container(self.view_chat()).width(Length::Fill)
            ]
            .into(),
        };

        let mut page = column![self.view_nav()];
        if let Some(ref toast) = self.toast {
            let banner = container(
                row![
                    text(toast).size(12),
                    Space::with_width(Length::Fill),
                    button(text("x").size(10)).padding([2, 6]).on_press(Message::DismissToast),
                ]
                .spacing(8),
            )
            .padding([6, 12])
            .width(Length::Fill)
            .style(card_style());
            page = page.push(banner);
        }
        page = page.push(content);

        container(page)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(background_style())
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        // Window focus feeds the "ambient alert vs interrupt" decision.
        let focus_sub = iced::event::listen_with(|event, _status| match event {
            iced::Event::Window(_, iced::window::Event::Focused) => {
                Some(Message::WindowFocusChanged(true))
            }
            iced::Event::Window(_, iced::window::Event::Unfocused) => {
                Some(Message::WindowFocusChanged(false))
            }
            _ => None,
        });

        if self.polling_enabled {
            let poll_sub = iced::time::every(Duration::from_secs(self.config.poll_interval_secs))
                .map(|_| Message::PollTick);
            Subscription::batch([poll_sub, focus_sub])
        } else {
            focus_sub
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

impl VagaDesktop {
    fn refresh(&mut self) {
        self.conversations = self.store.get_all();
        self.snapshot_generation += 1;
    }

    fn snap_to_bottom(&self) -> Command<Message> {
        scrollable::snap_to(self.scroll_id.clone(), scrollable::RelativeOffset::END)
    }

    fn active_conversation(&self) -> Option<&Conversation> {
        let id = self.active_conversation_id?;
        self.conversations.iter().find(|c| c.id == id)
    }

    fn display_name(&self, conversation: &Conversation) -> String {
        query::other_participant(conversation, &self.profile.id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|_| "Unknown".to_string())
    }

    fn view_nav(&self) -> Element<Message> {
        let unread = query::total_unread_count(&self.conversations);
        let messages_label = if unread > 0 {
            format!("Messages ({unread})")
        } else {
            "Messages".to_string()
        };
        let polling_label = if self.polling_enabled {
            "Pause alerts"
        } else {
            "Resume alerts"
        };

        row![
            text("Vaga").size(20),
            Space::with_width(16),
            button(text("Home").size(13))
                .padding([6, 12])
                .on_press(Message::Navigate(Route::Home)),
            button(text(messages_label).size(13))
                .padding([6, 12])
                .on_press(Message::Navigate(Route::Messages)),
            Space::with_width(Length::Fill),
            button(text(polling_label).size(11))
                .padding([4, 8])
                .on_press(Message::TogglePolling),
        ]
        .spacing(8)
        .padding(10)
        .align_items(iced::Alignment::Center)
        .into()
    }

    fn view_home(&self) -> Element<Message> {
        let unread = query::total_unread_count(&self.conversations);
        let unread_line = if unread > 0 {
            format!("You have {unread} unread message(s).")
        } else {
            "No unread messages.".to_string()
        };

        container(
            column![
                text(format!("Welcome back, {}", self.profile.name)).size(24),
                text("Job openings matched to your profile appear here.").size(13),
                Space::with_height(12),
                text(unread_line).size(13),
                button(text("Open messages").size(13))
                    .padding([8, 16])
                    .on_press(Message::Navigate(Route::Messages)),
            ]
            .spacing(8)
            .align_items(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x()
        .center_y()
        .into()
    }

    fn view_sidebar(&self) -> Element<Message> {
        let search = text_input("Search conversations...", &self.search_input)
            .on_input(Message::SearchInputChanged)
            .padding(8)
            .size(12);

        // Views filter the in-memory snapshot; `store.search` is for
        // callers that need a fresh read.
        let needle = self.search_input.trim();
        let listed: Vec<&Conversation> = self
            .conversations
            .iter()
            .filter(|c| needle.is_empty() || query::matches_query(c, needle))
            .collect();

        let list: Element<Message> = if listed.is_empty() {
            container(
                text("No conversations").size(12).style(iced::theme::Text::Color(
                    theme::colors::TEXT_SECONDARY,
                )),
            )
            .padding(10)
            .into()
        } else {
            column(
                listed
                    .into_iter()
                    .map(|c| {
                        let is_active = self.active_conversation_id == Some(c.id);
                        let name = self.display_name(c);
                        let label = if is_active { format!("> {name}") } else { name };

                        let mut title_row = row![text(label).size(13)]
                            .spacing(6)
                            .align_items(iced::Alignment::Center);
                        if c.unread_count > 0 {
                            title_row = title_row.push(
                                container(text(c.unread_count.to_string()).size(10))
                                    .padding([1, 6])
                                    .style(theme::unread_badge),
                            );
                        }

                        let subtitle = match (&c.context, c.messages.last()) {
                            (Some(context), Some(last)) => {
                                format!("{} · {}", context.label(), snippet(&last.text))
                            }
                            (Some(context), None) => context.label().to_string(),
                            (None, Some(last)) => snippet(&last.text),
                            (None, None) => "No messages yet".to_string(),
                        };

                        button(
                            column![
                                title_row,
                                text(subtitle).size(10).style(iced::theme::Text::Color(
                                    theme::colors::TEXT_SECONDARY,
                                )),
                            ]
                            .spacing(2),
                        )
                        .width(Length::Fill)
                        .padding(8)
                        .on_press(Message::SelectConversation(c.id))
                        .into()
                    })
                    .collect::<Vec<_>>(),
            )
            .spacing(2)
            .into()
        };

        column![
            search,
            scrollable(list).height(Length::Fill),
            button(text("New conversation").size(11))
                .padding([6, 10])
                .on_press(Message::StartConversation),
        ]
        .spacing(8)
        .padding(8)
        .into()
    }

    fn view_chat(&self) -> Element<Message> {
        let Some(conversation) = self.active_conversation() else {
            return container(
                column![
                    text("Your messages").size(16),
                    text("Select a conversation from the list to start chatting.").size(12),
                ]
                .spacing(6)
                .align_items(iced::Alignment::Center),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .into();
        };

        // Header
        let peer = query::other_participant(conversation, &self.profile.id).ok();
        let peer_name = peer.map(|p| p.name.clone()).unwrap_or_else(|| "Unknown".to_string());
        let peer_kind = peer
            .map(|p| match p.kind {
                ParticipantKind::Candidate => "Candidate",
                ParticipantKind::Company => "Company",
                ParticipantKind::Admin => "Vaga team",
            })
            .unwrap_or("");
        let context_tag = conversation
            .context
            .as_ref()
            .map(|c| c.label())
            .unwrap_or("");
        let header = row![
            text(peer_name).size(16),
            Space::with_width(8),
            text(peer_kind).size(10).style(iced::theme::Text::Color(
                theme::colors::TEXT_SECONDARY,
            )),
            Space::with_width(Length::Fill),
            text(context_tag).size(10).style(iced::theme::Text::Color(
                theme::colors::TEXT_MUTED,
            )),
        ]
        .padding(10)
        .align_items(iced::Alignment::Center);

        // Thread with date separators
        let thread: Element<Message> = if conversation.messages.is_empty() {
            container(text("No messages yet. Say hello!").size(12))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x()
                .center_y()
                .into()
        } else {
            let mut rows: Vec<Element<Message>> = Vec::new();
            for group in query::group_by_date(&conversation.messages) {
                rows.push(
                    container(
                        text(group.date.format("%d %b %Y").to_string())
                            .size(10)
                            .style(iced::theme::Text::Color(theme::colors::TEXT_MUTED)),
                    )
                    .width(Length::Fill)
                    .center_x()
                    .padding([4, 0])
                    .into(),
                );
                for message in &group.messages {
                    rows.push(self.render_bubble(message, conversation));
                }
            }
            scrollable(column(rows).spacing(8).padding(16))
                .id(self.scroll_id.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        };

        // Composer
        let composer = row![
            text_input("Type a message...", &self.message_input)
                .on_input(Message::MessageInputChanged)
                .on_submit(Message::SendMessage)
                .padding(10)
                .size(14),
            button(text("Send")).padding([10, 16]).on_press(Message::SendMessage),
        ]
        .spacing(8)
        .padding(12);

        column![header, thread, composer]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn render_bubble(&self, message: &ChatMessage, conversation: &Conversation) -> Element<Message> {
        if message.is_system {
            let style: fn(&Theme) -> iced::widget::container::Appearance =
                |_| theme::system_bubble();
            let bubble = container(text(&message.text).size(11))
                .padding([6, 12])
                .style(style);
            return row![
                Space::with_width(Length::FillPortion(1)),
                bubble,
                Space::with_width(Length::FillPortion(1)),
            ]
            .width(Length::Fill)
            .into();
        }

        let is_mine = message.sender_id == self.profile.id;
        let name_label = if is_mine {
            format!("{} (You)", self.profile.name)
        } else {
            conversation
                .participants
                .iter()
                .find(|p| p.id == message.sender_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Unknown".to_string())
        };

        let status_indicator = if is_mine {
            match message.status {
                MessageStatus::Read => " [read]",
                MessageStatus::Delivered => " [delivered]",
                MessageStatus::Sent => " [sent]",
            }
        } else {
            ""
        };

        let mut content_col = column![
            text(name_label).size(11),
            text(&message.text).size(14),
        ];

        for attachment in &message.attachments {
            content_col = content_col.push(
                text(format!(
                    "[file] {} ({})",
                    attachment.name,
                    format_size(attachment.size_bytes)
                ))
                .size(11)
                .style(iced::theme::Text::Color(theme::colors::TEXT_SECONDARY)),
            );
        }

        let bubble_content: Element<Message> = content_col
            .push(
                row![
                    text(message.sent_at.format("%H:%M").to_string()).size(9),
                    text(status_indicator).size(9),
                ]
                .spacing(4),
            )
            .spacing(3)
            .into();

        let bubble_style: fn(&Theme) -> iced::widget::container::Appearance = if is_mine {
            |_| theme::my_bubble()
        } else {
            |_| theme::their_bubble()
        };

        let bubble = container(bubble_content)
            .padding([10, 16])
            .max_width(500)
            .style(bubble_style);

        if is_mine {
            row![Space::with_width(Length::FillPortion(1)), bubble]
                .width(Length::Fill)
                .into()
        } else {
            row![bubble, Space::with_width(Length::FillPortion(1))]
                .width(Length::Fill)
                .into()
        }
    }
}

fn sidebar_style() -> fn(&Theme) -> iced::widget::container::Appearance {
    |_| theme::sidebar_container()
}

fn card_style() -> fn(&Theme) -> iced::widget::container::Appearance {
    |_| theme::card_container()
}

fn background_style() -> fn(&Theme) -> iced::widget::container::Appearance {
    |_| theme::dark_container()
}

fn snippet(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(MAX).collect();
        format!("{truncated}…")
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> iced::Result {
    init_tracing();

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        eprintln!("failed to read configuration: {e:#}");
        std::process::exit(1);
    });
    info!(data_dir = %config.data_dir.display(), poll_secs = config.poll_interval_secs, "starting Vaga desktop client");

    VagaDesktop::run(Settings {
        window: iced::window::Settings {
            size: iced::Size::new(1000.0, 680.0),
            min_size: Some(iced::Size::new(760.0, 480.0)),
            ..Default::default()
        },
        ..Settings::with_flags(config)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> VagaDesktop {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            data_dir: dir.into_path(),
            poll_interval_secs: 30,
            polling_enabled: false,
            notifications_enabled: false,
            seed_demo: false,
        };
        VagaDesktop::new(config).0
    }

    #[test]
    fn stale_snapshot_read_does_not_clobber_newer_state() {
        let mut app = test_app();

        // A tick starts its read against the empty store.
        let stale = app.store.get_all();
        let generation_at_tick = app.snapshot_generation;

        // The user creates a conversation before the read lands.
        let _ = app.update(Message::StartConversation);
        assert_eq!(app.conversations.len(), 1);

        let _ = app.update(Message::SnapshotLoaded(generation_at_tick, Some(stale)));
        assert_eq!(app.conversations.len(), 1);
    }

    #[test]
    fn current_snapshot_read_is_applied() {
        let mut app = test_app();
        let _ = app.update(Message::StartConversation);

        let fresh = app.store.get_all();
        let generation = app.snapshot_generation;
        let _ = app.update(Message::SnapshotLoaded(generation, Some(fresh)));
        assert_eq!(app.conversations.len(), 1);
    }

    #[test]
    fn snippet_truncates_long_text() {
        assert_eq!(snippet("short"), "short");
        let long = "x".repeat(60);
        let cut = snippet(&long);
        assert!(cut.ends_with('…'));
        assert_eq!(cut.chars().count(), 41);
    }

    #[test]
    fn format_size_picks_sensible_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
