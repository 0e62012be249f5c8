//! Vaga dark theme.

use iced::Color;

/// Dark theme color palette
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = Color::from_rgb(0.102, 0.102, 0.118); // #1a1a1e
    pub const SIDEBAR_BG: Color = Color::from_rgb(0.078, 0.078, 0.090); // #141417
    pub const CARD_BG: Color = Color::from_rgb(0.165, 0.165, 0.180); // #2a2a2e

    pub const ACCENT: Color = Color::from_rgb(0.173, 0.482, 0.898); // #2c7be5
    pub const ERROR_RED: Color = Color::from_rgb(1.0, 0.231, 0.188); // #ff3b30

    pub const TEXT_PRIMARY: Color = Color::WHITE;
    pub const TEXT_SECONDARY: Color = Color::from_rgb(0.557, 0.557, 0.576); // #8e8e93
    pub const TEXT_MUTED: Color = Color::from_rgb(0.400, 0.400, 0.420); // #666666

    pub const BUBBLE_MINE: Color = Color::from_rgb(0.173, 0.482, 0.898); // #2c7be5
    pub const BUBBLE_THEIRS: Color = Color::from_rgb(0.165, 0.165, 0.180); // #2a2a2e
    pub const BUBBLE_SYSTEM: Color = Color::from_rgb(0.125, 0.125, 0.140); // #202024
}

/// Container style for dark background
pub fn dark_container() -> iced::widget::container::Appearance {
    iced::widget::container::Appearance {
        background: Some(iced::Background::Color(colors::BACKGROUND)),
        text_color: Some(colors::TEXT_PRIMARY),
        ..Default::default()
    }
}

/// Sidebar container style
pub fn sidebar_container() -> iced::widget::container::Appearance {
    iced::widget::container::Appearance {
        background: Some(iced::Background::Color(colors::SIDEBAR_BG)),
        text_color: Some(colors::TEXT_PRIMARY),
        ..Default::default()
    }
}

/// Card container style (toast banner, panels)
pub fn card_container() -> iced::widget::container::Appearance {
    iced::widget::container::Appearance {
        background: Some(iced::Background::Color(colors::CARD_BG)),
        text_color: Some(colors::TEXT_PRIMARY),
        border: iced::Border {
            radius: 12.0.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// My message bubble style
pub fn my_bubble() -> iced::widget::container::Appearance {
    iced::widget::container::Appearance {
        background: Some(iced::Background::Color(colors::BUBBLE_MINE)),
        text_color: Some(Color::WHITE),
        border: iced::Border {
            radius: 16.0.into(),
            ..Default::default()
        },
        shadow: iced::Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.2),
            offset: iced::Vector { x: 2.0, y: 2.0 },
            blur_radius: 8.0,
        },
    }
}

/// Their message bubble style
pub fn their_bubble() -> iced::widget::container::Appearance {
    iced::widget::container::Appearance {
        background: Some(iced::Background::Color(colors::BUBBLE_THEIRS)),
        text_color: Some(Color::WHITE),
        border: iced::Border {
            radius: 16.0.into(),
            ..Default::default()
        },
        shadow: iced::Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.15),
            offset: iced::Vector { x: 2.0, y: 2.0 },
            blur_radius: 6.0,
        },
    }
}

/// Centered bubble for system messages
pub fn system_bubble() -> iced::widget::container::Appearance {
    iced::widget::container::Appearance {
        background: Some(iced::Background::Color(colors::BUBBLE_SYSTEM)),
        text_color: Some(colors::TEXT_SECONDARY),
        border: iced::Border {
            radius: 10.0.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Style for unread-count pills in the conversation list
pub fn unread_badge(_theme: &iced::Theme) -> iced::widget::container::Appearance {
    iced::widget::container::Appearance {
        background: Some(iced::Background::Color(colors::ACCENT)),
        text_color: Some(Color::WHITE),
        border: iced::Border {
            radius: 12.0.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}
