//! Color palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const ACCENT: Color = Color::Rgb(130, 170, 255); // periwinkle
pub const HEADER: Color = Color::Rgb(137, 221, 255); // sky
pub const SUCCESS_GREEN: Color = Color::Rgb(105, 240, 174);
pub const WARNING_YELLOW: Color = Color::Rgb(255, 203, 107);
pub const ERROR_RED: Color = Color::Rgb(255, 110, 110);

pub const DIM_WHITE: Color = Color::Rgb(171, 178, 191);
pub const BORDER_GRAY: Color = Color::Rgb(92, 99, 112);
pub const BG_HIGHLIGHT: Color = Color::Rgb(44, 49, 60);
pub const BG_DARK: Color = Color::Rgb(26, 29, 35);

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(HEADER).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(ACCENT)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(HEADER)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Normal table row text.
pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Selected / highlighted table row.
pub fn table_selected() -> Style {
    Style::default()
        .fg(ACCENT)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// A row with an operation in flight: dimmed, actions ignored.
pub fn table_busy() -> Style {
    Style::default()
        .fg(BORDER_GRAY)
        .add_modifier(Modifier::DIM | Modifier::ITALIC)
}

/// Active tab in the tab bar.
pub fn tab_active() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Inactive tab in the tab bar.
pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(HEADER).add_modifier(Modifier::BOLD)
}

/// Toast styling per severity.
pub fn notification(level: crate::action::NotificationLevel) -> Style {
    use crate::action::NotificationLevel;
    match level {
        NotificationLevel::Info => Style::default().fg(DIM_WHITE),
        NotificationLevel::Success => Style::default().fg(SUCCESS_GREEN),
        NotificationLevel::Error => Style::default().fg(ERROR_RED).add_modifier(Modifier::BOLD),
    }
}
