//! Login screen — the gate's landing spot when no session exists.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use lanwarden_core::SessionState;

use crate::action::Action;
use crate::component::Component;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
}

pub struct LoginScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    username: String,
    password: String,
    field: Field,
    /// True while a submitted login or probe is outstanding.
    checking: bool,
    error: Option<String>,
}

impl LoginScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            action_tx: None,
            username: String::new(),
            password: String::new(),
            field: Field::Username,
            checking: false,
            error: None,
        }
    }

    fn active_input_mut(&mut self) -> &mut String {
        match self.field {
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
        }
    }

    fn submit(&mut self) -> Option<Action> {
        if self.username.trim().is_empty() {
            self.error = Some("Username cannot be empty".into());
            return None;
        }
        if self.password.is_empty() {
            self.error = Some("Password cannot be empty".into());
            return None;
        }
        self.error = None;
        self.checking = true;
        Some(Action::SubmitLogin {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }

    fn render_input_field(
        &self,
        frame: &mut Frame,
        area: Rect,
        label: &str,
        value: &str,
        active: bool,
        masked: bool,
    ) {
        if area.height < 3 {
            return;
        }

        let label_style = if active {
            Style::default().fg(theme::ACCENT)
        } else {
            Style::default().fg(theme::DIM_WHITE)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label.to_owned(), label_style)),
            Rect::new(area.x, area.y, area.width, 1),
        );

        let shown = if masked {
            "•".repeat(value.chars().count())
        } else {
            value.to_owned()
        };
        let cursor = if active { "▏" } else { "" };
        let box_style = if active {
            theme::border_focused()
        } else {
            theme::border_default()
        };
        let input = Paragraph::new(format!("{shown}{cursor}")).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(box_style),
        );
        frame.render_widget(input, Rect::new(area.x, area.y + 1, area.width, 3));
    }
}

impl Component for LoginScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.checking {
            return Ok(None);
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.field = match self.field {
                    Field::Username => Field::Password,
                    Field::Password => Field::Username,
                };
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.field = match self.field {
                    Field::Username => Field::Password,
                    Field::Password => Field::Username,
                };
            }
            KeyCode::Enter => {
                if self.field == Field::Username && self.password.is_empty() {
                    self.field = Field::Password;
                } else {
                    return Ok(self.submit());
                }
            }
            KeyCode::Backspace => {
                self.active_input_mut().pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.active_input_mut().clear();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.active_input_mut().push(c);
            }
            _ => {}
        }
        Ok(None)
    }

    fn wants_text_input(&self) -> bool {
        true
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SessionChanged(state) => {
                self.checking = matches!(state, SessionState::Probing);
                if matches!(state, SessionState::Authed { .. }) {
                    self.password.clear();
                    self.error = None;
                }
            }
            Action::Notify(n) if self.checking || self.focused => {
                if n.level == crate::action::NotificationLevel::Error {
                    self.checking = false;
                    self.error = Some(n.message.clone());
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let panel_w = 48u16.min(area.width.saturating_sub(4));
        let panel_h = 15u16.min(area.height.saturating_sub(2));
        let x = (area.width.saturating_sub(panel_w)) / 2;
        let y = (area.height.saturating_sub(panel_h)) / 2;
        let panel = Rect::new(area.x + x, area.y + y, panel_w, panel_h);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            panel,
        );

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    "Sign In",
                    Style::default()
                        .fg(theme::HEADER)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let rows = Layout::vertical([
            Constraint::Length(1), // spacer
            Constraint::Length(4), // username
            Constraint::Length(4), // password
            Constraint::Length(1), // status / error
            Constraint::Length(1), // hints
        ])
        .split(inner);

        self.render_input_field(
            frame,
            rows[1],
            " Username",
            &self.username,
            self.field == Field::Username,
            false,
        );
        self.render_input_field(
            frame,
            rows[2],
            " Password",
            &self.password,
            self.field == Field::Password,
            true,
        );

        let status = if self.checking {
            Line::from(Span::styled(
                "  Checking credentials…",
                Style::default().fg(theme::WARNING_YELLOW),
            ))
        } else if let Some(err) = &self.error {
            Line::from(Span::styled(
                format!("  {err}"),
                Style::default().fg(theme::ERROR_RED),
            ))
        } else {
            Line::from("")
        };
        frame.render_widget(Paragraph::new(status), rows[3]);

        let hints = Line::from(vec![
            Span::styled("  Tab ", theme::key_hint_key()),
            Span::styled("switch field  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("sign in  ", theme::key_hint()),
            Span::styled("Ctrl+C ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), rows[4]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Login"
    }
}
