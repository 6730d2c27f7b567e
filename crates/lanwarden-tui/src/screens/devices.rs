//! Devices screen — unapproved and approved device lists side by side.
//!
//! Rows with an operation in flight are dimmed and their action keys
//! are ignored until the busy key is released.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use tokio::sync::mpsc::UnboundedSender;

use lanwarden_core::{BusyKey, BusySet, Device};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Unapproved,
    Approved,
}

pub struct DevicesScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    busy: Arc<BusySet>,
    approved: Arc<Vec<Device>>,
    unapproved: Arc<Vec<Device>>,
    pane: Pane,
    approved_state: TableState,
    unapproved_state: TableState,
    /// Open scan-target prompt, if any.
    scan_input: Option<String>,
}

impl DevicesScreen {
    pub fn new(busy: Arc<BusySet>) -> Self {
        Self {
            focused: false,
            action_tx: None,
            busy,
            approved: Arc::new(Vec::new()),
            unapproved: Arc::new(Vec::new()),
            pane: Pane::Unapproved,
            approved_state: TableState::default(),
            unapproved_state: TableState::default(),
            scan_input: None,
        }
    }

    fn active_list(&self) -> &Arc<Vec<Device>> {
        match self.pane {
            Pane::Unapproved => &self.unapproved,
            Pane::Approved => &self.approved,
        }
    }

    fn active_state(&mut self) -> &mut TableState {
        match self.pane {
            Pane::Unapproved => &mut self.unapproved_state,
            Pane::Approved => &mut self.approved_state,
        }
    }

    fn selected_index(&self) -> usize {
        match self.pane {
            Pane::Unapproved => self.unapproved_state.selected().unwrap_or(0),
            Pane::Approved => self.approved_state.selected().unwrap_or(0),
        }
    }

    fn selected_device(&self) -> Option<&Device> {
        self.active_list().get(self.selected_index())
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.active_list().len();
        if len == 0 {
            return;
        }
        let current = self.selected_index() as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.active_state().select(Some(next));
    }

    fn clamp_selection(&mut self) {
        for pane in [Pane::Unapproved, Pane::Approved] {
            let len = match pane {
                Pane::Unapproved => self.unapproved.len(),
                Pane::Approved => self.approved.len(),
            };
            let state = match pane {
                Pane::Unapproved => &mut self.unapproved_state,
                Pane::Approved => &mut self.approved_state,
            };
            if len == 0 {
                state.select(None);
            } else if state.selected().is_none_or(|i| i >= len) {
                state.select(Some(len.saturating_sub(1).min(state.selected().unwrap_or(0))));
            }
        }
    }

    fn render_pane(&self, frame: &mut Frame, area: Rect, pane: Pane) {
        let (list, state, title) = match pane {
            Pane::Unapproved => (
                &self.unapproved,
                &self.unapproved_state,
                format!(" Unapproved ({}) ", self.unapproved.len()),
            ),
            Pane::Approved => (
                &self.approved,
                &self.approved_state,
                format!(" Approved ({}) ", self.approved.len()),
            ),
        };
        let active = pane == self.pane;

        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if active && self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let header = Row::new(vec![
            Cell::from("MAC").style(theme::table_header()),
            Cell::from("IP").style(theme::table_header()),
            Cell::from("Hostname").style(theme::table_header()),
            Cell::from("Vendor").style(theme::table_header()),
            Cell::from("Last Seen").style(theme::table_header()),
        ]);

        let selected = state.selected().unwrap_or(0);
        let rows: Vec<Row> = list
            .iter()
            .enumerate()
            .map(|(i, dev)| {
                let is_selected = active && i == selected;
                let is_busy = self.busy.contains(&BusyKey::Device(dev.key.clone()));

                let prefix = if is_selected { "▸" } else { " " };
                let hostname = dev.hostname.as_deref().unwrap_or("─");
                let vendor = dev.vendor.as_deref().unwrap_or("─");
                let last_seen = dev
                    .last_seen
                    .map(|dt| dt.format("%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "─".into());

                let row_style = if is_busy {
                    theme::table_busy()
                } else if is_selected {
                    theme::table_selected()
                } else {
                    theme::table_row()
                };

                Row::new(vec![
                    Cell::from(format!("{prefix}{}", dev.key.mac)),
                    Cell::from(dev.key.ip.clone()),
                    Cell::from(hostname.to_string()),
                    Cell::from(vendor.to_string()),
                    Cell::from(last_seen),
                ])
                .style(row_style)
            })
            .collect();

        let widths = [
            Constraint::Length(19),
            Constraint::Length(15),
            Constraint::Min(10),
            Constraint::Min(8),
            Constraint::Length(11),
        ];

        let table = Table::new(rows, widths).header(header);
        let mut render_state = state.clone();
        frame.render_stateful_widget(table, inner, &mut render_state);
    }

    fn render_scan_prompt(&self, frame: &mut Frame, area: Rect, input: &str) {
        let width = 50u16.min(area.width.saturating_sub(4));
        let x = (area.width.saturating_sub(width)) / 2;
        let y = area.height / 3;
        let prompt = Rect::new(area.x + x, area.y + y, width, 3);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            prompt,
        );
        let block = Block::default()
            .title(" Scan target (CIDR or IP, Enter to start) ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(prompt);
        frame.render_widget(block, prompt);
        frame.render_widget(Paragraph::new(format!("{input}▏")), inner);
    }
}

impl Component for DevicesScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Scan prompt captures keys while open
        if let Some(input) = &mut self.scan_input {
            match key.code {
                KeyCode::Esc => {
                    self.scan_input = None;
                }
                KeyCode::Enter => {
                    let target = input.trim().to_string();
                    self.scan_input = None;
                    if !target.is_empty() {
                        return Ok(Some(Action::StartScan(target)));
                    }
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => {
                    input.push(c);
                }
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.pane = match self.pane {
                    Pane::Unapproved => Pane::Approved,
                    Pane::Approved => Pane::Unapproved,
                };
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('g') => {
                if !self.active_list().is_empty() {
                    self.active_state().select(Some(0));
                }
            }
            KeyCode::Char('G') => {
                let len = self.active_list().len();
                if len > 0 {
                    self.active_state().select(Some(len - 1));
                }
            }
            KeyCode::Char('a') if self.pane == Pane::Unapproved => {
                if let Some(dev) = self.selected_device() {
                    if !self.busy.contains(&BusyKey::Device(dev.key.clone())) {
                        return Ok(Some(Action::Approve(dev.key.clone())));
                    }
                }
            }
            KeyCode::Char('r') if self.pane == Pane::Approved => {
                if let Some(dev) = self.selected_device() {
                    if !self.busy.contains(&BusyKey::Device(dev.key.clone())) {
                        return Ok(Some(Action::Revoke(dev.key.clone())));
                    }
                }
            }
            KeyCode::Char('s') => {
                self.scan_input = Some(String::new());
            }
            _ => {}
        }
        Ok(None)
    }

    fn wants_text_input(&self) -> bool {
        self.scan_input.is_some()
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ApprovedUpdated(list) => {
                self.approved = Arc::clone(list);
                self.clamp_selection();
            }
            Action::UnapprovedUpdated(list) => {
                self.unapproved = Arc::clone(list);
                self.clamp_selection();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Min(1),    // panes
            Constraint::Length(1), // hints
        ])
        .split(area);

        let panes =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(layout[0]);

        self.render_pane(frame, panes[0], Pane::Unapproved);
        self.render_pane(frame, panes[1], Pane::Approved);

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("Tab ", theme::key_hint_key()),
            Span::styled("pane  ", theme::key_hint()),
            Span::styled("a ", theme::key_hint_key()),
            Span::styled("approve  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("revoke  ", theme::key_hint()),
            Span::styled("s ", theme::key_hint_key()),
            Span::styled("scan", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);

        if let Some(input) = &self.scan_input {
            self.render_scan_prompt(frame, area, input);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Devices"
    }
}
