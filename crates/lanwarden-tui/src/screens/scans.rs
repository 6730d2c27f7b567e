//! Scans screen — the planned-scan schedule plus an activity log.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use lanwarden_core::{BusyKey, BusySet, PlannedScan};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

/// Keep the activity log bounded.
const LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Interval,
    Target,
}

/// The new-schedule form, open as an overlay.
struct PlanForm {
    interval: String,
    target: String,
    field: FormField,
    error: Option<String>,
}

impl PlanForm {
    fn new() -> Self {
        Self {
            interval: String::new(),
            target: String::new(),
            field: FormField::Target,
            error: None,
        }
    }

    fn active_input_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Interval => &mut self.interval,
            FormField::Target => &mut self.target,
        }
    }

    fn toggle_field(&mut self) {
        self.field = match self.field {
            FormField::Interval => FormField::Target,
            FormField::Target => FormField::Interval,
        };
    }

    fn submit(&mut self) -> Option<Action> {
        let target = self.target.trim().to_string();
        if target.is_empty() {
            self.error = Some("Target cannot be empty".into());
            return None;
        }
        let interval = match self.interval.trim().parse::<i64>() {
            Ok(n) if n > 0 => n,
            _ => {
                self.error = Some("Interval must be a positive number of minutes".into());
                return None;
            }
        };
        Some(Action::PlanScan { interval, target })
    }
}

pub struct ScansScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    busy: Arc<BusySet>,
    schedule: Arc<Vec<PlannedScan>>,
    due_count: usize,
    table_state: TableState,
    form: Option<PlanForm>,
    log: Vec<String>,
}

impl ScansScreen {
    pub fn new(busy: Arc<BusySet>) -> Self {
        Self {
            focused: false,
            action_tx: None,
            busy,
            schedule: Arc::new(Vec::new()),
            due_count: 0,
            table_state: TableState::default(),
            form: None,
            log: Vec::new(),
        }
    }

    fn selected_row(&self) -> Option<&PlannedScan> {
        self.schedule.get(self.table_state.selected().unwrap_or(0))
    }

    fn move_selection(&mut self, delta: isize) {
        if self.schedule.is_empty() {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, self.schedule.len() as isize - 1);
        self.table_state.select(Some(next as usize));
    }

    fn row_busy(&self, id: Uuid) -> bool {
        self.busy.contains(&BusyKey::Run(id))
            || self.busy.contains(&BusyKey::Pause(id))
            || self.busy.contains(&BusyKey::Delete(id))
    }

    fn push_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > LOG_CAPACITY {
            let excess = self.log.len() - LOG_CAPACITY;
            self.log.drain(..excess);
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let title = if self.due_count > 0 {
            format!(" Planned Scans ({}, {} due) ", self.schedule.len(), self.due_count)
        } else {
            format!(" Planned Scans ({}) ", self.schedule.len())
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let header = Row::new(vec![
            Cell::from("Target").style(theme::table_header()),
            Cell::from("Interval").style(theme::table_header()),
            Cell::from("Next Scan").style(theme::table_header()),
            Cell::from("Last Scan").style(theme::table_header()),
        ]);

        let selected = self.table_state.selected().unwrap_or(0);
        let rows: Vec<Row> = self
            .schedule
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let is_selected = i == selected;
                let is_busy = self.row_busy(row.id);
                let prefix = if is_selected { "▸" } else { " " };

                let next = if row.is_paused() {
                    "paused".to_string()
                } else {
                    row.next_scan_at
                        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "─".into())
                };
                let last = row
                    .last_scan_at
                    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".into());

                let row_style = if is_busy {
                    theme::table_busy()
                } else if is_selected {
                    theme::table_selected()
                } else if row.is_paused() {
                    Style::default().fg(theme::WARNING_YELLOW)
                } else {
                    theme::table_row()
                };

                Row::new(vec![
                    Cell::from(format!("{prefix}{}", row.target)),
                    Cell::from(format!("{} min", row.interval)),
                    Cell::from(next),
                    Cell::from(last),
                ])
                .style(row_style)
            })
            .collect();

        let widths = [
            Constraint::Min(18),
            Constraint::Length(10),
            Constraint::Length(17),
            Constraint::Length(17),
        ];

        let table = Table::new(rows, widths).header(header);
        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, inner, &mut state);
    }

    fn render_log(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Activity ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let visible = inner.height as usize;
        let start = self.log.len().saturating_sub(visible);
        let lines: Vec<Line> = self.log[start..]
            .iter()
            .map(|l| Line::from(Span::styled(l.clone(), theme::table_row())))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, form: &PlanForm) {
        let width = 52u16.min(area.width.saturating_sub(4));
        let height = 11u16.min(area.height.saturating_sub(2));
        let x = (area.width.saturating_sub(width)) / 2;
        let y = (area.height.saturating_sub(height)) / 2;
        let panel = Rect::new(area.x + x, area.y + y, width, height);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            panel,
        );
        let block = Block::default()
            .title(" New Planned Scan ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let rows = Layout::vertical([
            Constraint::Length(4), // target
            Constraint::Length(4), // interval
            Constraint::Length(1), // error
        ])
        .split(inner);

        let field = |frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool| {
            let label_style = if active {
                Style::default().fg(theme::ACCENT)
            } else {
                Style::default().fg(theme::DIM_WHITE)
            };
            frame.render_widget(
                Paragraph::new(Span::styled(label.to_owned(), label_style)),
                Rect::new(area.x, area.y, area.width, 1),
            );
            let cursor = if active { "▏" } else { "" };
            let input = Paragraph::new(format!("{value}{cursor}")).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(if active {
                        theme::border_focused()
                    } else {
                        theme::border_default()
                    }),
            );
            frame.render_widget(input, Rect::new(area.x, area.y + 1, area.width, 3));
        };

        field(
            frame,
            rows[0],
            " Target (CIDR or IP)",
            &form.target,
            form.field == FormField::Target,
        );
        field(
            frame,
            rows[1],
            " Interval (minutes)",
            &form.interval,
            form.field == FormField::Interval,
        );

        if let Some(err) = &form.error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("  {err}"),
                    Style::default().fg(theme::ERROR_RED),
                )),
                rows[2],
            );
        }
    }
}

impl Component for ScansScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(form) = &mut self.form {
            match key.code {
                KeyCode::Esc => {
                    self.form = None;
                }
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    form.toggle_field();
                }
                KeyCode::Enter => {
                    if let Some(action) = form.submit() {
                        self.form = None;
                        return Ok(Some(action));
                    }
                }
                KeyCode::Backspace => {
                    form.active_input_mut().pop();
                }
                KeyCode::Char(c) => {
                    form.active_input_mut().push(c);
                }
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('c') => {
                self.form = Some(PlanForm::new());
            }
            KeyCode::Char('n') => {
                if let Some(row) = self.selected_row() {
                    if !self.row_busy(row.id) {
                        return Ok(Some(Action::RunNow(row.id)));
                    }
                }
            }
            KeyCode::Char('p') => {
                if let Some(row) = self.selected_row() {
                    if !self.row_busy(row.id) && !row.is_paused() {
                        return Ok(Some(Action::PauseSchedule(row.id)));
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(row) = self.selected_row() {
                    if !self.row_busy(row.id) {
                        return Ok(Some(Action::DeleteSchedule(row.id)));
                    }
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn wants_text_input(&self) -> bool {
        self.form.is_some()
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ScheduleUpdated(rows) => {
                self.schedule = Arc::clone(rows);
                if self.schedule.is_empty() {
                    self.table_state.select(None);
                } else if self
                    .table_state
                    .selected()
                    .is_none_or(|i| i >= self.schedule.len())
                {
                    self.table_state.select(Some(self.schedule.len() - 1));
                }
            }
            Action::DueCountUpdated(n) => {
                self.due_count = *n;
            }
            Action::LogLine(line) => {
                let stamp = chrono::Local::now().format("%H:%M:%S");
                self.push_log(format!("{stamp}  {line}"));
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Min(6),     // schedule table
            Constraint::Length(8),  // activity log
            Constraint::Length(1),  // hints
        ])
        .split(area);

        self.render_table(frame, layout[0]);
        self.render_log(frame, layout[1]);

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("c ", theme::key_hint_key()),
            Span::styled("new  ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("run now  ", theme::key_hint()),
            Span::styled("p ", theme::key_hint_key()),
            Span::styled("pause  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[2]);

        if let Some(form) = &self.form {
            self.render_form(frame, area, form);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Scans"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_rejects_bad_input_without_submitting() {
        let mut form = PlanForm::new();
        assert!(form.submit().is_none());

        form.target = "192.168.1.0/24".into();
        form.interval = "0".into();
        assert!(form.submit().is_none());

        form.interval = "60".into();
        match form.submit() {
            Some(Action::PlanScan { interval, target }) => {
                assert_eq!(interval, 60);
                assert_eq!(target, "192.168.1.0/24");
            }
            other => panic!("expected PlanScan, got {other:?}"),
        }
    }
}
