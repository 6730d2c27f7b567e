//! Application core — event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use lanwarden_core::SessionState;

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::data_bridge::Hub;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// How long a toast stays visible.
const TOAST_LIFETIME: Duration = Duration::from_secs(4);

/// Top-level application state and event loop.
pub struct App {
    hub: Hub,
    /// Current active screen.
    active_screen: ScreenId,
    /// Where the user wanted to go when the gate sent them to Login.
    requested_screen: Option<ScreenId>,
    /// All screen components, keyed by ScreenId.
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Whether the app should keep running.
    running: bool,
    /// Last session state reported by the gate.
    session: SessionState,
    /// Due-schedule count for the status-bar badge.
    due_count: usize,
    /// Help overlay visibility.
    help_visible: bool,
    /// Active toast and its expiry.
    toast: Option<(Notification, Instant)>,
    /// Action sender — components can dispatch actions through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver — main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(hub: Hub) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens(hub.busy.clone()).into_iter().collect();

        Self {
            hub,
            active_screen: ScreenId::Login,
            requested_screen: Some(ScreenId::default()),
            screens,
            running: true,
            session: SessionState::default(),
            due_count: 0,
            help_visible: false,
            toast: None,
            action_tx,
            action_rx,
        }
    }

    /// Expose the action sender so the data bridge can be wired up.
    pub fn action_tx(&self) -> mpsc::UnboundedSender<Action> {
        self.action_tx.clone()
    }

    /// Initialize all screen components with the action sender.
    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop. This is the heart of the TUI.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        // Kick off the first gate check for the default screen.
        self.action_tx.send(Action::NavigateTo(ScreenId::default()))?;

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            // 1. Wait for the next event
            let Some(event) = events.next().await else {
                break;
            };

            // 2. Map event → action(s)
            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            // 3. Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        // On the login screen every printable key belongs to the input
        // fields; only Ctrl+C quits globally.
        if self.active_screen == ScreenId::Login {
            if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
                return Ok(Some(Action::Quit));
            }
            if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                return screen.handle_key_event(key);
            }
            return Ok(None);
        }

        // Screens with an open text prompt claim keys before the
        // global bindings run.
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if screen.wants_text_input() {
                if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
                    return Ok(Some(Action::Quit));
                }
                return screen.handle_key_event(key);
            }
        }

        // Global keybindings
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),

            // Screen navigation via number keys
            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='2')) => {
                let n = c as u8 - b'0';
                if let Some(screen) = ScreenId::from_number(n) {
                    return Ok(Some(Action::NavigateTo(screen)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Char('R')) | (KeyModifiers::SHIFT, KeyCode::Char('R')) => {
                return Ok(Some(Action::Refresh));
            }

            (KeyModifiers::CONTROL, KeyCode::Char('l')) => {
                return Ok(Some(Action::Logout));
            }

            _ => {}
        }

        // Delegate to active screen component
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    /// Process a single action — update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(..) => {}

            Action::Tick => {
                if let Some((_, expires)) = &self.toast {
                    if Instant::now() >= *expires {
                        self.toast = None;
                    }
                }
                self.propagate(action)?;
            }

            // Navigation intent. Protected targets wait for the gate;
            // the probe result arrives as SessionChanged.
            Action::NavigateTo(target) => {
                if !target.protected() {
                    self.action_tx.send(Action::ActivateScreen(*target))?;
                } else {
                    self.requested_screen = Some(*target);
                    let gate = self.hub.gate.clone();
                    tokio::spawn(async move {
                        gate.probe().await;
                    });
                }
            }

            Action::ActivateScreen(target) => {
                self.activate(*target)?;
            }

            Action::SessionChanged(state) => {
                self.session = state.clone();
                match state {
                    SessionState::Authed { .. } => {
                        let target = self
                            .requested_screen
                            .take()
                            .filter(|s| s.protected())
                            .unwrap_or_default();
                        self.action_tx.send(Action::ActivateScreen(target))?;
                        self.action_tx.send(Action::Refresh)?;
                    }
                    SessionState::Unauthenticated => {
                        if self.active_screen.protected() && self.requested_screen.is_none() {
                            self.requested_screen = Some(self.active_screen);
                        }
                        self.action_tx.send(Action::ActivateScreen(ScreenId::Login))?;
                    }
                    SessionState::Probing => {}
                }
                self.propagate(action)?;
            }

            Action::SubmitLogin { username, password } => {
                let gate = self.hub.gate.clone();
                let tx = self.action_tx.clone();
                let username = username.clone();
                let password = password.clone().into();
                tokio::spawn(async move {
                    if let Err(e) = gate.login(&username, &password).await {
                        warn!(error = %e, "login failed");
                        let _ = tx.send(Action::Notify(Notification::error(format!(
                            "Login failed: {e}"
                        ))));
                    }
                });
            }

            Action::Logout => {
                let gate = self.hub.gate.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let _ = gate.logout().await;
                    let _ = tx.send(Action::Notify(Notification::info("Logged out")));
                });
            }

            Action::DueCountUpdated(n) => {
                self.due_count = *n;
                self.propagate(action)?;
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Notify(notification) => {
                self.toast = Some((notification.clone(), Instant::now() + TOAST_LIFETIME));
            }

            Action::Refresh
            | Action::Approve(_)
            | Action::Revoke(_)
            | Action::StartScan(_)
            | Action::PlanScan { .. }
            | Action::RunNow(_)
            | Action::PauseSchedule(_)
            | Action::DeleteSchedule(_) => {
                self.spawn_command(action.clone());
            }

            // Render is handled in the main loop, not here
            Action::Render => {}

            // Data updates and log lines go to every screen so state
            // stays current across switches.
            other => {
                self.propagate(other)?;
            }
        }

        Ok(())
    }

    /// Forward an action to all screens, re-queueing any follow-ups.
    fn propagate(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn activate(&mut self, target: ScreenId) -> Result<()> {
        if target != self.active_screen {
            debug!("switching screen: {} → {}", self.active_screen, target);
            if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                screen.set_focused(false);
            }
            self.active_screen = target;
            if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                screen.set_focused(true);
            }
        }
        Ok(())
    }

    /// Run a synchronizer call on a background task, reporting the
    /// outcome through the action channel.
    fn spawn_command(&self, action: Action) {
        let hub = self.hub.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome: std::result::Result<Option<String>, String> = match &action {
                Action::Refresh => {
                    let (lists, board) = tokio::join!(hub.lists.refresh(), hub.board.refresh());
                    lists
                        .and(board)
                        .map(|()| None)
                        .map_err(|e| format!("Refresh failed: {e}"))
                }
                Action::Approve(key) => hub
                    .lists
                    .approve(key)
                    .await
                    .map(|()| Some(format!("Approved {key}")))
                    .map_err(|e| format!("Approve failed: {e}")),
                Action::Revoke(key) => hub
                    .lists
                    .revoke(key)
                    .await
                    .map(|()| Some(format!("Revoked {key}")))
                    .map_err(|e| format!("Revoke failed: {e}")),
                Action::StartScan(target) => hub
                    .lists
                    .start_scan(target)
                    .await
                    .map(|()| Some(format!("Scan of {target} started")))
                    .map_err(|e| format!("Scan failed: {e}")),
                Action::PlanScan { interval, target } => hub
                    .board
                    .plan_scan(*interval, target)
                    .await
                    .map(|()| Some(format!("Planned {target} every {interval} min")))
                    .map_err(|e| format!("Plan failed: {e}")),
                Action::RunNow(id) => match find_row(&hub, *id) {
                    Some(row) => hub
                        .board
                        .run_now(&row)
                        .await
                        .map(|()| Some(format!("Scan of {} started", row.target)))
                        .map_err(|e| format!("Run failed: {e}")),
                    None => Err("Schedule no longer exists".into()),
                },
                Action::PauseSchedule(id) => match find_row(&hub, *id) {
                    Some(row) => hub
                        .board
                        .stop(&row)
                        .await
                        .map(|()| Some(format!("Paused {}", row.target)))
                        .map_err(|e| format!("Pause failed: {e}")),
                    None => Err("Schedule no longer exists".into()),
                },
                Action::DeleteSchedule(id) => match find_row(&hub, *id) {
                    Some(row) => hub
                        .board
                        .delete(&row)
                        .await
                        .map(|()| Some(format!("Deleted schedule for {}", row.target)))
                        .map_err(|e| format!("Delete failed: {e}")),
                    None => Err("Schedule no longer exists".into()),
                },
                _ => Ok(None),
            };

            match outcome {
                Ok(Some(message)) => {
                    let _ = tx.send(Action::LogLine(message.clone()));
                    let _ = tx.send(Action::Notify(Notification::success(message)));
                }
                Ok(None) => {}
                Err(message) => {
                    let _ = tx.send(Action::LogLine(message.clone()));
                    let _ = tx.send(Action::Notify(Notification::error(message)));
                }
            }
        });
    }

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: [screen content] [tab bar] [status bar]
        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        let content_area = layout[0];
        let tab_area = layout[1];
        let status_area = layout[2];

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content_area);
        }

        self.render_tab_bar(frame, tab_area);
        self.render_status_bar(frame, status_area);

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    /// Render the bottom tab bar. Login is deliberately absent.
    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::TABS
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                let badge = if id == ScreenId::Scans && self.due_count > 0 {
                    format!(" ({} due)", self.due_count)
                } else {
                    String::new()
                };
                Line::from(Span::styled(
                    format!(" {} {}{} ", id.number(), id.label(), badge),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::TABS
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    /// Render the bottom status bar with session state and key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let session_indicator = match &self.session {
            SessionState::Authed { username } => Span::styled(
                format!("● {username}"),
                Style::default().fg(theme::SUCCESS_GREEN),
            ),
            SessionState::Probing => Span::styled(
                "◐ checking session",
                Style::default().fg(theme::WARNING_YELLOW),
            ),
            SessionState::Unauthenticated => {
                Span::styled("○ logged out", Style::default().fg(theme::ERROR_RED))
            }
        };

        let mut spans = vec![Span::raw(" "), session_indicator];

        if let Some((toast, _)) = &self.toast {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                toast.message.clone(),
                theme::notification(toast.level),
            ));
        } else {
            spans.push(Span::styled(
                " │ ? help  R refresh  q quit",
                theme::key_hint(),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// Render the help overlay centered on screen.
    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_width = 58u16.min(area.width.saturating_sub(4));
        let help_height = 20u16.min(area.height.saturating_sub(4));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;

        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        // Clear the background
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let row = |key: &str, desc: &str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(desc.to_owned(), theme::key_hint()),
            ])
        };

        let help_text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Navigation",
                Style::default().fg(theme::HEADER),
            )),
            Line::from(Span::styled("  ─────────", theme::key_hint())),
            row("1-2", "Jump to screen"),
            row("j/k ↑/↓", "Move up/down"),
            row("Tab", "Switch pane / field"),
            row("Esc", "Close prompt"),
            Line::from(""),
            Line::from(Span::styled("  Actions", Style::default().fg(theme::HEADER))),
            Line::from(Span::styled("  ───────", theme::key_hint())),
            row("a", "Approve device"),
            row("r", "Revoke device"),
            row("s", "Start scan"),
            row("n/p/d", "Run / pause / delete schedule"),
            row("R", "Refresh all"),
            row("Ctrl+l", "Log out"),
            row("q", "Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "                       Esc or ? to close",
                theme::key_hint(),
            )),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }
}

/// Resolve a schedule row id against the board's current snapshot.
fn find_row(hub: &Hub, id: uuid::Uuid) -> Option<lanwarden_core::PlannedScan> {
    hub.board.scheduled().iter().find(|r| r.id == id).cloned()
}
