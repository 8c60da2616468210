//! The app loop: terminal events in, actions through the queue, one frame
//! per render tick.
//!
//! Fleet actions are broadcast to every screen so switching tabs never
//! shows stale data. Tracker snapshots and admin results go to the one
//! screen that owns them. Writes run as spawned tasks and report back
//! through toasts.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bustrack_core::{Command, Controller, SimulationParams};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::keymap;
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

const TICK_RATE: Duration = Duration::from_millis(250);
const FRAME_RATE: Duration = Duration::from_millis(33);
const TOAST_TTL: Duration = Duration::from_secs(3);

/// Fleet load state for the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug)]
struct Toast {
    note: Notification,
    shown: Instant,
}

pub struct App {
    screens: HashMap<ScreenId, Box<dyn Component>>,
    active: ScreenId,
    previous: Option<ScreenId>,
    running: bool,
    load: LoadStatus,
    help: bool,
    /// `Some` while the dashboard search prompt is open.
    search: Option<String>,
    toast: Option<Toast>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    bridge: CancellationToken,
}

impl App {
    pub fn new(controller: Controller, params: SimulationParams) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            screens: create_screens(params).into_iter().collect(),
            active: ScreenId::default(),
            previous: None,
            running: true,
            load: LoadStatus::default(),
            help: false,
            search: None,
            toast: None,
            tx,
            rx,
            controller,
            bridge: CancellationToken::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::start()?;

        for screen in self.screens.values_mut() {
            screen.init(self.tx.clone())?;
        }
        self.set_focus(self.active, true);

        tokio::spawn(crate::data_bridge::spawn_data_bridge(
            self.controller.clone(),
            self.tx.clone(),
            self.bridge.clone(),
        ));

        let mut events = EventReader::new(TICK_RATE, FRAME_RATE);
        info!("event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };
            let queued = match event {
                Event::Key(key) => self.handle_key_event(key)?,
                Event::Resize(cols, rows) => Some(Action::Resize(cols, rows)),
                Event::Tick => Some(Action::Tick),
                Event::Render => Some(Action::Render),
            };
            if let Some(action) = queued {
                self.tx.send(action)?;
            }

            while let Ok(action) = self.rx.try_recv() {
                if matches!(action, Action::Render) {
                    tui.draw(|frame| self.render(frame))?;
                } else {
                    self.process_action(&action)?;
                }
            }
        }

        self.bridge.cancel();
        events.stop();
        info!("event loop ended");
        Ok(())
    }

    /// Open forms see every key but Ctrl+C. After that come the search
    /// prompt, the help overlay, global bindings, and finally the screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let active = self.active;
        let Some(screen) = self.screens.get_mut(&active) else {
            return Ok(None);
        };

        if screen.captures_input() {
            if keymap::is_ctrl_c(&key) {
                return Ok(Some(Action::Quit));
            }
            return screen.handle_key_event(key);
        }
        if let Some(query) = self.search.as_mut() {
            return Ok(keymap::search(query, &key));
        }
        if self.help {
            return Ok(keymap::help(&key));
        }
        match keymap::global(&key, active) {
            Some(action) => Ok(Some(action)),
            None => screen.handle_key_event(key),
        }
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Render | Action::Resize(..) => {}
            Action::Tick => {
                if self
                    .toast
                    .as_ref()
                    .is_some_and(|t| t.shown.elapsed() > TOAST_TTL)
                {
                    self.toast = None;
                }
            }

            Action::SwitchScreen(target) => self.switch_to(*target),
            Action::GoBack => {
                if let Some(prev) = self.previous.take() {
                    self.switch_to(prev);
                }
            }
            Action::ToggleHelp => self.help = !self.help,

            Action::OpenSearch => self.search = Some(String::new()),
            // Enter hides the prompt and leaves the filter applied
            Action::SearchSubmit => self.search = None,
            Action::SearchInput(_) => self.deliver(ScreenId::Dashboard, action)?,
            Action::CloseSearch => {
                self.search = None;
                self.deliver(ScreenId::Dashboard, action)?;
            }

            Action::Loading | Action::Loaded | Action::LoadFailed(_) | Action::BusesUpdated(_) => {
                self.load = match action {
                    Action::Loading => LoadStatus::Loading,
                    Action::Loaded => LoadStatus::Loaded,
                    Action::LoadFailed(_) => LoadStatus::Failed,
                    _ => self.load,
                };
                for id in ScreenId::ALL {
                    self.deliver(id, action)?;
                }
            }
            Action::Refresh => {
                self.notify(Notification::info("Reloading buses…"));
                let controller = self.controller.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    crate::data_bridge::refresh(&controller, &tx).await;
                });
            }

            Action::TrackLive(id) => {
                // The ack is informational; only its failure is shown
                self.spawn_command(Command::TrackBus { id: id.clone() }, None);
                self.switch_to(ScreenId::Tracking);
                self.deliver(ScreenId::Tracking, action)?;
            }
            Action::TrackingUpdated(_) => self.deliver(ScreenId::Tracking, action)?,

            Action::CreateBus(bus) => {
                self.spawn_command(Command::CreateBus(bus.clone()), Some("New route added!"));
            }
            Action::SaveBus { id, bus } => {
                let cmd = Command::UpdateBus {
                    id: id.clone(),
                    bus: bus.clone(),
                };
                self.spawn_command(cmd, Some("Changes saved!"));
            }
            Action::AdminSaved => self.deliver(ScreenId::Admin, action)?,

            Action::Notify(note) => self.notify(note.clone()),
        }
        Ok(())
    }

    fn set_focus(&mut self, id: ScreenId, focused: bool) {
        if let Some(screen) = self.screens.get_mut(&id) {
            screen.set_focused(focused);
        }
    }

    fn switch_to(&mut self, target: ScreenId) {
        if target == self.active {
            return;
        }
        debug!(from = %self.active, to = %target, "switching screen");
        self.set_focus(self.active, false);
        self.previous = Some(self.active);
        self.active = target;
        self.search = None;
        self.set_focus(target, true);
    }

    /// Hand an action to one screen and queue whatever it answers with.
    fn deliver(&mut self, target: ScreenId, action: &Action) -> Result<()> {
        let Some(screen) = self.screens.get_mut(&target) else {
            return Ok(());
        };
        if let Some(follow_up) = screen.update(action)? {
            self.tx.send(follow_up)?;
        }
        Ok(())
    }

    fn notify(&mut self, note: Notification) {
        self.toast = Some(Toast {
            note,
            shown: Instant::now(),
        });
    }

    /// Run a write in the background. With a success message the result is
    /// toasted and the admin form closes; a failure toasts the operation's
    /// generic message.
    fn spawn_command(&self, cmd: Command, success: Option<&'static str>) {
        let controller = self.controller.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let op = cmd.operation();
            match controller.execute(cmd).await {
                Ok(_) => {
                    if let Some(msg) = success {
                        let _ = tx.send(Action::Notify(Notification::success(msg)));
                        let _ = tx.send(Action::AdminSaved);
                    }
                }
                Err(e) => {
                    warn!(error = %e, op = %op, "command failed");
                    let _ = tx.send(Action::Notify(Notification::error(e.user_message(op))));
                }
            }
        });
    }

    // ── Drawing ─────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let [body, tabs, status] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active) {
            screen.render(frame, body);
        }
        frame.render_widget(Paragraph::new(self.tab_line()), tabs);
        frame.render_widget(Paragraph::new(self.status_line()), status);

        if let Some(toast) = &self.toast {
            draw_toast(frame, area, &toast.note);
        }
        if self.help {
            draw_help(frame, area);
        }
    }

    fn tab_line(&self) -> Line<'static> {
        let mut spans = Vec::with_capacity(ScreenId::ALL.len() * 2);
        for id in ScreenId::ALL {
            let style = theme::tab(id == self.active);
            spans.push(Span::styled(format!(" {} {} ", id.number(), id.label()), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }

    fn status_line(&self) -> Line<'_> {
        if let Some(query) = &self.search {
            return Line::from(vec![
                Span::styled(" / ", Style::default().fg(theme::ACCENT)),
                Span::styled(query.as_str(), Style::default().fg(theme::CYAN)),
                Span::styled("█", Style::default().fg(theme::CYAN)),
                Span::styled("  Enter keep  Esc clear", theme::hint()),
            ]);
        }

        let (dot, label, color) = match self.load {
            LoadStatus::Idle => ("○", "idle", theme::MUTED),
            LoadStatus::Loading => ("◐", "loading", theme::AMBER),
            LoadStatus::Loaded => ("●", "loaded", theme::GREEN),
            LoadStatus::Failed => ("○", "offline", theme::RED),
        };
        Line::from(vec![
            Span::styled(format!(" {dot} {label}"), Style::default().fg(color)),
            Span::styled(
                " │ ? help  / search  Ctrl+R reload  q quit",
                theme::hint(),
            ),
        ])
    }
}

/// Centre a `width` x `height` box inside `area`, shrinking to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_help(frame: &mut Frame, area: Rect) {
    const SECTIONS: &[(&str, &[(&str, &str)])] = &[
        (
            "Navigation",
            &[
                ("1-3 / Tab", "Switch screen"),
                ("j/k ↑/↓", "Move selection"),
                ("Esc", "Back / close"),
            ],
        ),
        (
            "Dashboard",
            &[
                ("/", "Search number, route, stop"),
                ("r", "Cycle route filter"),
                ("Enter", "Toggle schedule"),
                ("t", "Track selected bus"),
            ],
        ),
        (
            "Live Tracking",
            &[("[ ]", "Previous / next bus"), ("Space", "Start / stop")],
        ),
        (
            "Admin Panel",
            &[("e / a", "Edit status / add route"), ("Ctrl+S", "Save form")],
        ),
        ("Global", &[("Ctrl+R", "Reload fleet"), ("q", "Quit")]),
    ];

    let mut lines = Vec::new();
    for (title, keys) in SECTIONS {
        lines.push(Line::from(Span::styled(
            format!(" {title}"),
            Style::default().fg(theme::CYAN),
        )));
        for (key, what) in *keys {
            lines.push(Line::from(vec![
                Span::styled(format!("   {key:<11}"), theme::hint_key()),
                Span::styled(*what, theme::hint()),
            ]));
        }
    }

    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
    let box_area = centered(area, 52, height);
    let block = Block::default()
        .title(" Keys · Esc or ? to close ")
        .title_style(theme::title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(Style::default().bg(theme::BG_PANEL));

    frame.render_widget(Clear, box_area);
    frame.render_widget(Paragraph::new(lines).block(block), box_area);
}

/// Toast in the bottom-right corner, above the status bar.
fn draw_toast(frame: &mut Frame, area: Rect, note: &Notification) {
    let (color, icon) = match note.level {
        NotificationLevel::Success => (theme::GREEN, "✓"),
        NotificationLevel::Error => (theme::RED, "✗"),
        NotificationLevel::Info => (theme::CYAN, "·"),
    };

    let text_width = u16::try_from(note.message.chars().count()).unwrap_or(u16::MAX);
    let width = text_width.saturating_add(6).clamp(20, 60).min(area.width);
    let toast_area = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + area.height.saturating_sub(5),
        width,
        3.min(area.height),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_PANEL));
    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(note.message.as_str(), Style::default().fg(theme::TEXT)),
    ]);

    frame.render_widget(Clear, toast_area);
    frame.render_widget(Paragraph::new(line).block(block), toast_area);
}
