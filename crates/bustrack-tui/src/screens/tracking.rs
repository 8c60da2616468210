//! Live Tracking screen: bus selector, simulated position, route stops
//! with markers, status and upcoming stops.
//!
//! The screen owns one [`Tracker`]. Its snapshots come back through the
//! action channel as [`Action::TrackingUpdated`], so rendering never locks
//! the simulator.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use bustrack_core::{Bus, BusId, SimulationParams, StopMarker, Tracker, TrackingSnapshot};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::load::load_span;

pub struct TrackingScreen {
    focused: bool,
    tracker: Tracker,
    snapshot: TrackingSnapshot,
    buses: Arc<Vec<Arc<Bus>>>,
    /// Requested before the fleet arrived.
    pending: Option<BusId>,
}

impl TrackingScreen {
    pub fn new(params: SimulationParams) -> Self {
        let tracker = Tracker::new(params);
        let snapshot = tracker.snapshot();
        Self {
            focused: false,
            tracker,
            snapshot,
            buses: Arc::new(Vec::new()),
            pending: None,
        }
    }

    fn find(&self, id: &BusId) -> Option<Arc<Bus>> {
        self.buses.iter().find(|b| &b.id == id).cloned()
    }

    fn selected_position(&self) -> Option<usize> {
        let selected = self.tracker.selected()?;
        self.buses.iter().position(|b| b.id == selected.id)
    }

    /// Move the selection by `delta`, wrapping at both ends.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn step_selection(&mut self, delta: isize) {
        let len = self.buses.len();
        if len == 0 {
            return;
        }
        let next = match self.selected_position() {
            Some(current) => (current as isize + delta).rem_euclid(len as isize) as usize,
            None => 0,
        };
        if let Some(bus) = self.buses.get(next) {
            self.tracker.select(Arc::clone(bus));
        }
    }

    fn on_buses(&mut self, buses: &Arc<Vec<Arc<Bus>>>) {
        self.buses = Arc::clone(buses);

        if let Some(id) = self.pending.take() {
            match self.find(&id) {
                Some(bus) => {
                    self.tracker.track(bus);
                    return;
                }
                None => self.pending = Some(id),
            }
        }

        match self.tracker.selected() {
            // Same id only refreshes the record
            Some(current) => {
                if let Some(fresh) = self.find(&current.id) {
                    if fresh != current {
                        self.tracker.select(fresh);
                    }
                }
            }
            None => {
                if let Some(first) = self.buses.first() {
                    self.tracker.select(Arc::clone(first));
                }
            }
        }
    }

    fn on_track_live(&mut self, id: &BusId) {
        match self.find(id) {
            Some(bus) => self.tracker.track(bus),
            None => {
                debug!(bus_id = %id, "track requested before fleet loaded");
                self.pending = Some(id.clone());
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn panel(title: &str, focused: bool) -> Block<'_> {
        Block::default()
            .title(format!(" {title} "))
            .title_style(theme::title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(focused))
    }

    fn render_selector(&self, frame: &mut Frame, area: Rect) {
        let selected = self.selected_position();
        let lines: Vec<Line> = self
            .buses
            .iter()
            .enumerate()
            .map(|(i, bus)| {
                let is_selected = Some(i) == selected;
                let style = if is_selected {
                    theme::selected_row()
                } else {
                    theme::row()
                };
                Line::from(vec![
                    Span::styled(if is_selected { "▸ " } else { "  " }, style),
                    Span::styled(format!("{:<5}", bus.number), style),
                    Span::styled(bus.route.clone(), style),
                ])
            })
            .collect();
        frame.render_widget(
            Paragraph::new(lines).block(Self::panel("Select Bus", self.focused)),
            area,
        );
    }

    fn render_position(&self, frame: &mut Frame, area: Rect) {
        let snap = &self.snapshot;
        let (dot, state, color) = if snap.tracking {
            ("●", "Tracking", theme::GREEN)
        } else {
            ("○", "Stopped", theme::MUTED)
        };
        let updated = snap
            .updated_at
            .map_or_else(
                || "─".to_owned(),
                |t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string(),
            );

        let lines = vec![
            Line::from(vec![
                Span::styled(format!("  {dot} "), Style::default().fg(color)),
                Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            ]),
            Line::from(vec![
                Span::styled("  Position  ", theme::label()),
                Span::styled(snap.position.to_string(), theme::value(false)),
            ]),
            Line::from(vec![
                Span::styled("  Ticks     ", theme::label()),
                Span::styled(snap.tick_count.to_string(), theme::row()),
                Span::styled("   Updated ", theme::label()),
                Span::styled(updated, theme::row()),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(lines).block(Self::panel("Live Position", false)),
            area,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let snap = &self.snapshot;
        let mut lines = vec![
            Line::from(vec![
                Span::styled("  Current Stop  ", theme::label()),
                Span::styled(snap.display_current(), theme::value(false)),
            ]),
            Line::from(vec![
                Span::styled("  Next Stop     ", theme::label()),
                Span::styled(snap.display_next(), theme::value(false)),
            ]),
            Line::from(vec![
                Span::styled("  ETA           ", theme::label()),
                Span::styled(snap.display_eta(), Style::default().fg(theme::CORAL)),
            ]),
        ];
        if let Some(bus) = snap.bus.as_deref() {
            lines.push(Line::from(vec![
                Span::styled("  Occupancy     ", theme::label()),
                load_span(bus),
            ]));
        }
        frame.render_widget(
            Paragraph::new(lines).block(Self::panel("Bus Status", false)),
            area,
        );
    }

    fn render_route(&self, frame: &mut Frame, area: Rect) {
        let title = self
            .snapshot
            .bus
            .as_deref()
            .map_or_else(|| "Route".to_owned(), |b| format!("Route · {}", b.label()));

        let lines: Vec<Line> = self
            .snapshot
            .route_stops()
            .into_iter()
            .map(|stop| {
                let symbol = match stop.marker {
                    StopMarker::Current => "◉",
                    StopMarker::Passed => "✓",
                    StopMarker::Ahead => "○",
                };
                let style = theme::marker(stop.marker);
                Line::from(vec![
                    Span::styled(format!("  {symbol} "), style),
                    Span::styled(format!("{:<24}", stop.name), style),
                    Span::styled(stop.coordinate.short(), theme::hint()),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(Self::panel(&title, false)), area);
    }

    fn render_upcoming(&self, frame: &mut Frame, area: Rect) {
        let upcoming = self.snapshot.upcoming();
        let lines: Vec<Line> = if upcoming.is_empty() {
            vec![Line::from(Span::styled("  ─", theme::hint()))]
        } else {
            upcoming
                .into_iter()
                .map(|u| {
                    Line::from(vec![
                        Span::styled(
                            format!("  {:<6}", u.scheduled_time),
                            Style::default().fg(theme::CORAL),
                        ),
                        Span::styled(u.name, theme::row()),
                    ])
                })
                .collect()
        };
        frame.render_widget(
            Paragraph::new(lines).block(Self::panel("Upcoming Stops", false)),
            area,
        );
    }
}

impl Component for TrackingScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        let mut rx = self.tracker.subscribe();
        tokio::spawn(async move {
            // Ends when the tracker (and its sender) is dropped
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                if action_tx
                    .send(Action::TrackingUpdated(Box::new(snapshot)))
                    .is_err()
                {
                    break;
                }
            }
        });
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j' | ']') | KeyCode::Down => self.step_selection(1),
            KeyCode::Char('k' | '[') | KeyCode::Up => self.step_selection(-1),
            KeyCode::Char(' ') => {
                let tracking = self.tracker.toggle();
                debug!(tracking, "tracking toggled");
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::BusesUpdated(buses) => self.on_buses(buses),
            Action::TrackLive(id) => self.on_track_live(id),
            Action::TrackingUpdated(snapshot) => self.snapshot = (**snapshot).clone(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let outer = Layout::vertical([Constraint::Min(8), Constraint::Length(1)]).split(area);
        let columns =
            Layout::horizontal([Constraint::Length(30), Constraint::Min(40)]).split(outer[0]);

        self.render_selector(frame, columns[0]);

        let main = Layout::vertical([
            Constraint::Length(6), // position + status
            Constraint::Min(4),    // route
            Constraint::Length(6), // upcoming
        ])
        .split(columns[1]);
        let top = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(main[0]);

        self.render_position(frame, top[0]);
        self.render_status(frame, top[1]);
        self.render_route(frame, main[1]);
        self.render_upcoming(frame, main[2]);

        let action = if self.snapshot.tracking {
            "stop tracking"
        } else {
            "start tracking"
        };
        let hints = Line::from(vec![
            Span::styled("  j/k [/] ", theme::hint_key()),
            Span::styled("select bus  ", theme::hint()),
            Span::styled("Space ", theme::hint_key()),
            Span::styled(action, theme::hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), outer[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
