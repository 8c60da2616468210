//! Dashboard screen: fleet summary, search, route filter, bus table with
//! an inline schedule panel.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use bustrack_core::{Bus, BusFilter, FleetSummary, distinct_routes};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::load::{load_bar, load_span};

/// What the fleet table shows while nothing has loaded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum LoadStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

pub struct DashboardScreen {
    focused: bool,
    buses: Arc<Vec<Arc<Bus>>>,
    filter: BusFilter,
    /// `buses` after `filter`, in registry order.
    visible: Vec<Arc<Bus>>,
    table_state: TableState,
    schedule_open: bool,
    status: LoadStatus,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            buses: Arc::new(Vec::new()),
            filter: BusFilter::default(),
            visible: Vec::new(),
            table_state: TableState::default(),
            schedule_open: false,
            status: LoadStatus::default(),
        }
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_bus(&self) -> Option<&Arc<Bus>> {
        self.visible.get(self.selected_index())
    }

    fn select(&mut self, idx: usize) {
        let clamped = if self.visible.is_empty() {
            0
        } else {
            idx.min(self.visible.len() - 1)
        };
        self.table_state.select(Some(clamped));
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let current = self.selected_index() as isize;
        let next = (current + delta).clamp(0, self.visible.len() as isize - 1);
        self.select(next as usize);
    }

    fn apply_filter(&mut self) {
        self.visible = self.filter.apply(&self.buses);
        self.select(self.selected_index());
    }

    /// All Routes → first route → ... → last route → All Routes.
    fn cycle_route(&mut self) {
        let routes = distinct_routes(&self.buses);
        self.filter.route = match &self.filter.route {
            None => routes.first().cloned(),
            Some(current) => routes
                .iter()
                .position(|r| r == current)
                .and_then(|i| routes.get(i + 1))
                .cloned(),
        };
        self.apply_filter();
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect) {
        let summary = FleetSummary::compute(&self.buses, &self.filter);
        let route = self.filter.route.as_deref().unwrap_or("All Routes");
        let query = if self.filter.query.is_empty() {
            "─"
        } else {
            self.filter.query.as_str()
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("  Total Buses ", theme::label()),
                Span::styled(summary.total.to_string(), theme::title()),
                Span::styled("    Active Routes ", theme::label()),
                Span::styled(summary.routes.to_string(), theme::title()),
                Span::styled("    Showing ", theme::label()),
                Span::styled(summary.matching.to_string(), theme::title()),
            ]),
            Line::from(vec![
                Span::styled("  Route  ", theme::label()),
                Span::styled(route.to_owned(), Style::default().fg(theme::CORAL)),
                Span::styled("    Search  ", theme::label()),
                Span::styled(query.to_owned(), Style::default().fg(theme::CYAN)),
            ]),
        ];

        let block = Block::default()
            .title(" Fleet ")
            .title_style(theme::title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(false));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Buses ({}) ", self.visible.len()))
            .title_style(theme::title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(self.focused));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.visible.is_empty() {
            let text = match &self.status {
                LoadStatus::Loading => "Loading buses…".to_owned(),
                LoadStatus::Failed(message) => message.clone(),
                LoadStatus::Ready if self.filter.is_active() => "No buses match.".to_owned(),
                LoadStatus::Ready => "No buses yet.".to_owned(),
            };
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  {text}"), theme::hint())),
                inner,
            );
            return;
        }

        let header = Row::new(vec![
            Cell::from("Bus").style(theme::header()),
            Cell::from("Route").style(theme::header()),
            Cell::from("Location").style(theme::header()),
            Cell::from("Next Stop").style(theme::header()),
            Cell::from("ETA").style(theme::header()),
            Cell::from("Load").style(theme::header()),
        ]);

        let selected_idx = self.selected_index();
        let rows: Vec<Row> = self
            .visible
            .iter()
            .enumerate()
            .map(|(i, bus)| {
                let is_selected = i == selected_idx;
                let prefix = if is_selected { "▸" } else { " " };
                Row::new(vec![
                    Cell::from(format!("{prefix}{}", bus.number)).style(
                        Style::default().fg(theme::CYAN).add_modifier(
                            if is_selected {
                                Modifier::BOLD
                            } else {
                                Modifier::empty()
                            },
                        ),
                    ),
                    Cell::from(bus.route.clone()),
                    Cell::from(bus.current_location.clone()),
                    Cell::from(bus.next_stop.clone()),
                    Cell::from(bus.eta.clone()).style(Style::default().fg(theme::CORAL)),
                    Cell::from(Line::from(load_span(bus))),
                ])
                .style(if is_selected {
                    theme::selected_row()
                } else {
                    theme::row()
                })
            })
            .collect();

        let widths = [
            Constraint::Length(6),
            Constraint::Min(16),
            Constraint::Min(14),
            Constraint::Min(14),
            Constraint::Length(8),
            Constraint::Length(8),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::selected_row());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, inner, &mut state);
    }

    fn render_schedule(frame: &mut Frame, area: Rect, bus: &Bus) {
        let block = Block::default()
            .title(format!(" Bus {}  ·  {} ", bus.number, bus.route))
            .title_style(theme::title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(true));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = vec![Line::from(vec![
            Span::styled("  Occupancy  ", theme::label()),
            load_span(bus),
            Span::raw("  "),
            Span::styled(
                load_bar(bus, 20),
                Style::default().fg(theme::load_color(bus.load_level())),
            ),
        ])];
        lines.push(Line::from(""));
        lines.extend(bus.stops.iter().map(|stop| {
            Line::from(vec![
                Span::styled(
                    format!("  {:<6}", stop.scheduled_time),
                    Style::default().fg(theme::CORAL),
                ),
                Span::styled(stop.name.clone(), theme::row()),
            ])
        }));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('g') => self.select(0),
            KeyCode::Char('G') => self.select(usize::MAX),
            KeyCode::Char('r') => self.cycle_route(),
            KeyCode::Enter => self.schedule_open = !self.schedule_open,
            KeyCode::Esc if self.schedule_open => self.schedule_open = false,
            KeyCode::Char('t') => {
                return Ok(self.selected_bus().map(|b| Action::TrackLive(b.id.clone())));
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::BusesUpdated(buses) => {
                self.buses = Arc::clone(buses);
                self.status = LoadStatus::Ready;
                self.apply_filter();
            }
            Action::LoadFailed(message) if self.buses.is_empty() => {
                self.status = LoadStatus::Failed(message.clone());
            }
            Action::Loaded => self.status = LoadStatus::Ready,
            Action::SearchInput(query) => {
                self.filter.query.clone_from(query);
                self.apply_filter();
            }
            Action::CloseSearch => {
                self.filter.query.clear();
                self.apply_filter();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Length(4), // summary
            Constraint::Min(5),    // table + schedule
            Constraint::Length(1), // hints
        ])
        .split(area);

        self.render_summary(frame, layout[0]);

        let selected = self.selected_bus().filter(|_| self.schedule_open);
        if let Some(bus) = selected {
            let chunks =
                Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(layout[1]);
            self.render_table(frame, chunks[0]);
            Self::render_schedule(frame, chunks[1], bus);
        } else {
            self.render_table(frame, layout[1]);
        }

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::hint_key()),
            Span::styled("navigate  ", theme::hint()),
            Span::styled("/ ", theme::hint_key()),
            Span::styled("search  ", theme::hint()),
            Span::styled("r ", theme::hint_key()),
            Span::styled("route  ", theme::hint()),
            Span::styled("Enter ", theme::hint_key()),
            Span::styled("schedule  ", theme::hint()),
            Span::styled("t ", theme::hint_key()),
            Span::styled("track live", theme::hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[2]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bustrack_core::{BusId, Stop};
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn bus(id: &str, number: &str, route: &str, stop: &str) -> Arc<Bus> {
        Arc::new(Bus {
            id: BusId::from(id),
            number: number.into(),
            route: route.into(),
            stops: vec![Stop::new(stop, "06:00")],
            current_location: stop.into(),
            next_stop: String::new(),
            eta: "5 mins".into(),
            capacity: 50,
            occupancy: 10,
        })
    }

    fn loaded() -> DashboardScreen {
        let mut screen = DashboardScreen::new();
        let fleet = vec![
            bus("1", "101", "Downtown Express", "Central Station"),
            bus("2", "102", "University Line", "Campus Gate"),
            bus("3", "103", "Downtown Express", "City Hall"),
        ];
        screen
            .update(&Action::BusesUpdated(Arc::new(fleet)))
            .unwrap();
        screen
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn numbers(screen: &DashboardScreen) -> Vec<String> {
        screen.visible.iter().map(|b| b.number.clone()).collect()
    }

    #[test]
    fn search_narrows_and_close_restores() {
        let mut screen = loaded();
        screen.update(&Action::SearchInput("campus".into())).unwrap();
        assert_eq!(numbers(&screen), ["102"]);

        screen.update(&Action::CloseSearch).unwrap();
        assert_eq!(numbers(&screen), ["101", "102", "103"]);
    }

    #[test]
    fn route_filter_cycles_back_to_all() {
        let mut screen = loaded();
        screen.handle_key_event(key(KeyCode::Char('r'))).unwrap();
        assert_eq!(screen.filter.route.as_deref(), Some("Downtown Express"));
        assert_eq!(numbers(&screen), ["101", "103"]);

        screen.handle_key_event(key(KeyCode::Char('r'))).unwrap();
        assert_eq!(screen.filter.route.as_deref(), Some("University Line"));

        screen.handle_key_event(key(KeyCode::Char('r'))).unwrap();
        assert_eq!(screen.filter.route, None);
        assert_eq!(numbers(&screen).len(), 3);
    }

    #[test]
    fn track_key_sends_selected_bus() {
        let mut screen = loaded();
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Char('t'))).unwrap();
        match action {
            Some(Action::TrackLive(id)) => assert_eq!(id, BusId::from("2")),
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn selection_is_clamped_when_filter_shrinks_list() {
        let mut screen = loaded();
        screen.handle_key_event(key(KeyCode::Char('G'))).unwrap();
        assert_eq!(screen.selected_index(), 2);

        screen.update(&Action::SearchInput("101".into())).unwrap();
        assert_eq!(screen.selected_index(), 0);
        assert_eq!(screen.selected_bus().unwrap().number, "101");
    }

    #[test]
    fn no_buses_means_no_track_action() {
        let mut screen = DashboardScreen::new();
        assert!(
            screen
                .handle_key_event(key(KeyCode::Char('t')))
                .unwrap()
                .is_none()
        );
    }
}
