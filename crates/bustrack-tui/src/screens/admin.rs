//! Admin Panel screen: edit a bus's live status, add new routes.
//!
//! Forms keep raw text per field and only parse on save, so a bad number
//! is reported without a request being sent.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use bustrack_core::{Bus, BusEdit, BusField, CoreError, Operation, RouteDraft};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::form::{edit_text, field_line};
use crate::widgets::load::load_span;

/// Scalar fields on the add-route form, in display order.
const ROUTE_FIELDS: [BusField; 7] = [
    BusField::BusNumber,
    BusField::Route,
    BusField::Capacity,
    BusField::Occupancy,
    BusField::CurrentLocation,
    BusField::NextStop,
    BusField::Eta,
];

const LABEL_WIDTH: usize = 16;

// ── Forms ───────────────────────────────────────────────────────────

/// "Edit route" form over [`BusField::STATUS`].
#[derive(Debug, Clone)]
struct EditForm {
    edit: BusEdit,
    values: Vec<String>,
    active: usize,
}

impl EditForm {
    fn new(bus: &Bus) -> Self {
        let edit = BusEdit::from_bus(bus);
        let values = BusField::STATUS.iter().map(|&f| edit.get(f)).collect();
        Self {
            edit,
            values,
            active: 0,
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn active_value(&mut self) -> Option<&mut String> {
        self.values.get_mut(self.active)
    }

    fn submit(&self) -> Result<Action, CoreError> {
        let mut edit = self.edit.clone();
        for (field, raw) in BusField::STATUS.iter().zip(&self.values) {
            edit.set(*field, raw)?;
        }
        let (id, bus) = edit.into_update();
        Ok(Action::SaveBus { id, bus })
    }
}

/// Where the cursor sits on the add-route form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddFocus {
    Field(usize),
    StopName(usize),
    StopTime(usize),
}

/// "Add new route" form: scalar fields then one name/time row per stop.
#[derive(Debug, Clone)]
struct AddForm {
    draft: RouteDraft,
    values: Vec<String>,
    active: usize,
}

impl AddForm {
    fn new() -> Self {
        let draft = RouteDraft::default();
        let values = ROUTE_FIELDS.iter().map(|&f| draft.get(f)).collect();
        Self {
            draft,
            values,
            active: 0,
        }
    }

    fn len(&self) -> usize {
        ROUTE_FIELDS.len() + self.draft.stops.len() * 2
    }

    fn focus(&self) -> AddFocus {
        match self.active.checked_sub(ROUTE_FIELDS.len()) {
            None => AddFocus::Field(self.active),
            Some(j) if j % 2 == 0 => AddFocus::StopName(j / 2),
            Some(j) => AddFocus::StopTime(j / 2),
        }
    }

    fn active_value(&mut self) -> Option<&mut String> {
        match self.focus() {
            AddFocus::Field(i) => self.values.get_mut(i),
            AddFocus::StopName(s) => self.draft.stops.get_mut(s).map(|row| &mut row.name),
            AddFocus::StopTime(s) => self.draft.stops.get_mut(s).map(|row| &mut row.time),
        }
    }

    fn add_stop(&mut self) {
        self.draft.add_stop();
        self.active = self.len() - 2;
    }

    fn remove_stop(&mut self) -> Result<(), CoreError> {
        let index = match self.focus() {
            AddFocus::StopName(s) | AddFocus::StopTime(s) => s,
            AddFocus::Field(_) => self.draft.stops.len().saturating_sub(1),
        };
        self.draft.remove_stop(index)?;
        self.active = self.active.min(self.len() - 1);
        Ok(())
    }

    fn submit(&self) -> Result<Action, CoreError> {
        let mut draft = self.draft.clone();
        for (field, raw) in ROUTE_FIELDS.iter().zip(&self.values) {
            draft.set(*field, raw)?;
        }
        Ok(Action::CreateBus(draft.to_new_bus()))
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Browse,
    Edit(EditForm),
    Add(AddForm),
}

// ── Screen ──────────────────────────────────────────────────────────

pub struct AdminScreen {
    focused: bool,
    buses: Arc<Vec<Arc<Bus>>>,
    selected: usize,
    mode: Mode,
}

impl AdminScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            buses: Arc::new(Vec::new()),
            selected: 0,
            mode: Mode::Browse,
        }
    }

    fn selected_bus(&self) -> Option<&Arc<Bus>> {
        self.buses.get(self.selected)
    }

    fn move_selection(&mut self, down: bool) {
        if self.buses.is_empty() {
            return;
        }
        self.selected = if down {
            (self.selected + 1).min(self.buses.len() - 1)
        } else {
            self.selected.saturating_sub(1)
        };
    }

    fn invalid(err: &CoreError) -> Action {
        Action::Notify(Notification::error(err.user_message(Operation::Save)))
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(true),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(false),
            KeyCode::Char('e') => {
                if let Some(bus) = self.selected_bus() {
                    self.mode = Mode::Edit(EditForm::new(bus));
                }
            }
            KeyCode::Char('a') => self.mode = Mode::Add(AddForm::new()),
            _ => {}
        }
        None
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Esc {
            self.mode = Mode::Browse;
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match (&mut self.mode, key.code) {
            (Mode::Edit(form), KeyCode::Char('s')) if ctrl => {
                Some(form.submit().unwrap_or_else(|e| Self::invalid(&e)))
            }
            (Mode::Add(form), KeyCode::Char('s')) if ctrl => {
                Some(form.submit().unwrap_or_else(|e| Self::invalid(&e)))
            }
            (Mode::Add(form), KeyCode::Char('n')) if ctrl => {
                form.add_stop();
                None
            }
            (Mode::Add(form), KeyCode::Char('d')) if ctrl => {
                form.remove_stop().err().map(|e| Self::invalid(&e))
            }
            (Mode::Edit(form), code) => {
                form.active = cycle(form.active, form.len(), code);
                if let Some(value) = form.active_value() {
                    edit_text(value, key);
                }
                None
            }
            (Mode::Add(form), code) => {
                form.active = cycle(form.active, form.len(), code);
                if let Some(value) = form.active_value() {
                    edit_text(value, key);
                }
                None
            }
            (Mode::Browse, _) => None,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let browsing = matches!(self.mode, Mode::Browse);
        let lines: Vec<Line> = self
            .buses
            .iter()
            .enumerate()
            .map(|(i, bus)| {
                let style = if i == self.selected {
                    theme::selected_row()
                } else {
                    theme::row()
                };
                Line::from(vec![
                    Span::styled(if i == self.selected { "▸ " } else { "  " }, style),
                    Span::styled(format!("{:<5}", bus.number), style),
                    Span::styled(bus.route.clone(), style),
                ])
            })
            .collect();

        let block = panel(" Buses ", self.focused && browsing);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect) {
        let Some(bus) = self.selected_bus() else {
            let empty = Paragraph::new(Span::styled("  No buses yet.", theme::hint()))
                .block(panel(" Bus ", false));
            frame.render_widget(empty, area);
            return;
        };
        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("  {label:<LABEL_WIDTH$} "), theme::label()),
                Span::styled(value, theme::value(false)),
            ])
        };
        let mut lines = vec![
            row("Route", bus.route.clone()),
            row("Current Location", bus.current_location.clone()),
            row("Next Stop", bus.next_stop.clone()),
            row("ETA", bus.eta.clone()),
            Line::from(vec![
                Span::styled(format!("  {:<LABEL_WIDTH$} ", "Occupancy"), theme::label()),
                load_span(bus),
            ]),
            Line::from(""),
        ];
        lines.extend(bus.stops.iter().map(|s| {
            Line::from(Span::styled(
                format!("  {:<6} {}", s.scheduled_time, s.name),
                theme::row(),
            ))
        }));
        let title = format!(" Bus {} ", bus.number);
        frame.render_widget(Paragraph::new(lines).block(panel(&title, false)), area);
    }

    fn render_edit(frame: &mut Frame, area: Rect, form: &EditForm) {
        let lines: Vec<Line> = BusField::STATUS
            .iter()
            .zip(&form.values)
            .enumerate()
            .map(|(i, (field, value))| {
                field_line(field.label(), value, i == form.active, LABEL_WIDTH)
            })
            .collect();
        let title = format!(" Edit Route · {} ", form.edit.fields().number);
        frame.render_widget(Paragraph::new(lines).block(panel(&title, true)), area);
    }

    fn render_add(frame: &mut Frame, area: Rect, form: &AddForm) {
        let focus = form.focus();
        let mut lines: Vec<Line> = ROUTE_FIELDS
            .iter()
            .zip(&form.values)
            .enumerate()
            .map(|(i, (field, value))| {
                field_line(field.label(), value, focus == AddFocus::Field(i), LABEL_WIDTH)
            })
            .collect();
        lines.push(Line::from(Span::styled("  Stops", theme::title())));
        for (s, stop) in form.draft.stops.iter().enumerate() {
            lines.push(field_line(
                &format!("Stop {}", s + 1),
                &stop.name,
                focus == AddFocus::StopName(s),
                LABEL_WIDTH,
            ));
            lines.push(field_line(
                "  Time",
                &stop.time,
                focus == AddFocus::StopTime(s),
                LABEL_WIDTH,
            ));
        }
        frame.render_widget(
            Paragraph::new(lines).block(panel(" Add New Route ", true)),
            area,
        );
    }
}

fn panel(title: &str, focused: bool) -> Block<'static> {
    Block::default()
        .title(title.to_owned())
        .title_style(theme::title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(focused))
}

/// Move a form cursor for Tab/Down and Shift+Tab/Up, wrapping.
fn cycle(active: usize, len: usize, code: KeyCode) -> usize {
    if len == 0 {
        return 0;
    }
    match code {
        KeyCode::Tab | KeyCode::Down | KeyCode::Enter => (active + 1) % len,
        KeyCode::BackTab | KeyCode::Up => (active + len - 1) % len,
        _ => active,
    }
}

impl Component for AdminScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Edit(_) | Mode::Add(_) => self.handle_form_key(key),
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::BusesUpdated(buses) => {
                self.buses = Arc::clone(buses);
                self.selected = self.selected.min(self.buses.len().saturating_sub(1));
            }
            Action::AdminSaved => self.mode = Mode::Browse,
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let outer = Layout::vertical([Constraint::Min(6), Constraint::Length(1)]).split(area);
        let columns =
            Layout::horizontal([Constraint::Length(30), Constraint::Min(40)]).split(outer[0]);

        self.render_list(frame, columns[0]);
        match &self.mode {
            Mode::Browse => self.render_summary(frame, columns[1]),
            Mode::Edit(form) => Self::render_edit(frame, columns[1], form),
            Mode::Add(form) => Self::render_add(frame, columns[1], form),
        }

        let hints = match self.mode {
            Mode::Browse => Line::from(vec![
                Span::styled("  j/k ", theme::hint_key()),
                Span::styled("select  ", theme::hint()),
                Span::styled("e ", theme::hint_key()),
                Span::styled("edit  ", theme::hint()),
                Span::styled("a ", theme::hint_key()),
                Span::styled("add route", theme::hint()),
            ]),
            Mode::Edit(_) => Line::from(vec![
                Span::styled("  Tab ", theme::hint_key()),
                Span::styled("next field  ", theme::hint()),
                Span::styled("Ctrl+S ", theme::hint_key()),
                Span::styled("save  ", theme::hint()),
                Span::styled("Esc ", theme::hint_key()),
                Span::styled("cancel", theme::hint()),
            ]),
            Mode::Add(_) => Line::from(vec![
                Span::styled("  Tab ", theme::hint_key()),
                Span::styled("next field  ", theme::hint()),
                Span::styled("Ctrl+N ", theme::hint_key()),
                Span::styled("add stop  ", theme::hint()),
                Span::styled("Ctrl+D ", theme::hint_key()),
                Span::styled("remove stop  ", theme::hint()),
                Span::styled("Ctrl+S ", theme::hint_key()),
                Span::styled("save  ", theme::hint()),
                Span::styled("Esc ", theme::hint_key()),
                Span::styled("cancel", theme::hint()),
            ]),
        };
        frame.render_widget(Paragraph::new(hints), outer[1]);
    }

    fn captures_input(&self) -> bool {
        !matches!(self.mode, Mode::Browse)
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::action::NotificationLevel;
    use bustrack_core::{BusId, Stop};
    use pretty_assertions::assert_eq;

    fn loaded() -> AdminScreen {
        let mut screen = AdminScreen::new();
        let bus = Bus {
            id: BusId::from("1"),
            number: "101".into(),
            route: "Downtown Express".into(),
            stops: vec![Stop::new("Central Station", "06:00")],
            current_location: "City Hall".into(),
            next_stop: "Main Street".into(),
            eta: "5 mins".into(),
            capacity: 50,
            occupancy: 32,
        };
        screen
            .update(&Action::BusesUpdated(Arc::new(vec![Arc::new(bus)])))
            .unwrap();
        screen
    }

    fn press(screen: &mut AdminScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn ctrl(screen: &mut AdminScreen, c: char) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
            .unwrap()
    }

    fn type_text(screen: &mut AdminScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    fn clear(screen: &mut AdminScreen, n: usize) {
        for _ in 0..n {
            press(screen, KeyCode::Backspace);
        }
    }

    #[test]
    fn edit_sends_full_record_with_changed_status() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Char('e'));
        assert!(screen.captures_input());

        // current location → next stop → eta
        press(&mut screen, KeyCode::Tab);
        press(&mut screen, KeyCode::Tab);
        clear(&mut screen, "5 mins".len());
        type_text(&mut screen, "2 mins");

        match ctrl(&mut screen, 's') {
            Some(Action::SaveBus { id, bus }) => {
                assert_eq!(id, BusId::from("1"));
                assert_eq!(bus.eta, "2 mins");
                assert_eq!(bus.number, "101");
                assert_eq!(bus.stops.len(), 1);
                assert_eq!(bus.occupancy, 32);
            }
            other => panic!("unexpected action: {other:?}"),
        }

        screen.update(&Action::AdminSaved).unwrap();
        assert!(!screen.captures_input());
    }

    #[test]
    fn bad_occupancy_is_rejected_at_the_form() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Char('e'));
        press(&mut screen, KeyCode::BackTab); // wraps to occupancy
        type_text(&mut screen, "x");

        match ctrl(&mut screen, 's') {
            Some(Action::Notify(n)) => {
                assert_eq!(n.level, NotificationLevel::Error);
                assert!(n.message.contains("whole number"), "{}", n.message);
            }
            other => panic!("unexpected action: {other:?}"),
        }
        assert!(screen.captures_input());
    }

    #[test]
    fn add_route_collects_stops_in_order() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Char('a'));
        type_text(&mut screen, "201");
        press(&mut screen, KeyCode::Tab);
        type_text(&mut screen, "Test");

        // jump to the first stop row
        for _ in 0..6 {
            press(&mut screen, KeyCode::Tab);
        }
        type_text(&mut screen, "Depot");
        press(&mut screen, KeyCode::Tab);
        type_text(&mut screen, "06:00");

        ctrl(&mut screen, 'n');
        type_text(&mut screen, "Pier");

        match ctrl(&mut screen, 's') {
            Some(Action::CreateBus(bus)) => {
                assert_eq!(bus.number, "201");
                assert_eq!(bus.route, "Test");
                assert_eq!(bus.capacity, 50);
                assert_eq!(
                    bus.stops,
                    vec![Stop::new("Depot", "06:00"), Stop::new("Pier", "")]
                );
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn last_stop_cannot_be_removed() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Char('a'));
        match ctrl(&mut screen, 'd') {
            Some(Action::Notify(n)) => assert_eq!(n.level, NotificationLevel::Error),
            other => panic!("unexpected action: {other:?}"),
        }

        ctrl(&mut screen, 'n');
        assert!(ctrl(&mut screen, 'd').is_none());
        let Mode::Add(form) = &screen.mode else {
            panic!("form closed");
        };
        assert_eq!(form.draft.stops.len(), 1);
    }

    #[test]
    fn esc_discards_form() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Char('a'));
        type_text(&mut screen, "999");
        press(&mut screen, KeyCode::Esc);
        assert!(!screen.captures_input());
    }
}
