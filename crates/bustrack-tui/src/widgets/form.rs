//! Line-based form fields: a label, a raw text value, and in-place editing.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::text::{Line, Span};

use crate::theme;

/// Apply a key to a text value. Returns `true` if the key was consumed.
pub fn edit_text(value: &mut String, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Backspace => {
            value.pop();
            true
        }
        KeyCode::Char(c)
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
        {
            value.push(c);
            true
        }
        _ => false,
    }
}

/// One `label  value` row; the active row shows a cursor.
pub fn field_line<'a>(label: &str, value: &'a str, active: bool, width: usize) -> Line<'a> {
    let marker = if active { "▸ " } else { "  " };
    let mut spans = vec![
        Span::styled(marker, theme::hint_key()),
        Span::styled(format!("{label:<width$} "), theme::label()),
        Span::styled(value, theme::value(active)),
    ];
    if active {
        spans.push(Span::styled("█", theme::value(false)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_backspace() {
        let mut value = String::from("4 min");
        assert!(edit_text(&mut value, key(KeyCode::Char('s'))));
        assert_eq!(value, "4 mins");
        assert!(edit_text(&mut value, key(KeyCode::Backspace)));
        assert_eq!(value, "4 min");
    }

    #[test]
    fn control_chords_are_not_text() {
        let mut value = String::new();
        let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(!edit_text(&mut value, save));
        assert!(!edit_text(&mut value, key(KeyCode::Enter)));
        assert!(value.is_empty());
    }
}
