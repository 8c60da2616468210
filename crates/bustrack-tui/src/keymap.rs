//! Global key bindings, resolved before the active screen sees a key.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::Action;
use crate::screen::ScreenId;

pub fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c')
}

/// App-wide bindings. `None` means the key belongs to the screen.
pub fn global(key: &KeyEvent, active: ScreenId) -> Option<Action> {
    let action = match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            Action::Quit
        }
        (KeyModifiers::CONTROL, KeyCode::Char('r')) => Action::Refresh,
        (KeyModifiers::NONE, KeyCode::Char('?')) => Action::ToggleHelp,
        (KeyModifiers::NONE, KeyCode::Char('/')) if active == ScreenId::Dashboard => {
            Action::OpenSearch
        }
        (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='9')) => {
            let digit = c.to_digit(10).and_then(|d| u8::try_from(d).ok())?;
            Action::SwitchScreen(ScreenId::from_number(digit)?)
        }
        (KeyModifiers::NONE, KeyCode::Tab) => Action::SwitchScreen(active.next()),
        (_, KeyCode::BackTab) => Action::SwitchScreen(active.prev()),
        // Esc on the dashboard closes its schedule panel instead
        (KeyModifiers::NONE, KeyCode::Esc) if active != ScreenId::Dashboard => Action::GoBack,
        _ => return None,
    };
    Some(action)
}

/// Edit the search prompt. Every change is pushed to the dashboard as it
/// is typed.
pub fn search(query: &mut String, key: &KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => {
            query.clear();
            Some(Action::CloseSearch)
        }
        KeyCode::Enter => Some(Action::SearchSubmit),
        KeyCode::Backspace => {
            query.pop();
            Some(Action::SearchInput(query.clone()))
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            query.push(c);
            Some(Action::SearchInput(query.clone()))
        }
        _ => None,
    }
}

/// While the help overlay is up only its close keys do anything.
pub fn help(key: &KeyEvent) -> Option<Action> {
    matches!(key.code, KeyCode::Esc | KeyCode::Char('?')).then_some(Action::ToggleHelp)
}
