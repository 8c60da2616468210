//! The interface each screen implements for the app loop.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// A screen. `init` runs once at startup; after that the loop calls the
/// remaining methods in any order.
pub trait Component: Send {
    /// Screens that emit actions outside of key handling keep the sender.
    fn init(&mut self, _tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    /// A key that no global binding claimed.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// React to a routed action, optionally answering with another.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    /// True while an open form wants raw keys (everything but Ctrl+C).
    fn captures_input(&self) -> bool {
        false
    }

    fn set_focused(&mut self, _focused: bool) {}
}
