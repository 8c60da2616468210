//! Colors and styles shared by every screen.

use ratatui::style::{Color, Modifier, Style};

use bustrack_core::{LoadLevel, StopMarker};

pub const ACCENT: Color = Color::Rgb(225, 53, 255);
pub const CYAN: Color = Color::Rgb(128, 255, 234);
pub const CORAL: Color = Color::Rgb(255, 106, 193);
pub const AMBER: Color = Color::Rgb(241, 250, 140);
pub const GREEN: Color = Color::Rgb(80, 250, 123);
pub const RED: Color = Color::Rgb(255, 99, 99);

pub const TEXT: Color = Color::Rgb(189, 193, 207);
pub const MUTED: Color = Color::Rgb(98, 114, 164);
pub const BG_SELECTED: Color = Color::Rgb(40, 42, 54);
pub const BG_PANEL: Color = Color::Rgb(30, 31, 41);

fn fg(color: Color) -> Style {
    Style::default().fg(color)
}

fn bold(color: Color) -> Style {
    fg(color).add_modifier(Modifier::BOLD)
}

pub fn title() -> Style {
    bold(CYAN)
}

pub fn border(focused: bool) -> Style {
    fg(if focused { ACCENT } else { MUTED })
}

pub fn tab(active: bool) -> Style {
    if active { bold(ACCENT) } else { fg(TEXT) }
}

// Tables

pub fn header() -> Style {
    bold(CYAN).add_modifier(Modifier::UNDERLINED)
}

pub fn row() -> Style {
    fg(TEXT)
}

pub fn selected_row() -> Style {
    bold(ACCENT).bg(BG_SELECTED)
}

// Hints and forms

/// Description text in a hint line.
pub fn hint() -> Style {
    fg(MUTED)
}

/// The key itself in a hint line.
pub fn hint_key() -> Style {
    bold(CYAN)
}

pub fn label() -> Style {
    fg(TEXT)
}

pub fn value(active: bool) -> Style {
    if active {
        bold(CYAN).bg(BG_SELECTED)
    } else {
        fg(CYAN)
    }
}

// Bus data

/// Occupancy color; `None` when capacity is unknown.
pub fn load_color(level: Option<LoadLevel>) -> Color {
    match level {
        Some(LoadLevel::Low) => GREEN,
        Some(LoadLevel::Moderate) => AMBER,
        Some(LoadLevel::High) => RED,
        None => TEXT,
    }
}

/// Stop list styling: where the bus is, where it has been, where it is going.
pub fn marker(marker: StopMarker) -> Style {
    match marker {
        StopMarker::Current => bold(ACCENT),
        StopMarker::Passed => fg(MUTED),
        StopMarker::Ahead => fg(TEXT),
    }
}
