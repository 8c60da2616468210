//! Occupancy cell: `32/50` colored by load band.

use ratatui::style::Style;
use ratatui::text::Span;

use bustrack_core::Bus;

use crate::theme;

pub fn load_span(bus: &Bus) -> Span<'static> {
    let color = theme::load_color(bus.load_level());
    Span::styled(
        format!("{}/{}", bus.occupancy, bus.capacity),
        Style::default().fg(color),
    )
}

/// Text bar of `width` cells, filled by load percentage (capped at full).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn load_bar(bus: &Bus, width: usize) -> String {
    let percent = bus.load_percent().unwrap_or(0.0).clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled.min(width)))
}
