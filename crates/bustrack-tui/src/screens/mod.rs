//! Screen implementations. Each screen is a top-level Component.

pub mod admin;
pub mod dashboard;
pub mod tracking;

use bustrack_core::SimulationParams;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components for the tab bar.
pub fn create_screens(params: SimulationParams) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Dashboard,
            Box::new(dashboard::DashboardScreen::new()),
        ),
        (
            ScreenId::Tracking,
            Box::new(tracking::TrackingScreen::new(params)),
        ),
        (ScreenId::Admin, Box::new(admin::AdminScreen::new())),
    ]
}
