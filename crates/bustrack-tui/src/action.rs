//! Messages on the app queue. Keys, timers, the data bridge and spawned
//! commands all produce [`Action`]s; only the app loop consumes them.

use std::sync::Arc;

use bustrack_core::{Bus, BusId, NewBus, TrackingSnapshot};

use crate::screen::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// Toast text plus how to color it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,

    // fleet, from the data bridge
    BusesUpdated(Arc<Vec<Arc<Bus>>>),
    Loading,
    Loaded,
    LoadFailed(String),
    Refresh,

    /// Select the bus on the tracking screen, start the simulation and
    /// send the server acknowledgement.
    TrackLive(BusId),
    TrackingUpdated(Box<TrackingSnapshot>),

    CreateBus(NewBus),
    SaveBus { id: BusId, bus: NewBus },
    /// A create or save went through; forms close.
    AdminSaved,

    // dashboard search prompt
    OpenSearch,
    CloseSearch,
    SearchInput(String),
    SearchSubmit,

    Notify(Notification),
}
