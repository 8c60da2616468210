// ── Command API ──
//
// All writes flow through one `Command` enum so front ends share the same
// execution and reload behavior.

use crate::error::Operation;
use crate::model::{Bus, BusId, NewBus, TrackingAck};

/// All write operations against the registry.
#[derive(Debug, Clone)]
pub enum Command {
    /// Store a new bus; the server assigns its id.
    CreateBus(NewBus),
    /// Replace every field of an existing bus.
    UpdateBus { id: BusId, bus: NewBus },
    /// Ask the server to acknowledge tracking. Nothing is persisted.
    TrackBus { id: BusId },
}

/// Result of a successful [`Command`].
#[derive(Debug, Clone)]
pub enum CommandResult {
    Bus(Bus),
    Tracking(TrackingAck),
}

impl Command {
    /// The user-level operation this command belongs to.
    pub fn operation(&self) -> Operation {
        match self {
            Self::CreateBus(_) | Self::UpdateBus { .. } => Operation::Save,
            Self::TrackBus { .. } => Operation::Track,
        }
    }
}
