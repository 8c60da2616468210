// REST API wire types
//
// JSON documents exchanged with the bustrack server. Field names are
// camelCase on the wire. Free-text fields default to empty strings so
// partially filled admin forms still deserialize.

use serde::{Deserialize, Serialize};

/// Capacity the admin form starts with when the field is omitted.
pub const DEFAULT_CAPACITY: u32 = 50;

fn default_capacity() -> u32 {
    DEFAULT_CAPACITY
}

// ── Bus documents ───────────────────────────────────────────────────

/// A bus document without an id: the body of `POST /api/buses` and
/// `PUT /api/buses/{id}`.
///
/// `stops` and `schedule` are parallel arrays, same index meaning:
/// ```json
/// { "busNumber": "201", "route": "Test", "stops": [""], "schedule": [""],
///   "capacity": 50, "occupancy": 0 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusDraft {
    #[serde(default)]
    pub bus_number: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub stops: Vec<String>,
    #[serde(default)]
    pub schedule: Vec<String>,
    #[serde(default)]
    pub current_location: String,
    #[serde(default)]
    pub next_stop: String,
    #[serde(default)]
    pub eta: String,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default)]
    pub occupancy: u32,
}

impl Default for BusDraft {
    fn default() -> Self {
        Self {
            bus_number: String::new(),
            route: String::new(),
            stops: Vec::new(),
            schedule: Vec::new(),
            current_location: String::new(),
            next_stop: String::new(),
            eta: String::new(),
            capacity: DEFAULT_CAPACITY,
            occupancy: 0,
        }
    }
}

/// A stored bus document, as returned by every read and write endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: BusDraft,
}

// ── Tracking ────────────────────────────────────────────────────────

/// Body of `POST /api/track/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub bus_id: String,
}

/// Acknowledgement returned by `POST /api/track/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackAck {
    pub bus_id: String,
    #[serde(default)]
    pub tracking: bool,
    #[serde(default)]
    pub message: String,
}

// ── Errors ──────────────────────────────────────────────────────────

/// Error body the server sends with every non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
