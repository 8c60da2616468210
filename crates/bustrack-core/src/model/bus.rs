// ── Bus domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::bus_id::BusId;

/// Percent below which a bus counts as lightly loaded.
const LOW_LOAD_BELOW: f64 = 50.0;
/// Percent below which a bus counts as moderately loaded.
const MODERATE_LOAD_BELOW: f64 = 80.0;

/// One stop on a route together with its scheduled time of day.
///
/// Both strings are free text; empty values are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub name: String,
    pub scheduled_time: String,
}

impl Stop {
    pub fn new(name: impl Into<String>, scheduled_time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scheduled_time: scheduled_time.into(),
        }
    }
}

/// A bus record.
///
/// `stops` is an ordered cyclic sequence with at least one entry.
/// `current_location`, `next_stop` and `eta` are the stored snapshot shown
/// whenever no simulation is running. `occupancy` is never clamped to
/// `capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    pub id: BusId,
    pub number: String,
    pub route: String,
    pub stops: Vec<Stop>,
    pub current_location: String,
    pub next_stop: String,
    pub eta: String,
    pub capacity: u32,
    pub occupancy: u32,
}

/// A bus record without an id: what gets sent on create and full replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBus {
    pub number: String,
    pub route: String,
    pub stops: Vec<Stop>,
    pub current_location: String,
    pub next_stop: String,
    pub eta: String,
    pub capacity: u32,
    pub occupancy: u32,
}

impl Bus {
    /// Attach an id to a new record.
    pub fn from_new(id: BusId, new: NewBus) -> Self {
        Self {
            id,
            number: new.number,
            route: new.route,
            stops: new.stops,
            current_location: new.current_location,
            next_stop: new.next_stop,
            eta: new.eta,
            capacity: new.capacity,
            occupancy: new.occupancy,
        }
    }

    /// Copy every field except the id.
    pub fn to_new(&self) -> NewBus {
        NewBus {
            number: self.number.clone(),
            route: self.route.clone(),
            stops: self.stops.clone(),
            current_location: self.current_location.clone(),
            next_stop: self.next_stop.clone(),
            eta: self.eta.clone(),
            capacity: self.capacity,
            occupancy: self.occupancy,
        }
    }

    /// `"Bus 101 - Downtown Express"`, the selector label.
    pub fn label(&self) -> String {
        format!("Bus {} - {}", self.number, self.route)
    }

    /// The stop at `index`, if in range. Indices are never wrapped here.
    pub fn stop(&self, index: usize) -> Option<&Stop> {
        self.stops.get(index)
    }

    /// The stop after `index` on the cyclic route: `stops[(index + 1) % len]`.
    pub fn stop_after(&self, index: usize) -> Option<&Stop> {
        let len = self.stops.len();
        if len == 0 {
            return None;
        }
        self.stops.get((index + 1) % len)
    }

    /// Occupancy as a percentage of capacity. `None` when capacity is 0.
    pub fn load_percent(&self) -> Option<f64> {
        (self.capacity > 0)
            .then(|| f64::from(self.occupancy) / f64::from(self.capacity) * 100.0)
    }

    pub fn load_level(&self) -> Option<LoadLevel> {
        self.load_percent().map(LoadLevel::from_percent)
    }

    /// Case-insensitive substring match against number, route, and every
    /// stop name. An empty query matches.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.number.to_lowercase().contains(&query)
            || self.route.to_lowercase().contains(&query)
            || self
                .stops
                .iter()
                .any(|s| s.name.to_lowercase().contains(&query))
    }
}

/// Occupancy band, drawn as green / orange / red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LoadLevel {
    Low,
    Moderate,
    High,
}

impl LoadLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent < LOW_LOAD_BELOW {
            Self::Low
        } else if percent < MODERATE_LOAD_BELOW {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

/// Server acknowledgement of a tracking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingAck {
    pub bus_id: BusId,
    pub tracking: bool,
    pub message: String,
}
