// ── Admin forms ──
//
// Form state for adding a route and editing a bus's live status. Both map
// field by field onto `NewBus`; the only checks are that numbers parse and
// that a route keeps at least one stop.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::CoreError;
use crate::model::{Bus, BusId, NewBus, Stop};

/// Capacity a fresh add-route form starts with; the same default the wire
/// format fills in for a missing `capacity`.
pub use bustrack_api::models::DEFAULT_CAPACITY;

// ── Add route ───────────────────────────────────────────────────────

/// One editable stop row: name and scheduled time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopDraft {
    pub name: String,
    pub time: String,
}

/// The "add new route" form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDraft {
    pub number: String,
    pub route: String,
    pub stops: Vec<StopDraft>,
    pub current_location: String,
    pub next_stop: String,
    pub eta: String,
    pub capacity: u32,
    pub occupancy: u32,
}

impl Default for RouteDraft {
    fn default() -> Self {
        Self {
            number: String::new(),
            route: String::new(),
            stops: vec![StopDraft::default()],
            current_location: String::new(),
            next_stop: String::new(),
            eta: String::new(),
            capacity: DEFAULT_CAPACITY,
            occupancy: 0,
        }
    }
}

impl RouteDraft {
    /// Append an empty stop row.
    pub fn add_stop(&mut self) {
        self.stops.push(StopDraft::default());
    }

    /// Remove stop row `index`. The last remaining row cannot be removed.
    pub fn remove_stop(&mut self, index: usize) -> Result<StopDraft, CoreError> {
        if self.stops.len() <= 1 {
            return Err(CoreError::validation("a route needs at least one stop"));
        }
        self.check_index(index)?;
        Ok(self.stops.remove(index))
    }

    pub fn set_stop_name(&mut self, index: usize, name: impl Into<String>) -> Result<(), CoreError> {
        self.check_index(index)?;
        self.stops[index].name = name.into();
        Ok(())
    }

    pub fn set_stop_time(&mut self, index: usize, time: impl Into<String>) -> Result<(), CoreError> {
        self.check_index(index)?;
        self.stops[index].time = time.into();
        Ok(())
    }

    /// Set a scalar field from raw form input.
    pub fn set(&mut self, field: BusField, value: &str) -> Result<(), CoreError> {
        match field {
            BusField::BusNumber => self.number = value.to_owned(),
            BusField::Route => self.route = value.to_owned(),
            BusField::CurrentLocation => self.current_location = value.to_owned(),
            BusField::NextStop => self.next_stop = value.to_owned(),
            BusField::Eta => self.eta = value.to_owned(),
            BusField::Capacity => self.capacity = parse_count(field, value)?,
            BusField::Occupancy => self.occupancy = parse_count(field, value)?,
        }
        Ok(())
    }

    /// Current value of a scalar field, as shown in the form.
    pub fn get(&self, field: BusField) -> String {
        match field {
            BusField::BusNumber => self.number.clone(),
            BusField::Route => self.route.clone(),
            BusField::CurrentLocation => self.current_location.clone(),
            BusField::NextStop => self.next_stop.clone(),
            BusField::Eta => self.eta.clone(),
            BusField::Capacity => self.capacity.to_string(),
            BusField::Occupancy => self.occupancy.to_string(),
        }
    }

    pub fn to_new_bus(&self) -> NewBus {
        NewBus {
            number: self.number.clone(),
            route: self.route.clone(),
            stops: self
                .stops
                .iter()
                .map(|s| Stop::new(s.name.clone(), s.time.clone()))
                .collect(),
            current_location: self.current_location.clone(),
            next_stop: self.next_stop.clone(),
            eta: self.eta.clone(),
            capacity: self.capacity,
            occupancy: self.occupancy,
        }
    }

    fn check_index(&self, index: usize) -> Result<(), CoreError> {
        if index < self.stops.len() {
            Ok(())
        } else {
            Err(CoreError::validation(format!(
                "stop {} does not exist (route has {})",
                index + 1,
                self.stops.len()
            )))
        }
    }
}

// ── Edit bus ────────────────────────────────────────────────────────

/// The "edit route" form: a copy of one bus whose fields can be changed
/// before a full-replace save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusEdit {
    id: BusId,
    fields: NewBus,
}

impl BusEdit {
    pub fn from_bus(bus: &Bus) -> Self {
        Self {
            id: bus.id.clone(),
            fields: bus.to_new(),
        }
    }

    pub fn id(&self) -> &BusId {
        &self.id
    }

    pub fn fields(&self) -> &NewBus {
        &self.fields
    }

    pub fn set(&mut self, field: BusField, value: &str) -> Result<(), CoreError> {
        let f = &mut self.fields;
        match field {
            BusField::BusNumber => f.number = value.to_owned(),
            BusField::Route => f.route = value.to_owned(),
            BusField::CurrentLocation => f.current_location = value.to_owned(),
            BusField::NextStop => f.next_stop = value.to_owned(),
            BusField::Eta => f.eta = value.to_owned(),
            BusField::Capacity => f.capacity = parse_count(field, value)?,
            BusField::Occupancy => f.occupancy = parse_count(field, value)?,
        }
        Ok(())
    }

    pub fn get(&self, field: BusField) -> String {
        let f = &self.fields;
        match field {
            BusField::BusNumber => f.number.clone(),
            BusField::Route => f.route.clone(),
            BusField::CurrentLocation => f.current_location.clone(),
            BusField::NextStop => f.next_stop.clone(),
            BusField::Eta => f.eta.clone(),
            BusField::Capacity => f.capacity.to_string(),
            BusField::Occupancy => f.occupancy.to_string(),
        }
    }

    /// Apply `field=value` assignments in order, stopping at the first
    /// invalid one.
    pub fn apply_assignments<'a>(
        &mut self,
        assignments: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), CoreError> {
        for raw in assignments {
            let (field, value) = BusField::parse_assignment(raw)?;
            self.set(field, value)?;
        }
        Ok(())
    }

    /// The id and full record to send as a replace.
    pub fn into_update(self) -> (BusId, NewBus) {
        (self.id, self.fields)
    }
}

// ── Field names ─────────────────────────────────────────────────────

/// Scalar bus fields, named as on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum BusField {
    BusNumber,
    Route,
    CurrentLocation,
    NextStop,
    Eta,
    Capacity,
    Occupancy,
}

impl BusField {
    /// Fields on the status edit form.
    pub const STATUS: [BusField; 4] = [
        BusField::CurrentLocation,
        BusField::NextStop,
        BusField::Eta,
        BusField::Occupancy,
    ];

    /// Human label for forms.
    pub fn label(self) -> &'static str {
        match self {
            Self::BusNumber => "Bus Number",
            Self::Route => "Route Name",
            Self::CurrentLocation => "Current Location",
            Self::NextStop => "Next Stop",
            Self::Eta => "ETA",
            Self::Capacity => "Capacity",
            Self::Occupancy => "Occupancy",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Capacity | Self::Occupancy)
    }

    /// Split `field=value`. The value may contain further `=` signs.
    pub fn parse_assignment(raw: &str) -> Result<(Self, &str), CoreError> {
        let (name, value) = raw.split_once('=').ok_or_else(|| {
            CoreError::validation(format!("expected field=value, got '{raw}'"))
        })?;
        let field = name.trim().parse::<Self>().map_err(|_| {
            let known: Vec<&'static str> = Self::iter().map(<&'static str>::from).collect();
            CoreError::validation(format!(
                "unknown field '{}' (expected one of: {})",
                name.trim(),
                known.join(", ")
            ))
        })?;
        Ok((field, value))
    }
}

fn parse_count(field: BusField, value: &str) -> Result<u32, CoreError> {
    value
        .trim()
        .parse()
        .map_err(|_| CoreError::validation(format!("{field} must be a whole number, got '{value}'")))
}
