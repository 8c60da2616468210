// ── Wire ↔ domain conversion ──
//
// The wire format carries stops and schedule as parallel arrays. Inside
// the domain they are one `Vec<Stop>`, so a length mismatch or an empty
// route is rejected here rather than represented.

use bustrack_api::models::{BusDraft, BusRecord, TrackAck};

use crate::error::CoreError;
use crate::model::{Bus, BusId, NewBus, Stop, TrackingAck};

/// Zip parallel `stops` / `schedule` arrays into stop pairs.
pub fn zip_stops(stops: Vec<String>, schedule: Vec<String>) -> Result<Vec<Stop>, CoreError> {
    if stops.is_empty() {
        return Err(CoreError::validation("a route needs at least one stop"));
    }
    if stops.len() != schedule.len() {
        return Err(CoreError::validation(format!(
            "stops and schedule differ in length ({} vs {})",
            stops.len(),
            schedule.len()
        )));
    }
    Ok(stops
        .into_iter()
        .zip(schedule)
        .map(|(name, scheduled_time)| Stop {
            name,
            scheduled_time,
        })
        .collect())
}

/// Split stop pairs back into the wire's parallel arrays.
pub fn unzip_stops(stops: &[Stop]) -> (Vec<String>, Vec<String>) {
    stops
        .iter()
        .map(|s| (s.name.clone(), s.scheduled_time.clone()))
        .unzip()
}

impl TryFrom<BusDraft> for NewBus {
    type Error = CoreError;

    fn try_from(d: BusDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            stops: zip_stops(d.stops, d.schedule)?,
            number: d.bus_number,
            route: d.route,
            current_location: d.current_location,
            next_stop: d.next_stop,
            eta: d.eta,
            capacity: d.capacity,
            occupancy: d.occupancy,
        })
    }
}

impl TryFrom<BusRecord> for Bus {
    type Error = CoreError;

    fn try_from(r: BusRecord) -> Result<Self, Self::Error> {
        let id = BusId::from(r.id);
        let new = NewBus::try_from(r.fields).map_err(|e| match e {
            CoreError::ValidationFailed { message } => CoreError::MalformedRecord {
                message: format!("bus {id}: {message}"),
            },
            other => other,
        })?;
        Ok(Bus::from_new(id, new))
    }
}

impl From<&NewBus> for BusDraft {
    fn from(n: &NewBus) -> Self {
        let (stops, schedule) = unzip_stops(&n.stops);
        Self {
            bus_number: n.number.clone(),
            route: n.route.clone(),
            stops,
            schedule,
            current_location: n.current_location.clone(),
            next_stop: n.next_stop.clone(),
            eta: n.eta.clone(),
            capacity: n.capacity,
            occupancy: n.occupancy,
        }
    }
}

impl From<&Bus> for BusRecord {
    fn from(b: &Bus) -> Self {
        Self {
            id: b.id.to_string(),
            fields: BusDraft::from(&b.to_new()),
        }
    }
}

impl From<TrackAck> for TrackingAck {
    fn from(a: TrackAck) -> Self {
        Self {
            bus_id: BusId::from(a.bus_id),
            tracking: a.tracking,
            message: a.message,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft(stops: &[&str], schedule: &[&str]) -> BusDraft {
        BusDraft {
            bus_number: "201".into(),
            route: "Test".into(),
            stops: stops.iter().map(ToString::to_string).collect(),
            schedule: schedule.iter().map(ToString::to_string).collect(),
            ..BusDraft::default()
        }
    }

    #[test]
    fn draft_with_empty_stop_name_is_accepted() {
        let new = NewBus::try_from(draft(&[""], &[""])).unwrap();
        assert_eq!(new.stops, vec![Stop::default()]);
        assert_eq!(new.capacity, 50);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = NewBus::try_from(draft(&["A", "B"], &["06:00"])).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[test]
    fn zero_stops_are_rejected() {
        let err = NewBus::try_from(draft(&[], &[])).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[test]
    fn record_round_trips_through_domain() {
        let record = BusRecord {
            id: "4".into(),
            fields: draft(&["West Terminal", "East Terminal"], &["05:45", "06:05"]),
        };
        let bus = Bus::try_from(record.clone()).unwrap();
        assert_eq!(bus.id, BusId::from("4"));
        assert_eq!(bus.stops[1], Stop::new("East Terminal", "06:05"));
        assert_eq!(BusRecord::from(&bus), record);
    }

    #[test]
    fn malformed_record_names_the_bus() {
        let record = BusRecord {
            id: "9".into(),
            fields: draft(&["A"], &[]),
        };
        let err = Bus::try_from(record).unwrap_err();
        assert!(matches!(err, CoreError::MalformedRecord { .. }));
        assert!(err.to_string().contains("bus 9"));
    }
}
