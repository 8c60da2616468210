// ── Tracking snapshot ──
//
// Immutable view of the tracker published on every change. Everything a
// view renders for Live Tracking is derived from it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

use crate::model::{Bus, GeoPoint, Stop};

/// How many upcoming stops the status panel lists.
pub const UPCOMING_LIMIT: usize = 4;

/// Placeholder for a stop that does not exist at the current index.
pub const NO_STOP: &str = "-";

/// Point-in-time state of a [`Tracker`](super::Tracker).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingSnapshot {
    pub bus: Option<Arc<Bus>>,
    pub position: GeoPoint,
    pub stop_index: usize,
    pub tracking: bool,
    /// Drawn on start and on every tick; `None` when not tracking.
    pub eta_minutes: Option<u32>,
    /// Ticks applied since the current selection.
    pub tick_count: u64,
    /// Bumped on every selection change.
    pub generation: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub origin: GeoPoint,
    pub step: GeoPoint,
}

/// Marker drawn next to a stop on the route list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum StopMarker {
    Current,
    Passed,
    Ahead,
}

/// One row of the route list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStop {
    pub index: usize,
    pub name: String,
    pub coordinate: GeoPoint,
    pub marker: StopMarker,
}

/// One row of the upcoming stops panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingStop {
    pub name: String,
    pub scheduled_time: String,
}

impl TrackingSnapshot {
    /// Stop at the simulated index. Only meaningful while tracking.
    pub fn current_stop(&self) -> Option<&Stop> {
        self.bus.as_deref()?.stop(self.stop_index)
    }

    pub fn next_stop(&self) -> Option<&Stop> {
        self.bus.as_deref()?.stop_after(self.stop_index)
    }

    /// "Current stop" as displayed: the simulated stop while tracking,
    /// otherwise the record's stored location.
    pub fn display_current(&self) -> String {
        match self.bus.as_deref() {
            None => NO_STOP.to_owned(),
            Some(_) if self.tracking => self
                .current_stop()
                .map_or_else(|| NO_STOP.to_owned(), |s| s.name.clone()),
            Some(bus) => bus.current_location.clone(),
        }
    }

    pub fn display_next(&self) -> String {
        match self.bus.as_deref() {
            None => NO_STOP.to_owned(),
            Some(_) if self.tracking => self
                .next_stop()
                .map_or_else(|| NO_STOP.to_owned(), |s| s.name.clone()),
            Some(bus) => bus.next_stop.clone(),
        }
    }

    pub fn display_eta(&self) -> String {
        match (self.bus.as_deref(), self.eta_minutes) {
            (Some(_), Some(minutes)) if self.tracking => format!("{minutes} mins"),
            (Some(bus), _) if !self.tracking => bus.eta.clone(),
            _ => NO_STOP.to_owned(),
        }
    }

    /// Every stop with its synthetic coordinate and marker.
    pub fn route_stops(&self) -> Vec<RouteStop> {
        let Some(bus) = self.bus.as_deref() else {
            return Vec::new();
        };
        bus.stops
            .iter()
            .enumerate()
            .map(|(k, stop)| RouteStop {
                index: k,
                name: stop.name.clone(),
                coordinate: self.origin.offset(self.step, k),
                marker: self.marker(k),
            })
            .collect()
    }

    /// Up to [`UPCOMING_LIMIT`] stops after the current index, without
    /// wrapping, each with its scheduled time.
    pub fn upcoming(&self) -> Vec<UpcomingStop> {
        let Some(bus) = self.bus.as_deref() else {
            return Vec::new();
        };
        bus.stops
            .iter()
            .skip(self.stop_index + 1)
            .take(UPCOMING_LIMIT)
            .map(|s| UpcomingStop {
                name: s.name.clone(),
                scheduled_time: s.scheduled_time.clone(),
            })
            .collect()
    }

    fn marker(&self, k: usize) -> StopMarker {
        if !self.tracking {
            StopMarker::Ahead
        } else if k == self.stop_index {
            StopMarker::Current
        } else if k < self.stop_index {
            StopMarker::Passed
        } else {
            StopMarker::Ahead
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::BusId;
    use crate::sim::SimulationParams;

    fn snapshot(stops: &[&str], stop_index: usize, tracking: bool) -> TrackingSnapshot {
        let params = SimulationParams::default();
        let bus = Bus {
            id: BusId::from("1"),
            number: "101".into(),
            route: "Downtown Express".into(),
            stops: stops
                .iter()
                .enumerate()
                .map(|(i, s)| Stop::new(*s, format!("06:{:02}", i * 15)))
                .collect(),
            current_location: "City Hall".into(),
            next_stop: "Main Street".into(),
            eta: "5 mins".into(),
            capacity: 50,
            occupancy: 32,
        };
        TrackingSnapshot {
            bus: Some(Arc::new(bus)),
            position: params.origin,
            stop_index,
            tracking,
            eta_minutes: tracking.then_some(4),
            tick_count: 0,
            generation: 1,
            updated_at: None,
            origin: params.origin,
            step: params.step,
        }
    }

    #[test]
    fn idle_display_uses_stored_snapshot_fields() {
        let snap = snapshot(&["A", "B", "C"], 1, false);
        assert_eq!(snap.display_current(), "City Hall");
        assert_eq!(snap.display_next(), "Main Street");
        assert_eq!(snap.display_eta(), "5 mins");
    }

    #[test]
    fn tracking_display_uses_simulated_stops() {
        let snap = snapshot(&["A", "B", "C"], 2, true);
        assert_eq!(snap.display_current(), "C");
        assert_eq!(snap.display_next(), "A");
        assert_eq!(snap.display_eta(), "4 mins");
    }

    #[test]
    fn single_stop_route_shows_dash_then_first_stop() {
        let snap = snapshot(&["Only"], 1, true);
        assert_eq!(snap.display_current(), NO_STOP);
        assert_eq!(snap.display_next(), "Only");
    }

    #[test]
    fn markers_only_while_tracking() {
        let snap = snapshot(&["A", "B", "C", "D"], 2, true);
        let markers: Vec<StopMarker> = snap.route_stops().iter().map(|r| r.marker).collect();
        assert_eq!(
            markers,
            [
                StopMarker::Passed,
                StopMarker::Passed,
                StopMarker::Current,
                StopMarker::Ahead
            ]
        );

        let idle = snapshot(&["A", "B"], 1, false);
        assert!(idle.route_stops().iter().all(|r| r.marker == StopMarker::Ahead));
    }

    #[test]
    fn route_coordinates_step_per_index() {
        let snap = snapshot(&["A", "B"], 1, false);
        let stops = snap.route_stops();
        assert_eq!(stops[0].coordinate.short(), "40.7128, -74.0060");
        assert_eq!(stops[1].coordinate.short(), "40.7135, -74.0055");
    }

    #[test]
    fn upcoming_takes_four_without_wrapping() {
        let snap = snapshot(&["A", "B", "C", "D", "E", "F", "G", "H"], 1, true);
        let names: Vec<String> = snap.upcoming().into_iter().map(|u| u.name).collect();
        assert_eq!(names, ["C", "D", "E", "F"]);
        assert_eq!(snap.upcoming()[0].scheduled_time, "06:30");

        let near_end = snapshot(&["A", "B", "C", "D"], 2, true);
        let names: Vec<String> = near_end.upcoming().into_iter().map(|u| u.name).collect();
        assert_eq!(names, ["D"]);
    }
}
