// ── Bus store ──
//
// In-process mirror of the server's fleet, fed by `Controller::refresh`
// and by write results.

mod collection;
mod refresh;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{Bus, BusId};
use crate::stream::EntityStream;
use collection::EntityCollection;

/// Reactive storage for the fleet, in registry order.
pub struct BusStore {
    pub(crate) buses: EntityCollection<Bus>,
    pub(crate) last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl BusStore {
    pub fn new() -> Self {
        let (last_refresh, _) = watch::channel(None);
        Self {
            buses: EntityCollection::new(),
            last_refresh,
        }
    }

    /// Insert or replace a single bus. New buses go to the end.
    pub fn upsert_bus(&self, bus: Bus) -> bool {
        self.buses.upsert(bus.id.clone(), bus)
    }

    pub fn bus(&self, id: &BusId) -> Option<Arc<Bus>> {
        self.buses.get(id)
    }

    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    pub fn buses_snapshot(&self) -> Arc<Vec<Arc<Bus>>> {
        self.buses.snapshot()
    }

    pub fn subscribe_buses(&self) -> EntityStream<Bus> {
        EntityStream::new(self.buses.subscribe())
    }

    /// When the fleet was last loaded in full.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }
}

impl Default for BusStore {
    fn default() -> Self {
        Self::new()
    }
}
