// ── Ordered reactive entity collection ──
//
// Concurrent storage with O(1) lookups and push-based change notification
// via `watch` channels. Each entry carries a position so snapshots keep
// registry order even though `DashMap` iteration does not.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;

use crate::model::BusId;

struct Slot<T> {
    position: u64,
    entity: Arc<T>,
}

/// A reactive, order-preserving collection for one entity type.
///
/// Every mutation rebuilds the snapshot that subscribers receive.
pub(crate) struct EntityCollection<T: Send + Sync + 'static> {
    by_id: DashMap<BusId, Slot<T>>,

    /// Next position handed to an appended entity.
    next_position: AtomicU64,

    /// Full snapshot in position order, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            next_position: AtomicU64::new(0),
            snapshot,
        }
    }

    /// Insert or update an entity. Existing entries keep their position;
    /// new ones are appended. Returns `true` if the id was new.
    pub(crate) fn upsert(&self, id: BusId, entity: T) -> bool {
        let entity = Arc::new(entity);
        let is_new = match self.by_id.entry(id) {
            Entry::Occupied(mut slot) => {
                slot.get_mut().entity = entity;
                false
            }
            Entry::Vacant(vacant) => {
                let position = self.next_position.fetch_add(1, Ordering::Relaxed);
                vacant.insert(Slot { position, entity });
                true
            }
        };

        self.rebuild_snapshot();
        is_new
    }

    /// Replace the whole collection with `items`, in their given order.
    ///
    /// Upserts first, then prunes ids missing from `items`, and publishes
    /// a single snapshot at the end so subscribers never see an empty
    /// intermediate state.
    pub(crate) fn replace_all(&self, items: Vec<(BusId, T)>) {
        let incoming: HashSet<BusId> = items.iter().map(|(id, _)| id.clone()).collect();
        for (id, entity) in items {
            let position = self.next_position.fetch_add(1, Ordering::Relaxed);
            self.by_id.insert(
                id,
                Slot {
                    position,
                    entity: Arc::new(entity),
                },
            );
        }
        self.by_id.retain(|id, _| incoming.contains(id));

        self.rebuild_snapshot();
    }

    pub(crate) fn get(&self, id: &BusId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(&r.value().entity))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn rebuild_snapshot(&self) {
        let mut slots: Vec<(u64, Arc<T>)> = self
            .by_id
            .iter()
            .map(|r| (r.value().position, Arc::clone(&r.value().entity)))
            .collect();
        slots.sort_unstable_by_key(|(position, _)| *position);
        let values = slots.into_iter().map(|(_, entity)| entity).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn names(col: &EntityCollection<String>) -> Vec<String> {
        col.snapshot().iter().map(|s| (**s).clone()).collect()
    }

    #[test]
    fn upsert_reports_new_ids() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.upsert(BusId::from("1"), "a".into()));
        assert!(!col.upsert(BusId::from("1"), "b".into()));
        assert_eq!(*col.get(&BusId::from("1")).unwrap(), "b");
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn snapshot_keeps_insertion_order() {
        let col: EntityCollection<String> = EntityCollection::new();
        for id in ["9", "2", "5"] {
            col.upsert(BusId::from(id), id.to_owned());
        }
        assert_eq!(names(&col), ["9", "2", "5"]);

        col.upsert(BusId::from("2"), "two".into());
        assert_eq!(names(&col), ["9", "two", "5"]);
    }

    #[test]
    fn replace_all_follows_incoming_order_and_prunes() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(BusId::from("1"), "one".into());
        col.upsert(BusId::from("2"), "two".into());

        col.replace_all(vec![
            (BusId::from("3"), "three".into()),
            (BusId::from("1"), "uno".into()),
        ]);

        assert_eq!(names(&col), ["three", "uno"]);
        assert!(col.get(&BusId::from("2")).is_none());
    }

    #[test]
    fn subscribers_see_each_mutation() {
        let col: EntityCollection<String> = EntityCollection::new();
        let mut rx = col.subscribe();
        col.upsert(BusId::from("1"), "a".into());
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
