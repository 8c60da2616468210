//! Change feed over a store collection.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared, immutable view of a collection in store order.
pub type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// Subscriber handle returned by [`BusStore::subscribe_buses`](crate::BusStore::subscribe_buses).
///
/// Holds the last snapshot it saw so a consumer can render immediately and
/// then wait for the next publish.
pub struct EntityStream<T: Send + Sync + 'static> {
    seen: Snapshot<T>,
    rx: watch::Receiver<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(rx: watch::Receiver<Snapshot<T>>) -> Self {
        let seen = Arc::clone(&rx.borrow());
        Self { seen, rx }
    }

    pub fn current(&self) -> &Snapshot<T> {
        &self.seen
    }

    /// Resolves on the next publish. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        self.rx.changed().await.ok()?;
        self.seen = Arc::clone(&self.rx.borrow_and_update());
        Some(Arc::clone(&self.seen))
    }
}
