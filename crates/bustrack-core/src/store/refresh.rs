// ── Full refresh application ──
//
// Applies a freshly loaded fleet to the store in one step.

use chrono::Utc;

use super::BusStore;
use crate::model::Bus;

impl BusStore {
    /// Replace the stored fleet with `buses`, keeping their order.
    pub(crate) fn apply_snapshot(&self, buses: Vec<Bus>) {
        let count = buses.len();
        self.buses
            .replace_all(buses.into_iter().map(|b| (b.id.clone(), b)).collect());
        self.last_refresh.send_replace(Some(Utc::now()));
        tracing::debug!(count, "applied fleet snapshot");
    }
}
