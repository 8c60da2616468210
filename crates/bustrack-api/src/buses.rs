// Bus registry and tracking endpoints
//
// `/api/buses` collection, `/api/buses/{id}` documents, and the
// `/api/track/{id}` acknowledgement.

use tracing::debug;

use crate::client::BusClient;
use crate::error::Error;
use crate::models::{BusDraft, BusRecord, TrackAck, TrackRequest};

impl BusClient {
    /// List every stored bus in registry order.
    ///
    /// `GET /api/buses`
    pub async fn list_buses(&self) -> Result<Vec<BusRecord>, Error> {
        let url = self.api_url(&["buses"])?;
        debug!("listing buses");
        self.get(url).await
    }

    /// Fetch a single bus.
    ///
    /// `GET /api/buses/{id}`
    pub async fn get_bus(&self, id: &str) -> Result<BusRecord, Error> {
        let url = self.api_url(&["buses", id])?;
        debug!(id, "fetching bus");
        self.get(url).await
    }

    /// Store a new bus. The server assigns the id.
    ///
    /// `POST /api/buses`
    pub async fn create_bus(&self, draft: &BusDraft) -> Result<BusRecord, Error> {
        let url = self.api_url(&["buses"])?;
        debug!(number = %draft.bus_number, "creating bus");
        self.post(url, draft).await
    }

    /// Replace every field of an existing bus. The id is taken from the
    /// path only.
    ///
    /// `PUT /api/buses/{id}`
    pub async fn update_bus(&self, id: &str, draft: &BusDraft) -> Result<BusRecord, Error> {
        let url = self.api_url(&["buses", id])?;
        debug!(id, "updating bus");
        self.put(url, draft).await
    }

    /// Acknowledge a tracking request. No server-side state changes.
    ///
    /// `POST /api/track/{id}` with `{"busId": "..."}`
    pub async fn track_bus(&self, id: &str) -> Result<TrackAck, Error> {
        let url = self.api_url(&["track", id])?;
        debug!(id, "requesting tracking");
        self.post(
            url,
            &TrackRequest {
                bus_id: id.to_owned(),
            },
        )
        .await
    }
}
