// ── Controller abstraction ──
//
// Facade over the REST client for CLI and TUI consumers: loads the fleet
// into the BusStore, executes write commands, and exposes reactive views.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use bustrack_api::{BusClient, BusDraft, TransportConfig};

use crate::command::{Command, CommandResult};
use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::model::{Bus, BusId};
use crate::store::BusStore;
use crate::stream::EntityStream;

// ── ConnectionState ──────────────────────────────────────────────

/// Load state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nothing loaded yet.
    Idle,
    Loading,
    Loaded,
    /// The last load failed; the store keeps whatever it had before.
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ClientConfig,
    client: BusClient,
    store: Arc<BusStore>,
    connection_state: watch::Sender<ConnectionState>,
}

impl Controller {
    /// Build a controller. Does NOT contact the server; call
    /// [`refresh()`](Self::refresh) to load the fleet.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = BusClient::new(config.api_url.clone(), &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Build a controller around an existing client.
    pub fn with_client(config: ClientConfig, client: BusClient) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Idle);
        Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                store: Arc::new(BusStore::new()),
                connection_state,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<BusStore> {
        &self.inner.store
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Load the whole fleet and replace the store contents.
    ///
    /// Any failure aborts the load; the previous contents stay in place.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Loading);

        match self.load_buses().await {
            Ok(buses) => {
                debug!(count = buses.len(), "fleet loaded");
                self.inner.store.apply_snapshot(buses);
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Loaded);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "fleet load failed");
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Failed);
                Err(e)
            }
        }
    }

    async fn load_buses(&self) -> Result<Vec<Bus>, CoreError> {
        self.inner
            .client
            .list_buses()
            .await?
            .into_iter()
            .map(Bus::try_from)
            .collect()
    }

    /// Fetch one bus straight from the server.
    pub async fn get_bus(&self, id: &BusId) -> Result<Bus, CoreError> {
        let record = self
            .inner
            .client
            .get_bus(&id.to_string())
            .await
            .map_err(|e| CoreError::from(e).for_bus(id))?;
        Bus::try_from(record)
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a write command.
    ///
    /// A created bus is appended to the store. An update is written into
    /// the store and followed by a full reload; a failed reload is logged
    /// but does not fail the already-saved update.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let client = &self.inner.client;
        match cmd {
            Command::CreateBus(new) => {
                let record = client.create_bus(&BusDraft::from(&new)).await?;
                let bus = Bus::try_from(record)?;
                info!(bus_id = %bus.id, number = %bus.number, "bus created");
                self.inner.store.upsert_bus(bus.clone());
                Ok(CommandResult::Bus(bus))
            }
            Command::UpdateBus { id, bus } => {
                let record = client
                    .update_bus(&id.to_string(), &BusDraft::from(&bus))
                    .await
                    .map_err(|e| CoreError::from(e).for_bus(&id))?;
                let bus = Bus::try_from(record)?;
                info!(bus_id = %bus.id, "bus updated");
                self.inner.store.upsert_bus(bus.clone());
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "reload after update failed");
                }
                Ok(CommandResult::Bus(bus))
            }
            Command::TrackBus { id } => {
                let ack = client
                    .track_bus(&id.to_string())
                    .await
                    .map_err(|e| CoreError::from(e).for_bus(&id))?;
                debug!(bus_id = %id, message = %ack.message, "tracking acknowledged");
                Ok(CommandResult::Tracking(ack.into()))
            }
        }
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn buses_snapshot(&self) -> Arc<Vec<Arc<Bus>>> {
        self.inner.store.buses_snapshot()
    }

    pub fn buses(&self) -> EntityStream<Bus> {
        self.inner.store.subscribe_buses()
    }
}
