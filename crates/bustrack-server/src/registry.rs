// ── Vehicle registry ──
//
// Insertion-ordered map of bus records behind one `RwLock`. Writes go to
// storage while the write lock is held, so the on-disk documents never
// drift from the map.

use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use bustrack_core::{Bus, BusId, NewBus};

use crate::error::{RegistryError, StorageError};
use crate::storage::{Storage, StoreUrl};

/// Whether the store opened.
#[derive(Debug)]
pub enum Backend {
    Ready(Store),
    Unavailable { reason: String },
}

#[derive(Debug)]
pub struct Store {
    buses: IndexMap<BusId, Bus>,
    storage: Storage,
}

/// The server-side registry of bus records.
#[derive(Debug)]
pub struct Registry {
    backend: RwLock<Backend>,
}

impl Registry {
    /// Open the store behind `url` and load its records.
    pub async fn open(url: &StoreUrl) -> Result<Self, StorageError> {
        let (storage, buses) = Storage::open(url).await?;
        info!(store = storage.kind(), count = buses.len(), "bus store ready");
        Ok(Self::from_parts(storage, buses))
    }

    /// An in-memory registry holding `buses`.
    pub fn in_memory(buses: Vec<Bus>) -> Self {
        Self::from_parts(Storage::Memory, buses)
    }

    /// A registry whose store failed to open. Every request answers 503.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            backend: RwLock::new(Backend::Unavailable {
                reason: reason.into(),
            }),
        }
    }

    fn from_parts(storage: Storage, buses: Vec<Bus>) -> Self {
        let buses = buses.into_iter().map(|b| (b.id.clone(), b)).collect();
        Self {
            backend: RwLock::new(Backend::Ready(Store { buses, storage })),
        }
    }

    /// `"memory"`, `"file"` or `"unavailable"`.
    pub async fn status(&self) -> &'static str {
        match &*self.backend.read().await {
            Backend::Ready(store) => store.storage.kind(),
            Backend::Unavailable { .. } => "unavailable",
        }
    }

    /// Every record in insertion order.
    pub async fn list(&self) -> Result<Vec<Bus>, RegistryError> {
        let backend = self.backend.read().await;
        let store = ready(&backend)?;
        Ok(store.buses.values().cloned().collect())
    }

    pub async fn get(&self, id: &BusId) -> Result<Bus, RegistryError> {
        let backend = self.backend.read().await;
        let store = ready(&backend)?;
        store
            .buses
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound { id: id.clone() })
    }

    /// Assign a fresh UUID and append.
    pub async fn create(&self, new: NewBus) -> Result<Bus, RegistryError> {
        let mut backend = self.backend.write().await;
        let store = ready_mut(&mut backend)?;

        let bus = Bus::from_new(BusId::generate(), new);
        store.storage.write(store.buses.len(), &bus).await?;
        store.buses.insert(bus.id.clone(), bus.clone());
        debug!(id = %bus.id, number = %bus.number, "created bus");
        Ok(bus)
    }

    /// Full replace of an existing record. The path id wins over any id
    /// the caller sent.
    pub async fn update(&self, id: &BusId, new: NewBus) -> Result<Bus, RegistryError> {
        let mut backend = self.backend.write().await;
        let store = ready_mut(&mut backend)?;

        let Some(position) = store.buses.get_index_of(id) else {
            warn!(id = %id, "update for unknown bus");
            return Err(RegistryError::NotFound { id: id.clone() });
        };
        let bus = Bus::from_new(id.clone(), new);
        store.storage.write(position, &bus).await?;
        store.buses.insert(id.clone(), bus.clone());
        debug!(id = %id, "updated bus");
        Ok(bus)
    }
}

fn ready(backend: &Backend) -> Result<&Store, RegistryError> {
    match backend {
        Backend::Ready(store) => Ok(store),
        Backend::Unavailable { reason } => Err(RegistryError::Unavailable {
            reason: reason.clone(),
        }),
    }
}

fn ready_mut(backend: &mut Backend) -> Result<&mut Store, RegistryError> {
    match backend {
        Backend::Ready(store) => Ok(store),
        Backend::Unavailable { reason } => Err(RegistryError::Unavailable {
            reason: reason.clone(),
        }),
    }
}
