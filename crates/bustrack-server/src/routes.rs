use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tracing::info;

use bustrack_api::{BusDraft, BusRecord, TrackAck};
use bustrack_core::{BusId, NewBus};

use crate::error::RegistryError;
use crate::state::AppState;

/// Liveness text for `GET /`.
pub const ROOT_MESSAGE: &str = "bustrack server is running";

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub store: &'static str,
}

pub async fn root() -> &'static str {
    ROOT_MESSAGE
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let store = state.registry.status().await;
    let status = if store == "unavailable" {
        "degraded"
    } else {
        "ok"
    };
    Json(Health { status, store })
}

pub async fn list_buses(
    State(state): State<AppState>,
) -> Result<Json<Vec<BusRecord>>, RegistryError> {
    let buses = state.registry.list().await?;
    Ok(Json(buses.iter().map(BusRecord::from).collect()))
}

pub async fn get_bus(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BusRecord>, RegistryError> {
    let bus = state.registry.get(&BusId::from(id)).await?;
    Ok(Json(BusRecord::from(&bus)))
}

pub async fn create_bus(
    State(state): State<AppState>,
    body: Result<Json<BusDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<BusRecord>), RegistryError> {
    let Json(draft) = body?;
    let new = NewBus::try_from(draft)?;
    let bus = state.registry.create(new).await?;
    info!(id = %bus.id, route = %bus.route, "bus created");
    Ok((StatusCode::CREATED, Json(BusRecord::from(&bus))))
}

/// Full replace. Accepts a full record or a bare draft; any `id` in the
/// body is ignored.
pub async fn update_bus(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<BusDraft>, JsonRejection>,
) -> Result<Json<BusRecord>, RegistryError> {
    let Json(draft) = body?;
    let new = NewBus::try_from(draft)?;
    let bus = state.registry.update(&BusId::from(id), new).await?;
    info!(id = %bus.id, "bus updated");
    Ok(Json(BusRecord::from(&bus)))
}

/// Acknowledge a tracking request. The simulation itself runs client side.
pub async fn track_bus(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrackAck>, RegistryError> {
    let bus = state.registry.get(&BusId::from(id)).await?;
    info!(id = %bus.id, "tracking requested");
    Ok(Json(TrackAck {
        bus_id: bus.id.to_string(),
        tracking: true,
        message: format!("Tracking started for bus {}", bus.number),
    }))
}
