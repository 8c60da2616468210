#![allow(clippy::unwrap_used)]
// End-to-end tests: a real server on 127.0.0.1:0 driven through BusClient.

use std::net::SocketAddr;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;

use bustrack_api::{BusClient, BusDraft, TransportConfig};
use bustrack_core::{BusId, ClientConfig, Command, Controller, NewBus, Operation, Stop};
use bustrack_server::{AppState, Registry, RunningServer, seed};

// ── Helpers ─────────────────────────────────────────────────────────

async fn start(registry: Registry) -> RunningServer {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    bustrack_server::spawn(addr, AppState::new(registry))
        .await
        .unwrap()
}

fn client(server: &RunningServer) -> BusClient {
    let url = Url::parse(&server.api_url()).unwrap();
    BusClient::new(url, &TransportConfig::default()).unwrap()
}

fn test_draft() -> BusDraft {
    BusDraft {
        bus_number: "201".into(),
        route: "Test".into(),
        stops: vec![String::new()],
        schedule: vec![String::new()],
        capacity: 50,
        occupancy: 0,
        ..BusDraft::default()
    }
}

// ── Registry over HTTP ──────────────────────────────────────────────

#[tokio::test]
async fn lists_seed_fleet_in_order() {
    let server = start(Registry::in_memory(seed::demo_fleet())).await;
    let api = client(&server);

    let first = api.list_buses().await.unwrap();
    let second = api.list_buses().await.unwrap();
    assert_eq!(first, second);

    let numbers: Vec<&str> = first.iter().map(|b| b.fields.bus_number.as_str()).collect();
    assert_eq!(numbers, ["101", "102", "103", "104", "105", "106"]);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn create_returns_id_and_submitted_fields() {
    let server = start(Registry::in_memory(Vec::new())).await;
    let api = client(&server);

    let created = api.create_bus(&test_draft()).await.unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.fields, test_draft());

    let fetched = api.get_bus(&created.id).await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(api.list_buses().await.unwrap().len(), 1);
}

#[tokio::test]
async fn occupancy_above_capacity_is_stored_as_is() {
    let server = start(Registry::in_memory(Vec::new())).await;
    let api = client(&server);

    let mut draft = test_draft();
    draft.capacity = 40;
    draft.occupancy = 55;
    let created = api.create_bus(&draft).await.unwrap();
    assert_eq!(created.fields.occupancy, 55);
}

#[tokio::test]
async fn update_replaces_record_and_keeps_path_id() {
    let server = start(Registry::in_memory(seed::demo_fleet())).await;
    let api = client(&server);

    let mut record = api.get_bus("2").await.unwrap();
    record.fields.eta = "1 min".into();
    record.fields.occupancy = 44;

    let updated = api.update_bus("2", &record.fields).await.unwrap();
    assert_eq!(updated.id, "2");
    assert_eq!(updated.fields.eta, "1 min");
    assert_eq!(api.list_buses().await.unwrap()[1], updated);
}

#[tokio::test]
async fn update_unknown_id_is_404() {
    let server = start(Registry::in_memory(seed::demo_fleet())).await;
    let api = client(&server);

    let err = api.update_bus("does-not-exist", &test_draft()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn mismatched_stops_and_schedule_are_rejected() {
    let server = start(Registry::in_memory(Vec::new())).await;
    let api = client(&server);

    let mut draft = test_draft();
    draft.stops = vec!["A".into(), "B".into()];
    let err = api.create_bus(&draft).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(api.list_buses().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_400_with_error_body() {
    let server = start(Registry::in_memory(Vec::new())).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/buses", server.api_url()))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn track_acknowledges_known_bus() {
    let server = start(Registry::in_memory(seed::demo_fleet())).await;
    let api = client(&server);

    let ack = api.track_bus("4").await.unwrap();
    assert_eq!(ack.bus_id, "4");
    assert!(ack.tracking);
    assert!(!ack.message.is_empty());

    let err = api.track_bus("nope").await.unwrap_err();
    assert!(err.is_not_found());
}

// ── Liveness and degraded store ─────────────────────────────────────

#[tokio::test]
async fn root_and_health_respond() {
    let server = start(Registry::in_memory(Vec::new())).await;
    let base = format!("http://{}", server.local_addr());
    let http = reqwest::Client::new();

    let text = http.get(&base).send().await.unwrap().text().await.unwrap();
    assert_eq!(text, bustrack_server::routes::ROOT_MESSAGE);

    let health: serde_json::Value = http
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, json!({ "status": "ok", "store": "memory" }));
}

#[tokio::test]
async fn unavailable_store_answers_503() {
    let server = start(Registry::unavailable("connection refused")).await;
    let api = client(&server);

    let err = api.list_buses().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

// ── Through the controller ──────────────────────────────────────────

#[tokio::test]
async fn controller_reports_generic_message_for_unknown_update() {
    let server = start(Registry::in_memory(seed::demo_fleet())).await;
    let controller =
        Controller::new(ClientConfig::new(Url::parse(&server.api_url()).unwrap())).unwrap();

    controller.refresh().await.unwrap();
    assert_eq!(controller.buses_snapshot().len(), 6);

    let bus = NewBus {
        number: "900".into(),
        route: "Ghost".into(),
        stops: vec![Stop::new("Nowhere", "00:00")],
        current_location: String::new(),
        next_stop: String::new(),
        eta: String::new(),
        capacity: 10,
        occupancy: 0,
    };
    let err = controller
        .execute(Command::UpdateBus {
            id: BusId::from("ghost"),
            bus,
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message(Operation::Save), "Could not save changes.");
}

#[tokio::test]
async fn file_store_round_trips_across_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let store = bustrack_server::StoreUrl::Directory(tmp.path().to_path_buf());

    let first = start(Registry::open(&store).await.unwrap()).await;
    let created = client(&first).create_bus(&test_draft()).await.unwrap();
    first.shutdown().await.unwrap();

    let second = start(Registry::open(&store).await.unwrap()).await;
    let fetched = client(&second).get_bus(&created.id).await.unwrap();
    assert_eq!(fetched, created);
}
