#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` against a wiremock server.

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bustrack_core::{
    BusEdit, BusField, BusId, ClientConfig, Command, CommandResult, ConnectionState, Controller,
    CoreError, Operation, RouteDraft,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let api_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let controller = Controller::new(ClientConfig::new(api_url)).unwrap();
    (server, controller)
}

fn record(id: &str, number: &str, occupancy: u32) -> serde_json::Value {
    json!({
        "id": id,
        "busNumber": number,
        "route": "Downtown Express",
        "stops": ["Central Station", "City Hall", "Main Street"],
        "schedule": ["06:00", "06:15", "06:30"],
        "currentLocation": "City Hall",
        "nextStop": "Main Street",
        "eta": "5 mins",
        "capacity": 50,
        "occupancy": occupancy
    })
}

async fn mount_list(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/buses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_loads_fleet_in_server_order() {
    let (server, controller) = setup().await;
    mount_list(&server, json!([record("2", "102", 10), record("1", "101", 60)])).await;

    controller.refresh().await.unwrap();

    let buses = controller.buses_snapshot();
    let ids: Vec<String> = buses.iter().map(|b| b.id.to_string()).collect();
    assert_eq!(ids, ["2", "1"]);
    assert_eq!(buses[1].occupancy, 60);
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Loaded);
}

#[tokio::test]
async fn refresh_failure_keeps_previous_fleet() {
    let (server, controller) = setup().await;
    mount_list(&server, json!([record("1", "101", 10)])).await;
    controller.refresh().await.unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/buses"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "error": "store unavailable" })))
        .mount(&server)
        .await;

    let err = controller.refresh().await.unwrap_err();
    assert_eq!(
        err.user_message(Operation::Load),
        "Could not load buses. Please try again later."
    );
    assert_eq!(controller.buses_snapshot().len(), 1);
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Failed);
}

#[tokio::test]
async fn refresh_rejects_mismatched_record() {
    let (server, controller) = setup().await;
    mount_list(
        &server,
        json!([{ "id": "1", "busNumber": "1", "stops": ["A", "B"], "schedule": ["06:00"] }]),
    )
    .await;

    let err = controller.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::MalformedRecord { .. }));
    assert_eq!(
        err.user_message(Operation::Load),
        "Could not load buses. Please try again later."
    );
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Failed);
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn create_with_malformed_reply_shows_save_message() {
    let (server, controller) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/buses"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "7",
            "busNumber": "201",
            "stops": [],
            "schedule": []
        })))
        .mount(&server)
        .await;

    let err = controller
        .execute(Command::CreateBus(RouteDraft::default().to_new_bus()))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::MalformedRecord { .. }));
    assert_eq!(err.user_message(Operation::Save), "Could not save changes.");
    assert!(controller.buses_snapshot().is_empty());
}

#[tokio::test]
async fn create_appends_returned_bus() {
    let (server, controller) = setup().await;
    mount_list(&server, json!([record("1", "101", 10)])).await;
    controller.refresh().await.unwrap();

    Mock::given(method("POST"))
        .and(path("/api/buses"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "busNumber": "201",
            "route": "Test",
            "stops": [""],
            "schedule": [""],
            "currentLocation": "",
            "nextStop": "",
            "eta": "",
            "capacity": 50,
            "occupancy": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut draft = RouteDraft::default();
    draft.set(BusField::BusNumber, "201").unwrap();
    draft.set(BusField::Route, "Test").unwrap();

    let result = controller
        .execute(Command::CreateBus(draft.to_new_bus()))
        .await
        .unwrap();
    let CommandResult::Bus(bus) = result else {
        panic!("expected Bus result");
    };
    assert!(bus.id.is_generated());
    assert_eq!(bus.number, "201");

    let snapshot = controller.buses_snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[1].id, bus.id);
}

#[tokio::test]
async fn update_puts_full_record_then_reloads() {
    let (server, controller) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/buses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record("1", "101", 10)])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    controller.refresh().await.unwrap();

    Mock::given(method("PUT"))
        .and(path("/api/buses/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record("1", "101", 45)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/buses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record("1", "101", 45)])))
        .expect(1)
        .mount(&server)
        .await;

    let bus = controller.buses_snapshot()[0].clone();
    let mut edit = BusEdit::from_bus(&bus);
    edit.set(BusField::Occupancy, "45").unwrap();
    let (id, fields) = edit.into_update();

    controller
        .execute(Command::UpdateBus { id, bus: fields })
        .await
        .unwrap();
    assert_eq!(controller.buses_snapshot()[0].occupancy, 45);
}

#[tokio::test]
async fn update_unknown_id_is_generic_save_failure() {
    let (server, controller) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/buses/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "bus 'nope' not found" })))
        .mount(&server)
        .await;

    let mut draft = RouteDraft::default();
    draft.set_stop_name(0, "A").unwrap();
    let cmd = Command::UpdateBus {
        id: BusId::from("nope"),
        bus: draft.to_new_bus(),
    };
    let op = cmd.operation();
    let err = controller.execute(cmd).await.unwrap_err();

    assert!(matches!(err, CoreError::BusNotFound { ref id } if id == "nope"));
    assert_eq!(err.user_message(op), "Could not save changes.");
}

#[tokio::test]
async fn track_returns_ack() {
    let (server, controller) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/track/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "busId": "1",
            "tracking": true,
            "message": "Now tracking bus 1"
        })))
        .mount(&server)
        .await;

    let result = controller
        .execute(Command::TrackBus { id: BusId::from("1") })
        .await
        .unwrap();
    let CommandResult::Tracking(ack) = result else {
        panic!("expected Tracking result");
    };
    assert!(ack.tracking);
    assert_eq!(ack.bus_id, BusId::from("1"));
}
