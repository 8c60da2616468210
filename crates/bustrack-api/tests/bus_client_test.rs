#![allow(clippy::unwrap_used)]
// Integration tests for `BusClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bustrack_api::{BusClient, BusDraft, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BusClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = BusClient::with_client(reqwest::Client::new(), base_url).unwrap();
    (server, client)
}

fn bus_json(id: &str, number: &str) -> serde_json::Value {
    json!({
        "id": id,
        "busNumber": number,
        "route": "Downtown Express",
        "stops": ["Central Station", "Main St"],
        "schedule": ["06:00", "06:15"],
        "currentLocation": "Central Station",
        "nextStop": "Main St",
        "eta": "5 mins",
        "capacity": 50,
        "occupancy": 32
    })
}

// ── Registry tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_buses() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/buses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([bus_json("1", "101"), bus_json("2", "202")])),
        )
        .mount(&server)
        .await;

    let buses = client.list_buses().await.unwrap();
    assert_eq!(buses.len(), 2);
    assert_eq!(buses[0].id, "1");
    assert_eq!(buses[1].fields.bus_number, "202");
    assert_eq!(buses[0].fields.schedule, vec!["06:00", "06:15"]);
}

#[tokio::test]
async fn test_get_bus_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/buses/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "bus 'missing' not found" })),
        )
        .mount(&server)
        .await;

    let err = client.get_bus("missing").await.unwrap_err();
    assert!(err.is_not_found());
    match err {
        Error::Api { message, .. } => assert_eq!(message, "bus 'missing' not found"),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_bus_sends_camel_case_body() {
    let (server, client) = setup().await;

    let draft = BusDraft {
        bus_number: "201".into(),
        route: "Test".into(),
        stops: vec![String::new()],
        schedule: vec![String::new()],
        ..BusDraft::default()
    };

    Mock::given(method("POST"))
        .and(path("/api/buses"))
        .and(body_json(json!({
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
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "a1b2",
            "busNumber": "201",
            "route": "Test",
            "stops": [""],
            "schedule": [""],
            "capacity": 50,
            "occupancy": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client.create_bus(&draft).await.unwrap();
    assert_eq!(created.id, "a1b2");
    assert_eq!(created.fields, draft);
}

#[tokio::test]
async fn test_update_bus_puts_to_id_path() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/buses/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bus_json("3", "303")))
        .expect(1)
        .mount(&server)
        .await;

    let draft = BusDraft {
        bus_number: "303".into(),
        ..BusDraft::default()
    };
    let updated = client.update_bus("3", &draft).await.unwrap();
    assert_eq!(updated.id, "3");
}

#[tokio::test]
async fn test_server_error_without_json_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/buses"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client.list_buses().await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream down");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/buses"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.list_buses().await.unwrap_err();
    assert!(
        matches!(err, Error::Deserialization { ref body, .. } if body == "not json"),
        "expected Deserialization error, got: {err:?}"
    );
}

// ── Tracking tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_track_bus_ack() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/track/1"))
        .and(body_json(json!({ "busId": "1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "busId": "1",
            "tracking": true,
            "message": "Now tracking bus 1"
        })))
        .mount(&server)
        .await;

    let ack = client.track_bus("1").await.unwrap();
    assert!(ack.tracking);
    assert_eq!(ack.bus_id, "1");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let base_url = Url::parse("http://127.0.0.1:9/api").unwrap();
    let client = BusClient::with_client(reqwest::Client::new(), base_url).unwrap();

    let err = client.list_buses().await.unwrap_err();
    assert!(err.is_transport(), "expected transport error, got: {err:?}");
}
