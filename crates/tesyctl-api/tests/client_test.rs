// Integration tests for the device clients using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tesyctl_api::{ApiVariant, DeviceClient, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

fn host_of(server: &MockServer) -> String {
    server
        .uri()
        .trim_start_matches("http://")
        .to_owned()
}

async fn setup(variant: ApiVariant) -> (MockServer, DeviceClient) {
    let server = MockServer::start().await;
    let client =
        DeviceClient::new(&host_of(&server), variant, &TransportConfig::default()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_modern_fetch_all() {
    let (server, client) = setup(ApiVariant::Modern).await;

    let body = json!({
        "api": "OK",
        "id": "2003",
        "tmpC": "52",
        "tmpT": "60",
        "mode": "1",
        "ht": "1",
        "err": "00",
    });

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("name", "_all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let snapshot = client.fetch_all().await.unwrap();

    assert_eq!(snapshot.get("id"), Some("2003"));
    assert_eq!(snapshot.get("tmpC"), Some("52"));
    assert!(snapshot.api_ok());
    assert!(client.prober().is_some());
}

#[tokio::test]
async fn test_legacy_fetch_all_uses_cgi_path() {
    let (server, client) = setup(ApiVariant::Legacy).await;

    Mock::given(method("GET"))
        .and(path("/api.cgi"))
        .and(query_param("name", "_all"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "2000", "tmpC": "48" })),
        )
        .mount(&server)
        .await;

    let snapshot = client.fetch_all().await.unwrap();

    assert_eq!(snapshot.get("id"), Some("2000"));
    assert!(client.prober().is_none());
    assert_eq!(client.variant(), ApiVariant::Legacy);
}

#[tokio::test]
async fn test_set_field_sends_name_and_set() {
    let (server, client) = setup(ApiVariant::Modern).await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("name", "tmpT"))
        .and(query_param("set", "65"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tmpT": "65" })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client.set_field("tmpT", "65").await.unwrap();

    assert_eq!(ack.get("tmpT"), Some("65"));
}

#[tokio::test]
async fn test_numeric_and_boolean_values_are_coerced() {
    let (server, client) = setup(ApiVariant::Modern).await;

    // Some firmware builds emit bare JSON numbers and booleans.
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "tmpC": 52, "ht": true, "wdBm": -61 })),
        )
        .mount(&server)
        .await;

    let snapshot = client.fetch_all().await.unwrap();

    assert_eq!(snapshot.get("tmpC"), Some("52"));
    assert_eq!(snapshot.get("ht"), Some("1"));
    assert_eq!(snapshot.get("wdBm"), Some("-61"));
}

// ── Error-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_http_error_status_is_surfaced() {
    let (server, client) = setup(ApiVariant::Modern).await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.fetch_all().await.unwrap_err();
    assert!(matches!(err, Error::Http { status: 503 }));
}

#[tokio::test]
async fn test_non_json_body_is_a_deserialization_error() {
    let (server, client) = setup(ApiVariant::Modern).await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let err = client.fetch_all().await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("busy")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_ascii_body_preview_does_not_split_a_char() {
    let (server, client) = setup(ApiVariant::Modern).await;

    // A multi-byte character straddling the 200-byte preview cutoff.
    let body = format!("{}é{}", "x".repeat(199), "filler".repeat(20));
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let err = client.fetch_all().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));
}

#[tokio::test]
async fn test_connection_refused_is_a_transport_error() {
    // Bind then drop the server so the port is closed. A dedicated
    // (non-pooled) server is required: pooled servers keep listening
    // after drop.
    let server = MockServer::builder().start().await;
    let host = host_of(&server);
    drop(server);

    // The drop only signals shutdown; wait until the listener has
    // actually stopped accepting connections.
    for _ in 0..100 {
        if std::net::TcpStream::connect(&host).is_err() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let client =
        DeviceClient::new(&host, ApiVariant::Modern, &TransportConfig::default()).unwrap();
    let err = client.fetch_all().await.unwrap_err();

    assert!(err.is_connect());
}
