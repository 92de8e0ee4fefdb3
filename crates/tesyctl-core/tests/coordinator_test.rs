// Integration tests for the coordinator state machine using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tesyctl_core::{Coordinator, CoreError, Health, HeaterConfig, Mode, WritePolicy, decode};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer) -> HeaterConfig {
    let mut cfg = HeaterConfig::new(server.uri().trim_start_matches("http://"));
    // Keep the background loop out of the way; tests drive refreshes.
    cfg.poll_interval = Duration::from_secs(300);
    cfg
}

fn full_state() -> serde_json::Value {
    json!({
        "api": "OK",
        "id": "2003",
        "MAC": "aa:bb:cc:dd:ee:ff",
        "tmpC": "48",
        "tmpT": "55",
        "mode": "0",
        "pwr": "1",
        "ht": "1",
        "err": "00",
    })
}

async fn mount_fetch_all(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("name", "_all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn started_coordinator() -> (MockServer, Coordinator) {
    let server = MockServer::start().await;
    mount_fetch_all(&server, full_state()).await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    coordinator.start().await.unwrap();
    (server, coordinator)
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_validates_and_captures_identity() {
    let (_server, coordinator) = started_coordinator().await;

    assert_eq!(coordinator.current_health(), Health::Idle);
    let identity = coordinator.identity().await.unwrap();
    assert_eq!(identity.mac, "aa:bb:cc:dd:ee:ff");
    assert_eq!(identity.model_name(), "BiLight Smart");

    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_start_against_unreachable_host_fails() {
    let server = MockServer::builder().start().await;
    let cfg = config_for(&server);
    let host = server.uri().trim_start_matches("http://").to_owned();
    drop(server);

    // The drop only signals shutdown; wait until the listener has
    // actually stopped accepting connections.
    for _ in 0..100 {
        if std::net::TcpStream::connect(&host).is_err() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let coordinator = Coordinator::new(cfg).unwrap();
    let err = coordinator.start().await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::ConnectionFailed { .. } | CoreError::Timeout { .. }
    ));
    // Validation failed: still unusable, no polling started.
    assert_eq!(coordinator.current_health(), Health::Unvalidated);
    assert!(coordinator.current_snapshot().is_none());
}

#[tokio::test]
async fn test_api_not_ok_is_a_validation_failure() {
    let server = MockServer::start().await;
    mount_fetch_all(&server, json!({ "api": "ERROR" })).await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    let err = coordinator.start().await.unwrap_err();

    assert!(matches!(err, CoreError::ValidationFailed { status } if status == "ERROR"));
    assert_eq!(coordinator.current_health(), Health::Unvalidated);
}

#[tokio::test]
async fn test_missing_api_field_is_a_validation_failure() {
    let server = MockServer::start().await;
    mount_fetch_all(&server, json!({ "id": "2003", "tmpC": "48" })).await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    let err = coordinator.start().await.unwrap_err();

    assert!(matches!(err, CoreError::ValidationFailed { .. }));
    assert_eq!(coordinator.current_health(), Health::Unvalidated);
    assert!(coordinator.current_snapshot().is_none());
}

#[tokio::test]
async fn test_double_start_is_rejected() {
    let (_server, coordinator) = started_coordinator().await;

    assert!(coordinator.start().await.is_err());

    coordinator.shutdown().await;
}

// ── Refresh semantics ───────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_refreshes_issue_one_fetch() {
    let server = MockServer::start().await;

    // One request for start(), exactly one for the two racing refreshes.
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("name", "_all"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(full_state())
                .set_delay(Duration::from_millis(100)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    coordinator.start().await.unwrap();

    let (a, b) = tokio::join!(coordinator.refresh(), coordinator.refresh());
    assert!(a.is_ok());
    assert!(b.is_ok());

    coordinator.shutdown().await;
    // The mock's expect(2) verifies on drop.
}

#[tokio::test]
async fn test_failure_retains_last_good_snapshot() {
    let (server, coordinator) = started_coordinator().await;
    let before = coordinator.current_snapshot().unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(coordinator.refresh().await.is_err());
    assert_eq!(coordinator.current_health(), Health::Stale);

    // The last good snapshot is still served unchanged.
    let after = coordinator.current_snapshot().unwrap();
    assert_eq!(*before, *after);

    // Stale is not terminal: a working device brings it back to Idle.
    server.reset().await;
    mount_fetch_all(&server, full_state()).await;
    coordinator.refresh().await.unwrap();
    assert_eq!(coordinator.current_health(), Health::Idle);

    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_timeout_error_reports_the_configured_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(full_state())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut cfg = config_for(&server);
    cfg.timeout = Duration::from_secs(1);
    let coordinator = Coordinator::new(cfg).unwrap();

    match coordinator.start().await.unwrap_err() {
        CoreError::Timeout { timeout_secs } => assert_eq!(timeout_secs, 1),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_repeated_refresh_is_idempotent() {
    let (_server, coordinator) = started_coordinator().await;

    coordinator.refresh().await.unwrap();
    let first = coordinator.current_snapshot().unwrap();
    coordinator.refresh().await.unwrap();
    let second = coordinator.current_snapshot().unwrap();

    assert_eq!(*first, *second);
    assert_eq!(decode::target_temperature(&second), Some(55));

    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_eco_scenario_decodes() {
    let server = MockServer::start().await;
    mount_fetch_all(
        &server,
        json!({ "api": "OK", "mode": "4", "pwr": "1", "err": "00" }),
    )
    .await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    coordinator.start().await.unwrap();

    let snapshot = coordinator.current_snapshot().unwrap();
    assert_eq!(decode::mode_text(&snapshot).unwrap(), "eco");
    assert_eq!(decode::error_text(&snapshot).unwrap(), "no error");
    assert_eq!(decode::is_powered_on(&snapshot), Some(true));

    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_poll_interval_change_is_clamped_and_applied() {
    let (_server, coordinator) = started_coordinator().await;

    let applied = coordinator.set_poll_interval(Duration::from_secs(1));
    assert_eq!(applied, Duration::from_secs(10));
    assert_eq!(coordinator.poll_interval(), Duration::from_secs(10));

    let applied = coordinator.set_poll_interval(Duration::from_secs(120));
    assert_eq!(applied, Duration::from_secs(120));

    coordinator.shutdown().await;
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_write_merges_only_the_acked_field() {
    let (server, coordinator) = started_coordinator().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("name", "tmpT"))
        .and(query_param("set", "60"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "api": "OK", "tmpT": "60" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    coordinator.set_target_temperature(60).await.unwrap();

    let snapshot = coordinator.current_snapshot().unwrap();
    assert_eq!(snapshot.get("tmpT"), Some("60"));
    // Siblings keep their pre-write values until the next poll.
    assert_eq!(snapshot.get("tmpC"), Some("48"));

    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_setpoint_outside_model_range_is_rejected_locally() {
    let (_server, coordinator) = started_coordinator().await;

    // BiLight Smart allows 15..=75.
    let err = coordinator.set_target_temperature(80).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidSetpoint {
            value: 80,
            min: 15,
            max: 75,
        }
    ));

    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_refresh_after_write_policy_refetches() {
    let server = MockServer::start().await;
    mount_fetch_all(&server, full_state()).await;

    let mut cfg = config_for(&server);
    cfg.write_policy = WritePolicy::RefreshAfterWrite;
    let coordinator = Coordinator::new(cfg).unwrap();
    coordinator.start().await.unwrap();

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("name", "mode"))
        .and(query_param("set", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "api": "OK" })))
        .expect(1)
        .mount(&server)
        .await;

    coordinator.set_operation_mode(Mode::Eco).await.unwrap();
    assert_eq!(coordinator.current_health(), Health::Idle);

    let requests = server.received_requests().await.unwrap();
    let full_fetches = requests
        .iter()
        .filter(|r| r.url.query_pairs().any(|(k, v)| k == "name" && v == "_all"))
        .count();
    // One for start, one forced by the write policy.
    assert_eq!(full_fetches, 2);

    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_write_rejected_by_device() {
    let (server, coordinator) = started_coordinator().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("name", "pwr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "api": "ERR" })))
        .mount(&server)
        .await;

    let err = coordinator.set_power(true).await.unwrap_err();
    assert!(matches!(err, CoreError::WriteRejected { field } if field == "pwr"));

    coordinator.shutdown().await;
}

// ── Diagnostics delegation ──────────────────────────────────────────

#[tokio::test]
async fn test_diagnostics_unsupported_on_legacy_api() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_state()))
        .mount(&server)
        .await;

    let mut cfg = config_for(&server);
    cfg.api = tesyctl_core::ApiVariant::Legacy;
    let coordinator = Coordinator::new(cfg).unwrap();
    coordinator.start().await.unwrap();

    let err = coordinator.discover_diagnostics().await.unwrap_err();
    assert!(matches!(err, CoreError::Unsupported { .. }));

    coordinator.shutdown().await;
}
