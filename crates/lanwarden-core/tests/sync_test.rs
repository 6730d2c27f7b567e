#![allow(clippy::unwrap_used)]
// Synchronizer behavior against a mock backend: optimistic windows,
// rollback totality, busy spans, and validation short-circuits.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lanwarden_api::ApiClient;
use lanwarden_core::{
    BusyKey, BusySet, CoreError, DeviceKey, DeviceLists, MacAddress, ScheduleBoard, SessionGate,
    SessionState,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Arc<ApiClient>) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let api = Arc::new(ApiClient::with_client(reqwest::Client::new(), base_url));
    (server, api)
}

fn device_json(mac: &str, ip: &str) -> serde_json::Value {
    json!({ "mac_address": mac, "ip_address": ip, "description": "test device" })
}

fn key(mac: &str, ip: &str) -> DeviceKey {
    DeviceKey {
        mac: MacAddress::parse(mac).unwrap(),
        ip: ip.into(),
    }
}

/// Mount a GET list endpoint returning `body`, consumed after `times`
/// matches so later mounts can take over.
async fn mount_list_once(server: &MockServer, endpoint: &str, body: &serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

async fn mount_list(server: &MockServer, endpoint: &str, body: &serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Session gate ────────────────────────────────────────────────────

#[tokio::test]
async fn probe_ok_resolves_authed_with_username() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "username": "admin" })),
        )
        .mount(&server)
        .await;

    let gate = SessionGate::new(api);
    let state = gate.probe().await;

    assert_eq!(
        state,
        SessionState::Authed {
            username: "admin".into()
        }
    );
    assert_eq!(gate.state(), state);
}

#[tokio::test]
async fn probe_non_ok_resolves_unauthenticated() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("no session"))
        .mount(&server)
        .await;

    let gate = SessionGate::new(api);
    assert_eq!(gate.probe().await, SessionState::Unauthenticated);
}

#[tokio::test]
async fn probe_transport_failure_resolves_unauthenticated() {
    // Nothing listens on this port; the probe must fail toward login.
    let base_url = Url::parse("http://127.0.0.1:1/").unwrap();
    let api = Arc::new(ApiClient::with_client(reqwest::Client::new(), base_url));

    let gate = SessionGate::new(api);
    assert_eq!(gate.probe().await, SessionState::Unauthenticated);
}

#[tokio::test]
async fn login_sets_authed_and_logout_clears_it() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "username": "admin" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let gate = SessionGate::new(api);
    let secret: secrecy::SecretString = "hunter2".to_string().into();
    gate.login("admin", &secret).await.unwrap();
    assert!(gate.state().is_authed());

    gate.logout().await.unwrap();
    assert_eq!(gate.state(), SessionState::Unauthenticated);
}

// ── Device lists: refresh ───────────────────────────────────────────

#[tokio::test]
async fn refresh_populates_both_lists() {
    let (server, api) = setup().await;
    mount_list(
        &server,
        "/getApproved",
        &json!([device_json("aa:bb:cc:dd:ee:01", "192.168.1.1")]),
    )
    .await;
    mount_list(
        &server,
        "/getUnapproved",
        &json!([
            device_json("aa:bb:cc:dd:ee:02", "192.168.1.2"),
            device_json("aa:bb:cc:dd:ee:03", "192.168.1.3")
        ]),
    )
    .await;

    let lists = DeviceLists::new(api, Arc::new(BusySet::new()));
    lists.refresh().await.unwrap();

    assert_eq!(lists.approved().len(), 1);
    assert_eq!(lists.unapproved().len(), 2);
    assert_eq!(lists.approved()[0].key, key("aa:bb:cc:dd:ee:01", "192.168.1.1"));
}

#[tokio::test]
async fn refresh_drops_malformed_rows() {
    let (server, api) = setup().await;
    mount_list(
        &server,
        "/getApproved",
        &json!([
            device_json("aa:bb:cc:dd:ee:01", "192.168.1.1"),
            { "mac_address": "not-a-mac", "ip_address": "192.168.1.9" }
        ]),
    )
    .await;
    mount_list(&server, "/getUnapproved", &json!([])).await;

    let lists = DeviceLists::new(api, Arc::new(BusySet::new()));
    lists.refresh().await.unwrap();

    assert_eq!(lists.approved().len(), 1);
}

// ── Device lists: optimistic approve ────────────────────────────────

#[tokio::test]
async fn approve_applies_optimistically_then_reconciles() {
    let (server, api) = setup().await;
    let target = key("aa:bb:cc:dd:ee:02", "192.168.1.2");

    // Initial state: one unapproved device, nothing approved.
    mount_list_once(&server, "/getApproved", &json!([])).await;
    mount_list_once(
        &server,
        "/getUnapproved",
        &json!([device_json("aa:bb:cc:dd:ee:02", "192.168.1.2")]),
    )
    .await;
    // Server truth after the mutation.
    mount_list(
        &server,
        "/getApproved",
        &json!([device_json("aa:bb:cc:dd:ee:02", "192.168.1.2")]),
    )
    .await;
    mount_list(&server, "/getUnapproved", &json!([])).await;
    // The mutation call is slow so the optimistic window is observable.
    Mock::given(method("POST"))
        .and(path("/addApproved"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true }))
                .set_delay(Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let busy = Arc::new(BusySet::new());
    let lists = Arc::new(DeviceLists::new(api, Arc::clone(&busy)));
    lists.refresh().await.unwrap();

    let task = tokio::spawn({
        let lists = Arc::clone(&lists);
        let target = target.clone();
        async move { lists.approve(&target).await }
    });

    // Inside the optimistic window: the move is already visible
    // locally and the row is busy.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(lists.approved().len(), 1);
    assert!(lists.unapproved().is_empty());
    assert!(busy.contains(&BusyKey::Device(target.clone())));

    task.await.unwrap().unwrap();

    // Reconciled against server truth, busy span closed.
    assert_eq!(lists.approved().len(), 1);
    assert!(lists.unapproved().is_empty());
    assert!(!busy.contains(&BusyKey::Device(target)));
}

#[tokio::test]
async fn approve_failure_rolls_back_both_lists() {
    let (server, api) = setup().await;
    let target = key("aa:bb:cc:dd:ee:02", "192.168.1.2");

    mount_list(
        &server,
        "/getApproved",
        &json!([device_json("aa:bb:cc:dd:ee:01", "192.168.1.1")]),
    )
    .await;
    mount_list(
        &server,
        "/getUnapproved",
        &json!([device_json("aa:bb:cc:dd:ee:02", "192.168.1.2")]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/addApproved"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db locked"))
        .mount(&server)
        .await;

    let busy = Arc::new(BusySet::new());
    let lists = DeviceLists::new(api, Arc::clone(&busy));
    lists.refresh().await.unwrap();

    let approved_before = lists.approved();
    let unapproved_before = lists.unapproved();

    let err = lists.approve(&target).await.unwrap_err();

    match err {
        CoreError::Api { status, .. } => assert_eq!(status, Some(500)),
        other => panic!("expected Api error, got: {other:?}"),
    }
    // Rollback is total: both lists byte-for-byte as before.
    assert_eq!(lists.approved(), approved_before);
    assert_eq!(lists.unapproved(), unapproved_before);
    assert!(busy.is_empty());
}

#[tokio::test]
async fn duplicate_approve_rejected_while_busy() {
    let (server, api) = setup().await;
    let target = key("aa:bb:cc:dd:ee:02", "192.168.1.2");

    mount_list(&server, "/getApproved", &json!([])).await;
    mount_list(
        &server,
        "/getUnapproved",
        &json!([device_json("aa:bb:cc:dd:ee:02", "192.168.1.2")]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/addApproved"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true }))
                .set_delay(Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let busy = Arc::new(BusySet::new());
    let lists = Arc::new(DeviceLists::new(api, busy));
    lists.refresh().await.unwrap();

    let task = tokio::spawn({
        let lists = Arc::clone(&lists);
        let target = target.clone();
        async move { lists.approve(&target).await }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = lists.approve(&target).await;
    assert!(
        matches!(second, Err(CoreError::Busy { .. })),
        "expected Busy, got: {second:?}"
    );

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn approve_unknown_device_is_not_found() {
    let (server, api) = setup().await;
    mount_list(&server, "/getApproved", &json!([])).await;
    mount_list(&server, "/getUnapproved", &json!([])).await;

    let lists = DeviceLists::new(api, Arc::new(BusySet::new()));
    lists.refresh().await.unwrap();

    let err = lists.approve(&key("aa:bb:cc:dd:ee:99", "10.0.0.9")).await;
    assert!(matches!(err, Err(CoreError::DeviceNotFound { .. })));
}

// ── Device lists: revoke ────────────────────────────────────────────

#[tokio::test]
async fn revoke_removes_then_re_adds() {
    let (server, api) = setup().await;
    let target = key("aa:bb:cc:dd:ee:01", "192.168.1.1");

    mount_list_once(
        &server,
        "/getApproved",
        &json!([device_json("aa:bb:cc:dd:ee:01", "192.168.1.1")]),
    )
    .await;
    mount_list_once(&server, "/getUnapproved", &json!([])).await;
    mount_list(&server, "/getApproved", &json!([])).await;
    mount_list(
        &server,
        "/getUnapproved",
        &json!([device_json("aa:bb:cc:dd:ee:01", "192.168.1.1")]),
    )
    .await;
    Mock::given(method("DELETE"))
        .and(path("/removeApproved"))
        .and(body_json(json!({
            "mac_address": "aa:bb:cc:dd:ee:01",
            "ip_address": "192.168.1.1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/addUnapproved"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let lists = DeviceLists::new(api, Arc::new(BusySet::new()));
    lists.refresh().await.unwrap();
    lists.revoke(&target).await.unwrap();

    assert!(lists.approved().is_empty());
    assert_eq!(lists.unapproved().len(), 1);
}

#[tokio::test]
async fn revoke_second_call_failure_still_rolls_back_locally() {
    let (server, api) = setup().await;
    let target = key("aa:bb:cc:dd:ee:01", "192.168.1.1");

    mount_list(
        &server,
        "/getApproved",
        &json!([device_json("aa:bb:cc:dd:ee:01", "192.168.1.1")]),
    )
    .await;
    mount_list(&server, "/getUnapproved", &json!([])).await;
    Mock::given(method("DELETE"))
        .and(path("/removeApproved"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/addUnapproved"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db locked"))
        .mount(&server)
        .await;

    let busy = Arc::new(BusySet::new());
    let lists = DeviceLists::new(api, Arc::clone(&busy));
    lists.refresh().await.unwrap();

    let approved_before = lists.approved();
    let unapproved_before = lists.unapproved();

    assert!(lists.revoke(&target).await.is_err());
    assert_eq!(lists.approved(), approved_before);
    assert_eq!(lists.unapproved(), unapproved_before);
    assert!(busy.is_empty());
}

// ── Validation short-circuits ───────────────────────────────────────

#[tokio::test]
async fn start_scan_empty_target_sends_nothing() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/StartScan"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let lists = DeviceLists::new(api, Arc::new(BusySet::new()));
    let err = lists.start_scan("   ").await;
    assert!(matches!(err, Err(CoreError::ValidationFailed { .. })));
}

#[tokio::test]
async fn plan_scan_validation_sends_nothing() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/planScan"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let board = ScheduleBoard::new(api, Arc::new(BusySet::new()));

    let empty_target = board.plan_scan(60, "  ").await;
    assert!(matches!(
        empty_target,
        Err(CoreError::ValidationFailed { .. })
    ));

    let zero_interval = board.plan_scan(0, "192.168.1.0/24").await;
    assert!(matches!(
        zero_interval,
        Err(CoreError::ValidationFailed { .. })
    ));
}

// ── Schedule board ──────────────────────────────────────────────────

fn plan_json(interval: i64, target: &str, next: Option<&str>) -> serde_json::Value {
    json!({
        "interval": interval,
        "scan_target": target,
        "next_scan_at": next,
        "last_scan_at": null
    })
}

#[tokio::test]
async fn schedule_refresh_sets_rows_and_due_count() {
    let (server, api) = setup().await;
    mount_list(
        &server,
        "/plannedScans/all",
        &json!([
            plan_json(60, "192.168.1.0/24", Some("2026-08-30 12:00:00")),
            plan_json(1440, "10.0.0.0/16", None)
        ]),
    )
    .await;
    mount_list(
        &server,
        "/plannedScans/due",
        &json!([plan_json(60, "192.168.1.0/24", Some("2026-08-30 12:00:00"))]),
    )
    .await;

    let board = ScheduleBoard::new(api, Arc::new(BusySet::new()));
    board.refresh().await.unwrap();

    let rows = board.scheduled();
    assert_eq!(rows.len(), 2);
    assert!(rows[1].is_paused());
    assert_eq!(board.due_count(), 1);
}

#[tokio::test]
async fn schedule_row_ids_stable_across_refreshes() {
    let (server, api) = setup().await;
    mount_list(
        &server,
        "/plannedScans/all",
        &json!([plan_json(60, "192.168.1.0/24", Some("2026-08-30 12:00:00"))]),
    )
    .await;
    mount_list(&server, "/plannedScans/due", &json!([])).await;

    let board = ScheduleBoard::new(api, Arc::new(BusySet::new()));
    board.refresh().await.unwrap();
    let first = board.scheduled()[0].id;
    board.refresh().await.unwrap();
    let second = board.scheduled()[0].id;

    assert_eq!(first, second);
}

#[tokio::test]
async fn run_now_triggers_scan_then_touch() {
    let (server, api) = setup().await;
    mount_list(
        &server,
        "/plannedScans/all",
        &json!([plan_json(60, "192.168.1.0/24", Some("2026-08-30 12:00:00"))]),
    )
    .await;
    mount_list(&server, "/plannedScans/due", &json!([])).await;
    Mock::given(method("POST"))
        .and(path("/StartScan"))
        .and(body_json(json!({ "scan_target": "192.168.1.0/24" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/plannedScans/touch"))
        .and(body_json(json!({ "scan_target": "192.168.1.0/24" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let busy = Arc::new(BusySet::new());
    let board = ScheduleBoard::new(api, Arc::clone(&busy));
    board.refresh().await.unwrap();

    let row = board.scheduled()[0].clone();
    board.run_now(&row).await.unwrap();
    assert!(busy.is_empty());
}

#[tokio::test]
async fn delete_keys_by_interval_and_releases_busy_on_failure() {
    let (server, api) = setup().await;
    mount_list(
        &server,
        "/plannedScans/all",
        &json!([plan_json(60, "192.168.1.0/24", None)]),
    )
    .await;
    mount_list(&server, "/plannedScans/due", &json!([])).await;
    Mock::given(method("DELETE"))
        .and(path("/plannedScans/delete"))
        .and(body_json(json!({ "interval": 60 })))
        .respond_with(ResponseTemplate::new(500).set_body_string("db locked"))
        .expect(1)
        .mount(&server)
        .await;

    let busy = Arc::new(BusySet::new());
    let board = ScheduleBoard::new(api, Arc::clone(&busy));
    board.refresh().await.unwrap();

    let row = board.scheduled()[0].clone();
    assert!(board.delete(&row).await.is_err());
    assert!(busy.is_empty());
    // The row keeps its id for a retry.
    board.refresh().await.unwrap();
    assert_eq!(board.scheduled()[0].id, row.id);
}
