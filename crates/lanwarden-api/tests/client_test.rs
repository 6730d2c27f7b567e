#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lanwarden_api::{ApiClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({
            "username": "admin",
            "password": "test-password"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "test-password".to_string().into();
    client.login("admin", &secret).await.unwrap();
}

#[tokio::test]
async fn test_login_failure_carries_status_and_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"error":"bad credentials"}"#),
        )
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong-password".to_string().into();
    let result = client.login("admin", &secret).await;

    match result {
        Err(Error::Http {
            status,
            ref status_text,
            ref body,
        }) => {
            assert_eq!(status, 401);
            assert_eq!(status_text, "Unauthorized");
            assert!(body.contains("bad credentials"), "body was: {body}");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
    assert!(result.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn test_me_returns_username() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "username": "admin" })),
        )
        .mount(&server)
        .await;

    let me = client.me().await.unwrap();
    assert!(me.ok);
    assert_eq!(me.username.as_deref(), Some("admin"));
}

// ── Device list tests ───────────────────────────────────────────────

#[tokio::test]
async fn test_get_approved_parses_rows() {
    let (server, client) = setup().await;

    let rows = json!([
        {
            "mac_address": "aa:bb:cc:dd:ee:ff",
            "ip_address": "192.168.1.10",
            "hostname": "printer",
            "description": "office printer",
            "vendor": "HP",
            "first_seen": "2026-01-04 09:15:00",
            "last_seen": "2026-08-29 17:02:11"
        },
        {
            "mac_address": "11:22:33:44:55:66",
            "ip_address": "192.168.1.11"
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/getApproved"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&rows))
        .mount(&server)
        .await;

    let devices = client.get_approved().await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].mac_address, "aa:bb:cc:dd:ee:ff");
    assert_eq!(devices[0].hostname.as_deref(), Some("printer"));
    assert_eq!(devices[1].ip_address, "192.168.1.11");
    assert!(devices[1].description.is_none());
}

#[tokio::test]
async fn test_non_json_success_is_empty_list() {
    let (server, client) = setup().await;

    // Backend sends a bare 200 with a text body when a table is empty.
    Mock::given(method("GET"))
        .and(path("/getUnapproved"))
        .respond_with(ResponseTemplate::new(200).set_body_string("no rows"))
        .mount(&server)
        .await;

    let devices = client.get_unapproved().await.unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_remove_approved_sends_identity_pair() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/removeApproved"))
        .and(body_json(json!({
            "mac_address": "aa:bb:cc:dd:ee:ff",
            "ip_address": "192.168.1.10"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .remove_approved("aa:bb:cc:dd:ee:ff", "192.168.1.10")
        .await
        .unwrap();
}

// ── Scan and schedule tests ─────────────────────────────────────────

#[tokio::test]
async fn test_start_scan_with_target() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/StartScan"))
        .and(body_json(json!({ "scan_target": "192.168.1.0/24" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.start_scan(Some("192.168.1.0/24")).await.unwrap();
}

#[tokio::test]
async fn test_planned_all_parses_paused_rows() {
    let (server, client) = setup().await;

    let rows = json!([
        {
            "interval": 60,
            "scan_target": "192.168.1.0/24",
            "next_scan_at": "2026-08-30 12:00:00",
            "last_scan_at": "2026-08-30 11:00:00"
        },
        {
            "interval": 1440,
            "scan_target": "10.0.0.0/16",
            "next_scan_at": null,
            "last_scan_at": null
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/plannedScans/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&rows))
        .mount(&server)
        .await;

    let plans = client.planned_all().await.unwrap();

    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].interval, 60);
    assert_eq!(
        plans[0].next_scan_at.as_deref(),
        Some("2026-08-30 12:00:00")
    );
    assert!(plans[1].next_scan_at.is_none());
}

#[tokio::test]
async fn test_delete_planned_keys_by_interval() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/plannedScans/delete"))
        .and(body_json(json!({ "interval": 60 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_planned(60).await.unwrap();
}

// ── Error contract tests ────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_surfaces_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/getApproved"))
        .respond_with(ResponseTemplate::new(500).set_body_string("scanner offline"))
        .mount(&server)
        .await;

    let result = client.get_approved().await;

    match result {
        Err(Error::Http {
            status,
            ref status_text,
            ref body,
        }) => {
            assert_eq!(status, 500);
            assert_eq!(status_text, "Internal Server Error");
            assert_eq!(body, "scanner offline");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_json_multibyte_body_is_error_not_panic() {
    let (server, client) = setup().await;

    // Long invalid body whose 200th byte lands inside a multi-byte
    // character; the preview must back up to a char boundary.
    let body = format!("{}ééééé", "x".repeat(199));
    Mock::given(method("GET"))
        .and(path("/getApproved"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let result = client.get_approved().await;

    match result {
        Err(Error::Deserialization { ref message, .. }) => {
            assert!(message.contains("body preview"), "message was: {message}");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_json_reports_preview() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/getApproved"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("{not json", "application/json"),
        )
        .mount(&server)
        .await;

    let result = client.get_approved().await;

    match result {
        Err(Error::Deserialization { ref message, .. }) => {
            assert!(message.contains("not json"), "message was: {message}");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
