//! Relay endpoints against a mock Google backend.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Form, Json, Router};
use serde_json::{Value, json};

use weekcal_core::{CalendarClient, CredentialStore, Credentials, Endpoints};
use weekcal_server::{RelayHandle, RelayServer};

#[derive(Default)]
struct Google {
    accepted_token: Mutex<String>,
    events: Mutex<Vec<Value>>,
    token_calls: AtomicUsize,
    deleted: Mutex<Vec<String>>,
}

type Mock = Arc<Google>;

fn authorized(mock: &Google, headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", mock.accepted_token.lock().unwrap());
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected)
}

async fn list(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    if !authorized(&mock, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "items": mock.events.lock().unwrap().clone() })).into_response()
}

async fn insert(State(mock): State<Mock>, headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    if !authorized(&mock, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    body["id"] = json!("created1");
    mock.events.lock().unwrap().push(body.clone());
    Json(body).into_response()
}

async fn remove(
    State(mock): State<Mock>,
    Path((_calendar, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&mock, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    mock.deleted.lock().unwrap().push(id);
    StatusCode::NO_CONTENT.into_response()
}

async fn token(State(mock): State<Mock>, Form(form): Form<HashMap<String, String>>) -> Response {
    mock.token_calls.fetch_add(1, Ordering::SeqCst);

    match form.get("grant_type").map(String::as_str) {
        Some("refresh_token") => {
            Json(json!({ "access_token": "refreshed", "expires_in": 3599 })).into_response()
        }
        Some("authorization_code") if form.get("code").map(String::as_str) == Some("good") => {
            Json(json!({
                "access_token": "from-code",
                "refresh_token": "new-refresh",
                "expires_in": 3599
            }))
            .into_response()
        }
        _ => (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" }))).into_response(),
    }
}

async fn spawn_google(mock: Mock) -> SocketAddr {
    let app = Router::new()
        .route("/v3/calendars/{calendar}/events", get(list).post(insert))
        .route("/v3/calendars/{calendar}/events/{id}", delete(remove))
        .route("/token", post(token))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}

struct Harness {
    google: Mock,
    relay: RelayHandle,
    credentials: CredentialStore,
    http: reqwest::Client,
    _dir: tempfile::TempDir,
    config_path: std::path::PathBuf,
}

impl Harness {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.relay.addr(), path)
    }
}

async fn harness(access_token: &str) -> Harness {
    let google: Mock = Arc::default();
    *google.accepted_token.lock().unwrap() = "valid".into();
    let addr = spawn_google(google.clone()).await;

    let endpoints = Endpoints {
        calendar_base: format!("http://{}/v3", addr),
        token_url: format!("http://{}/token", addr),
        auth_url: format!("http://{}/o/oauth2/v2/auth", addr),
    };

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join(".env");
    std::fs::write(&config_path, "ACCESS_TOKEN=\"x\"\nREFRESH_TOKEN=\"rt\"\n").unwrap();

    let credentials = CredentialStore::new(
        Credentials {
            access_token: access_token.into(),
            refresh_token: "rt".into(),
            client_id: "cid".into(),
            client_secret: "secret".into(),
            calendar_id: "primary".into(),
        },
        &endpoints,
        Some(config_path.clone()),
    );
    let client = CalendarClient::new(credentials.clone(), endpoints);
    let relay = RelayServer::new(client, 0).start().await.unwrap();

    Harness {
        google,
        relay,
        credentials,
        http: reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap(),
        _dir: dir,
        config_path,
    }
}

fn event_body(start: &str, end: &str) -> Value {
    json!({
        "summary": "Standup",
        "location": "Room 4",
        "start": { "dateTime": start },
        "end": { "dateTime": end }
    })
}

#[tokio::test]
async fn test_lists_events() {
    let h = harness("valid").await;
    h.google.events.lock().unwrap().push(json!({
        "id": "e1",
        "summary": "Lunch",
        "start": { "dateTime": "2025-03-20T12:00:00+01:00" },
        "end": { "dateTime": "2025-03-20T13:00:00+01:00" }
    }));

    let response = h.http.get(h.url("/calendar/events?weeks=2")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let events: Vec<Value> = response.json().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], "e1");
    assert_eq!(events[0]["summary"], "Lunch");
    assert!(events[0].get("location").is_none());
    assert_eq!(events[0]["start"]["dateTime"], "2025-03-20T12:00:00+01:00");
}

#[tokio::test]
async fn test_rejects_non_positive_weeks() {
    let h = harness("valid").await;

    for weeks in ["0", "-1", "abc"] {
        let response = h
            .http
            .get(h.url(&format!("/calendar/events?weeks={}", weeks)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "weeks={}", weeks);
    }
}

#[tokio::test]
async fn test_upstream_401_becomes_refresh_oauth_secret() {
    let h = harness("expired").await;

    let response = h.http.get(h.url("/calendar/events")).send().await.unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(response.text().await.unwrap(), "Refresh OAuth Secret");
    assert_eq!(h.google.token_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_admin_refresh_replaces_and_persists_token() {
    let h = harness("expired").await;

    let response = h.http.post(h.url("/admin/refresh")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.text().await.unwrap(),
        "Successfully refreshed access token"
    );

    assert_eq!(h.credentials.current_access_token(), "refreshed");
    let saved = std::fs::read_to_string(&h.config_path).unwrap();
    assert!(saved.contains("ACCESS_TOKEN=\"refreshed\""));
}

#[tokio::test]
async fn test_creates_event() {
    let h = harness("valid").await;

    let response = h
        .http
        .post(h.url("/calendar/events"))
        .json(&event_body("2025-03-20T09:00:00Z", "2025-03-20T09:15:00Z"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let created: Value = response.json().await.unwrap();
    assert_eq!(created["id"], "created1");
    assert_eq!(created["location"], "Room 4");
}

#[tokio::test]
async fn test_rejects_event_ending_before_start() {
    let h = harness("valid").await;

    let response = h
        .http
        .post(h.url("/calendar/events"))
        .json(&event_body("2025-03-20T10:00:00Z", "2025-03-20T09:00:00Z"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert!(h.google.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_patch_without_id_is_bad_request() {
    let h = harness("valid").await;

    let response = h
        .http
        .patch(h.url("/calendar/events"))
        .json(&event_body("2025-03-20T09:00:00Z", "2025-03-20T10:00:00Z"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_deletes_by_id() {
    let h = harness("valid").await;

    let response = h
        .http
        .delete(h.url("/calendar/events"))
        .json(&json!({ "id": "gone" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(*h.google.deleted.lock().unwrap(), vec!["gone".to_string()]);
}

#[tokio::test]
async fn test_auth_google_redirects_to_consent() {
    let h = harness("valid").await;

    let response = h.http.get(h.url("/auth/google")).send().await.unwrap();
    assert_eq!(response.status(), 307);

    let location = response.headers()["location"].to_str().unwrap();
    let url = url_pairs(location);
    assert_eq!(url["client_id"], "cid");
    assert_eq!(url["access_type"], "offline");
    assert_eq!(url["prompt"], "consent");
    assert_eq!(
        url["redirect_uri"],
        format!("http://localhost:{}/auth/callback", h.relay.addr().port())
    );
}

fn url_pairs(location: &str) -> HashMap<String, String> {
    reqwest::Url::parse(location)
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect()
}

#[tokio::test]
async fn test_callback_without_code_is_bad_request() {
    let h = harness("valid").await;

    let response = h.http.get(h.url("/auth/callback")).send().await.unwrap();
    assert_eq!(response.status(), 400);

    let response = h
        .http
        .get(h.url("/auth/callback?error=access_denied"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_callback_stores_tokens_and_signals() {
    let h = harness("old").await;

    let response = h
        .http
        .get(h.url("/auth/callback?code=good"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.text().await.unwrap(),
        "Authorization successful. You can close this window."
    );

    tokio::time::timeout(Duration::from_secs(1), h.relay.authorized())
        .await
        .expect("authorization was not signalled");

    let creds = h.credentials.snapshot();
    assert_eq!(creds.access_token, "from-code");
    assert_eq!(creds.refresh_token, "new-refresh");

    let saved = std::fs::read_to_string(&h.config_path).unwrap();
    assert!(saved.contains("REFRESH_TOKEN=\"new-refresh\""));
}

#[tokio::test]
async fn test_cors_allows_local_origin() {
    let h = harness("valid").await;
    let origin = format!("http://localhost:{}", h.relay.addr().port());

    let response = h
        .http
        .request(reqwest::Method::OPTIONS, h.url("/calendar/events"))
        .header("Origin", &origin)
        .header("Access-Control-Request-Method", "PATCH")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["access-control-allow-origin"].to_str().unwrap(),
        origin
    );
    let methods = response.headers()["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .to_string();
    assert!(methods.contains("PATCH"));
}

#[tokio::test]
async fn test_stop_closes_the_listener() {
    let h = harness("valid").await;
    let url = h.url("/calendar/events");
    let http = h.http.clone();

    h.relay.stop().await.unwrap();

    assert!(http.get(url).send().await.is_err());
}
