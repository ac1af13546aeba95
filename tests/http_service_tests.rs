#![allow(clippy::unwrap_used)]

//! `HttpRemoteService` against a local axum server
//!
//! Each test serves a single canned response on a loopback port and captures
//! the request the client sent, so headers and bodies can be checked.

use appscout::api::{HttpRemoteService, RegisterRequest, RemoteService};
use appscout::config::ApiSettings;
use appscout::device::DeviceIdentity;
use appscout::error::AppScoutError;
use appscout::session::SessionContext;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use chrono::{TimeZone, Utc};
use std::collections::BTreeSet;
use std::sync::{Arc, mpsc};
use std::time::Duration;
use tokio::sync::oneshot;

/// Request as seen by the server
struct CapturedRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: String,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

struct CannedResponse {
    status: StatusCode,
    body: &'static str,
    requests: mpsc::Sender<CapturedRequest>,
}

async fn respond(
    State(canned): State<Arc<CannedResponse>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let _ = canned.requests.send(CapturedRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    });
    (
        canned.status,
        [(header::CONTENT_TYPE, "application/json")],
        canned.body,
    )
}

/// Loopback server answering every request with the same response
struct TestServer {
    requests: mpsc::Receiver<CapturedRequest>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// First request the server received
    fn request(&self) -> CapturedRequest {
        self.requests.recv_timeout(Duration::from_secs(5)).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Serve `body` with `status`, returning the API settings pointing at the server
fn serve_once(status: StatusCode, body: &'static str) -> (ApiSettings, TestServer) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let port = listener.local_addr().unwrap().port();

    let (request_tx, request_rx) = mpsc::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let canned = Arc::new(CannedResponse {
        status,
        body,
        requests: request_tx,
    });

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let app = Router::new().fallback(respond).with_state(canned);
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });
    });

    let settings = ApiSettings {
        base_url: format!("http://127.0.0.1:{port}/api/"),
        timeout_secs: 5,
        ..ApiSettings::default()
    };
    let server = TestServer {
        requests: request_rx,
        shutdown: Some(shutdown_tx),
    };
    (settings, server)
}

fn session() -> SessionContext {
    SessionContext {
        auth_token: "secret-token".to_string(),
        user_id: Some("12".to_string()),
        last_backgrounded_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
    }
}

fn identity() -> DeviceIdentity {
    DeviceIdentity {
        device_id: "dev-9".to_string(),
        device_name: "workstation".to_string(),
        device_model: "aarch64".to_string(),
        device_os: "macos".to_string(),
    }
}

#[test]
fn test_fetch_reference_names_sends_bearer_and_lowercases() {
    let (settings, server) = serve_once(
        StatusCode::OK,
        r#"{"success":true,"data":[{"app_name":"WhatsApp"},{"app_name":"Telegram"}]}"#,
    );
    let service = HttpRemoteService::new(settings).unwrap();

    let names = service.fetch_reference_names("secret-token").unwrap();
    let request = server.request();

    assert_eq!(names, vec!["whatsapp".to_string(), "telegram".to_string()]);
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/api/appnames");
    assert_eq!(request.header("authorization"), Some("Bearer secret-token"));
    assert!(
        request
            .header("user-agent")
            .is_some_and(|ua| ua.starts_with("AppScout/"))
    );
}

#[test]
fn test_fetch_with_success_false_is_api_error() {
    let (settings, server) = serve_once(StatusCode::OK, r#"{"success":false,"message":"Unauthenticated."}"#);
    let service = HttpRemoteService::new(settings).unwrap();

    let err = service.fetch_reference_names("stale").unwrap_err();
    server.request();

    match err {
        AppScoutError::Api { status, message } => {
            assert_eq!(status, 200);
            assert_eq!(message, "Unauthenticated.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_report_posts_device_payload() {
    let (settings, server) = serve_once(StatusCode::OK, r#"{"success":true,"message":"Stored"}"#);
    let service = HttpRemoteService::new(settings).unwrap();
    let matched: BTreeSet<String> = ["WhatsApp".to_string()].into();

    let ack = service.report(&identity(), &session(), &matched).unwrap();
    let request = server.request();

    assert_eq!(ack.message.as_deref(), Some("Stored"));
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/api/appdetect");
    assert_eq!(request.header("authorization"), Some("Bearer secret-token"));

    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "deviceId": "dev-9",
            "deviceModel": "aarch64",
            "deviceName": "workstation",
            "deviceOs": "macos",
            "user_id": "12",
            "app_closedate": "2024-01-02T03:04:05.000Z",
        })
    );
}

#[test]
fn test_report_non_200_is_api_error() {
    let (settings, server) = serve_once(StatusCode::CREATED, "{}");
    let service = HttpRemoteService::new(settings).unwrap();
    let matched: BTreeSet<String> = ["Signal".to_string()].into();

    let err = service.report(&identity(), &session(), &matched).unwrap_err();
    server.request();

    assert!(matches!(err, AppScoutError::Api { status: 201, .. }));
}

#[test]
fn test_login_returns_token() {
    let (settings, server) = serve_once(
        StatusCode::OK,
        r#"{"success":true,"message":"Login successful","data":{"token":"tok-1","user_id":3}}"#,
    );
    let service = HttpRemoteService::new(settings).unwrap();

    let outcome = service.login("5550100", "hunter2").unwrap();
    let request = server.request();

    assert_eq!(outcome.token, "tok-1");
    assert_eq!(outcome.user_id.as_deref(), Some("3"));
    assert_eq!(outcome.message.as_deref(), Some("Login successful"));

    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/api/login");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"phone_number": "5550100", "password": "hunter2"})
    );
}

#[test]
fn test_login_rejected() {
    let (settings, server) = serve_once(StatusCode::UNAUTHORIZED, r#"{"success":false,"message":"Invalid credentials"}"#);
    let service = HttpRemoteService::new(settings).unwrap();

    let err = service.login("5550100", "wrong").unwrap_err();
    server.request();

    assert!(matches!(err, AppScoutError::Api { status: 401, .. }));
}

#[test]
fn test_register_returns_message() {
    let (settings, server) = serve_once(StatusCode::OK, r#"{"success":true,"message":"User registered"}"#);
    let service = HttpRemoteService::new(settings).unwrap();
    let request = RegisterRequest {
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone_number: "5550101".to_string(),
        password: "engine".to_string(),
    };

    let message = service.register(&request).unwrap();
    let captured = server.request();

    assert_eq!(message, "User registered");
    assert_eq!(captured.method, Method::POST);
    assert_eq!(captured.path, "/api/register");
    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(body["full_name"], "Ada Lovelace");
    assert_eq!(body["email"], "ada@example.com");
}
