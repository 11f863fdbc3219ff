//! Integration tests for the HTTP transport and the widget on top of it.
//!
//! Each test starts an in-process axum server standing in for the chat
//! endpoint, so the full request/response path is exercised over a socket.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chat_widget::{
    Error,
    transport::{ChatRequest, ChatTransport, HttpTransport},
    widget::{ChatView, ChatWidget, HeadlessView, Origin, SendPolicy},
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

// =============================================================================
// Test Utilities
// =============================================================================

/// What the mock endpoint saw on its last request.
#[derive(Debug, Default, Clone)]
struct Seen {
    csrf: Option<String>,
    cookie: Option<String>,
    content_type: Option<String>,
    body: Option<Value>,
}

type Recorder = Arc<Mutex<Seen>>;

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn record(recorder: &Recorder, headers: &HeaderMap, body: Value) {
    *recorder.lock().unwrap() = Seen {
        csrf: header_str(headers, "x-csrftoken"),
        cookie: header_str(headers, "cookie"),
        content_type: header_str(headers, "content-type"),
        body: Some(body),
    };
}

/// Serve `app` on an ephemeral port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Endpoint that answers every POST with `status` and `body`.
async fn canned(status: StatusCode, body: &'static str) -> (String, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route(
            "/api/chat/",
            post(
                move |State(rec): State<Recorder>, headers: HeaderMap, Json(req): Json<Value>| async move {
                    record(&rec, &headers, req);
                    (status, [(header::CONTENT_TYPE, "application/json")], body)
                },
            ),
        )
        .with_state(Arc::clone(&recorder));
    (serve(app).await, recorder)
}

fn mounted() -> ChatWidget<HeadlessView> {
    let mut widget = ChatWidget::new(HeadlessView::new(4), SendPolicy::Concurrent);
    widget.mount();
    widget
}

fn request(text: &str) -> ChatRequest {
    ChatRequest {
        message: text.to_string(),
    }
}

// =============================================================================
// Transport
// =============================================================================

#[tokio::test]
async fn test_post_carries_body_csrf_and_cookies() {
    let (base, seen) = canned(StatusCode::OK, r#"{"response": "hi"}"#).await;
    let transport = HttpTransport::new(&base, "/api/chat/")
        .unwrap()
        .with_cookies("a=1; csrftoken=XYZ; b=2");

    let reply = transport.send(&request("hello")).await.unwrap();
    assert_eq!(reply.response, "hi");

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.csrf.as_deref(), Some("XYZ"));
    assert_eq!(seen.cookie.as_deref(), Some("a=1; csrftoken=XYZ; b=2"));
    assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    assert_eq!(seen.body, Some(json!({"message": "hello"})));
}

#[tokio::test]
async fn test_post_without_token_omits_csrf_header() {
    let (base, seen) = canned(StatusCode::OK, r#"{"response": "hi"}"#).await;
    let transport = HttpTransport::new(&base, "/api/chat/")
        .unwrap()
        .with_cookies("sessionid=abc");

    let reply = transport.send(&request("hello")).await.unwrap();
    assert_eq!(reply.response, "hi");

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.csrf, None);
    assert_eq!(seen.cookie.as_deref(), Some("sessionid=abc"));
    assert_eq!(seen.body, Some(json!({"message": "hello"})));
}

#[tokio::test]
async fn test_post_with_empty_jar_sends_no_csrf_or_cookie() {
    let (base, seen) = canned(StatusCode::OK, r#"{"response": "hi"}"#).await;
    let transport = HttpTransport::new(&base, "/api/chat/").unwrap();

    transport.send(&request("hello")).await.unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.csrf, None);
    assert_eq!(seen.cookie, None);
}

#[tokio::test]
async fn test_custom_csrf_names() {
    let recorder = Recorder::default();
    let app = Router::new()
        .route(
            "/chat",
            post(|State(rec): State<Recorder>, headers: HeaderMap, Json(req): Json<Value>| async move {
                let token = header_str(&headers, "x-xsrf-token");
                record(&rec, &headers, req);
                Json(json!({"response": token.unwrap_or_default()}))
            }),
        )
        .with_state(Arc::clone(&recorder));
    let base = serve(app).await;

    let transport = HttpTransport::new(&base, "/chat")
        .unwrap()
        .with_csrf_names("XSRF-TOKEN", "X-XSRF-TOKEN")
        .with_cookies("XSRF-TOKEN=abc%3D%3D");

    let reply = transport.send(&request("hello")).await.unwrap();
    assert_eq!(reply.response, "abc==");
    assert!(recorder.lock().unwrap().csrf.is_none());
}

#[tokio::test]
async fn test_status_failure_with_error_field() {
    let (base, _) = canned(StatusCode::BAD_REQUEST, r#"{"error": "bad request"}"#).await;
    let transport = HttpTransport::new(&base, "/api/chat/").unwrap();

    let err = transport.send(&request("hello")).await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "bad request");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_status_failure_with_non_json_body() {
    let (base, _) = canned(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").await;
    let transport = HttpTransport::new(&base, "/api/chat/").unwrap();

    let err = transport.send(&request("hello")).await.unwrap_err();
    assert!(matches!(err, Error::Json(_)), "got {err:?}");
}

#[tokio::test]
async fn test_transport_failure() {
    // Grab a free port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new(format!("http://{addr}"), "/api/chat/").unwrap();
    let err = transport.send(&request("hello")).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn test_bootstrap_and_rotation_update_jar() {
    let recorder = Recorder::default();
    let app = Router::new()
        .route(
            "/",
            get(|| async {
                (
                    [(header::SET_COOKIE, "csrftoken=BOOT; Max-Age=31449600; Path=/; SameSite=Lax")],
                    "<html></html>",
                )
            }),
        )
        .route(
            "/api/chat/",
            post(|State(rec): State<Recorder>, headers: HeaderMap, Json(req): Json<Value>| async move {
                record(&rec, &headers, req);
                (
                    [(header::SET_COOKIE, "csrftoken=ROTATED; Path=/")],
                    Json(json!({"response": "ok"})),
                )
            }),
        )
        .with_state(Arc::clone(&recorder));
    let base = serve(app).await;

    let transport = HttpTransport::new(format!("{base}/"), "/api/chat/").unwrap();
    assert!(transport.csrf_token().is_none());

    assert!(transport.bootstrap().await.unwrap());
    assert_eq!(transport.csrf_token().as_deref(), Some("BOOT"));

    transport.send(&request("hello")).await.unwrap();
    assert_eq!(recorder.lock().unwrap().csrf.as_deref(), Some("BOOT"));
    assert_eq!(transport.csrf_token().as_deref(), Some("ROTATED"));
}

#[tokio::test]
async fn test_bootstrap_without_cookie_reports_missing_token() {
    let app = Router::new().route("/", get(|| async { "<html></html>" }));
    let base = serve(app).await;

    let transport = HttpTransport::new(&base, "/api/chat/").unwrap();
    assert!(!transport.bootstrap().await.unwrap());
    assert!(transport.cookies().is_empty());
}

// =============================================================================
// Widget over HTTP
// =============================================================================

#[tokio::test]
async fn test_widget_renders_success_reply() {
    let (base, _) = canned(StatusCode::OK, r#"{"response": "hi"}"#).await;
    let transport = HttpTransport::new(&base, "/api/chat/").unwrap();
    let mut widget = mounted();

    widget.view_mut().set_input("  hello  ");
    widget.submit(&transport).await;

    let log = widget.log();
    assert_eq!(log.len(), 2);
    assert_eq!(log.messages()[0].text, "hello");
    assert_eq!(log.messages()[0].origin, Origin::User);
    let last = log.last().unwrap();
    assert_eq!(last.origin, Origin::Bot);
    assert_eq!(last.text, "hi");

    assert!(widget.view().input_value().is_empty());
    assert_eq!(widget.view().scroll_offset(), widget.view().max_scroll_offset());
}

#[tokio::test]
async fn test_widget_renders_server_error() {
    let (base, _) = canned(StatusCode::BAD_REQUEST, r#"{"error": "bad request"}"#).await;
    let transport = HttpTransport::new(&base, "/api/chat/").unwrap();
    let mut widget = mounted();

    widget.view_mut().set_input("hello");
    widget.submit(&transport).await;

    assert_eq!(widget.log().last().unwrap().text, "Error: bad request");
    assert!(widget.view().input_value().is_empty());
}

#[tokio::test]
async fn test_widget_renders_unknown_error() {
    let (base, _) = canned(StatusCode::INTERNAL_SERVER_ERROR, "{}").await;
    let transport = HttpTransport::new(&base, "/api/chat/").unwrap();
    let mut widget = mounted();

    widget.view_mut().set_input("hello");
    widget.submit(&transport).await;

    assert_eq!(widget.log().last().unwrap().text, "Error: Unknown error");
}

#[tokio::test]
async fn test_widget_renders_malformed_success_body() {
    let (base, _) = canned(StatusCode::OK, r#"{"reply": "wrong field"}"#).await;
    let transport = HttpTransport::new(&base, "/api/chat/").unwrap();
    let mut widget = mounted();

    widget.view_mut().set_input("hello");
    let last = widget.submit(&transport).await.unwrap();

    assert_eq!(last.origin, Origin::Bot);
    assert!(last.text.starts_with("Error: "), "got {:?}", last.text);
    assert!(last.text.contains("response"), "got {:?}", last.text);
}

#[tokio::test]
async fn test_widget_renders_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new(format!("http://{addr}"), "/api/chat/").unwrap();
    let expected = transport.send(&request("ping")).await.unwrap_err().to_string();

    let mut widget = mounted();
    widget.view_mut().set_input("hello");
    widget.submit(&transport).await;

    let last = widget.log().last().unwrap();
    assert_eq!(last.origin, Origin::Bot);
    assert_eq!(last.text, format!("Error: {expected}"));
    assert!(widget.view().input_value().is_empty());
    assert_eq!(widget.view().scroll_offset(), widget.view().max_scroll_offset());
}

#[tokio::test]
async fn test_widget_blank_input_sends_nothing() {
    let (base, seen) = canned(StatusCode::OK, r#"{"response": "hi"}"#).await;
    let transport = HttpTransport::new(&base, "/api/chat/").unwrap();
    let mut widget = mounted();

    widget.view_mut().set_input("   ");
    assert!(widget.submit(&transport).await.is_none());

    assert!(widget.log().is_empty());
    assert!(seen.lock().unwrap().body.is_none());
}
