use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use encode::proxy::{self, ProxyState, ANALYZE_ROUTE};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    matchers::{body_json, body_string, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const MAX_SIZE: usize = 1024 * 1024;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn app_for(webhook_url: String) -> Router {
    proxy::router(ProxyState::with_webhook_url(webhook_url))
}

async fn post(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let (status, _, text) = post_raw(app, body).await;
    (status, serde_json::from_str(&text).unwrap())
}

// status, content type and the body exactly as sent back
async fn post_raw(app: Router, body: impl Into<Body>) -> (StatusCode, Option<String>, String) {
    let request = Request::builder()
        .method("POST")
        .uri(ANALYZE_ROUTE)
        .header(CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), MAX_SIZE).await.unwrap();

    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

fn failure() -> Value {
    json!({ "error": "Failed to connect to AI Brain" })
}

#[tokio::test]
async fn relays_the_webhook_reply() {
    init_logging();
    let mock_server = MockServer::start().await;
    let request_body = json!({ "image": "data:image/png;base64,AAAA", "user": { "diet": "vegan" } });
    let reply = json!({ "product_name": "Oat Milk", "risk_level": "Low", "highlight_ingredients": ["Oats"] });

    Mock::given(method("POST"))
        .and(path("/webhook/analyze"))
        .and(body_json(&request_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(&reply))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = app_for(format!("{}/webhook/analyze", mock_server.uri()));
    let (status, body) = post(app, request_body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, reply);
}

#[tokio::test]
async fn bodies_pass_through_byte_for_byte() {
    let mock_server = MockServer::start().await;
    let request_body = r#"{"zeta":1,"alpha":2}"#;
    let reply = r#"{"risk_level":"High","product_name":"Soda","amount":1.10}"#;

    Mock::given(method("POST"))
        .and(header("content-type", "application/json"))
        .and(body_string(request_body))
        .respond_with(ResponseTemplate::new(200).set_body_raw(reply, "application/json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, content_type, body) = post_raw(app_for(mock_server.uri()), request_body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body, reply);
}

#[tokio::test]
async fn any_json_shape_is_forwarded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!([1, "two", null])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = post(app_for(mock_server.uri()), r#"[1, "two", null]"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn unreachable_webhook_gives_fixed_error() {
    init_logging();
    // nothing listens on port 1
    let app = app_for("http://127.0.0.1:1/webhook".to_string());

    let (status, body) = post(app, r#"{"image": "x"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, failure());
}

#[tokio::test]
async fn webhook_error_status_gives_fixed_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({ "message": "workflow crashed" })))
        .mount(&mock_server)
        .await;

    let (status, body) = post(app_for(mock_server.uri()), "{}").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, failure());
}

#[tokio::test]
async fn non_json_reply_gives_fixed_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Workflow was started"))
        .mount(&mock_server)
        .await;

    let (status, body) = post(app_for(mock_server.uri()), "{}").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, failure());
}

#[tokio::test]
async fn malformed_request_never_reaches_the_webhook() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (status, body) = post(app_for(mock_server.uri()), "not json at all").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, failure());
}

#[tokio::test]
async fn only_post_is_routed() {
    let app = app_for("http://127.0.0.1:1".to_string());
    let request = Request::builder()
        .method("GET")
        .uri(ANALYZE_ROUTE)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
