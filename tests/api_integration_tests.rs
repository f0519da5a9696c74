use axum::{
    body::Body,
    http::{
        header::{ALLOW, CONTENT_TYPE, RETRY_AFTER},
        Request, StatusCode,
    },
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use webadmin::api::{error_routes, handlers::AppStateInner, routes};
use webadmin::errors::{ApiError, ErrorResponder, ErrorType, INTERNAL_ERROR_MESSAGE};
use webadmin::json::JsonBody;

// Helper to create the full WebAdmin app
fn create_test_app(error_routes_enabled: bool) -> Router {
    let state = Arc::new(AppStateInner {
        instance_id: "test-instance".to_string(),
        error_routes_enabled,
    });

    routes::create_router(state)
}

#[derive(Debug, Deserialize)]
struct QuotaRequest {
    count: u64,
}

async fn corrupted_index() -> &'static str {
    panic!("mailbox index corrupted")
}

// Router with handlers failing in every way the translation layer covers
fn create_failing_app() -> Router {
    let router = Router::new()
        .route("/panic", get(corrupted_index))
        .route(
            "/quota",
            post(|JsonBody(quota): JsonBody<QuotaRequest>| async move {
                axum::Json(json!({ "count": quota.count }))
            }),
        )
        .route(
            "/strict-json",
            post(|axum::Json(value): axum::Json<Value>| async move { axum::Json(value) }),
        )
        .route(
            "/unavailable",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "cassandra is down") }),
        )
        .route(
            "/wrong-state",
            get(|| async {
                Err::<(), _>(ApiError::from(
                    ErrorResponder::new(
                        StatusCode::CONFLICT,
                        ErrorType::WrongState,
                        "Task is already running",
                    )
                    .build(),
                ))
            }),
        )
        .route(
            "/parse-count",
            get(|| async {
                use anyhow::Context;
                let count: u32 = "many".parse().context("Invalid stored count")?;
                Ok::<_, ApiError>(count.to_string())
            }),
        )
        .route(
            "/users/bob",
            get(|| async { (StatusCode::NOT_FOUND, "user bob does not exist") }),
        )
        .route(
            "/read-only",
            get(|| async {
                (
                    StatusCode::METHOD_NOT_ALLOWED,
                    [(ALLOW, "GET,HEAD"), (RETRY_AFTER, "30")],
                    "use GET",
                )
            }),
        )
        .route("/only-get", get(|| async { "ok" }));

    routes::with_error_translation(router)
}

// Helper to send request and return status, headers and raw body
async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

async fn send_json_request(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(app, request).await;
    let json: Value = serde_json::from_str(&body).unwrap_or(json!({}));

    (status, json)
}

async fn send_body_request(
    app: Router,
    uri: &str,
    content_type: Option<&str>,
    body: &'static str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body)).unwrap();

    let (status, _, body) = send(app, request).await;
    let json: Value = serde_json::from_str(&body).unwrap_or(json!({}));

    (status, json)
}

fn error_route(name: &str) -> String {
    format!("{}/{}", error_routes::BASE_URL, name)
}

// ========== DIAGNOSTIC ROUTES ==========

#[tokio::test]
async fn test_internal_error_route_returns_server_error_json() {
    let request = Request::builder()
        .uri(error_route(error_routes::INTERNAL_SERVER_ERROR))
        .body(Body::empty())
        .unwrap();

    let (status, content_type, body) = send(create_test_app(true), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        body,
        r#"{"statusCode":500,"type":"ServerError","message":"WebAdmin encountered an unexpected internal error"}"#
    );
}

#[tokio::test]
async fn test_not_found_route_returns_not_found_json() {
    let request = Request::builder()
        .uri(error_route(error_routes::NOT_FOUND))
        .body(Body::empty())
        .unwrap();

    let (status, content_type, body) = send(create_test_app(true), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        body,
        r#"{"statusCode":404,"type":"NotFound","message":"GET /errors/notFound can not be found"}"#
    );
}

#[tokio::test]
async fn test_json_extract_route_returns_bad_request_json() {
    let (status, body) = send_json_request(
        create_test_app(true),
        "GET",
        &error_route(error_routes::JSON_EXTRACT_EXCEPTION),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "statusCode": 400,
            "type": "InvalidArgument",
            "message": "JSON payload of the request is not valid",
            "details": "expected value at line 1 column 1"
        })
    );
}

#[tokio::test]
async fn test_diagnostic_routes_are_repeatable() {
    for route in [
        error_routes::INTERNAL_SERVER_ERROR,
        error_routes::NOT_FOUND,
        error_routes::JSON_EXTRACT_EXCEPTION,
    ] {
        let mut bodies = Vec::new();
        for _ in 0..2 {
            let request = Request::builder()
                .uri(error_route(route))
                .body(Body::empty())
                .unwrap();
            let (_, _, body) = send(create_test_app(true), request).await;
            bodies.push(body);
        }
        assert_eq!(bodies[0], bodies[1], "route {route} is not deterministic");
    }
}

#[tokio::test]
async fn test_error_routes_can_be_disabled() {
    let (status, body) = send_json_request(
        create_test_app(false),
        "GET",
        &error_route(error_routes::INTERNAL_SERVER_ERROR),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "GET /errors/internalError can not be found");
}

// ========== ROUTE NOT FOUND ==========

#[tokio::test]
async fn test_unregistered_method_on_registered_path() {
    let (status, body) = send_json_request(
        create_test_app(true),
        "DELETE",
        &error_route(error_routes::INTERNAL_SERVER_ERROR),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["type"], "NotFound");
    assert_eq!(body["message"], "DELETE /errors/internalError can not be found");
}

#[tokio::test]
async fn test_not_found_message_excludes_query() {
    let (status, body) =
        send_json_request(create_test_app(true), "PUT", "/domains/example.com?force=true").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "PUT /domains/example.com can not be found");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_method_not_allowed_is_translated_to_not_found() {
    let (status, body) = send_json_request(create_failing_app(), "POST", "/only-get").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["message"], "POST /only-get can not be found");
}

#[tokio::test]
async fn test_handler_not_found_keeps_its_body_as_details() {
    let (status, body) = send_json_request(create_failing_app(), "GET", "/users/bob").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({
            "statusCode": 404,
            "type": "NotFound",
            "message": "GET /users/bob can not be found",
            "details": "user bob does not exist"
        })
    );
}

#[tokio::test]
async fn test_method_not_allowed_drops_allow_header() {
    let request = Request::builder()
        .uri("/read-only")
        .body(Body::empty())
        .unwrap();

    let response = create_failing_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(ALLOW).is_none());
    assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "30");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["message"], "GET /read-only can not be found");
    assert!(body.get("details").is_none());
}

// ========== INTERNAL FAILURES ==========

#[tokio::test]
async fn test_panic_is_translated_without_details() {
    let (status, body) = send_json_request(create_failing_app(), "GET", "/panic").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "statusCode": 500,
            "type": "ServerError",
            "message": INTERNAL_ERROR_MESSAGE
        })
    );
}

#[tokio::test]
async fn test_anyhow_error_is_translated_without_details() {
    let (status, body) = send_json_request(create_failing_app(), "GET", "/parse-count").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["type"], "ServerError");
    assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_plain_server_error_is_rewritten() {
    let (status, body) = send_json_request(create_failing_app(), "GET", "/unavailable").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["statusCode"], 503);
    assert_eq!(body["type"], "ServerError");
    assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
    assert!(body.get("details").is_none());
}

// ========== PAYLOAD FAILURES ==========

#[tokio::test]
async fn test_json_body_accepts_valid_payload() {
    let (status, body) =
        send_body_request(create_failing_app(), "/quota", None, r#"{"count": 12}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 12);
}

#[tokio::test]
async fn test_json_body_reports_parser_details() {
    let (status, body) = send_body_request(
        create_failing_app(),
        "/quota",
        Some("application/json"),
        "{\"count\": }",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["type"], "InvalidArgument");
    assert_eq!(body["message"], "JSON payload of the request is not valid");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .starts_with("expected value at line 1"));
}

#[tokio::test]
async fn test_framework_rejection_is_rewritten() {
    let (status, body) =
        send_body_request(create_failing_app(), "/strict-json", None, r#"{"a": 1}"#).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["statusCode"], 415);
    assert_eq!(body["type"], "InvalidArgument");
    assert_eq!(body["message"], "Unsupported Media Type");
    assert!(body["details"].as_str().unwrap().contains("Content-Type"));
}

// ========== DOMAIN ERRORS ==========

#[tokio::test]
async fn test_shaped_domain_error_passes_through() {
    let (status, body) = send_json_request(create_failing_app(), "GET", "/wrong-state").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        json!({
            "statusCode": 409,
            "type": "WrongState",
            "message": "Task is already running"
        })
    );
}

#[tokio::test]
async fn test_successful_response_is_untouched() {
    let request = Request::builder()
        .uri("/only-get")
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(create_failing_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

// ========== AMBIENT ENDPOINTS ==========

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send_json_request(create_test_app(true), "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "webadmin");
    assert_eq!(body["instance_id"], "test-instance");
}

#[tokio::test]
async fn test_request_id_header_is_set() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(true).oneshot(request).await.unwrap();
    assert!(response.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn test_metrics_count_error_responses() {
    let app = create_test_app(true);
    let (status, _) = send_json_request(app.clone(), "GET", "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send_json_request(app.clone(), "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("webadmin_error_responses_total"));
    assert!(body.contains("http_requests_total"));
    assert!(body.contains(r#"route="/health""#));
    assert!(!body.contains(r#"route="/nowhere""#));
}

#[tokio::test]
async fn test_error_response_into_response_matches_status() {
    let response = ErrorResponder::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        ErrorType::InvalidArgument,
        "Unknown domain",
    )
    .build()
    .into_response();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
