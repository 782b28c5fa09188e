//! Router-level tests for the bias endpoints.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use bias_api::config::Config;
use bias_api::routes::build_router;
use bias_api::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with(config: Config) -> axum::Router {
    build_router(AppState::new(config))
}

fn app() -> axum::Router {
    app_with(Config::default())
}

fn make_post_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = ServiceExt::<Request<Body>>::oneshot(app, req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

fn candidates(n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| {
                json!({
                    "candidate_id": i,
                    "gender": if i % 2 == 0 { "female" } else { "male" },
                    "hiring_decision": if i % 2 == 0 { "rejected" } else { "hired" },
                    "final_score": if i % 2 == 0 { 60 + i % 7 } else { 82 + i % 7 },
                })
            })
            .collect(),
    )
}

// --- /health ---

#[tokio::test]
async fn test_health() {
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, json) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "bias-api");
}

// --- /api/v1/bias/text ---

#[tokio::test]
async fn test_text_endpoint_flags_stereotypes() {
    let req = make_post_request(
        "/api/v1/bias/text",
        json!({"text": "She seems too aggressive and emotional for this senior role"}),
    );
    let (status, json) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["analysis"], "text");
    assert_eq!(json["detected"], true);
    assert_eq!(json["evidence"]["kind"], "text");
    assert!(json["evidence"]["detected_patterns"]["gender_bias"].is_array());
    assert!(json["analysis_id"].is_string());
    assert!(json["analyzed_at"].is_string());
}

#[tokio::test]
async fn test_text_endpoint_rejects_empty_text() {
    let req = make_post_request("/api/v1/bias/text", json!({"text": "  "}));
    let (status, json) = send(app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

// --- /api/v1/bias/demographic ---

#[tokio::test]
async fn test_demographic_endpoint_defaults_to_gender() {
    let req = make_post_request(
        "/api/v1/bias/demographic",
        json!({"candidates": candidates(60)}),
    );
    let (status, json) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["detected"], true);
    assert_eq!(json["confidence"], "high");
    assert_eq!(json["evidence"]["protected_attribute"], "gender");
    assert_eq!(json["evidence"]["bias_level"], "high");
}

#[tokio::test]
async fn test_demographic_endpoint_reports_missing_attribute() {
    let req = make_post_request(
        "/api/v1/bias/demographic",
        json!({"candidates": candidates(10), "protected_attribute": "ethnicity"}),
    );
    let (status, json) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["confidence"], "none");
    assert_eq!(json["evidence"]["kind"], "missing_field");
}

#[tokio::test]
async fn test_candidate_limit_enforced() {
    let config = Config {
        max_candidates: 5,
        ..Config::default()
    };
    let req = make_post_request("/api/v1/bias/scores", json!({"candidates": candidates(6)}));
    let (status, json) = send(app_with(config), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Too many candidates"));
}

#[tokio::test]
async fn test_blank_attribute_rejected() {
    let req = make_post_request(
        "/api/v1/bias/scores",
        json!({"candidates": candidates(6), "protected_attribute": ""}),
    );
    let (status, _) = send(app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// --- /api/v1/bias/scores ---

#[tokio::test]
async fn test_scores_endpoint() {
    let req = make_post_request("/api/v1/bias/scores", json!({"candidates": candidates(30)}));
    let (status, json) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["analysis"], "score");
    assert_eq!(json["detected"], true);
    assert_eq!(json["evidence"]["fields"]["final_score"]["status"], "analyzed");
}

// --- /api/v1/bias/comprehensive ---

#[tokio::test]
async fn test_comprehensive_endpoint() {
    let req = make_post_request(
        "/api/v1/bias/comprehensive",
        json!({
            "text": "Strong candidate, demonstrated measurable results",
            "candidates": candidates(20),
        }),
    );
    let (status, json) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["overall"]["analysis"], "aggregate");
    assert_eq!(json["overall"]["evidence"]["analyses_run"], 3);
    assert!(json["demographic"]["gender"].is_object());
    assert_eq!(json["text"]["detected"], false);
}

// --- /api/v1/bias/insights ---

#[tokio::test]
async fn test_insights_endpoint() {
    let req = make_post_request("/api/v1/bias/insights", json!({"candidates": candidates(20)}));
    let (status, json) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_candidates"], 20);
    assert_eq!(json["overall_hiring_rate"], 0.5);
    assert_eq!(json["risk_level"], "high");
}

#[tokio::test]
async fn test_insights_endpoint_small_list() {
    let req = make_post_request("/api/v1/bias/insights", json!({"candidates": candidates(3)}));
    let (status, json) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Insufficient data for statistical analysis");
}
