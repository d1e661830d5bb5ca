//! Integration tests for the pricing service router.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use house_price_estimator::service::{router, ReportedMetrics, ServiceState};
use house_price_estimator::{
    AttributeRegistry, PricingClient, PricingFormula, PropertyAttributes, FEATURE_NAMES,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    router(Arc::new(ServiceState::with_registry(
        ReportedMetrics::default(),
        AttributeRegistry::for_year(2024),
    )))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_healthy_with_metrics() {
    let (status, json) = send(app(), Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model_info"]["features"], FEATURE_NAMES.len());
    assert_eq!(json["model_info"]["trained_at"], "Unknown");
    assert_eq!(json["model_metrics"]["r2_score"], 0.8712);
}

// ---------------------------------------------------------------------------
// GET /features
// ---------------------------------------------------------------------------

#[tokio::test]
async fn features_lists_engineered_names() {
    let (status, json) = send(app(), Method::GET, "/features", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["feature_count"], FEATURE_NAMES.len());
    assert_eq!(json["features"][11], "age");
}

// ---------------------------------------------------------------------------
// POST /predict
// ---------------------------------------------------------------------------

#[tokio::test]
async fn predict_prices_with_formula() {
    let attrs = PropertyAttributes::default();
    let body = serde_json::to_value(attrs).unwrap();

    let (status, json) = send(app(), Method::POST, "/predict", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["predicted_price"], PricingFormula::price(&attrs));
    assert_eq!(json["model_info"]["features_used"], FEATURE_NAMES.len());
    assert_eq!(json["metrics"]["mape"], 14.37);
}

#[tokio::test]
async fn predict_rejects_missing_fields() {
    let (status, json) = send(app(), Method::POST, "/predict", Some(json!({"bedrooms": 3}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = json["error"].as_str().unwrap();
    assert!(error.starts_with("Missing required fields: bathrooms, living_area"));
    assert!(!error.contains("bedrooms"));
}

#[tokio::test]
async fn predict_rejects_out_of_range() {
    let mut body = serde_json::to_value(PropertyAttributes::default()).unwrap();
    body["bedrooms"] = json!(25);

    let (status, json) = send(app(), Method::POST, "/predict", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "bedrooms must be between 1 and 20");
}

#[tokio::test]
async fn predict_rejects_empty_body() {
    let (status, json) = send(app(), Method::POST, "/predict", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No data provided");
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let (status, json) = send(app(), Method::GET, "/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Endpoint not found");
}

// ---------------------------------------------------------------------------
// Client against the real service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn client_round_trip_against_service() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app()).await.unwrap();
    });
    let client = PricingClient::new(format!("http://{}", addr));

    let health = client.health_check().await.unwrap();
    assert!(health.is_healthy());

    let attrs = PropertyAttributes::default();
    let result = client.predict(&attrs).await.unwrap();
    assert_eq!(result.predicted_price, PricingFormula::price(&attrs));

    let invalid = PropertyAttributes {
        grade: 20.0,
        ..attrs
    };
    let err = client.predict(&invalid).await.unwrap_err();
    assert_eq!(err.to_string(), "grade must be between 1 and 13");
}
