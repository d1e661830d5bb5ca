// 📡 Pricing Service - the remote side of the estimator
//
// | Route           | Purpose                                  |
// |-----------------|------------------------------------------|
// | `GET /`         | health check plus reported model metrics |
// | `GET /features` | names of the engineered model features   |
// | `POST /predict` | validate an attribute set and price it   |
//
// Prices come from the deterministic `PricingFormula` (no jitter).

use crate::attributes::{AttributeRegistry, Field, PropertyAttributes};
use crate::estimator::PricingFormula;
use crate::features::{FeatureVector, FEATURE_NAMES};
use crate::prediction::{
    ErrorBody, HealthModelInfo, HealthResponse, Metrics, ModelInfo, ModelMetrics, PredictionResult,
};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

pub const MODEL_TYPE: &str = "LinearPricingFormula";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to read metrics file {path}: {source}")]
    MetricsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metrics file {path}: {source}")]
    MetricsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Error reply: status plus `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

// ============================================================================
// State
// ============================================================================

/// Metrics reported by the service, normally loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedMetrics {
    pub r2_score: f64,
    pub mae: f64,
    pub rmse: f64,
    #[serde(default)]
    pub mape: f64,
    #[serde(default = "unknown")]
    pub trained_at: String,
}

fn unknown() -> String {
    "Unknown".to_string()
}

impl Default for ReportedMetrics {
    fn default() -> Self {
        ReportedMetrics {
            r2_score: 0.8712,
            mae: 74_210.55,
            rmse: 121_876.4,
            mape: 14.37,
            trained_at: unknown(),
        }
    }
}

impl ReportedMetrics {
    pub fn load(path: &Path) -> Result<Self, ServiceError> {
        let text = std::fs::read_to_string(path).map_err(|source| ServiceError::MetricsRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ServiceError::MetricsParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub struct ServiceState {
    pub metrics: ReportedMetrics,
    pub registry: AttributeRegistry,
}

impl ServiceState {
    pub fn new(metrics: ReportedMetrics) -> Self {
        Self::with_registry(metrics, AttributeRegistry::new())
    }

    pub fn with_registry(metrics: ReportedMetrics, registry: AttributeRegistry) -> Self {
        ServiceState { metrics, registry }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: Arc<ServiceState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/features", get(get_features))
        .route("/predict", post(predict))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// GET / - Health check
async fn health_check(State(state): State<Arc<ServiceState>>) -> Json<HealthResponse> {
    let m = &state.metrics;
    Json(HealthResponse {
        status: Some(HealthResponse::HEALTHY.to_string()),
        message: Some("House Price Prediction API is running".to_string()),
        model_info: Some(HealthModelInfo {
            type_: MODEL_TYPE.to_string(),
            features: FEATURE_NAMES.len() as u32,
            trained_at: m.trained_at.clone(),
        }),
        model_metrics: Some(ModelMetrics {
            r2_score: round_to(m.r2_score, 4),
            mae: round_to(m.mae, 2),
            rmse: round_to(m.rmse, 2),
            mape: None,
        }),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeaturesResponse {
    pub features: Vec<String>,
    pub feature_count: usize,
}

/// GET /features - Names of the engineered features
async fn get_features() -> Json<FeaturesResponse> {
    Json(FeaturesResponse {
        features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        feature_count: FEATURE_NAMES.len(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub status: String,
}

/// POST /predict - Validate and price one attribute set
async fn predict(
    State(state): State<Arc<ServiceState>>,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    let attrs = parse_request(&state.registry, &body).inspect_err(|e| {
        warn!(error = %e.message, "Rejected prediction request");
    })?;

    let features = FeatureVector::from_attributes(&attrs, state.registry.current_year());
    debug!(
        age = features.get("age"),
        living_to_lot_ratio = features.get("living_to_lot_ratio"),
        "Engineered {} features",
        features.len()
    );
    let predicted_price = PricingFormula::price(&attrs);
    info!("Prediction made: ${:.2}", predicted_price);

    let m = &state.metrics;
    Ok(Json(PredictResponse {
        result: PredictionResult {
            predicted_price,
            metrics: Metrics {
                r2_score: round_to(m.r2_score, 4),
                mae: round_to(m.mae, 2),
                rmse: round_to(m.rmse, 2),
                mape: round_to(m.mape, 2),
            },
            model_info: ModelInfo {
                model_type: MODEL_TYPE.to_string(),
                features_used: Some(FEATURE_NAMES.len() as u32),
            },
        },
        status: "success".to_string(),
    }))
}

async fn not_found() -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        message: "Endpoint not found".to_string(),
    }
}

// ============================================================================
// Request validation
// ============================================================================

/// Numbers, numeric strings and booleans are accepted.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Checks run in order: body present, required fields present, numeric,
/// in range. The first failing check decides the message.
fn parse_request(registry: &AttributeRegistry, body: &[u8]) -> Result<PropertyAttributes, ApiError> {
    let data = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => map,
        _ => return Err(ApiError::bad_request("No data provided")),
    };

    let missing: Vec<&str> = Field::ALL
        .iter()
        .map(|f| f.name())
        .filter(|name| match data.get(*name) {
            None => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::bad_request(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let mut attrs = PropertyAttributes::default();
    for field in Field::ALL {
        let value = data
            .get(field.name())
            .and_then(as_number)
            .ok_or_else(|| {
                ApiError::bad_request(format!("Invalid {} value. Must be a number.", field.name()))
            })?;

        if let Some(range) = registry.range(field) {
            if !range.contains(value) {
                return Err(ApiError::bad_request(format!(
                    "{} must be between {} and {}",
                    field.name(),
                    range.min,
                    range.max
                )));
            }
        }
        attrs.set(field, value);
    }

    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AttributeRegistry {
        AttributeRegistry::for_year(2024)
    }

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_parse_full_request() {
        let json = serde_json::to_value(PropertyAttributes::default()).unwrap();
        let attrs = parse_request(&registry(), &body(json)).unwrap();
        assert_eq!(attrs, PropertyAttributes::default());
    }

    #[test]
    fn test_empty_body() {
        let err = parse_request(&registry(), b"{}").unwrap_err();
        assert_eq!(err.message, "No data provided");

        let err = parse_request(&registry(), b"not json").unwrap_err();
        assert_eq!(err.message, "No data provided");
    }

    #[test]
    fn test_missing_fields_listed_in_order() {
        let mut json = serde_json::to_value(PropertyAttributes::default()).unwrap();
        let map = json.as_object_mut().unwrap();
        map.remove("grade");
        map.insert("bedrooms".to_string(), Value::String(String::new()));

        let err = parse_request(&registry(), &body(json)).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing required fields: bedrooms, grade");
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let mut json = serde_json::to_value(PropertyAttributes::default()).unwrap();
        json["bedrooms"] = Value::String("4".to_string());

        let attrs = parse_request(&registry(), &body(json)).unwrap();
        assert_eq!(attrs.bedrooms, 4.0);
    }

    #[test]
    fn test_non_numeric_rejected() {
        let mut json = serde_json::to_value(PropertyAttributes::default()).unwrap();
        json["views"] = Value::String("lots".to_string());

        let err = parse_request(&registry(), &body(json)).unwrap_err();
        assert_eq!(err.message, "Invalid views value. Must be a number.");
    }

    #[test]
    fn test_out_of_range_message() {
        let mut json = serde_json::to_value(PropertyAttributes::default()).unwrap();
        json["bathrooms"] = serde_json::json!(0.25);

        let err = parse_request(&registry(), &body(json)).unwrap_err();
        assert_eq!(err.message, "bathrooms must be between 0.5 and 20");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.871234, 4), 0.8712);
        assert_eq!(round_to(74210.5549, 2), 74210.55);
    }
}
