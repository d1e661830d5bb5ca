// 📦 Prediction Types - wire format
//
// Shared by the remote client, the local estimator and the service.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Synthetic or reported accuracy metrics of the pricing model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub r2_score: f64,
    pub mae: f64,
    pub rmse: f64,
    #[serde(default)]
    pub mape: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features_used: Option<u32>,
}

/// A single price estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_price: f64,
    pub metrics: Metrics,
    pub model_info: ModelInfo,
}

/// Metrics block of the health response (`mape` may be absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub r2_score: f64,
    pub mae: f64,
    pub rmse: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mape: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthModelInfo {
    #[serde(rename = "type")]
    pub type_: String,
    pub features: u32,
    pub trained_at: String,
}

/// Body of `GET /`. Every key is optional on the client side, and a key
/// whose value does not decode reads as `None` instead of failing the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub model_info: Option<HealthModelInfo>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub model_metrics: Option<ModelMetrics>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

impl HealthResponse {
    pub const HEALTHY: &'static str = "healthy";

    pub fn is_healthy(&self) -> bool {
        self.status.as_deref() == Some(Self::HEALTHY)
    }
}

/// Error body returned by the service on failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
