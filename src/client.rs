// 🌐 Pricing Client - HTTP calls to the remote pricing service
//
// Two calls: the startup health probe (`GET /`) and the price prediction
// (`POST /predict`). No explicit timeout is configured; the transport
// default applies.

use crate::attributes::PropertyAttributes;
use crate::prediction::{ErrorBody, HealthResponse, PredictionResult};
use tracing::{debug, warn};

/// Shown when the service fails without an `error` message of its own.
pub const GENERIC_PREDICT_FAILURE: &str = "Prediction failed. Please try again.";

/// Error text of a failed health probe without an `error` message.
pub const HEALTH_CHECK_FAILURE: &str = "Pricing service health check failed";

/// Errors from the pricing service client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (connection refused, DNS, TLS, ...).
    #[error("Unable to reach the pricing service")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-2xx status. `message` is the body's
    /// `error` string, or the generic failure text when absent.
    #[error("{message}")]
    Service { status: u16, message: String },

    /// A 2xx body that does not decode as the expected type.
    #[error("Unexpected response from the pricing service: {0}")]
    Decode(String),
}

pub struct PricingClient {
    client: reqwest::Client,
    base_url: String,
}

impl PricingClient {
    /// * `base_url` - e.g. `http://localhost:5000`; a trailing `/` is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /`. Any failure is returned to the caller, which decides the
    /// fallback.
    pub async fn health_check(&self) -> Result<HealthResponse, ClientError> {
        let response = self.client.get(format!("{}/", self.base_url)).send().await?;
        let response = Self::ensure_success(response, HEALTH_CHECK_FAILURE).await?;
        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// `POST /predict` with the attribute set as the JSON body.
    pub async fn predict(&self, attrs: &PropertyAttributes) -> Result<PredictionResult, ClientError> {
        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(attrs)
            .send()
            .await?;
        let response = Self::ensure_success(response, GENERIC_PREDICT_FAILURE).await?;
        let bytes = response.bytes().await?;

        let result: PredictionResult =
            serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))?;
        debug!(predicted_price = result.predicted_price, "Remote prediction received");
        Ok(result)
    }

    // ---- private helpers ----

    /// Pass 2xx responses through; turn anything else into
    /// [`ClientError::Service`] carrying the server's `error` text, or
    /// `fallback` when the body has none.
    async fn ensure_success(
        response: reqwest::Response,
        fallback: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| fallback.to_string());

        warn!(status = status.as_u16(), %message, "Pricing service returned an error");
        Err(ClientError::Service {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = PricingClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_service_error_displays_message_verbatim() {
        let err = ClientError::Service {
            status: 400,
            message: "bad input".to_string(),
        };
        assert_eq!(err.to_string(), "bad input");
    }

    fn response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            axum::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_error_text_falls_back_per_call() {
        let err = PricingClient::ensure_success(response(503, "down"), HEALTH_CHECK_FAILURE)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), HEALTH_CHECK_FAILURE);

        let err = PricingClient::ensure_success(response(500, "{}"), GENERIC_PREDICT_FAILURE)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), GENERIC_PREDICT_FAILURE);

        let body = r#"{"error":"bad input"}"#;
        let err = PricingClient::ensure_success(response(400, body), HEALTH_CHECK_FAILURE)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "bad input");
    }
}
