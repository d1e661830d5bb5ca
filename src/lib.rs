// House Price Estimator - Core Library
// Field validation, local/remote price estimation and the form state machine,
// shared by the terminal form, the pricing service and the tests

pub mod attributes;
pub mod validation;
pub mod prediction;
pub mod estimator;
pub mod features;
pub mod client;
pub mod form;
pub mod session;
pub mod config;

#[cfg(feature = "server")]
pub mod service;

// Re-export commonly used types
pub use attributes::{
    AttributeDefinition, AttributeRegistry, Field, PropertyAttributes, ValidationRange,
};
pub use validation::{
    derived_house_area, parse_input, FieldValidator, ValidationErrors, SUBMIT_BLOCKED_MESSAGE,
};
pub use prediction::{HealthResponse, Metrics, ModelInfo, ModelMetrics, PredictionResult};
pub use estimator::{LocalEstimator, PricingFormula, FALLBACK_MODEL_TYPE, PRICE_FLOOR};
pub use features::{FeatureVector, FEATURE_NAMES};
pub use client::{ClientError, PricingClient, GENERIC_PREDICT_FAILURE, HEALTH_CHECK_FAILURE};
pub use form::{Effect, Form, FormAction, FormState, ServiceMode};
pub use session::Session;
pub use config::{Config, ConfigError, ServerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
