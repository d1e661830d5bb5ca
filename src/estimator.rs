// 💰 Price Estimator - local fallback pricing
//
// Linear formula scaled by grade and condition, with bounded random jitter.
// Used when the remote pricing service is unreachable, and (without jitter)
// by the pricing service itself.

use crate::attributes::PropertyAttributes;
use crate::prediction::{Metrics, ModelInfo, PredictionResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::debug;

/// Local estimates never go below this
pub const PRICE_FLOOR: f64 = 50_000.0;

/// Multiplicative jitter applied to the formula output
pub const JITTER: RangeInclusive<f64> = 0.9..=1.1;

pub const FALLBACK_MODEL_TYPE: &str = "Demo Linear Approximation (fallback)";

/// Artificial "analyzing" delay of the fallback path
pub const FALLBACK_DELAY: RangeInclusive<Duration> =
    Duration::from_millis(1000)..=Duration::from_millis(3000);

// ============================================================================
// PRICING FORMULA
// ============================================================================

/// Deterministic part of the estimate.
///
/// ```text
/// base   = 50_000 + 150·living_area + 10_000·bedrooms + 15_000·bathrooms
///        + 2·lot_area + 200_000·waterfront + 20_000·views
/// scaled = base · (0.6 + 0.4·grade/13) · (0.8 + 0.2·condition/10)
/// ```
pub struct PricingFormula;

impl PricingFormula {
    pub const BASE: f64 = 50_000.0;
    pub const PER_SQFT_LIVING: f64 = 150.0;
    pub const PER_BEDROOM: f64 = 10_000.0;
    pub const PER_BATHROOM: f64 = 15_000.0;
    pub const PER_SQFT_LOT: f64 = 2.0;
    pub const WATERFRONT_BONUS: f64 = 200_000.0;
    pub const PER_VIEW: f64 = 20_000.0;

    /// Attributes the formula reads
    pub const INPUTS: u32 = 8;

    pub fn base(attrs: &PropertyAttributes) -> f64 {
        Self::BASE
            + Self::PER_SQFT_LIVING * attrs.living_area
            + Self::PER_BEDROOM * attrs.bedrooms
            + Self::PER_BATHROOM * attrs.bathrooms
            + Self::PER_SQFT_LOT * attrs.lot_area
            + Self::WATERFRONT_BONUS * attrs.waterfront
            + Self::PER_VIEW * attrs.views
    }

    pub fn grade_factor(grade: f64) -> f64 {
        0.6 + 0.4 * grade / 13.0
    }

    pub fn condition_factor(condition: f64) -> f64 {
        0.8 + 0.2 * condition / 10.0
    }

    /// Base scaled by grade and condition, floored at [`PRICE_FLOOR`]
    pub fn price(attrs: &PropertyAttributes) -> f64 {
        Self::floor(Self::unfloored(attrs))
    }

    fn unfloored(attrs: &PropertyAttributes) -> f64 {
        Self::base(attrs) * Self::grade_factor(attrs.grade) * Self::condition_factor(attrs.condition)
    }

    /// NaN inputs also end up on the floor.
    fn floor(price: f64) -> f64 {
        if price.is_finite() && price > PRICE_FLOOR {
            price
        } else {
            PRICE_FLOOR
        }
    }
}

// ============================================================================
// LOCAL ESTIMATOR
// ============================================================================

pub struct LocalEstimator {
    rng: StdRng,
    delay: RangeInclusive<Duration>,
}

impl LocalEstimator {
    /// OS-seeded, with the standard 1-3 s delay
    pub fn new() -> Self {
        LocalEstimator {
            rng: StdRng::from_os_rng(),
            delay: FALLBACK_DELAY,
        }
    }

    /// Reproducible estimator for tests
    pub fn seeded(seed: u64) -> Self {
        LocalEstimator {
            rng: StdRng::seed_from_u64(seed),
            delay: FALLBACK_DELAY,
        }
    }

    /// Builder: override the artificial delay
    pub fn with_delay(mut self, delay: RangeInclusive<Duration>) -> Self {
        self.delay = delay;
        self
    }

    /// Immediate estimate. Two calls with the same input differ by design.
    pub fn estimate(&mut self, attrs: &PropertyAttributes) -> PredictionResult {
        let jitter = self.rng.random_range(JITTER);
        let predicted_price = PricingFormula::floor(PricingFormula::unfloored(attrs) * jitter);

        let mae = self.rng.random_range(20_000.0..=40_000.0);
        let metrics = Metrics {
            r2_score: self.rng.random_range(0.85..=0.95),
            mae,
            rmse: mae * self.rng.random_range(1.2..=1.6),
            mape: self.rng.random_range(8.0..=15.0),
        };

        debug!(predicted_price, jitter, "Local estimate computed");

        PredictionResult {
            predicted_price,
            metrics,
            model_info: ModelInfo {
                model_type: FALLBACK_MODEL_TYPE.to_string(),
                features_used: Some(PricingFormula::INPUTS),
            },
        }
    }

    /// Estimate after the artificial delay
    pub async fn estimate_delayed(&mut self, attrs: &PropertyAttributes) -> PredictionResult {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.estimate(attrs)
    }

    fn next_delay(&mut self) -> Duration {
        let (min, max) = (*self.delay.start(), *self.delay.end());
        if max <= min {
            return min;
        }
        let millis = self.rng.random_range(min.as_millis() as u64..=max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

impl Default for LocalEstimator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
