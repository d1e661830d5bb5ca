// 🔁 Session - health probe and submit pipeline around the form reducer

use crate::attributes::{Field, PropertyAttributes};
use crate::client::PricingClient;
use crate::config::Config;
use crate::estimator::LocalEstimator;
use crate::form::{Effect, Form, FormAction, FormState, ServiceMode};
use crate::validation::FieldValidator;
use tracing::{info, warn};

/// One interactive pricing session.
///
/// Owns the form state, the remote client and the local fallback. All work
/// happens on the caller's task; at most one estimate is in flight.
pub struct Session {
    form: Form,
    client: PricingClient,
    local: LocalEstimator,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            PricingClient::new(config.api_url.clone()),
            LocalEstimator::new(),
            FieldValidator::new(),
        )
    }

    pub fn with_parts(client: PricingClient, local: LocalEstimator, validator: FieldValidator) -> Self {
        Session {
            form: Form::new(validator),
            client,
            local,
        }
    }

    pub fn state(&self) -> &FormState {
        self.form.state()
    }

    pub fn mode(&self) -> ServiceMode {
        self.form.state().mode
    }

    /// Startup probe. Never fails: any problem selects fallback mode.
    pub async fn detect_mode(&mut self) -> ServiceMode {
        let action = match self.client.health_check().await {
            Ok(health) if health.is_healthy() => {
                info!(url = %self.client.base_url(), "Pricing service healthy, using remote model");
                FormAction::HealthChecked {
                    healthy: true,
                    model_metrics: health.model_metrics,
                }
            }
            Ok(health) => {
                warn!(status = ?health.status, "Pricing service not healthy, using fallback");
                FormAction::HealthChecked {
                    healthy: false,
                    model_metrics: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Health check failed, using fallback");
                FormAction::HealthChecked {
                    healthy: false,
                    model_metrics: None,
                }
            }
        };

        self.form.dispatch(action);
        self.mode()
    }

    pub fn edit(&mut self, field: Field, value: f64) {
        self.form.dispatch(FormAction::Edit { field, value });
    }

    pub fn input(&mut self, field: Field, text: &str) {
        self.form.dispatch(FormAction::input(field, text));
    }

    pub fn reset(&mut self) {
        self.form.dispatch(FormAction::Reset);
    }

    /// First half of a submit: run the gate and mark the form busy.
    /// `Some` means an estimate must follow via [`Session::finish_submit`].
    pub fn begin_submit(&mut self) -> Option<PropertyAttributes> {
        match self.form.dispatch(FormAction::SubmitStart) {
            Effect::Estimate(attrs) => Some(attrs),
            Effect::None => None,
        }
    }

    /// Second half of a submit: estimate in the current mode and record
    /// the outcome.
    pub async fn finish_submit(&mut self, attrs: PropertyAttributes) {
        let action = match self.mode() {
            ServiceMode::Remote => match self.client.predict(&attrs).await {
                Ok(result) => FormAction::SubmitSuccess(result),
                Err(e) => {
                    warn!(error = %e, "Remote prediction failed");
                    FormAction::SubmitFailure(e.to_string())
                }
            },
            ServiceMode::Fallback | ServiceMode::Detecting => {
                FormAction::SubmitSuccess(self.local.estimate_delayed(&attrs).await)
            }
        };

        if let FormAction::SubmitSuccess(result) = &action {
            info!(
                price = result.predicted_price,
                model = %result.model_info.model_type,
                "Estimate ready"
            );
        }
        self.form.dispatch(action);
    }

    /// Gate, estimate and record in one go
    pub async fn submit(&mut self) {
        if let Some(attrs) = self.begin_submit() {
            self.finish_submit(attrs).await;
        }
    }
}
