// 📝 Form State - single reducer for everything the pricing form shows
//
// Transitions: edit, submit-start, submit-success, submit-failure, reset,
// health-checked. The reducer never performs I/O; a submit-start that passes
// the gate returns `Effect::Estimate` and the caller runs the estimator.

use crate::attributes::{Field, PropertyAttributes};
use crate::prediction::{ModelMetrics, PredictionResult};
use crate::validation::{parse_input, FieldValidator, ValidationErrors, SUBMIT_BLOCKED_MESSAGE};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMode {
    /// Startup health probe not finished yet
    Detecting,
    /// Remote pricing service answered healthy
    Remote,
    /// Local demo formula
    Fallback,
}

impl ServiceMode {
    pub fn label(&self) -> &str {
        match self {
            ServiceMode::Detecting => "Connecting...",
            ServiceMode::Remote => "Live model",
            ServiceMode::Fallback => "Demo mode (offline)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    Edit { field: Field, value: f64 },
    SubmitStart,
    SubmitSuccess(PredictionResult),
    SubmitFailure(String),
    Reset,
    HealthChecked {
        healthy: bool,
        model_metrics: Option<ModelMetrics>,
    },
}

impl FormAction {
    /// Edit from raw text; unparsable input becomes 0.
    pub fn input(field: Field, text: &str) -> Self {
        FormAction::Edit {
            field,
            value: parse_input(text),
        }
    }
}

/// What the caller must do after a dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Run one estimate on this snapshot of the attributes
    Estimate(PropertyAttributes),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub attributes: PropertyAttributes,
    pub errors: ValidationErrors,
    pub busy: bool,
    pub result: Option<PredictionResult>,
    pub error: Option<String>,
    pub mode: ServiceMode,
    pub model_metrics: Option<ModelMetrics>,
}

impl Default for FormState {
    fn default() -> Self {
        FormState {
            attributes: PropertyAttributes::default(),
            errors: ValidationErrors::default(),
            busy: false,
            result: None,
            error: None,
            mode: ServiceMode::Detecting,
            model_metrics: None,
        }
    }
}

pub struct Form {
    state: FormState,
    validator: FieldValidator,
    /// Set by a reset while busy; the pending outcome is then dropped.
    discard_pending: bool,
}

impl Form {
    pub fn new(validator: FieldValidator) -> Self {
        Form {
            state: FormState::default(),
            validator,
            discard_pending: false,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn validator(&self) -> &FieldValidator {
        &self.validator
    }

    pub fn dispatch(&mut self, action: FormAction) -> Effect {
        let state = &mut self.state;

        match action {
            FormAction::Edit { field, value } => {
                let changed =
                    self.validator
                        .apply_edit(&mut state.attributes, &mut state.errors, field, value);
                debug!(%field, value, ?changed, "Field edited");
                Effect::None
            }

            FormAction::SubmitStart => {
                if state.busy {
                    debug!("Submit ignored, estimate already pending");
                    return Effect::None;
                }

                state.errors = self.validator.validate_all(&state.attributes);
                if !state.errors.is_empty() {
                    info!(invalid = state.errors.len(), "Submit blocked by validation errors");
                    state.error = Some(SUBMIT_BLOCKED_MESSAGE.to_string());
                    state.result = None;
                    return Effect::None;
                }

                state.busy = true;
                state.error = None;
                state.result = None;
                Effect::Estimate(state.attributes)
            }

            FormAction::SubmitSuccess(_) | FormAction::SubmitFailure(_) if self.discard_pending => {
                debug!("Estimate for reset attributes dropped");
                self.discard_pending = false;
                state.busy = false;
                Effect::None
            }

            FormAction::SubmitSuccess(result) => {
                state.busy = false;
                state.error = None;
                state.result = Some(result);
                Effect::None
            }

            FormAction::SubmitFailure(message) => {
                state.busy = false;
                state.result = None;
                state.error = Some(message);
                Effect::None
            }

            // A pending estimate still runs to completion, but its outcome
            // is not shown next to the reset defaults.
            FormAction::Reset => {
                self.discard_pending = state.busy;
                state.attributes = PropertyAttributes::default();
                state.errors.clear();
                state.result = None;
                state.error = None;
                Effect::None
            }

            FormAction::HealthChecked {
                healthy,
                model_metrics,
            } => {
                if healthy {
                    state.mode = ServiceMode::Remote;
                    state.model_metrics = model_metrics;
                } else {
                    state.mode = ServiceMode::Fallback;
                    state.model_metrics = None;
                }
                Effect::None
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeRegistry;
    use crate::prediction::{Metrics, ModelInfo};

    fn form() -> Form {
        Form::new(FieldValidator::with_registry(AttributeRegistry::for_year(2024)))
    }

    fn sample_result() -> PredictionResult {
        PredictionResult {
            predicted_price: 420_000.0,
            metrics: Metrics {
                r2_score: 0.9,
                mae: 25_000.0,
                rmse: 32_000.0,
                mape: 9.5,
            },
            model_info: ModelInfo {
                model_type: "test".to_string(),
                features_used: None,
            },
        }
    }

    #[test]
    fn test_initial_state() {
        let form = form();
        let state = form.state();

        assert_eq!(state.attributes, PropertyAttributes::default());
        assert!(!state.busy);
        assert!(state.result.is_none());
        assert_eq!(state.mode, ServiceMode::Detecting);
    }

    #[test]
    fn test_valid_submit_requests_estimate() {
        let mut form = form();

        let effect = form.dispatch(FormAction::SubmitStart);
        assert_eq!(effect, Effect::Estimate(PropertyAttributes::default()));
        assert!(form.state().busy);
    }

    #[test]
    fn test_invalid_submit_blocked() {
        let mut form = form();
        form.dispatch(FormAction::Edit {
            field: Field::Bedrooms,
            value: 25.0,
        });
        assert_eq!(
            form.state().errors.get(Field::Bedrooms),
            Some("Bedrooms must be between 1 and 20")
        );

        let effect = form.dispatch(FormAction::SubmitStart);
        assert_eq!(effect, Effect::None);
        assert!(!form.state().busy);
        assert_eq!(form.state().error.as_deref(), Some(SUBMIT_BLOCKED_MESSAGE));
    }

    #[test]
    fn test_second_submit_while_busy_ignored() {
        let mut form = form();
        form.dispatch(FormAction::SubmitStart);

        assert_eq!(form.dispatch(FormAction::SubmitStart), Effect::None);
        assert!(form.state().busy);
    }

    #[test]
    fn test_success_and_failure_clear_busy() {
        let mut form = form();

        form.dispatch(FormAction::SubmitStart);
        form.dispatch(FormAction::SubmitSuccess(sample_result()));
        assert!(!form.state().busy);
        assert_eq!(form.state().result, Some(sample_result()));

        form.dispatch(FormAction::SubmitStart);
        assert!(form.state().result.is_none());
        form.dispatch(FormAction::SubmitFailure("bad input".to_string()));
        assert!(!form.state().busy);
        assert!(form.state().result.is_none());
        assert_eq!(form.state().error.as_deref(), Some("bad input"));

        // Resubmittable after failure
        assert!(matches!(form.dispatch(FormAction::SubmitStart), Effect::Estimate(_)));
    }

    #[test]
    fn test_text_input_parses_or_zeroes() {
        let mut form = form();

        form.dispatch(FormAction::input(Field::LivingArea, "2000"));
        assert_eq!(form.state().attributes.living_area, 2000.0);
        assert_eq!(form.state().attributes.house_area, 1800.0);

        form.dispatch(FormAction::input(Field::Bedrooms, "three"));
        assert_eq!(form.state().attributes.bedrooms, 0.0);
        assert!(form.state().errors.get(Field::Bedrooms).is_some());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut form = form();
        form.dispatch(FormAction::input(Field::Grade, "40"));
        form.dispatch(FormAction::SubmitStart);

        form.dispatch(FormAction::Reset);
        let state = form.state();
        assert_eq!(state.attributes, PropertyAttributes::default());
        assert!(state.errors.is_empty());
        assert!(state.error.is_none());
        assert!(state.result.is_none());
    }

    #[test]
    fn test_reset_while_busy_drops_pending_outcome() {
        let mut form = form();
        form.dispatch(FormAction::input(Field::LivingArea, "3000"));
        form.dispatch(FormAction::SubmitStart);

        form.dispatch(FormAction::Reset);
        assert!(form.state().busy);
        assert_eq!(form.dispatch(FormAction::SubmitStart), Effect::None);

        form.dispatch(FormAction::SubmitSuccess(sample_result()));
        let state = form.state();
        assert!(!state.busy);
        assert!(state.result.is_none());
        assert_eq!(state.attributes, PropertyAttributes::default());

        // The next estimate is shown again
        form.dispatch(FormAction::SubmitStart);
        form.dispatch(FormAction::SubmitSuccess(sample_result()));
        assert_eq!(form.state().result, Some(sample_result()));
    }

    #[test]
    fn test_reset_while_busy_drops_pending_failure() {
        let mut form = form();
        form.dispatch(FormAction::SubmitStart);
        form.dispatch(FormAction::Reset);

        form.dispatch(FormAction::SubmitFailure("bad input".to_string()));
        assert!(!form.state().busy);
        assert!(form.state().error.is_none());
    }

    #[test]
    fn test_reset_when_idle_keeps_next_outcome() {
        let mut form = form();
        form.dispatch(FormAction::Reset);
        form.dispatch(FormAction::SubmitStart);
        form.dispatch(FormAction::SubmitSuccess(sample_result()));
        assert_eq!(form.state().result, Some(sample_result()));
    }

    #[test]
    fn test_health_outcome_sets_mode() {
        let mut form = form();
        let metrics = ModelMetrics {
            r2_score: 0.88,
            mae: 1.0,
            rmse: 2.0,
            mape: None,
        };

        form.dispatch(FormAction::HealthChecked {
            healthy: true,
            model_metrics: Some(metrics.clone()),
        });
        assert_eq!(form.state().mode, ServiceMode::Remote);
        assert_eq!(form.state().model_metrics, Some(metrics));

        form.dispatch(FormAction::HealthChecked {
            healthy: false,
            model_metrics: None,
        });
        assert_eq!(form.state().mode, ServiceMode::Fallback);
        assert!(form.state().model_metrics.is_none());
    }
}
