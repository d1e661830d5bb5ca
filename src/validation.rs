// ✅ Field Validation - range checks, derived fields and the submit gate

use crate::attributes::{AttributeRegistry, Field, PropertyAttributes};
use serde::Serialize;
use std::collections::BTreeMap;

/// Message shown when a submit is attempted with invalid fields.
pub const SUBMIT_BLOCKED_MESSAGE: &str = "Please fix validation errors before submitting";

/// Lower bound of the derived house area
pub const MIN_HOUSE_AREA: f64 = 100.0;

/// Share of the living area assumed to be above-ground house area
pub const HOUSE_AREA_RATIO: f64 = 0.9;

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

/// Per-field messages, empty when every field is in range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Record the outcome of validating one field; `None` clears it.
    pub fn update(&mut self, field: Field, message: Option<String>) {
        match message {
            Some(message) => {
                self.errors.insert(field, message);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

// ============================================================================
// FIELD VALIDATOR
// ============================================================================

pub struct FieldValidator {
    registry: AttributeRegistry,
}

impl FieldValidator {
    pub fn new() -> Self {
        FieldValidator {
            registry: AttributeRegistry::new(),
        }
    }

    pub fn with_registry(registry: AttributeRegistry) -> Self {
        FieldValidator { registry }
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    /// Declared message when `value` is outside the field's inclusive range.
    pub fn validate(&self, field: Field, value: f64) -> Option<String> {
        match self.registry.range(field) {
            Some(range) if !range.contains(value) => Some(range.message.clone()),
            _ => None,
        }
    }

    /// Name-keyed variant; unknown names are never flagged.
    pub fn validate_by_name(&self, name: &str, value: f64) -> Option<String> {
        Field::from_name(name).and_then(|field| self.validate(field, value))
    }

    /// Validate every field of an attribute set
    pub fn validate_all(&self, attrs: &PropertyAttributes) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        for (field, value) in attrs.iter() {
            errors.update(field, self.validate(field, value));
        }
        errors
    }

    /// Submission gate: `Err` carries the aggregate message.
    pub fn check_submit(&self, attrs: &PropertyAttributes) -> Result<(), &'static str> {
        if self.validate_all(attrs).is_empty() {
            Ok(())
        } else {
            Err(SUBMIT_BLOCKED_MESSAGE)
        }
    }

    /// Write one field, apply its derived rule and re-validate every field
    /// that changed. Returns the fields that were written.
    pub fn apply_edit(
        &self,
        attrs: &mut PropertyAttributes,
        errors: &mut ValidationErrors,
        field: Field,
        value: f64,
    ) -> Vec<Field> {
        attrs.set(field, value);
        errors.update(field, self.validate(field, value));

        let mut changed = vec![field];
        if field == Field::LivingArea {
            let house_area = derived_house_area(value);
            attrs.set(Field::HouseArea, house_area);
            errors.update(Field::HouseArea, self.validate(Field::HouseArea, house_area));
            changed.push(Field::HouseArea);
        }
        changed
    }
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// `max(100, 0.9 × living_area)`
pub fn derived_house_area(living_area: f64) -> f64 {
    (HOUSE_AREA_RATIO * living_area).max(MIN_HOUSE_AREA)
}

/// Form text to number; anything unparsable counts as 0.
pub fn parse_input(text: &str) -> f64 {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

// ============================================================================
// TESTS
// ============================================================================
