// File: src/error.rs
// Purpose: Fatal configuration errors and recorded validation failures

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mistakes in how constraints or conditional logic were declared.
///
/// These are developer errors. They are surfaced immediately and never
/// turned into a failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "Cannot declare a logical operator more than once. (Specified {attempted}() after calling {first}()). \
         Use a nested group to combine conjunctive and disjunctive logic."
    )]
    ConflictingLogicalOperator {
        first: &'static str,
        attempted: &'static str,
    },

    #[error("Unknown conditional operator: {0}")]
    UnknownOperator(String),

    #[error("Operator {operator} expects {expected} argument(s), got {actual}")]
    OperatorArity {
        operator: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Operator {operator} needs a numeric argument, got {value:?}")]
    InvalidOperand {
        operator: &'static str,
        value: String,
    },

    #[error("Unknown comparison type: {0} (expected gt, gte, lt or lte)")]
    UnknownComparison(String),

    #[error("Unknown {constraint} mode: {mode}")]
    UnknownMode {
        constraint: &'static str,
        mode: String,
    },

    #[error("{constraint} range needs both a minimum and a maximum")]
    MissingBound { constraint: &'static str },

    #[error("{constraint} bounds are inverted: min {min} > max {max}")]
    InvertedBounds {
        constraint: &'static str,
        min: i64,
        max: i64,
    },

    #[error("Invalid regular expression {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid dimension ratio {0:?} (expected \"w/h\" or a decimal)")]
    InvalidRatio(String),

    #[error("Constraint {kind} is already bound to field {bound}, cannot bind it to {requested}")]
    AlreadyBound {
        kind: &'static str,
        bound: String,
        requested: String,
    },
}

/// Errors that abort a validator operation.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Field {field} references unknown field {target}")]
    UnknownTargetField { field: String, target: String },

    #[error("Conditional logic references unknown master field {0}")]
    UnknownMasterField(String),

    #[error("Cannot apply client markers: form has no field named {0}")]
    FieldNotInForm(String),

    #[error("Constraint {kind} on field {field} needs a {capability}, none was configured")]
    MissingCapability {
        kind: &'static str,
        field: String,
        capability: &'static str,
    },
}

/// One failed constraint, addressable by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field_name: String,
    pub message: String,
    pub error_type: String,
}

impl ValidationError {
    pub fn new(
        field_name: impl Into<String>,
        message: impl Into<String>,
        error_type: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
            error_type: error_type.into(),
        }
    }
}

/// Result of a validation pass grouped by field
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: HashMap<String, Vec<String>>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self {
            is_valid: true,
            errors: HashMap::new(),
        }
    }

    /// Group recorded errors by field, keeping their order within a field
    pub fn from_errors(errors: &[ValidationError]) -> Self {
        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for error in errors {
            grouped
                .entry(error.field_name.clone())
                .or_default()
                .push(error.message.clone());
        }

        Self {
            is_valid: grouped.is_empty(),
            errors: grouped,
        }
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get first error for a specific field
    pub fn get_error(&self, field: &str) -> Option<&String> {
        self.errors.get(field).and_then(|errors| errors.first())
    }

    /// Get all errors for a specific field
    pub fn get_errors(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    /// Convert into the `Result` shape used by form `validate()` methods
    pub fn into_result(self) -> Result<(), HashMap<String, Vec<String>>> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_operator_message_names_first_call() {
        let err = ConfigError::ConflictingLogicalOperator {
            first: "and_if",
            attempted: "or_if",
        };
        let msg = err.to_string();
        assert!(msg.contains("Specified or_if() after calling and_if()"));
    }

    #[test]
    fn test_result_groups_by_field() {
        let errors = vec![
            ValidationError::new("Title", "required", "required"),
            ValidationError::new("Title", "too short", "length"),
            ValidationError::new("Subtitle", "too short", "length"),
        ];

        let result = ValidationResult::from_errors(&errors);
        assert!(!result.is_valid);
        assert_eq!(result.get_error("Title"), Some(&"required".to_string()));
        assert_eq!(result.get_errors("Title").map(Vec::len), Some(2));
        assert!(result.get_error("Other").is_none());
    }

    #[test]
    fn test_empty_result_is_success() {
        let result = ValidationResult::from_errors(&[]);
        assert!(result.is_valid);
        assert!(result.into_result().is_ok());
    }
}
