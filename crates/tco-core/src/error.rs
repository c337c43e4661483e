//! # Error Types
//!
//! Domain-specific error types for tco-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tco-core errors (this file)                                           │
//! │  ├── ValidationError  - One field failing one rule                     │
//! │  ├── FieldErrors      - Every failing field of one input record        │
//! │  └── CoreError        - General domain errors                          │
//! │                                                                         │
//! │  tco-db / tco-report errors (separate crates)                          │
//! │  └── DbError, ReportError                                              │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── AppError         - What the user sees                             │
//! │                                                                         │
//! │  Flow: ValidationError → FieldErrors → CoreError → AppError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Field names are the closed [`Field`] enum, never free strings
//! 3. Validation collects every failing field instead of stopping at the first

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use crate::types::Field;

// =============================================================================
// Validation Error
// =============================================================================

/// A single field failing a single rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: Field },

    /// Value must be strictly greater than zero.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: Field },

    /// Value may be zero but not negative.
    #[error("{field} cannot be negative")]
    MustBeNonNegative { field: Field },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: Field },

    /// Integer value is outside an inclusive range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: Field, min: i64, max: i64 },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {}", .allowed.join(", "))]
    NotAllowed { field: Field, allowed: Vec<String> },
}

impl ValidationError {
    /// The field this error belongs to.
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Required { field }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustBeNonNegative { field }
            | ValidationError::NotFinite { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::NotAllowed { field, .. } => *field,
        }
    }
}

/// Result type for single-field validation rules.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Errors
// =============================================================================

/// Every validation failure of one input record, keyed by field.
///
/// ## Serialized Form
/// A flat `{ "fieldName": "message" }` object, which is what a form shows
/// next to each input:
/// ```json
/// { "customerName": "customerName is required",
///   "operationYears": "operationYears must be between 1 and 20" }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    errors: BTreeMap<Field, ValidationError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one rule, passing the value through on success.
    pub fn check<T>(&mut self, outcome: ValidationResult<T>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(err) => {
                self.insert(err);
                None
            }
        }
    }

    /// Adds an error. A second error for the same field replaces the first.
    pub fn insert(&mut self, err: ValidationError) {
        self.errors.insert(err.field(), err);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.errors.get(&field)
    }

    /// Iterates errors in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &ValidationError)> {
        self.errors.iter().map(|(field, err)| (*field, err))
    }

    /// `field → message` pairs, in field order.
    pub fn messages(&self) -> BTreeMap<Field, String> {
        self.iter().map(|(field, err)| (field, err.to_string())).collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid input")?;
        for (i, (_, err)) in self.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, err) in &self.errors {
            map.serialize_entry(field.key(), &err.to_string())?;
        }
        map.end()
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// The input record failed validation.
    #[error("{0}")]
    Validation(#[from] FieldErrors),

    #[error("Unknown truck type: {0}")]
    UnknownTruckType(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A value could not be parsed for a field (form editing).
    #[error("Invalid value for {field}: {reason}")]
    InvalidInput { field: Field, reason: String },

    /// A derived quantity would be a division by zero or non-finite.
    ///
    /// ## When This Occurs
    /// Never for a record that passed validation. Guards the engine against
    /// producing `NaN` or `inf` instead of failing.
    #[error("Cannot compute {quantity}: division undefined")]
    DivisionUndefined { quantity: &'static str },

    /// `compare` was called without any candidate.
    #[error("Nothing to compare")]
    EmptyComparison,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: Field::CustomerName,
        };
        assert_eq!(err.to_string(), "customerName is required");

        let err = ValidationError::OutOfRange {
            field: Field::OperationYears,
            min: 1,
            max: 20,
        };
        assert_eq!(err.to_string(), "operationYears must be between 1 and 20");

        let err = ValidationError::NotAllowed {
            field: Field::TruckType,
            allowed: vec!["light".into(), "medium".into()],
        };
        assert_eq!(err.to_string(), "truckType must be one of: light, medium");
    }

    #[test]
    fn test_field_errors_collects_and_passes_values_through() {
        let mut errors = FieldErrors::new();
        assert_eq!(errors.check::<f64>(Ok(3.0)), Some(3.0));
        assert_eq!(
            errors.check::<f64>(Err(ValidationError::MustBePositive {
                field: Field::FuelPrice
            })),
            None
        );
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(Field::FuelPrice));
        assert!(!errors.contains(Field::TruckValue));
    }

    #[test]
    fn test_field_errors_serializes_as_message_map() {
        let mut errors = FieldErrors::new();
        errors.insert(ValidationError::Required {
            field: Field::CustomerName,
        });
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["customerName"], "customerName is required");
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_field_errors_display_lists_every_error() {
        let mut errors = FieldErrors::new();
        errors.insert(ValidationError::Required {
            field: Field::CustomerName,
        });
        errors.insert(ValidationError::MustBePositive {
            field: Field::TruckValue,
        });
        assert_eq!(
            errors.to_string(),
            "invalid input: customerName is required; truckValue must be greater than zero"
        );
    }

    #[test]
    fn test_field_errors_converts_to_core_error() {
        let core_err: CoreError = FieldErrors::new().into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
