//! # Validation Module
//!
//! Turns a raw [`InputRecord`] into a [`ValidatedInput`] or a [`FieldErrors`]
//! map naming every failing field.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Field                  Rule                                            │
//! │  ─────────────────────  ──────────────────────────────────────────────  │
//! │  customerName           not blank                                       │
//! │  truckType              one of light / medium / heavy / extra_heavy     │
//! │  truckValue             present, finite, > 0                            │
//! │  annualDistance         present, finite, > 0                            │
//! │  fuelPrice              present, finite, > 0                            │
//! │  operationYears         present, 1..=20                                 │
//! │  customFuelEfficiency   absent, or finite and > 0                       │
//! │  loanAmount, rates,     absent, or finite and >= 0                      │
//! │  costs                                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rule runs on its own: one bad field never hides another.
//!
//! ## Usage
//! ```rust
//! use tco_core::{validate, Field, InputRecord};
//!
//! let mut input = InputRecord::form_defaults();
//! input.operation_years = Some(21);
//!
//! let errors = validate(&input);
//! assert!(errors.contains(Field::CustomerName));
//! assert!(errors.contains(Field::OperationYears));
//! assert_eq!(errors.len(), 2);
//! ```

use crate::error::{FieldErrors, ValidationError, ValidationResult};
use crate::types::{Field, InputRecord, TruckType, ValidatedInput};
use crate::MAX_OPERATION_YEARS;

/// Validates an input record and returns every failing field.
///
/// An empty map means the record is valid.
pub fn validate(input: &InputRecord) -> FieldErrors {
    match input.validated() {
        Ok(_) => FieldErrors::new(),
        Err(errors) => errors,
    }
}

impl InputRecord {
    /// Validates this record and, on success, returns the typed input the
    /// engine accepts.
    pub fn validated(&self) -> Result<ValidatedInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let customer_name = errors.check(validate_customer_name(&self.customer_name));
        let truck_type = errors.check(validate_truck_type(&self.truck_type));
        let truck_value = errors.check(required_positive(Field::TruckValue, self.truck_value));
        let annual_distance =
            errors.check(required_positive(Field::AnnualDistance, self.annual_distance));
        let fuel_price = errors.check(required_positive(Field::FuelPrice, self.fuel_price));
        let operation_years = errors.check(validate_operation_years(self.operation_years));
        let custom_fuel_efficiency = errors.check(optional_positive(
            Field::CustomFuelEfficiency,
            self.custom_fuel_efficiency,
        ));
        let loan_amount = errors.check(optional_non_negative(Field::LoanAmount, self.loan_amount));
        let interest_rate =
            errors.check(optional_non_negative(Field::InterestRate, self.interest_rate));
        let toll_cost_per_distance = errors.check(optional_non_negative(
            Field::TollCostPerDistance,
            self.toll_cost_per_distance,
        ));
        let annual_license_cost = errors.check(optional_non_negative(
            Field::AnnualLicenseCost,
            self.annual_license_cost,
        ));
        let other_annual_costs = errors.check(optional_non_negative(
            Field::OtherAnnualCosts,
            self.other_annual_costs,
        ));

        match (
            customer_name,
            truck_type,
            truck_value,
            annual_distance,
            fuel_price,
            operation_years,
            custom_fuel_efficiency,
            loan_amount,
            interest_rate,
            toll_cost_per_distance,
            annual_license_cost,
            other_annual_costs,
        ) {
            (
                Some(customer_name),
                Some(truck_type),
                Some(truck_value),
                Some(annual_distance),
                Some(fuel_price),
                Some(operation_years),
                Some(custom_fuel_efficiency),
                Some(loan_amount),
                Some(interest_rate),
                Some(toll_cost_per_distance),
                Some(annual_license_cost),
                Some(other_annual_costs),
            ) if errors.is_empty() => Ok(ValidatedInput {
                customer_name,
                truck_type,
                truck_value,
                annual_distance,
                operation_years,
                fuel_price,
                custom_fuel_efficiency,
                has_financing: self.has_financing,
                loan_amount,
                interest_rate,
                toll_cost_per_distance,
                annual_license_cost,
                other_annual_costs,
                sealed: (),
            }),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Field Rules
// =============================================================================

/// Returns the trimmed customer name.
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required {
            field: Field::CustomerName,
        });
    }
    Ok(name.to_string())
}

pub fn validate_truck_type(key: &str) -> ValidationResult<TruckType> {
    if key.trim().is_empty() {
        return Err(ValidationError::Required {
            field: Field::TruckType,
        });
    }
    key.parse::<TruckType>()
        .map_err(|_| ValidationError::NotAllowed {
            field: Field::TruckType,
            allowed: TruckType::ALL.iter().map(|t| t.key().to_string()).collect(),
        })
}

/// Validates the number of operation years.
///
/// ## Rules
/// - Must be present
/// - Must be between 1 and [`MAX_OPERATION_YEARS`] (20), inclusive
pub fn validate_operation_years(years: Option<i32>) -> ValidationResult<u32> {
    let years = years.ok_or(ValidationError::Required {
        field: Field::OperationYears,
    })?;
    if !(1..=MAX_OPERATION_YEARS).contains(&years) {
        return Err(ValidationError::OutOfRange {
            field: Field::OperationYears,
            min: 1,
            max: i64::from(MAX_OPERATION_YEARS),
        });
    }
    // Range-checked above.
    Ok(years.unsigned_abs())
}

/// A required quantity: present, finite and strictly positive.
pub fn required_positive(field: Field, value: Option<f64>) -> ValidationResult<f64> {
    let value = value.ok_or(ValidationError::Required { field })?;
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::MustBePositive { field });
    }
    Ok(value)
}

/// An optional quantity that must be strictly positive when given.
pub fn optional_positive(field: Field, value: Option<f64>) -> ValidationResult<Option<f64>> {
    value.map(|v| required_positive(field, Some(v))).transpose()
}

/// An optional quantity that may be zero but not negative when given.
pub fn optional_non_negative(field: Field, value: Option<f64>) -> ValidationResult<Option<f64>> {
    match value {
        None => Ok(None),
        Some(v) if !v.is_finite() => Err(ValidationError::NotFinite { field }),
        Some(v) if v < 0.0 => Err(ValidationError::MustBeNonNegative { field }),
        Some(v) => Ok(Some(v)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> InputRecord {
        InputRecord {
            customer_name: "Transportes Norte".to_string(),
            ..InputRecord::form_defaults()
        }
    }

    /// Asserts that exactly one field failed.
    fn assert_only(errors: &FieldErrors, field: Field) {
        assert_eq!(errors.len(), 1, "unexpected errors: {errors}");
        assert!(errors.contains(field), "missing {field}: {errors}");
    }

    #[test]
    fn test_valid_input_has_no_errors() {
        assert!(validate(&valid_input()).is_empty());
        let validated = valid_input().validated().unwrap();
        assert_eq!(validated.truck_type, TruckType::Medium);
        assert_eq!(validated.operation_years, 5);
    }

    #[test]
    fn test_empty_record_reports_every_required_field() {
        let errors = validate(&InputRecord::default());
        for field in [
            Field::CustomerName,
            Field::TruckType,
            Field::TruckValue,
            Field::AnnualDistance,
            Field::FuelPrice,
            Field::OperationYears,
        ] {
            assert!(errors.contains(field), "missing {field}");
        }
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_blank_customer_name() {
        let mut input = valid_input();
        input.customer_name = "   ".to_string();
        assert_only(&validate(&input), Field::CustomerName);
    }

    #[test]
    fn test_customer_name_is_trimmed() {
        let mut input = valid_input();
        input.customer_name = "  Acme  ".to_string();
        assert_eq!(input.validated().unwrap().customer_name, "Acme");
    }

    #[test]
    fn test_unknown_truck_type() {
        let mut input = valid_input();
        input.truck_type = "unknown".to_string();
        let errors = validate(&input);
        assert_only(&errors, Field::TruckType);
        assert!(matches!(
            errors.get(Field::TruckType),
            Some(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_required_quantities_reject_zero_negative_missing_and_nan() {
        for field in [Field::TruckValue, Field::AnnualDistance, Field::FuelPrice] {
            for bad in [None, Some(0.0), Some(-1.0), Some(f64::NAN), Some(f64::INFINITY)] {
                let mut input = valid_input();
                match field {
                    Field::TruckValue => input.truck_value = bad,
                    Field::AnnualDistance => input.annual_distance = bad,
                    _ => input.fuel_price = bad,
                }
                assert_only(&validate(&input), field);
            }
        }
    }

    #[test]
    fn test_operation_years_bounds() {
        for (years, ok) in [
            (None, false),
            (Some(0), false),
            (Some(-3), false),
            (Some(1), true),
            (Some(20), true),
            (Some(21), false),
        ] {
            let mut input = valid_input();
            input.operation_years = years;
            let errors = validate(&input);
            if ok {
                assert!(errors.is_empty(), "{years:?} should be valid");
            } else {
                assert_only(&errors, Field::OperationYears);
            }
        }
    }

    #[test]
    fn test_operation_years_21_message() {
        let mut input = valid_input();
        input.operation_years = Some(21);
        let errors = validate(&input);
        assert_eq!(
            errors.get(Field::OperationYears).unwrap().to_string(),
            "operationYears must be between 1 and 20"
        );
    }

    #[test]
    fn test_custom_fuel_efficiency_only_checked_when_present() {
        let mut input = valid_input();
        input.custom_fuel_efficiency = None;
        assert!(validate(&input).is_empty());

        input.custom_fuel_efficiency = Some(4.2);
        assert!(validate(&input).is_empty());

        input.custom_fuel_efficiency = Some(0.0);
        assert_only(&validate(&input), Field::CustomFuelEfficiency);

        input.custom_fuel_efficiency = Some(-2.0);
        assert_only(&validate(&input), Field::CustomFuelEfficiency);
    }

    #[test]
    fn test_optional_costs_accept_zero_and_reject_negative() {
        let mut input = valid_input();
        input.loan_amount = Some(0.0);
        input.interest_rate = Some(0.0);
        input.toll_cost_per_distance = Some(0.0);
        input.annual_license_cost = Some(0.0);
        input.other_annual_costs = Some(0.0);
        assert!(validate(&input).is_empty());

        input.toll_cost_per_distance = Some(-0.5);
        assert_only(&validate(&input), Field::TollCostPerDistance);
    }

    #[test]
    fn test_rules_are_independent() {
        let mut input = valid_input();
        input.customer_name.clear();
        input.fuel_price = Some(-1.0);
        input.operation_years = Some(40);
        let errors = validate(&input);
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(Field::CustomerName));
        assert!(errors.contains(Field::FuelPrice));
        assert!(errors.contains(Field::OperationYears));
    }

    #[test]
    fn test_spanish_truck_keys_validate() {
        let mut input = valid_input();
        input.truck_type = "pesado".to_string();
        assert_eq!(input.validated().unwrap().truck_type, TruckType::Heavy);
    }
}
