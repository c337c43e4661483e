//! # Form State
//!
//! The calculator form: one [`InputRecord`] that survives between runs.
//!
//! ## Edit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  "truckValue=950000"                                                    │
//! │        │ parse_assignment                                               │
//! │        ▼                                                                │
//! │  (Field::TruckValue, "950000")                                          │
//! │        │ apply_edit        (parse error → CoreError::InvalidInput)      │
//! │        ▼                                                                │
//! │  InputRecord in memory ──► kv "tco-form-data" (every edit)              │
//! │        │                                                                │
//! │        └──► evaluate ──► validate ──► compute_tco                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Edits only change the record. Whether the record is valid is decided by
//! the validator, so a form can hold a half-typed state (no truck value,
//! zero years) and report every problem at once.

use tco_core::{compute_tco, CoreError, CoreResult, Field, InputRecord, TcoResult, TruckType};
use tco_db::{KvRepository, StorageKey};
use tracing::debug;

use crate::error::AppResult;

/// Validates and computes in one step.
pub fn evaluate(input: &InputRecord) -> CoreResult<TcoResult> {
    compute_tco(&input.validated()?)
}

/// Splits `field=value`. The field accepts camelCase or snake_case.
pub fn parse_assignment(text: &str) -> CoreResult<(Field, String)> {
    let text = text.trim();
    match text.split_once('=') {
        Some((name, value)) => Ok((name.parse()?, value.trim().to_string())),
        // A bare field name clears it.
        None => Ok((text.parse()?, String::new())),
    }
}

fn invalid(field: Field, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidInput {
        field,
        reason: reason.into(),
    }
}

fn is_blank(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "" | "none" | "-")
}

/// Parses an amount, allowing `,` and `_` as digit separators.
/// Blank input clears the value.
fn parse_amount(field: Field, raw: &str) -> CoreResult<Option<f64>> {
    if is_blank(raw) {
        return Ok(None);
    }
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
    cleaned
        .parse::<f64>()
        .map(Some)
        .map_err(|_| invalid(field, format!("'{}' is not a number", raw.trim())))
}

fn parse_years(raw: &str) -> CoreResult<Option<i32>> {
    if is_blank(raw) {
        return Ok(None);
    }
    raw.trim()
        .parse::<i32>()
        .map(Some)
        .map_err(|_| {
            invalid(
                Field::OperationYears,
                format!("'{}' is not a whole number", raw.trim()),
            )
        })
}

fn parse_flag(raw: &str) -> CoreResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Ok(true),
        "false" | "no" | "n" | "off" | "0" | "" => Ok(false),
        other => Err(invalid(Field::HasFinancing, format!("'{other}' is not yes/no"))),
    }
}

/// Applies one textual edit to `input`.
///
/// A known truck type is stored under its canonical key; anything else is
/// stored as typed so the validator can report it.
pub fn apply_edit(input: &mut InputRecord, field: Field, raw: &str) -> CoreResult<()> {
    match field {
        Field::CustomerName => input.customer_name = raw.to_string(),
        Field::TruckType => {
            input.truck_type = match raw.parse::<TruckType>() {
                Ok(truck_type) => truck_type.key().to_string(),
                Err(_) => raw.trim().to_string(),
            }
        }
        Field::TruckValue => input.truck_value = parse_amount(field, raw)?,
        Field::AnnualDistance => input.annual_distance = parse_amount(field, raw)?,
        Field::OperationYears => input.operation_years = parse_years(raw)?,
        Field::FuelPrice => input.fuel_price = parse_amount(field, raw)?,
        Field::CustomFuelEfficiency => input.custom_fuel_efficiency = parse_amount(field, raw)?,
        Field::HasFinancing => input.has_financing = parse_flag(raw)?,
        Field::LoanAmount => input.loan_amount = parse_amount(field, raw)?,
        Field::InterestRate => input.interest_rate = parse_amount(field, raw)?,
        Field::TollCostPerDistance => input.toll_cost_per_distance = parse_amount(field, raw)?,
        Field::AnnualLicenseCost => input.annual_license_cost = parse_amount(field, raw)?,
        Field::OtherAnnualCosts => input.other_annual_costs = parse_amount(field, raw)?,
    }
    Ok(())
}

/// Textual value of a field, as `form show` prints it.
pub fn field_value(input: &InputRecord, field: Field) -> String {
    fn opt<T: ToString>(value: Option<T>) -> String {
        value.map_or_else(|| "-".to_string(), |v| v.to_string())
    }

    match field {
        Field::CustomerName => input.customer_name.clone(),
        Field::TruckType => input.truck_type.clone(),
        Field::TruckValue => opt(input.truck_value),
        Field::AnnualDistance => opt(input.annual_distance),
        Field::OperationYears => opt(input.operation_years),
        Field::FuelPrice => opt(input.fuel_price),
        Field::CustomFuelEfficiency => opt(input.custom_fuel_efficiency),
        Field::HasFinancing => (if input.has_financing { "yes" } else { "no" }).to_string(),
        Field::LoanAmount => opt(input.loan_amount),
        Field::InterestRate => opt(input.interest_rate),
        Field::TollCostPerDistance => opt(input.toll_cost_per_distance),
        Field::AnnualLicenseCost => opt(input.annual_license_cost),
        Field::OtherAnnualCosts => opt(input.other_annual_costs),
    }
}

// =============================================================================
// Persisted Form
// =============================================================================

/// The form, backed by the `tco-form-data` snapshot.
pub struct FormState {
    kv: KvRepository,
    input: InputRecord,
}

impl FormState {
    /// Restores the last snapshot, or the form defaults.
    pub async fn load(kv: KvRepository) -> Self {
        let input = kv
            .get_or_default(StorageKey::FormSnapshot, InputRecord::form_defaults())
            .await;
        FormState { kv, input }
    }

    pub fn input(&self) -> &InputRecord {
        &self.input
    }

    pub fn evaluate(&self) -> CoreResult<TcoResult> {
        evaluate(&self.input)
    }

    /// Applies several edits and persists once.
    ///
    /// Nothing is applied if any edit fails to parse.
    pub async fn apply(&mut self, edits: &[(Field, String)]) -> AppResult<()> {
        let mut next = self.input.clone();
        for (field, raw) in edits {
            apply_edit(&mut next, *field, raw)?;
        }
        self.replace(next).await
    }

    pub async fn set(&mut self, field: Field, raw: &str) -> AppResult<()> {
        self.apply(&[(field, raw.to_string())]).await
    }

    /// Replaces the whole record (loading a saved calculation).
    pub async fn replace(&mut self, input: InputRecord) -> AppResult<()> {
        self.input = input;
        self.persist().await
    }

    /// Back to the form defaults.
    pub async fn reset(&mut self) -> AppResult<()> {
        self.replace(InputRecord::form_defaults()).await
    }

    /// Adopts a snapshot written by another process, without writing it back.
    pub fn adopt(&mut self, input: InputRecord) {
        self.input = input;
    }

    async fn persist(&self) -> AppResult<()> {
        let version = self.kv.set(StorageKey::FormSnapshot, &self.input).await?;
        debug!(version, "Form snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tco_db::Database;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("truckValue=950000").unwrap(),
            (Field::TruckValue, "950000".to_string())
        );
        assert_eq!(
            parse_assignment(" operation_years = 7 ").unwrap(),
            (Field::OperationYears, "7".to_string())
        );
        assert_eq!(
            parse_assignment("customer_name=Fletes = Norte").unwrap(),
            (Field::CustomerName, "Fletes = Norte".to_string())
        );
        // Bare name clears the field.
        assert_eq!(
            parse_assignment("loanAmount").unwrap(),
            (Field::LoanAmount, String::new())
        );
        assert!(matches!(
            parse_assignment("wheels=6"),
            Err(CoreError::UnknownField(name)) if name == "wheels"
        ));
        assert!(matches!(
            parse_assignment("hello"),
            Err(CoreError::UnknownField(_))
        ));
    }

    #[test]
    fn test_apply_numeric_edits() {
        let mut input = InputRecord::form_defaults();
        apply_edit(&mut input, Field::TruckValue, "1,250,000").unwrap();
        apply_edit(&mut input, Field::OperationYears, "8").unwrap();
        apply_edit(&mut input, Field::InterestRate, "0").unwrap();
        apply_edit(&mut input, Field::FuelPrice, "").unwrap();

        assert_eq!(input.truck_value, Some(1_250_000.0));
        assert_eq!(input.operation_years, Some(8));
        assert_eq!(input.interest_rate, Some(0.0));
        assert_eq!(input.fuel_price, None);
    }

    #[test]
    fn test_parse_failure_is_invalid_input() {
        let mut input = InputRecord::form_defaults();
        let err = apply_edit(&mut input, Field::TruckValue, "lots").unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidInput {
                field: Field::TruckValue,
                reason: "'lots' is not a number".into()
            }
        );
        assert!(apply_edit(&mut input, Field::OperationYears, "5.5").is_err());
        assert!(apply_edit(&mut input, Field::HasFinancing, "maybe").is_err());
        // Failed edits leave the record alone.
        assert_eq!(input, InputRecord::form_defaults());
    }

    #[test]
    fn test_truck_type_edit() {
        let mut input = InputRecord::form_defaults();
        apply_edit(&mut input, Field::TruckType, "Pesado").unwrap();
        assert_eq!(input.truck_type, "heavy");

        apply_edit(&mut input, Field::TruckType, "monster").unwrap();
        assert_eq!(input.truck_type, "monster");
        let errors = input.validated().unwrap_err();
        assert!(errors.contains(Field::TruckType));
    }

    #[test]
    fn test_field_value() {
        let mut input = InputRecord::form_defaults();
        input.has_financing = true;
        assert_eq!(field_value(&input, Field::TruckValue), "800000");
        assert_eq!(field_value(&input, Field::LoanAmount), "-");
        assert_eq!(field_value(&input, Field::HasFinancing), "yes");
        assert_eq!(field_value(&input, Field::TruckType), "medium");
    }

    #[test]
    fn test_evaluate() {
        let mut input = InputRecord::form_defaults();
        assert!(matches!(evaluate(&input), Err(CoreError::Validation(_))));

        input.customer_name = "Fletes Norte".into();
        let result = evaluate(&input).unwrap();
        assert!((result.total_annual_cost - 810_000.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_form_starts_from_defaults_and_persists_edits() {
        let db = Database::in_memory().await.unwrap();

        let mut form = FormState::load(db.kv()).await;
        assert_eq!(form.input(), &InputRecord::form_defaults());

        form.apply(&[
            (Field::CustomerName, "Fletes Norte".into()),
            (Field::HasFinancing, "yes".into()),
        ])
        .await
        .unwrap();

        let reloaded = FormState::load(db.kv()).await;
        assert_eq!(reloaded.input().customer_name, "Fletes Norte");
        assert!(reloaded.input().has_financing);
    }

    #[tokio::test]
    async fn test_failed_batch_is_not_persisted() {
        let db = Database::in_memory().await.unwrap();
        let mut form = FormState::load(db.kv()).await;

        let result = form
            .apply(&[
                (Field::CustomerName, "Fletes Norte".into()),
                (Field::TruckValue, "abc".into()),
            ])
            .await;

        assert!(result.is_err());
        assert_eq!(form.input().customer_name, "");
        assert_eq!(db.kv().version(StorageKey::FormSnapshot).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reset() {
        let db = Database::in_memory().await.unwrap();
        let mut form = FormState::load(db.kv()).await;
        form.set(Field::FuelPrice, "30").await.unwrap();
        form.reset().await.unwrap();

        let reloaded = FormState::load(db.kv()).await;
        assert_eq!(reloaded.input(), &InputRecord::form_defaults());
    }
}
