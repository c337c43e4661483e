//! # Domain Types
//!
//! Core domain types used throughout Fleet TCO.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InputRecord    │──►│ ValidatedInput  │──►│   TcoResult     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  raw form data  │   │  typed, checked │   │  AnnualCosts    │       │
//! │  │  Option<f64>    │   │  TruckType enum │   │  breakdown[9]   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   TruckType     │   │  CostCategory   │   │ SavedCalculation│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Light          │   │  9 variants     │   │  id (UUID)      │       │
//! │  │  Medium ...     │   │  label, colour  │   │  input + result │       │
//! │  │  → TruckProfile │   │                 │   │  snapshots      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Closed Tables
//! Truck profiles and category metadata are static tables indexed by enums.
//! Adding a variant without a table entry does not compile.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;

// =============================================================================
// Truck Type & Profile
// =============================================================================

/// The four truck classes the calculator knows about.
///
/// ## Parsing
/// Accepts the English keys (`light`, `medium`, `heavy`, `extra_heavy`) and the
/// keys stored by older form snapshots (`ligero`, `mediano`, `pesado`,
/// `extrapesado`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TruckType {
    /// 3.5 to 7.5 tonnes.
    Light,
    /// 7.5 to 16 tonnes.
    Medium,
    /// 16 to 26 tonnes.
    Heavy,
    /// More than 26 tonnes.
    ExtraHeavy,
}

impl TruckType {
    /// Every truck type, in table order.
    pub const ALL: [TruckType; 4] = [
        TruckType::Light,
        TruckType::Medium,
        TruckType::Heavy,
        TruckType::ExtraHeavy,
    ];

    /// Returns the static cost profile for this truck type.
    #[inline]
    pub fn profile(self) -> &'static TruckProfile {
        &TRUCK_PROFILES[self as usize]
    }

    /// Returns the stable key used in stored records.
    pub const fn key(self) -> &'static str {
        match self {
            TruckType::Light => "light",
            TruckType::Medium => "medium",
            TruckType::Heavy => "heavy",
            TruckType::ExtraHeavy => "extra_heavy",
        }
    }

    /// Returns the human readable name shown in forms and reports.
    pub const fn display_name(self) -> &'static str {
        match self {
            TruckType::Light => "Light truck (3.5-7.5 t)",
            TruckType::Medium => "Medium truck (7.5-16 t)",
            TruckType::Heavy => "Heavy truck (16-26 t)",
            TruckType::ExtraHeavy => "Extra heavy truck (+26 t)",
        }
    }
}

impl Default for TruckType {
    fn default() -> Self {
        TruckType::Medium
    }
}

impl fmt::Display for TruckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TruckType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" | "ligero" => Ok(TruckType::Light),
            "medium" | "mediano" => Ok(TruckType::Medium),
            "heavy" | "pesado" => Ok(TruckType::Heavy),
            "extra_heavy" | "extra-heavy" | "extraheavy" | "extrapesado" => {
                Ok(TruckType::ExtraHeavy)
            }
            other => Err(CoreError::UnknownTruckType(other.to_string())),
        }
    }
}

/// Cost parameters of one truck class.
///
/// ## Units
/// - `depreciation_rate`, `insurance_rate`: fraction of the truck value per year
/// - `maintenance_cost_per_distance`: currency per distance unit
/// - `tire_cost_per_100k`: currency per 100,000 distance units
/// - `default_fuel_efficiency`: distance per volume of fuel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TruckProfile {
    pub truck_type: TruckType,
    pub depreciation_rate: f64,
    pub maintenance_cost_per_distance: f64,
    pub tire_cost_per_100k: f64,
    pub insurance_rate: f64,
    pub default_fuel_efficiency: f64,
}

/// Profile table, indexed by `TruckType as usize`.
static TRUCK_PROFILES: [TruckProfile; 4] = [
    TruckProfile {
        truck_type: TruckType::Light,
        depreciation_rate: 0.20,
        maintenance_cost_per_distance: 0.85,
        tire_cost_per_100k: 15_000.0,
        insurance_rate: 0.08,
        default_fuel_efficiency: 8.5,
    },
    TruckProfile {
        truck_type: TruckType::Medium,
        depreciation_rate: 0.18,
        maintenance_cost_per_distance: 1.20,
        tire_cost_per_100k: 25_000.0,
        insurance_rate: 0.07,
        default_fuel_efficiency: 6.0,
    },
    TruckProfile {
        truck_type: TruckType::Heavy,
        depreciation_rate: 0.15,
        maintenance_cost_per_distance: 1.80,
        tire_cost_per_100k: 45_000.0,
        insurance_rate: 0.06,
        default_fuel_efficiency: 3.5,
    },
    TruckProfile {
        truck_type: TruckType::ExtraHeavy,
        depreciation_rate: 0.12,
        maintenance_cost_per_distance: 2.50,
        tire_cost_per_100k: 65_000.0,
        insurance_rate: 0.05,
        default_fuel_efficiency: 2.8,
    },
];

// =============================================================================
// Cost Category
// =============================================================================

/// The nine annual cost categories.
///
/// Declaration order is significant: it is the summation order and the
/// tie-break order of the sorted breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Depreciation,
    Fuel,
    Maintenance,
    Tires,
    Insurance,
    Financing,
    Tolls,
    Licenses,
    Other,
}

impl CostCategory {
    /// Every category, in declaration order.
    pub const ALL: [CostCategory; 9] = [
        CostCategory::Depreciation,
        CostCategory::Fuel,
        CostCategory::Maintenance,
        CostCategory::Tires,
        CostCategory::Insurance,
        CostCategory::Financing,
        CostCategory::Tolls,
        CostCategory::Licenses,
        CostCategory::Other,
    ];

    /// Stable key, identical to the serialized form.
    pub const fn key(self) -> &'static str {
        match self {
            CostCategory::Depreciation => "depreciation",
            CostCategory::Fuel => "fuel",
            CostCategory::Maintenance => "maintenance",
            CostCategory::Tires => "tires",
            CostCategory::Insurance => "insurance",
            CostCategory::Financing => "financing",
            CostCategory::Tolls => "tolls",
            CostCategory::Licenses => "licenses",
            CostCategory::Other => "other",
        }
    }

    /// Display label for result views and reports.
    pub const fn label(self) -> &'static str {
        match self {
            CostCategory::Depreciation => "Depreciation",
            CostCategory::Fuel => "Fuel",
            CostCategory::Maintenance => "Maintenance",
            CostCategory::Tires => "Tires",
            CostCategory::Insurance => "Insurance",
            CostCategory::Financing => "Financing",
            CostCategory::Tolls => "Tolls",
            CostCategory::Licenses => "Licenses and permits",
            CostCategory::Other => "Other costs",
        }
    }

    /// Chart colour as a `#rrggbb` hex string.
    pub const fn color(self) -> &'static str {
        match self {
            CostCategory::Depreciation => "#1976d2",
            CostCategory::Fuel => "#f57c00",
            CostCategory::Maintenance => "#d32f2f",
            CostCategory::Tires => "#388e3c",
            CostCategory::Insurance => "#7b1fa2",
            CostCategory::Financing => "#00796b",
            CostCategory::Tolls => "#f44336",
            CostCategory::Licenses => "#3f51b5",
            CostCategory::Other => "#9e9e9e",
        }
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// Form Fields
// =============================================================================

/// Names of the input record fields.
///
/// Used as the key of [`crate::FieldErrors`] and by form editing, so a typo in
/// a field name is a compile error instead of a silently ignored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    CustomerName,
    TruckType,
    TruckValue,
    AnnualDistance,
    OperationYears,
    FuelPrice,
    CustomFuelEfficiency,
    HasFinancing,
    LoanAmount,
    InterestRate,
    TollCostPerDistance,
    AnnualLicenseCost,
    OtherAnnualCosts,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Field; 13] = [
        Field::CustomerName,
        Field::TruckType,
        Field::TruckValue,
        Field::AnnualDistance,
        Field::OperationYears,
        Field::FuelPrice,
        Field::CustomFuelEfficiency,
        Field::HasFinancing,
        Field::LoanAmount,
        Field::InterestRate,
        Field::TollCostPerDistance,
        Field::AnnualLicenseCost,
        Field::OtherAnnualCosts,
    ];

    /// The camelCase key used in JSON and error maps.
    pub const fn key(self) -> &'static str {
        match self {
            Field::CustomerName => "customerName",
            Field::TruckType => "truckType",
            Field::TruckValue => "truckValue",
            Field::AnnualDistance => "annualDistance",
            Field::OperationYears => "operationYears",
            Field::FuelPrice => "fuelPrice",
            Field::CustomFuelEfficiency => "customFuelEfficiency",
            Field::HasFinancing => "hasFinancing",
            Field::LoanAmount => "loanAmount",
            Field::InterestRate => "interestRate",
            Field::TollCostPerDistance => "tollCostPerDistance",
            Field::AnnualLicenseCost => "annualLicenseCost",
            Field::OtherAnnualCosts => "otherAnnualCosts",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = CoreError;

    /// Accepts the camelCase key or its snake_case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.trim().chars().filter(|c| *c != '_' && *c != '-').collect();
        Field::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| CoreError::UnknownField(s.trim().to_string()))
    }
}

// =============================================================================
// Input Record
// =============================================================================

/// Raw calculator input, exactly as the form holds it.
///
/// Every numeric field is optional: a missing value is a validation error for
/// required fields and "use the default" for the optional ones. `truck_type` is
/// a free string so that an unknown key can be reported by the validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct InputRecord {
    pub customer_name: String,
    pub truck_type: String,
    /// Purchase value of the truck (currency).
    pub truck_value: Option<f64>,
    /// Distance driven per year.
    pub annual_distance: Option<f64>,
    /// Years of operation, 1 to 20.
    pub operation_years: Option<i32>,
    /// Fuel price per volume unit.
    pub fuel_price: Option<f64>,
    /// Overrides the profile's fuel efficiency when present.
    pub custom_fuel_efficiency: Option<f64>,
    pub has_financing: bool,
    /// Defaults to 80% of the truck value when financing is on.
    pub loan_amount: Option<f64>,
    /// Annual fraction, defaults to 0.12.
    pub interest_rate: Option<f64>,
    /// Defaults to 0.5 per distance unit.
    pub toll_cost_per_distance: Option<f64>,
    /// Defaults to 15,000 per year.
    pub annual_license_cost: Option<f64>,
    /// Defaults to 0.
    pub other_annual_costs: Option<f64>,
}

impl InputRecord {
    /// The values a fresh form starts with.
    ///
    /// Everything is filled in except the customer name, so the form is one
    /// edit away from a valid calculation.
    pub fn form_defaults() -> Self {
        InputRecord {
            customer_name: String::new(),
            truck_type: TruckType::Medium.key().to_string(),
            truck_value: Some(800_000.0),
            annual_distance: Some(100_000.0),
            operation_years: Some(5),
            fuel_price: Some(24.0),
            custom_fuel_efficiency: None,
            has_financing: false,
            loan_amount: None,
            interest_rate: Some(crate::DEFAULT_INTEREST_RATE),
            toll_cost_per_distance: Some(crate::DEFAULT_TOLL_COST_PER_DISTANCE),
            annual_license_cost: Some(crate::DEFAULT_ANNUAL_LICENSE_COST),
            other_annual_costs: Some(crate::DEFAULT_OTHER_ANNUAL_COSTS),
        }
    }
}

// =============================================================================
// Validated Input
// =============================================================================

/// Input that passed every validator rule.
///
/// ## Construction
/// Only [`InputRecord::validated`] builds this type (the private `sealed`
/// field keeps other crates from assembling one by hand), so the engine can
/// rely on positive truck value, distance and fuel price, a known truck type
/// and 1..=20 years.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub customer_name: String,
    pub truck_type: TruckType,
    pub truck_value: f64,
    pub annual_distance: f64,
    pub operation_years: u32,
    pub fuel_price: f64,
    pub custom_fuel_efficiency: Option<f64>,
    pub has_financing: bool,
    pub loan_amount: Option<f64>,
    pub interest_rate: Option<f64>,
    pub toll_cost_per_distance: Option<f64>,
    pub annual_license_cost: Option<f64>,
    pub other_annual_costs: Option<f64>,
    pub(crate) sealed: (),
}

// =============================================================================
// Annual Costs
// =============================================================================

/// Annual cost of every category. All nine are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AnnualCosts {
    pub depreciation: f64,
    pub fuel: f64,
    pub maintenance: f64,
    pub tires: f64,
    pub insurance: f64,
    pub financing: f64,
    pub tolls: f64,
    pub licenses: f64,
    pub other: f64,
}

impl AnnualCosts {
    /// Returns the amount of one category.
    pub fn get(&self, category: CostCategory) -> f64 {
        match category {
            CostCategory::Depreciation => self.depreciation,
            CostCategory::Fuel => self.fuel,
            CostCategory::Maintenance => self.maintenance,
            CostCategory::Tires => self.tires,
            CostCategory::Insurance => self.insurance,
            CostCategory::Financing => self.financing,
            CostCategory::Tolls => self.tolls,
            CostCategory::Licenses => self.licenses,
            CostCategory::Other => self.other,
        }
    }

    /// Iterates `(category, amount)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (CostCategory, f64)> + '_ {
        CostCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Sum of all categories, always added in declaration order.
    pub fn total(&self) -> f64 {
        self.iter().fold(0.0, |sum, (_, amount)| sum + amount)
    }
}

// =============================================================================
// TCO Result
// =============================================================================

/// One line of the sorted cost breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdownEntry {
    pub category: CostCategory,
    pub amount: f64,
    /// Share of the annual total, 0 to 100.
    pub percentage_of_annual_total: f64,
}

/// Full output of one TCO calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TcoResult {
    pub annual_costs_by_category: AnnualCosts,
    pub total_annual_cost: f64,
    /// `total_annual_cost × operation_years`.
    pub total_period_cost: f64,
    pub cost_per_distance: f64,
    pub cost_per_day: f64,
    pub total_distance: f64,
    /// Equal to the truck value.
    pub initial_investment: f64,
    /// Truck value plus the period cost.
    pub total_investment: f64,
    /// Period cost as a percentage of the truck value.
    pub roi_percent: f64,
    /// The nine categories, highest amount first.
    pub cost_breakdown: Vec<CostBreakdownEntry>,
    pub truck_profile_used: TruckProfile,
    pub fuel_efficiency_used: f64,
}

// =============================================================================
// Saved Calculation
// =============================================================================

/// A calculation frozen into history.
///
/// Uses the snapshot pattern: input and result are copied at save time so a
/// later form edit never changes what was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SavedCalculation {
    /// Unique identifier (UUID v4).
    pub id: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub customer_name: String,
    pub input: InputRecord,
    pub result: TcoResult,
}

impl SavedCalculation {
    /// Snapshots an input/result pair with a fresh id and the current time.
    pub fn new(input: InputRecord, result: TcoResult) -> Self {
        SavedCalculation {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            customer_name: input.customer_name.trim().to_string(),
            input,
            result,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_table_is_indexed_by_truck_type() {
        for truck_type in TruckType::ALL {
            assert_eq!(truck_type.profile().truck_type, truck_type);
        }
    }

    #[test]
    fn test_medium_profile_values() {
        let profile = TruckType::Medium.profile();
        assert_eq!(profile.depreciation_rate, 0.18);
        assert_eq!(profile.maintenance_cost_per_distance, 1.20);
        assert_eq!(profile.tire_cost_per_100k, 25_000.0);
        assert_eq!(profile.insurance_rate, 0.07);
        assert_eq!(profile.default_fuel_efficiency, 6.0);
    }

    #[test]
    fn test_truck_type_parsing() {
        assert_eq!("medium".parse::<TruckType>().unwrap(), TruckType::Medium);
        assert_eq!(" Heavy ".parse::<TruckType>().unwrap(), TruckType::Heavy);
        assert_eq!("extra_heavy".parse::<TruckType>().unwrap(), TruckType::ExtraHeavy);
        assert_eq!("extrapesado".parse::<TruckType>().unwrap(), TruckType::ExtraHeavy);
        assert_eq!("ligero".parse::<TruckType>().unwrap(), TruckType::Light);
        assert!(matches!(
            "unknown".parse::<TruckType>(),
            Err(CoreError::UnknownTruckType(_))
        ));
    }

    #[test]
    fn test_truck_type_round_trips_through_key() {
        for truck_type in TruckType::ALL {
            assert_eq!(truck_type.key().parse::<TruckType>().unwrap(), truck_type);
        }
    }

    #[test]
    fn test_category_order_and_metadata() {
        assert_eq!(CostCategory::ALL[0], CostCategory::Depreciation);
        assert_eq!(CostCategory::ALL[8], CostCategory::Other);
        assert_eq!(CostCategory::Fuel.color(), "#f57c00");
        assert_eq!(CostCategory::Licenses.label(), "Licenses and permits");
        for category in CostCategory::ALL {
            assert!(category.color().starts_with('#'));
            assert_eq!(category.color().len(), 7);
        }
    }

    #[test]
    fn test_field_parsing() {
        assert_eq!("truckValue".parse::<Field>().unwrap(), Field::TruckValue);
        assert_eq!("truck_value".parse::<Field>().unwrap(), Field::TruckValue);
        assert_eq!("OPERATIONYEARS".parse::<Field>().unwrap(), Field::OperationYears);
        assert!(matches!("speed".parse::<Field>(), Err(CoreError::UnknownField(_))));
    }

    #[test]
    fn test_annual_costs_total_and_lookup() {
        let costs = AnnualCosts {
            depreciation: 1.0,
            fuel: 2.0,
            maintenance: 3.0,
            tires: 4.0,
            insurance: 5.0,
            financing: 6.0,
            tolls: 7.0,
            licenses: 8.0,
            other: 9.0,
        };
        assert_eq!(costs.total(), 45.0);
        assert_eq!(costs.get(CostCategory::Tolls), 7.0);
        assert_eq!(costs.iter().count(), 9);
    }

    #[test]
    fn test_input_record_missing_fields_deserialize_as_none() {
        let input: InputRecord =
            serde_json::from_str(r#"{"customerName":"Acme","truckType":"heavy"}"#).unwrap();
        assert_eq!(input.customer_name, "Acme");
        assert_eq!(input.truck_value, None);
        assert_eq!(input.operation_years, None);
        assert!(!input.has_financing);
    }

    #[test]
    fn test_form_defaults_use_camel_case_keys() {
        let json = serde_json::to_value(InputRecord::form_defaults()).unwrap();
        assert_eq!(json["truckType"], "medium");
        assert_eq!(json["annualDistance"], 100_000.0);
        assert_eq!(json["tollCostPerDistance"], 0.5);
    }
}
