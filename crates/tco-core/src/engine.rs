//! # TCO Engine
//!
//! Computes the annual cost breakdown and derived metrics of one truck.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        compute_tco                                      │
//! │                                                                         │
//! │  ValidatedInput                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TruckProfile = table[truck_type]                                      │
//! │  fuel efficiency = custom ?? profile default                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────────────────────────────────────┐     │
//! │  │ depreciation  = value × depreciation_rate                     │     │
//! │  │ fuel          = distance / efficiency × fuel_price            │     │
//! │  │ maintenance   = distance × maintenance_per_distance           │     │
//! │  │ tires         = distance / 100,000 × tire_cost_per_100k       │     │
//! │  │ insurance     = value × insurance_rate                        │     │
//! │  │ financing     = financed ? (loan ?? value×0.8) × (rate ?? 0.12)│     │
//! │  │ tolls         = distance × (toll ?? 0.5)                      │     │
//! │  │ licenses      = license ?? 15,000                             │     │
//! │  │ other         = other ?? 0                                    │     │
//! │  └───────────────────────────────────────────────────────────────┘     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  totals, per-distance / per-day, ROI, sorted breakdown                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fail Closed
//! Every division goes through [`checked_div`]. A zero divisor or a
//! non-finite outcome is a [`CoreError::DivisionUndefined`], so a result
//! never carries `NaN` or `inf`.

use std::cmp::Ordering;

use crate::error::{CoreError, CoreResult};
use crate::types::{AnnualCosts, CostBreakdownEntry, TcoResult, ValidatedInput};
use crate::{
    DAYS_PER_YEAR, DEFAULT_ANNUAL_LICENSE_COST, DEFAULT_INTEREST_RATE, DEFAULT_LOAN_RATIO,
    DEFAULT_OTHER_ANNUAL_COSTS, DEFAULT_TOLL_COST_PER_DISTANCE, TIRE_COST_DISTANCE_UNIT,
};

/// Computes the total cost of ownership for a validated input.
///
/// ## Example
/// ```rust
/// use tco_core::{compute_tco, CostCategory, InputRecord};
///
/// let mut input = InputRecord::form_defaults();
/// input.customer_name = "Acme".into();
/// input.custom_fuel_efficiency = Some(4.0);
///
/// let result = compute_tco(&input.validated().unwrap()).unwrap();
/// assert_eq!(result.fuel_efficiency_used, 4.0);
/// assert_eq!(result.annual_costs_by_category.get(CostCategory::Fuel), 600_000.0);
/// ```
pub fn compute_tco(input: &ValidatedInput) -> CoreResult<TcoResult> {
    let profile = input.truck_type.profile();
    let fuel_efficiency = input
        .custom_fuel_efficiency
        .unwrap_or(profile.default_fuel_efficiency);
    let distance = input.annual_distance;
    let value = input.truck_value;

    let financing = if input.has_financing {
        let loan = input.loan_amount.unwrap_or(value * DEFAULT_LOAN_RATIO);
        let rate = input.interest_rate.unwrap_or(DEFAULT_INTEREST_RATE);
        loan * rate
    } else {
        0.0
    };

    let costs = AnnualCosts {
        depreciation: value * profile.depreciation_rate,
        fuel: checked_div(distance, fuel_efficiency, "fuel cost")? * input.fuel_price,
        maintenance: distance * profile.maintenance_cost_per_distance,
        tires: checked_div(distance, TIRE_COST_DISTANCE_UNIT, "tire cost")?
            * profile.tire_cost_per_100k,
        insurance: value * profile.insurance_rate,
        financing,
        tolls: distance
            * input
                .toll_cost_per_distance
                .unwrap_or(DEFAULT_TOLL_COST_PER_DISTANCE),
        licenses: input
            .annual_license_cost
            .unwrap_or(DEFAULT_ANNUAL_LICENSE_COST),
        other: input.other_annual_costs.unwrap_or(DEFAULT_OTHER_ANNUAL_COSTS),
    };

    let total_annual_cost = costs.total();
    let years = f64::from(input.operation_years);
    let total_period_cost = total_annual_cost * years;

    let result = TcoResult {
        annual_costs_by_category: costs,
        total_annual_cost,
        total_period_cost,
        cost_per_distance: checked_div(total_annual_cost, distance, "cost per distance")?,
        cost_per_day: checked_div(total_annual_cost, DAYS_PER_YEAR, "cost per day")?,
        total_distance: distance * years,
        initial_investment: value,
        total_investment: value + total_period_cost,
        roi_percent: checked_div(total_period_cost, value, "ROI")? * 100.0,
        cost_breakdown: breakdown(&costs, total_annual_cost)?,
        truck_profile_used: *profile,
        fuel_efficiency_used: fuel_efficiency,
    };

    ensure_finite(&result)?;
    Ok(result)
}

/// Builds the nine breakdown entries, highest amount first.
///
/// The sort is stable, so equal amounts keep declaration order.
fn breakdown(costs: &AnnualCosts, total: f64) -> CoreResult<Vec<CostBreakdownEntry>> {
    let mut entries = costs
        .iter()
        .map(|(category, amount)| {
            Ok(CostBreakdownEntry {
                category,
                amount,
                percentage_of_annual_total: checked_div(amount, total, "cost share")? * 100.0,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    entries.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(Ordering::Equal));
    Ok(entries)
}

/// Divides, failing instead of producing a non-finite value.
pub(crate) fn checked_div(numerator: f64, divisor: f64, quantity: &'static str) -> CoreResult<f64> {
    if divisor == 0.0 || !divisor.is_finite() {
        return Err(CoreError::DivisionUndefined { quantity });
    }
    let quotient = numerator / divisor;
    if !quotient.is_finite() {
        return Err(CoreError::DivisionUndefined { quantity });
    }
    Ok(quotient)
}

fn ensure_finite(result: &TcoResult) -> CoreResult<()> {
    let derived = [
        ("total annual cost", result.total_annual_cost),
        ("total period cost", result.total_period_cost),
        ("total distance", result.total_distance),
        ("total investment", result.total_investment),
    ];
    let categories = result
        .annual_costs_by_category
        .iter()
        .map(|(category, amount)| (category.key(), amount));

    match derived.into_iter().chain(categories).find(|(_, v)| !v.is_finite()) {
        Some((quantity, _)) => Err(CoreError::DivisionUndefined { quantity }),
        None => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
