//! Output formatting module
//!
//! Every view is rendered to a `String` first so it can be tested; the
//! `print_*` functions pick table or JSON and write to stdout.

use std::fmt::Write as _;

use serde::Serialize;
use tco_core::format::{format_currency_with, format_number, format_percentage};
use tco_core::{
    Comparison, CostBreakdownEntry, Field, FieldErrors, InputRecord, SavedCalculation, TcoResult,
    TruckType,
};

use crate::cli::OutputFormat;
use crate::error::AppResult;
use crate::state::field_value;

/// Breakdown entries shown in the results view; the report lists all nine.
pub const TOP_CATEGORIES: usize = 6;

const BAR_WIDTH: usize = 30;

fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn truck_label(key: &str) -> String {
    key.parse::<TruckType>()
        .map(|t| t.display_name().to_string())
        .unwrap_or_else(|_| key.to_string())
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
}

// =============================================================================
// Results
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculationView<'a> {
    customer: &'a InputRecord,
    results: &'a TcoResult,
}

/// One bar per entry, scaled so the largest entry fills `BAR_WIDTH`.
pub fn render_bars(entries: &[CostBreakdownEntry], symbol: &str) -> Vec<String> {
    let max = entries.iter().map(|e| e.amount).fold(0.0, f64::max);

    entries
        .iter()
        .map(|entry| {
            let width = if max > 0.0 {
                ((entry.amount / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            format!(
                "{:<22} {:<width$} {:>12} {:>7}",
                entry.category.label(),
                "█".repeat(width),
                format_currency_with(entry.amount, symbol),
                format_percentage(entry.percentage_of_annual_total, 1),
                width = BAR_WIDTH,
            )
        })
        .collect()
}

pub fn render_result(input: &InputRecord, result: &TcoResult, symbol: &str) -> String {
    let money = |v: f64| format_currency_with(v, symbol);
    let mut out = String::new();

    heading(&mut out, "TCO Results");
    let _ = writeln!(out, "Customer:            {}", input.customer_name.trim());
    let _ = writeln!(
        out,
        "Truck:               {}",
        result.truck_profile_used.truck_type.display_name()
    );
    let _ = writeln!(
        out,
        "Fuel efficiency:     {} per unit",
        format_number(result.fuel_efficiency_used, 1)
    );
    let _ = writeln!(out, "-------------------------");
    let _ = writeln!(out, "Total annual cost:   {}", money(result.total_annual_cost));
    let _ = writeln!(
        out,
        "Total period cost:   {} ({} years)",
        money(result.total_period_cost),
        input.operation_years.unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "Cost per distance:   {symbol}{}",
        format_number(result.cost_per_distance, 2)
    );
    let _ = writeln!(out, "Cost per day:        {}", money(result.cost_per_day));
    let _ = writeln!(out, "Total distance:      {}", format_number(result.total_distance, 0));
    let _ = writeln!(out, "Initial investment:  {}", money(result.initial_investment));
    let _ = writeln!(out, "Total investment:    {}", money(result.total_investment));
    let _ = writeln!(out, "ROI:                 {}", format_percentage(result.roi_percent, 1));

    let shown = result.cost_breakdown.len().min(TOP_CATEGORIES);
    let _ = writeln!(out, "\n--- Cost breakdown (top {shown}) ---");
    for line in render_bars(&result.cost_breakdown[..shown], symbol) {
        let _ = writeln!(out, "{line}");
    }

    out
}

pub fn print_result(
    format: OutputFormat,
    input: &InputRecord,
    result: &TcoResult,
    symbol: &str,
) -> AppResult<()> {
    match format {
        OutputFormat::Json => print_json(&CalculationView {
            customer: input,
            results: result,
        }),
        OutputFormat::Table => {
            print!("{}", render_result(input, result, symbol));
            Ok(())
        }
    }
}

// =============================================================================
// Form & Validation
// =============================================================================

pub fn render_errors(errors: &FieldErrors) -> String {
    let mut out = String::new();
    for (field, err) in errors.iter() {
        let _ = writeln!(out, "  {:<22} {}", field.key(), err);
    }
    out
}

pub fn render_form(input: &InputRecord, errors: &FieldErrors) -> String {
    let mut out = String::new();
    heading(&mut out, "Form");

    for field in Field::ALL {
        let mut value = field_value(input, field);
        if field == Field::TruckType {
            value = format!("{value} ({})", truck_label(&value));
        }
        let marker = if errors.contains(field) { "  ✗" } else { "" };
        let _ = writeln!(out, "{:<22} {value}{marker}", field.key());
    }

    if errors.is_empty() {
        let _ = writeln!(out, "\nReady to calculate.");
    } else {
        let _ = writeln!(out, "\n{} field(s) need attention:", errors.len());
        out.push_str(&render_errors(errors));
    }
    out
}

#[derive(Serialize)]
struct FormView<'a> {
    input: &'a InputRecord,
    errors: &'a FieldErrors,
}

pub fn print_form(
    format: OutputFormat,
    input: &InputRecord,
    errors: &FieldErrors,
) -> AppResult<()> {
    match format {
        OutputFormat::Json => print_json(&FormView { input, errors }),
        OutputFormat::Table => {
            print!("{}", render_form(input, errors));
            Ok(())
        }
    }
}

// =============================================================================
// History
// =============================================================================

pub fn render_history(entries: &[SavedCalculation], symbol: &str) -> String {
    let mut out = String::new();
    heading(&mut out, "Saved Calculations");

    if entries.is_empty() {
        let _ = writeln!(out, "(none)");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<10} {:<17} {:<24} {:<26} {:>14}",
        "ID", "Saved (UTC)", "Customer", "Truck", "Annual cost"
    );
    for entry in entries {
        let _ = writeln!(
            out,
            "{:<10} {:<17} {:<24} {:<26} {:>14}",
            entry.id.chars().take(8).collect::<String>(),
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.customer_name.chars().take(24).collect::<String>(),
            truck_label(&entry.input.truck_type),
            format_currency_with(entry.result.total_annual_cost, symbol),
        );
    }
    out
}

pub fn print_history(
    format: OutputFormat,
    entries: &[SavedCalculation],
    symbol: &str,
) -> AppResult<()> {
    match format {
        OutputFormat::Json => print_json(entries),
        OutputFormat::Table => {
            print!("{}", render_history(entries, symbol));
            Ok(())
        }
    }
}

// =============================================================================
// Comparison
// =============================================================================

pub fn render_comparison(comparison: &Comparison, symbol: &str) -> String {
    let money = |v: f64| format_currency_with(v, symbol);
    let mut out = String::new();
    heading(&mut out, "Comparison");

    let _ = writeln!(
        out,
        "{:<4} {:<30} {:>12} {:>14} {:>16} {:>14}",
        "#", "Option", "Per distance", "Annual", "Period", "vs best"
    );
    for entry in &comparison.ranking {
        let _ = writeln!(
            out,
            "{:<4} {:<30} {:>12} {:>14} {:>16} {:>14}",
            entry.rank,
            entry.label.chars().take(30).collect::<String>(),
            format!("{symbol}{}", format_number(entry.cost_per_distance, 2)),
            money(entry.total_annual_cost),
            money(entry.total_period_cost),
            money(entry.savings_vs_best),
        );
    }

    let _ = writeln!(out, "\nBest option:           {}", comparison.best.label);
    let _ = writeln!(
        out,
        "Average per distance:  {symbol}{}",
        format_number(comparison.average_cost_per_distance, 2)
    );
    let _ = writeln!(out, "Annual spread:         {}", money(comparison.total_savings));
    out
}

pub fn print_comparison(
    format: OutputFormat,
    comparison: &Comparison,
    symbol: &str,
) -> AppResult<()> {
    match format {
        OutputFormat::Json => print_json(comparison),
        OutputFormat::Table => {
            print!("{}", render_comparison(comparison, symbol));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tco_core::{compare, compute_tco, Candidate, CostCategory};

    fn calculation() -> (InputRecord, TcoResult) {
        let mut input = InputRecord::form_defaults();
        input.customer_name = "Fletes Norte".into();
        let result = compute_tco(&input.validated().unwrap()).unwrap();
        (input, result)
    }

    #[test]
    fn test_result_view_shows_top_six() {
        let (input, result) = calculation();
        let text = render_result(&input, &result, "$");

        assert!(text.contains("Total annual cost:   $810,000"));
        assert!(text.contains("Total period cost:   $4,050,000 (5 years)"));
        assert!(text.contains("Cost per distance:   $8.10"));
        assert!(text.contains("top 6"));
        // Fuel is the largest category; financing (0) is past the sixth row.
        assert!(text.contains(CostCategory::Fuel.label()));
        assert!(!text.contains(CostCategory::Financing.label()));
    }

    #[test]
    fn test_bars_scale_to_largest() {
        let (_, result) = calculation();
        let bars = render_bars(&result.cost_breakdown, "$");

        assert_eq!(bars.len(), 9);
        assert_eq!(bars[0].matches('█').count(), BAR_WIDTH);
        assert_eq!(bars[8].matches('█').count(), 0);
    }

    #[test]
    fn test_form_view_marks_errors() {
        let input = InputRecord::form_defaults();
        let errors = tco_core::validate(&input);
        let text = render_form(&input, &errors);

        assert!(text.contains("customerName"));
        assert!(text.contains("medium (Medium truck (7.5-16 t))"));
        assert!(text.contains("1 field(s) need attention"));
        assert!(text.contains("customerName is required"));
    }

    #[test]
    fn test_history_view() {
        let (input, result) = calculation();
        let saved = SavedCalculation::new(input, result);
        let text = render_history(std::slice::from_ref(&saved), "$");

        assert!(text.contains(&saved.id[..8]));
        assert!(text.contains("Fletes Norte"));
        assert!(text.contains("$810,000"));
        assert!(render_history(&[], "$").contains("(none)"));
    }

    #[test]
    fn test_comparison_view() {
        let (_, result) = calculation();
        let comparison = compare(&[
            Candidate::new("Option A", result.clone()),
            Candidate::new("Option B", result),
        ])
        .unwrap();
        let text = render_comparison(&comparison, "$");

        assert!(text.contains("Best option:           Option A"));
        assert!(text.contains("Annual spread:         $0"));
    }
}
