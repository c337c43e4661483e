//! `tco compare`: rank saved calculations, or the current form across all
//! truck types, by cost per distance.

use tco_core::{compare, Candidate, CoreResult, InputRecord, SavedCalculation, TruckType};

use super::Context;
use crate::error::AppResult;
use crate::output;
use crate::state::{evaluate, FormState};

/// The form evaluated once per truck type.
///
/// A custom fuel efficiency belongs to one truck, so each variant uses its
/// profile's default instead.
pub fn truck_type_candidates(input: &InputRecord) -> CoreResult<Vec<Candidate>> {
    TruckType::ALL
        .into_iter()
        .map(|truck_type| {
            let mut variant = input.clone();
            variant.truck_type = truck_type.key().to_string();
            variant.custom_fuel_efficiency = None;
            let result = evaluate(&variant)?;
            Ok(Candidate::new(truck_type.display_name(), result))
        })
        .collect()
}

fn history_candidate(entry: SavedCalculation) -> Candidate {
    let short_id: String = entry.id.chars().take(8).collect();
    Candidate::new(format!("{} [{short_id}]", entry.customer_name), entry.result)
}

pub async fn run(ctx: &Context, types: bool, ids: &[String]) -> AppResult<()> {
    let candidates = if types {
        let form = FormState::load(ctx.db.kv()).await;
        truck_type_candidates(form.input())?
    } else if ids.is_empty() {
        ctx.db
            .history()
            .list()
            .await
            .into_iter()
            .map(history_candidate)
            .collect()
    } else {
        let history = ctx.db.history();
        let mut candidates = Vec::with_capacity(ids.len());
        for id in ids {
            candidates.push(history_candidate(history.get(id).await?));
        }
        candidates
    };

    let comparison = compare(&candidates)?;
    output::print_comparison(ctx.format, &comparison, ctx.currency_symbol())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tco_core::CoreError;

    #[test]
    fn test_truck_types_ranked() {
        let mut input = InputRecord::form_defaults();
        input.customer_name = "Fletes Norte".into();
        input.custom_fuel_efficiency = Some(9.0);

        let candidates = truck_type_candidates(&input).unwrap();
        assert_eq!(candidates.len(), 4);
        assert_eq!(candidates[2].label, "Heavy truck (16-26 t)");
        assert_eq!(candidates[2].result.fuel_efficiency_used, 3.5);

        let comparison = compare(&candidates).unwrap();
        // Light trucks are cheapest per distance with these inputs.
        assert_eq!(comparison.best.label, "Light truck (3.5-7.5 t)");
        assert_eq!(comparison.ranking.last().unwrap().label, "Extra heavy truck (+26 t)");
    }

    #[test]
    fn test_invalid_form_cannot_be_compared() {
        let input = InputRecord::form_defaults();
        assert!(matches!(
            truck_type_candidates(&input),
            Err(CoreError::Validation(_))
        ));
    }
}
