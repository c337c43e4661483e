//! # Comparison
//!
//! Ranks several calculations by cost per distance.
//!
//! ```text
//!   candidates ──► sort by cost/distance (stable) ──► rank 1..n
//!                                │
//!                                ├── best            = rank 1
//!                                ├── average         = mean cost/distance
//!                                └── total savings   = max − min annual total
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::TcoResult;

/// One calculation entered into a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Shown in the ranking (customer name, truck type, history id...).
    pub label: String,
    pub result: TcoResult,
}

impl Candidate {
    pub fn new(label: impl Into<String>, result: TcoResult) -> Self {
        Candidate {
            label: label.into(),
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    /// 1 is the cheapest per distance unit.
    pub rank: u32,
    pub label: String,
    pub cost_per_distance: f64,
    pub total_annual_cost: f64,
    pub total_period_cost: f64,
    /// Annual total minus the lowest annual total of the comparison.
    pub savings_vs_best: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub best: RankedCandidate,
    pub average_cost_per_distance: f64,
    /// Highest annual total minus the lowest.
    pub total_savings: f64,
    pub ranking: Vec<RankedCandidate>,
}

/// Compares calculations against each other.
///
/// Candidates with equal cost per distance keep their input order.
///
/// ## Errors
/// [`CoreError::EmptyComparison`] when `candidates` is empty.
pub fn compare(candidates: &[Candidate]) -> CoreResult<Comparison> {
    if candidates.is_empty() {
        return Err(CoreError::EmptyComparison);
    }

    let annual = candidates.iter().map(|c| c.result.total_annual_cost);
    let min_annual = annual.clone().fold(f64::INFINITY, f64::min);
    let max_annual = annual.fold(f64::NEG_INFINITY, f64::max);

    let mut sorted: Vec<&Candidate> = candidates.iter().collect();
    sorted.sort_by(|a, b| {
        a.result
            .cost_per_distance
            .partial_cmp(&b.result.cost_per_distance)
            .unwrap_or(Ordering::Equal)
    });

    let ranking: Vec<RankedCandidate> = sorted
        .into_iter()
        .zip(1u32..)
        .map(|(candidate, rank)| RankedCandidate {
            rank,
            label: candidate.label.clone(),
            cost_per_distance: candidate.result.cost_per_distance,
            total_annual_cost: candidate.result.total_annual_cost,
            total_period_cost: candidate.result.total_period_cost,
            savings_vs_best: candidate.result.total_annual_cost - min_annual,
        })
        .collect();

    let average_cost_per_distance = candidates
        .iter()
        .map(|c| c.result.cost_per_distance)
        .sum::<f64>()
        / candidates.len() as f64;

    Ok(Comparison {
        best: ranking[0].clone(),
        average_cost_per_distance,
        total_savings: max_annual - min_annual,
        ranking,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_tco;
    use crate::types::{InputRecord, TruckType};

    fn candidate(truck_type: TruckType) -> Candidate {
        let input = InputRecord {
            customer_name: "Fleet".to_string(),
            truck_type: truck_type.key().to_string(),
            ..InputRecord::form_defaults()
        };
        let result = compute_tco(&input.validated().unwrap()).unwrap();
        Candidate::new(truck_type.display_name(), result)
    }

    #[test]
    fn test_empty_comparison_is_an_error() {
        assert_eq!(compare(&[]).unwrap_err(), CoreError::EmptyComparison);
    }

    #[test]
    fn test_single_candidate() {
        let comparison = compare(&[candidate(TruckType::Medium)]).unwrap();
        assert_eq!(comparison.best.rank, 1);
        assert_eq!(comparison.total_savings, 0.0);
        assert_eq!(comparison.ranking.len(), 1);
        assert_eq!(comparison.ranking[0].savings_vs_best, 0.0);
    }

    #[test]
    fn test_ranking_orders_by_cost_per_distance() {
        let candidates: Vec<Candidate> = TruckType::ALL.into_iter().rev().map(candidate).collect();
        let comparison = compare(&candidates).unwrap();

        let ranks: Vec<u32> = comparison.ranking.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        for pair in comparison.ranking.windows(2) {
            assert!(pair[0].cost_per_distance <= pair[1].cost_per_distance);
        }
        assert_eq!(comparison.best, comparison.ranking[0]);
        assert_eq!(comparison.best.label, TruckType::Light.display_name());
    }

    #[test]
    fn test_savings_and_average() {
        let candidates = vec![candidate(TruckType::Light), candidate(TruckType::Heavy)];
        let light = candidates[0].result.clone();
        let heavy = candidates[1].result.clone();
        let comparison = compare(&candidates).unwrap();

        let expected_savings = heavy.total_annual_cost - light.total_annual_cost;
        assert!((comparison.total_savings - expected_savings).abs() < 1e-6);
        assert!(
            (comparison.average_cost_per_distance
                - (light.cost_per_distance + heavy.cost_per_distance) / 2.0)
                .abs()
                < 1e-9
        );
        assert_eq!(comparison.ranking[0].savings_vs_best, 0.0);
        assert!((comparison.ranking[1].savings_vs_best - expected_savings).abs() < 1e-6);
    }
}
