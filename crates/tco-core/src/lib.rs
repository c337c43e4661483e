//! # tco-core: Pure Business Logic for Fleet TCO
//!
//! This crate is the **heart** of the calculator. It turns a truck's operating
//! parameters into a Total Cost of Ownership breakdown with pure functions and
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fleet TCO Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Form (CLI flags / stored snapshot)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ InputRecord                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tco-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │validation │  │  engine   │  │  format   │  │   │
//! │  │   │TruckType  │  │ validate  │  │compute_tco│  │ currency  │  │   │
//! │  │   │ Category  │  │FieldErrors│  │ TcoResult │  │ percent   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ TcoResult                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          tco-db (history)   /   tco-report (exports)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InputRecord, TruckProfile, TcoResult, etc.)
//! - [`validation`] - Per-field input rules producing [`FieldErrors`]
//! - [`engine`] - The TCO calculation itself
//! - [`compare`] - Ranking several calculations against each other
//! - [`format`] - Currency, number and percentage display helpers
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, no hidden state
//! 2. **Validate Once**: the engine only accepts a [`ValidatedInput`]
//! 3. **Closed Enums**: truck types, categories and field names are enums,
//!    so a missing table entry is a compile error
//! 4. **Fail Closed**: an undefined division is an error, never `NaN`/`inf`
//!
//! ## Example Usage
//!
//! ```rust
//! use tco_core::{compute_tco, InputRecord};
//!
//! let mut input = InputRecord::form_defaults();
//! input.customer_name = "Transportes González".to_string();
//!
//! let validated = input.validated().expect("a named default form is valid");
//! let result = compute_tco(&validated).unwrap();
//!
//! assert!((result.total_annual_cost - 810_000.0).abs() < 1e-6);
//! assert_eq!(result.cost_breakdown.len(), 9);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod compare;
pub mod engine;
pub mod error;
pub mod format;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use compare::{compare, Candidate, Comparison, RankedCandidate};
pub use engine::compute_tco;
pub use error::{CoreError, CoreResult, FieldErrors, ValidationError};
pub use types::*;
pub use validation::validate;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of saved calculations kept in history.
///
/// The oldest entry is evicted when an 11th calculation is saved.
pub const HISTORY_CAPACITY: usize = 10;

/// Longest operation period accepted by the validator, in years.
pub const MAX_OPERATION_YEARS: i32 = 20;

/// Share of the truck value financed when no loan amount is given.
pub const DEFAULT_LOAN_RATIO: f64 = 0.8;

/// Annual interest rate used when financing is on and no rate is given.
pub const DEFAULT_INTEREST_RATE: f64 = 0.12;

/// Toll cost per distance unit used when none is given.
pub const DEFAULT_TOLL_COST_PER_DISTANCE: f64 = 0.5;

/// Annual licenses and permits cost used when none is given.
pub const DEFAULT_ANNUAL_LICENSE_COST: f64 = 15_000.0;

/// Other annual costs used when none are given.
pub const DEFAULT_OTHER_ANNUAL_COSTS: f64 = 0.0;

/// Tire costs in the profile table are quoted per this many distance units.
pub const TIRE_COST_DISTANCE_UNIT: f64 = 100_000.0;

/// Days used to derive the daily cost.
pub const DAYS_PER_YEAR: f64 = 365.0;
