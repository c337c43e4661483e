//! # State Module
//!
//! Application state shared by the commands.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────────────┐  │
//! │  │  AppConfig   │  │    FormState     │  │      Recalculator        │  │
//! │  │              │  │                  │  │                          │  │
//! │  │  TOML + env  │  │  InputRecord     │  │  generation counter      │  │
//! │  │  read-only   │  │  ⇅ kv snapshot   │  │  debounce task           │  │
//! │  │  after load  │  │  "tco-form-data" │  │  watch::Sender<result>   │  │
//! │  └──────────────┘  └──────────────────┘  └──────────────────────────┘  │
//! │                                                                         │
//! │  Only `interactive` runs a Recalculator; one-shot commands evaluate    │
//! │  the form directly.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod form;
mod recalc;

pub use config::{AppConfig, BrandingSettings, CalculatorSettings, ExportSettings, StorageSettings};
pub use form::{apply_edit, evaluate, field_value, parse_assignment, FormState};
pub use recalc::{Recalculation, Recalculator};
