//! CLI definition using clap

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tco_core::{InputRecord, TruckType};

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Parser)]
#[command(name = "tco")]
#[command(version)]
#[command(about = "Total cost of ownership calculator for fleet trucks")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overrides the config
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Calculate the TCO of the current form, optionally editing it first
    Calculate {
        #[command(flatten)]
        fields: FieldArgs,

        /// Save the calculation to history
        #[arg(long)]
        save: bool,
    },

    /// Show or edit the stored form
    #[command(subcommand)]
    Form(FormCommand),

    /// Saved calculations
    #[command(subcommand)]
    History(HistoryCommand),

    /// Export a calculation to a file
    #[command(subcommand)]
    Export(ExportCommand),

    /// Rank calculations by cost per distance
    Compare {
        /// Compare the current form across every truck type
        #[arg(long, conflicts_with = "ids")]
        types: bool,

        /// History ids (or unique prefixes) to compare; all history if omitted
        #[arg(long, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Edit the form line by line with live recalculation
    Interactive,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum FormCommand {
    /// Print every field and the validation state
    Show,

    /// Set fields: `tco form set truckValue=950000 operation_years=7`
    Set {
        /// `field=value` pairs; a bare field name clears it
        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// Restore the form defaults
    Reset,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List saved calculations, most recent first
    List,

    /// Show one saved calculation
    Show { id: String },

    /// Copy a saved calculation's input into the form
    Load { id: String },

    /// Delete one saved calculation
    Remove { id: String },

    /// Delete every saved calculation
    Clear,
}

#[derive(Subcommand)]
pub enum ExportCommand {
    /// JSON document with input and results
    Json {
        #[command(flatten)]
        target: ExportTarget,
    },

    /// Paginated text report
    Report {
        #[command(flatten)]
        target: ExportTarget,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExportTarget {
    /// Export a saved calculation instead of the current form
    #[arg(long)]
    pub id: Option<String>,

    /// Output directory, overrides the config
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Field flags shared by `calculate`.
#[derive(Args, Debug, Clone, Default)]
pub struct FieldArgs {
    #[arg(long)]
    pub customer_name: Option<String>,

    /// light, medium, heavy or extra_heavy
    #[arg(long)]
    pub truck_type: Option<TruckType>,

    #[arg(long)]
    pub truck_value: Option<f64>,

    #[arg(long)]
    pub annual_distance: Option<f64>,

    #[arg(long)]
    pub operation_years: Option<i32>,

    #[arg(long)]
    pub fuel_price: Option<f64>,

    /// Distance per volume unit, overrides the truck profile
    #[arg(long)]
    pub fuel_efficiency: Option<f64>,

    /// yes/no
    #[arg(long, value_parser = BoolishValueParser::new())]
    pub financing: Option<bool>,

    #[arg(long)]
    pub loan_amount: Option<f64>,

    /// Annual fraction, e.g. 0.12
    #[arg(long)]
    pub interest_rate: Option<f64>,

    #[arg(long)]
    pub toll_cost: Option<f64>,

    #[arg(long)]
    pub license_cost: Option<f64>,

    #[arg(long)]
    pub other_costs: Option<f64>,
}

impl FieldArgs {
    /// Copies every given flag onto `input`. Returns whether anything changed.
    pub fn apply_to(&self, input: &mut InputRecord) -> bool {
        let before = input.clone();

        if let Some(name) = &self.customer_name {
            input.customer_name = name.clone();
        }
        if let Some(truck_type) = self.truck_type {
            input.truck_type = truck_type.key().to_string();
        }
        if let Some(financing) = self.financing {
            input.has_financing = financing;
        }
        if let Some(years) = self.operation_years {
            input.operation_years = Some(years);
        }

        let amounts = [
            (self.truck_value, &mut input.truck_value),
            (self.annual_distance, &mut input.annual_distance),
            (self.fuel_price, &mut input.fuel_price),
            (self.fuel_efficiency, &mut input.custom_fuel_efficiency),
            (self.loan_amount, &mut input.loan_amount),
            (self.interest_rate, &mut input.interest_rate),
            (self.toll_cost, &mut input.toll_cost_per_distance),
            (self.license_cost, &mut input.annual_license_cost),
            (self.other_costs, &mut input.other_annual_costs),
        ];
        for (flag, slot) in amounts {
            if let Some(value) = flag {
                *slot = Some(value);
            }
        }

        *input != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_calculate_flags() {
        let cli = Cli::parse_from([
            "tco",
            "calculate",
            "--customer-name",
            "Fletes Norte",
            "--truck-type",
            "pesado",
            "--financing",
            "yes",
            "--toll-cost",
            "0",
            "--save",
            "-f",
            "json",
        ]);

        assert_eq!(cli.format, OutputFormat::Json);
        let Commands::Calculate { fields, save } = cli.command else {
            panic!("expected calculate");
        };
        assert!(save);

        let mut input = InputRecord::form_defaults();
        assert!(fields.apply_to(&mut input));
        assert_eq!(input.customer_name, "Fletes Norte");
        assert_eq!(input.truck_type, "heavy");
        assert!(input.has_financing);
        assert_eq!(input.toll_cost_per_distance, Some(0.0));
        assert_eq!(input.truck_value, Some(800_000.0));
    }

    #[test]
    fn test_no_flags_changes_nothing() {
        let mut input = InputRecord::form_defaults();
        assert!(!FieldArgs::default().apply_to(&mut input));
        assert_eq!(input, InputRecord::form_defaults());
    }

    #[test]
    fn test_unknown_truck_type_is_rejected() {
        assert!(Cli::try_parse_from(["tco", "calculate", "--truck-type", "monster"]).is_err());
    }

    #[test]
    fn test_compare_flags_conflict() {
        assert!(Cli::try_parse_from(["tco", "compare", "--types", "--ids", "abc"]).is_err());

        let cli = Cli::parse_from(["tco", "compare", "--ids", "abc", "def"]);
        let Commands::Compare { types, ids } = cli.command else {
            panic!("expected compare");
        };
        assert!(!types);
        assert_eq!(ids, ["abc", "def"]);
    }
}
