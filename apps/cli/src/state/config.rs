//! # Application Configuration
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. Defaults            AppConfig::default()                            │
//! │  2. Config file         <config dir>/config.toml                        │
//! │  3. Environment         FLEET_TCO_DB_PATH      storage.database_path    │
//! │                         FLEET_TCO_EXPORT_DIR   export.output_dir        │
//! │                         FLEET_TCO_DEBOUNCE_MS  calculator.debounce_ms   │
//! │                         FLEET_TCO_COMPANY_NAME branding.company_name    │
//! │                         FLEET_TCO_CURRENCY_SYMBOL                       │
//! │                                                branding.currency_symbol │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example File
//! ```toml
//! [storage]
//! database_path = "/var/lib/fleet-tco/fleet-tco.db"
//!
//! [export]
//! output_dir = "/home/me/reports"
//!
//! [calculator]
//! debounce_ms = 300
//!
//! [branding]
//! company_name = "ACME LOGISTICS"
//! currency_symbol = "$"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tco_report::ReportOptions;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "fleet-tco.db";

/// Upper bound for the recompute debounce.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

// =============================================================================
// Sections
// =============================================================================

/// Where the SQLite file lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Defaults to `<data dir>/fleet-tco.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

/// Where exported files are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorSettings {
    /// Quiet period after the last edit before recomputing.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How often `interactive` checks for edits made by other processes.
    #[serde(default = "default_watch_interval_ms")]
    pub watch_interval_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_watch_interval_ms() -> u64 {
    1000
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        CalculatorSettings {
            debounce_ms: default_debounce_ms(),
            watch_interval_ms: default_watch_interval_ms(),
        }
    }
}

/// Text printed on reports and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandingSettings {
    #[serde(default = "default_company_name")]
    pub company_name: String,

    #[serde(default = "default_report_subtitle")]
    pub report_subtitle: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_company_name() -> String {
    "FLEET TCO".to_string()
}

fn default_report_subtitle() -> String {
    "Total Cost of Ownership Calculator".to_string()
}

fn default_currency_symbol() -> String {
    tco_core::format::DEFAULT_CURRENCY_SYMBOL.to_string()
}

impl Default for BrandingSettings {
    fn default() -> Self {
        BrandingSettings {
            company_name: default_company_name(),
            report_subtitle: default_report_subtitle(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub export: ExportSettings,

    #[serde(default)]
    pub calculator: CalculatorSettings,

    #[serde(default)]
    pub branding: BrandingSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents =
                    std::fs::read_to_string(&path).map_err(|e| AppError::config_io(&path, e))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns the defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Writes the config as TOML and returns the path written.
    pub fn save(&self, config_path: Option<PathBuf>) -> AppResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(AppError::NoProjectDir("config"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::config_io(parent, e))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| AppError::config_io(&path, e))?;

        info!(?path, "Config saved");
        Ok(path)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.calculator.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(AppError::InvalidConfig(format!(
                "calculator.debounce_ms must be at most {}, got {}",
                MAX_DEBOUNCE_MS, self.calculator.debounce_ms
            )));
        }

        if self.calculator.watch_interval_ms == 0 {
            return Err(AppError::InvalidConfig(
                "calculator.watch_interval_ms must be greater than 0".into(),
            ));
        }

        if self.branding.currency_symbol.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "branding.currency_symbol must not be empty".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies `FLEET_TCO_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("FLEET_TCO_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(dir) = lookup("FLEET_TCO_EXPORT_DIR") {
            self.export.output_dir = Some(PathBuf::from(dir));
        }

        if let Some(ms) = lookup("FLEET_TCO_DEBOUNCE_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => self.calculator.debounce_ms = ms,
                Err(_) => warn!(value = %ms, "Ignoring non-numeric FLEET_TCO_DEBOUNCE_MS"),
            }
        }

        if let Some(name) = lookup("FLEET_TCO_COMPANY_NAME") {
            self.branding.company_name = name;
        }

        if let Some(symbol) = lookup("FLEET_TCO_CURRENCY_SYMBOL") {
            self.branding.currency_symbol = symbol;
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "fleettco", "fleet-tco")
    }

    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Resolved Values
    // =========================================================================

    /// The database file: the configured path or `<data dir>/fleet-tco.db`.
    pub fn resolved_database_path(&self) -> AppResult<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()
                .ok_or(AppError::NoProjectDir("data"))?
                .data_dir()
                .join(DATABASE_FILE)),
        }
    }

    /// Like [`Self::resolved_database_path`], creating the directory if needed.
    pub fn database_path(&self) -> AppResult<PathBuf> {
        let path = self.resolved_database_path()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        Ok(path)
    }

    /// Directory for exported files. `override_dir` wins over the config.
    pub fn export_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| self.export.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.calculator.debounce_ms)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.calculator.watch_interval_ms)
    }

    /// Report layout options carrying this config's branding.
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            company_name: self.branding.company_name.clone(),
            subtitle: self.branding.report_subtitle.clone(),
            currency_symbol: self.branding.currency_symbol.clone(),
            ..ReportOptions::default()
        }
    }
}
