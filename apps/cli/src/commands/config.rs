//! # Config Commands
//!
//! `config show` prints the effective configuration (file + environment);
//! `config init` writes the defaults to the config file.

use std::path::PathBuf;

use tracing::info;

use crate::cli::{ConfigCommand, OutputFormat};
use crate::error::{AppError, AppResult};
use crate::state::AppConfig;

pub fn run(
    config: &AppConfig,
    config_path: Option<PathBuf>,
    format: OutputFormat,
    command: ConfigCommand,
) -> AppResult<()> {
    match command {
        ConfigCommand::Show => show(config, config_path, format),
        ConfigCommand::Init { force } => {
            let path = init(config_path, force)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn show(config: &AppConfig, config_path: Option<PathBuf>, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Table => {
            let path = config_path.or_else(AppConfig::default_config_path);
            match path {
                Some(path) => println!("# {}", path.display()),
                None => println!("# (no config directory)"),
            }
            if let Ok(db) = config.resolved_database_path() {
                println!("# database: {}", db.display());
            }
            print!("{}", toml::to_string_pretty(config)?);
        }
    }
    Ok(())
}

/// Writes `AppConfig::default()` and returns the path written.
///
/// An existing file is kept unless `force` is set.
pub fn init(config_path: Option<PathBuf>, force: bool) -> AppResult<PathBuf> {
    let path = config_path
        .or_else(AppConfig::default_config_path)
        .ok_or(AppError::NoProjectDir("config"))?;

    if path.exists() && !force {
        return Err(AppError::InvalidConfig(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    info!(?path, "Writing default config");
    AppConfig::default().save(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = std::env::temp_dir().join(format!("tco-config-init-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(init(Some(path.clone()), false).unwrap(), path);
        assert!(matches!(
            init(Some(path.clone()), false),
            Err(AppError::InvalidConfig(_))
        ));
        assert!(init(Some(path.clone()), true).is_ok());

        let loaded = AppConfig::load(Some(path)).unwrap();
        assert_eq!(loaded.branding, AppConfig::default().branding);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
