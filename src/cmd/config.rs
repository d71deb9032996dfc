//! Configuration view and initialization commands: `marketlens config`.

use anyhow::Result;
use console::style;
use std::path::Path;

use super::super::ConfigCommands;
use marketlens::config::{
    CONFIG_FILE_NAME, ConfigFile, ENV_API_URL, ENV_STORAGE_DIR, ENV_TIMEOUT_SECS, Settings,
};

pub fn cmd_config(
    settings: &Settings,
    config_path: Option<&Path>,
    command: Option<ConfigCommands>,
    json: bool,
) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Settings::default_config_path);

    match command {
        None | Some(ConfigCommands::Show) => {
            let warnings = settings.validate();
            if json {
                let out = serde_json::json!({
                    "config_file": config_path,
                    "config_file_exists": config_path.exists(),
                    "settings": settings,
                    "warnings": warnings,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            println!();
            println!("{}", style("MarketLens Configuration").bold().cyan());
            println!();
            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No {} found at {}", CONFIG_FILE_NAME, config_path.display());
                println!("Using defaults. Run 'marketlens config init' to create one.");
            }
            println!();
            println!("Effective values (with env/CLI overrides):");
            println!("  api.base_url     = \"{}\"", settings.base_url);
            println!("  api.timeout_secs = {}", settings.timeout_secs);
            println!("  api.max_retries  = {}", settings.max_retries);
            println!("  storage.dir      = \"{}\"", settings.storage_dir.display());
            println!();
            println!(
                "Environment overrides: {}, {}, {}",
                ENV_API_URL, ENV_TIMEOUT_SECS, ENV_STORAGE_DIR
            );

            if !warnings.is_empty() {
                println!();
                println!("{}", style("Configuration warnings:").yellow());
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("{} already exists at {}", CONFIG_FILE_NAME, config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            ConfigFile::default().save(&config_path)?;

            println!("Created {} at {}", CONFIG_FILE_NAME, config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, timeout_secs, max_retries");
            println!("  - [storage] dir");
            println!();
        }
    }

    Ok(())
}
