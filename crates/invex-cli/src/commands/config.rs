//! `invex config`: read and edit the extraction and batch settings file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use tracing::debug;

use invex_core::InvexConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print every setting as `key = value`
    Show {
        /// Print the settings file as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Write a settings file holding the defaults
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one setting, e.g. "extraction.total_keyword_window"
    Get { key: String },

    /// Change one setting; the value is parsed as the setting's type
    Set { key: String, value: String },

    /// Print where the settings file lives
    Path,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(default_config_path);
    debug!("Settings file {}", path.display());

    match args.command {
        ConfigCommand::Show { json } => show(&path, json),
        ConfigCommand::Init { force } => init(&path, force),
        ConfigCommand::Get { key } => {
            println!("{}", read_or_default(&path)?.get(&key)?);
            Ok(())
        }
        ConfigCommand::Set { key, value } => set(&path, &key, &value),
        ConfigCommand::Path => path_status(&path),
    }
}

/// `invex/config.json` under the platform config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invex")
        .join("config.json")
}

fn read_or_default(path: &Path) -> anyhow::Result<InvexConfig> {
    if path.exists() {
        Ok(InvexConfig::from_file(path)?)
    } else {
        Ok(InvexConfig::default())
    }
}

fn save(config: &InvexConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn show(path: &Path, json: bool) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!(
            "{} {} does not exist, showing defaults",
            style("ℹ").blue(),
            path.display()
        );
    }
    let config = read_or_default(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    for key in InvexConfig::KEYS {
        println!("{} = {}", key, config.get(key)?);
    }
    Ok(())
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (pass --force to replace it)", path.display());
    }

    save(&InvexConfig::default(), path)?;
    println!("{} Wrote default settings to {}", style("✓").green(), path.display());
    Ok(())
}

fn set(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = read_or_default(path)?;
    config.set(key, value)?;
    save(&config, path)?;

    println!("{} {} = {}", style("✓").green(), key, config.get(key)?);
    Ok(())
}

fn path_status(path: &Path) -> anyhow::Result<()> {
    let status = if path.exists() {
        style("present").green()
    } else {
        style("missing, run 'invex config init'").yellow()
    };
    println!("{} ({})", path.display(), status);
    Ok(())
}
