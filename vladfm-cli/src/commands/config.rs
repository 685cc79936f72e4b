//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use vladfm_core::FeedSort;
use vladfm_store::{ClientConfig, default_config_dir, default_config_path};

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set the backend base URL.
    BaseUrl {
        /// Base URL, e.g. https://vlad.fm/api.
        url: String,
    },

    /// Set the name used for comments. Omit to sign as "anonymous".
    Author {
        /// Display name.
        name: Option<String>,
    },

    /// Set the default feed sort.
    Sort {
        /// Sort mode: new, top or discussed.
        sort: FeedSort,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::BaseUrl { url } => {
            update(|config| config.base_url.clone_from(url)).await
        }
        ConfigAction::Author { name } => {
            update(|config| config.author_name.clone_from(name)).await
        }
        ConfigAction::Sort { sort } => update(|config| config.default_sort = *sort).await,
        ConfigAction::Reset => reset_config().await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let config = ClientConfig::load().await?;

    match cli.format {
        OutputFormat::Text => {
            println!("vladFM Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Base URL:     {}", config.base_url);
            println!("Timeout:      {}s", config.timeout_secs);
            println!("Attempts:     {}", config.retry_attempts);
            println!("Default sort: {}", config.default_sort);
            println!("Author:       {}", config.author_or_anonymous());
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&config)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_path = default_config_path();
    let identity_path = config_dir.join(vladfm_store::IDENTITY_KEY);

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Config file:   {}", config_path.display());
            println!("Fingerprint:   {}", identity_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "configDir": config_dir.display().to_string(),
                "configFile": config_path.display().to_string(),
                "fingerprint": identity_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn update(change: impl FnOnce(&mut ClientConfig)) -> Result<()> {
    let mut config = ClientConfig::load().await?;
    change(&mut config);
    config.save().await?;
    println!("Configuration saved to {}", default_config_path().display());
    Ok(())
}

async fn reset_config() -> Result<()> {
    ClientConfig::default().save().await?;
    println!("Configuration reset to defaults");
    Ok(())
}
