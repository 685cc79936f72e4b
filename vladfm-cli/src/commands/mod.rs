//! CLI command implementations.

pub mod comment;
pub mod config;
pub mod feed;
pub mod identity;
pub mod post;
pub mod site;
pub mod user;
pub mod vote;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::info;
use vladfm_fetch::{ApiGateway, HttpGateway, MemoryGateway, RetryPolicy};
use vladfm_store::{
    AppState, ClientConfig, FileIdentityStorage, IDENTITY_KEY, IdentityStorage,
    MemoryIdentityStorage,
};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

// ============================================================================
// Session
// ============================================================================

/// Everything a command needs to talk to the backend.
pub struct Session {
    /// Client state.
    pub state: AppState,
    /// Gateway the stores share.
    pub gateway: Arc<dyn ApiGateway>,
    /// Retry policy for idempotent reads.
    pub retry: RetryPolicy,
    /// Where the fingerprint is stored, `None` when in memory.
    pub identity_path: Option<PathBuf>,
}

/// Loads the config file and applies command-line overrides.
pub async fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::load().await?;
    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    config.validate()?;
    Ok(config)
}

/// Builds the session for this invocation.
pub async fn open_session(cli: &Cli) -> Result<Session> {
    let config = load_config(cli).await?;
    Session::build(cli, config)
}

impl Session {
    /// Wires gateway, identity storage and stores according to the flags.
    pub fn build(cli: &Cli, config: ClientConfig) -> Result<Self> {
        let gateway: Arc<dyn ApiGateway> = if cli.offline {
            info!("Using built-in demo data");
            Arc::new(MemoryGateway::with_demo_data())
        } else {
            info!(base_url = %config.base_url, "Using backend");
            Arc::new(HttpGateway::new(&config.gateway_settings())?)
        };

        let (storage, identity_path): (Arc<dyn IdentityStorage>, Option<PathBuf>) = if cli.ephemeral {
            (Arc::new(MemoryIdentityStorage::new()), None)
        } else {
            let storage = FileIdentityStorage::default_location();
            let path = storage.dir().join(IDENTITY_KEY);
            (Arc::new(storage), Some(path))
        };

        let retry = config.retry_policy();
        let state = AppState::new(config, Arc::clone(&gateway), storage);
        Ok(Self {
            state,
            retry,
            gateway,
            identity_path,
        })
    }
}

// ============================================================================
// Output
// ============================================================================

/// Prints either the text rendering or the JSON document.
pub fn emit<T: Serialize>(cli: &Cli, text: impl FnOnce(&TextFormatter) -> String, json: &T) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", text(&formatter));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(json)?);
        }
    }
    Ok(())
}
