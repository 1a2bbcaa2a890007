//! Horizon desktop client
//!
//! Loads configuration, restores the saved session, starts the orchestrator
//! and opens the window.

use anyhow::{Context, Result};
use horizon::{ApiClient, HorizonConfig, Orchestrator, SessionStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "horizon=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Horizon voice assistant");

    let config = HorizonConfig::load().context("failed to load configuration")?;
    info!("Using API at {}", config.api_base_url);

    let api = ApiClient::from_config(&config).context("failed to build HTTP client")?;
    let store = match SessionStore::default_location() {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("Sessions will not be saved: {}", e);
            None
        }
    };

    let (orchestrator, handle) = Orchestrator::new(config.clone(), Arc::new(api), store)
        .context("failed to create orchestrator")?;
    let threads = orchestrator.start().context("failed to start orchestrator")?;

    let shutdown = handle.command_sender();
    let result = horizon::ui::run(&config, handle);

    // The window may close without on_exit having run
    let _ = shutdown.send(horizon::AppCommand::Shutdown);
    for thread in threads {
        if thread.join().is_err() {
            error!("Orchestrator thread panicked");
        }
    }

    result.map_err(|e| anyhow::anyhow!("window error: {}", e))?;
    info!("Horizon exited");
    Ok(())
}
