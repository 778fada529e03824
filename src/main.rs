//! blep-bot - prefix commands and regex triggers over a line gateway.
//!
//! Startup is two-phase: every command and trigger is registered, the
//! registry is frozen, and only then does the gateway start dispatching.

mod commands;
mod config;
mod network;
mod store;
mod telemetry;
mod triggers;

use crate::config::Config;
use crate::network::Gateway;
use crate::store::Stores;
use blep_dispatch::{Prefix, RegistryBuilder};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let mut config = Config::load(&config_path)
        .map_err(|e| anyhow::anyhow!("failed to load {config_path}: {e}"))?;
    let overridden = config.apply_env_overrides();

    // Initialize tracing
    telemetry::init_tracing(config.logging.format);
    if overridden {
        info!(prefix = %config.bot.prefix, "Command prefix overridden from environment");
    }

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(path = %config_path, error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }

    info!(
        name = %config.bot.name,
        prefix = %config.bot.prefix,
        gateway = %config.gateway.address,
        "Starting blep-bot"
    );

    let stores = Stores::open(&config.storage).await?;

    // Registration phase
    let mut builder = RegistryBuilder::new();
    commands::register_all(&mut builder, &stores)?;
    triggers::register_all(&mut builder, &config.triggers)?;
    let registry = builder.freeze();

    let prefix = Prefix::new(&config.bot.prefix)?;
    let gateway = Gateway::bind(config.gateway.address, registry.clone(), prefix).await?;

    let result = tokio::select! {
        result = gateway.run() => result,
        () = shutdown_signal() => {
            info!("Shutdown signal received");
            Ok(())
        }
    };

    let hooks = registry.shutdown().await;
    info!(hooks, "blep-bot stopped");
    if let Err(ref e) = result {
        warn!(error = %e, "Gateway stopped with an error");
    }
    result
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
