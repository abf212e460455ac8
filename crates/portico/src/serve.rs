// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `portico serve` command implementation.
//!
//! Builds the plugin registry from the compiled-in plugins, bootstraps the
//! enabled ones, mounts their routes on the gateway and serves until a
//! shutdown signal arrives. Plugins are torn down after the server drains.

use std::time::Instant;

use axum::Router;
use portico_config::PorticoConfig;
use portico_core::PorticoError;
use portico_gateway::{build_router, start_server, ControllerTable, HealthState, ServerConfig};
use portico_plugin::{builtin_plugins, PluginRegistry, PluginStatus};
use tracing::{info, warn};

use crate::shutdown;

/// Initializes the plugin registry with the compiled-in plugins.
///
/// Each plugin is registered with a status taken from the `[plugins]`
/// overrides. Plugins not mentioned there are enabled.
fn initialize_plugin_registry(config: &PorticoConfig) -> Result<PluginRegistry, PorticoError> {
    let mut registry = PluginRegistry::new();

    for plugin in builtin_plugins(&config.welcome.message)? {
        let name = plugin.manifest().name;
        let status = if config.plugin_enabled(&name) {
            PluginStatus::Enabled
        } else {
            PluginStatus::Disabled
        };
        registry.register_with_status(plugin, status);
    }

    info!(
        count = registry.len(),
        enabled = registry.enabled().len(),
        "plugin registry initialized"
    );
    Ok(registry)
}

fn host_version() -> Result<semver::Version, PorticoError> {
    semver::Version::parse(env!("CARGO_PKG_VERSION"))
        .map_err(|e| PorticoError::Internal(format!("invalid host version: {e}")))
}

/// Register, check and bootstrap the plugins.
///
/// If a bootstrap fails, plugins that already came up are destroyed before
/// the error is returned.
async fn start_plugins(config: &PorticoConfig) -> Result<PluginRegistry, PorticoError> {
    let mut registry = initialize_plugin_registry(config)?;
    registry.check_compatibility(&host_version()?)?;

    if let Err(e) = registry.bootstrap_all().await {
        registry.destroy_all().await;
        return Err(e);
    }
    Ok(registry)
}

/// Bind controllers to the enabled plugins and build the gateway router.
fn gateway_router(registry: &PluginRegistry, config: &PorticoConfig) -> Result<Router, PorticoError> {
    let controllers = ControllerTable::builtin(registry)?;
    let health = HealthState {
        start_time: Instant::now(),
        plugins: registry.enabled().len(),
    };
    build_router(registry, &controllers, config.welcome.response_format, health)
}

/// Runs the `portico serve` command.
pub async fn run_serve(config: PorticoConfig) -> Result<(), PorticoError> {
    init_tracing(&config.server.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "starting portico serve");

    let registry = start_plugins(&config).await?;
    let app = match gateway_router(&registry, &config) {
        Ok(app) => app,
        Err(e) => {
            registry.destroy_all().await;
            return Err(e);
        }
    };

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let cancel = shutdown::install_signal_handler();
    let result = start_server(&server_config, app, cancel.clone().cancelled_owned()).await;
    cancel.cancel();

    let failures = registry.destroy_all().await;
    if failures > 0 {
        warn!(failures, "some plugins failed to shut down cleanly");
    }
    info!("portico stopped");
    result
}

/// Default filter directives when `RUST_LOG` is unset.
fn default_filter(log_level: &str) -> String {
    format!("portico={log_level},tower_http={log_level},warn")
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
