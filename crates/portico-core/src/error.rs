// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Portico plugin host.

use thiserror::Error;

/// Failure to resolve a `(plugin, service)` pair in the plugin registry.
///
/// This is the only error a controller action can produce. It is returned
/// unchanged to the gateway, which turns it into an HTTP failure response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No plugin is registered under the requested name.
    #[error("plugin not found: {plugin}")]
    UnknownPlugin { plugin: String },

    /// The plugin exists but has been disabled by configuration.
    #[error("plugin is disabled: {plugin}")]
    PluginDisabled { plugin: String },

    /// The plugin exists but does not register the requested service.
    #[error("service not found: {plugin}/{service}")]
    UnknownService { plugin: String, service: String },
}

impl ResolutionError {
    /// Name of the plugin the failed lookup targeted.
    pub fn plugin(&self) -> &str {
        match self {
            ResolutionError::UnknownPlugin { plugin }
            | ResolutionError::PluginDisabled { plugin }
            | ResolutionError::UnknownService { plugin, .. } => plugin,
        }
    }
}

/// The primary error type used across the Portico workspace.
#[derive(Debug, Error)]
pub enum PorticoError {
    /// Configuration errors (invalid TOML, bad manifest, unknown route handler).
    #[error("configuration error: {0}")]
    Config(String),

    /// Registry lookup failed.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A plugin lifecycle hook failed.
    #[error("plugin {name} failed: {message}")]
    Plugin { name: String, message: String },

    /// HTTP server errors (bind failure, serve loop error).
    #[error("server error: {message}")]
    Server {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
