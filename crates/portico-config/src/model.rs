// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Portico plugin host.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::collections::HashMap;

use portico_core::{ResponseFormat, DEFAULT_WELCOME_MESSAGE};
use serde::{Deserialize, Serialize};

/// Top-level Portico configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PorticoConfig {
    /// HTTP server and logging settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Built-in welcome plugin settings.
    #[serde(default)]
    pub welcome: WelcomeConfig,

    /// Per-plugin enable/disable overrides, keyed by plugin name.
    /// Plugins not listed here are enabled.
    #[serde(default)]
    pub plugins: HashMap<String, bool>,
}

impl PorticoConfig {
    /// Whether the named plugin is enabled by configuration.
    pub fn plugin_enabled(&self, name: &str) -> bool {
        self.plugins.get(name).copied().unwrap_or(true)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    1337
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Welcome plugin configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WelcomeConfig {
    /// Greeting returned by the welcome service. May be empty.
    #[serde(default = "default_welcome_message")]
    pub message: String,

    /// Wire format of string response bodies.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            message: default_welcome_message(),
            response_format: ResponseFormat::default(),
        }
    }
}

fn default_welcome_message() -> String {
    DEFAULT_WELCOME_MESSAGE.to_string()
}
