// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in plugins compiled into the Portico binary.

use std::sync::Arc;

use async_trait::async_trait;
use portico_core::{PorticoError, WelcomeService, DEFAULT_WELCOME_MESSAGE, WELCOME_SERVICE};
use tracing::debug;

use crate::catalog::welcome_manifest;
use crate::lifecycle::{Plugin, ServiceTable};
use crate::manifest::PluginManifest;

/// Welcome service that always returns the same configured message.
#[derive(Debug, Clone)]
pub struct StaticWelcomeService {
    message: String,
}

impl StaticWelcomeService {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for StaticWelcomeService {
    fn default() -> Self {
        Self::new(DEFAULT_WELCOME_MESSAGE)
    }
}

impl WelcomeService for StaticWelcomeService {
    fn welcome_message(&self) -> String {
        self.message.clone()
    }
}

/// The `my-plugin` plugin: one service, one route.
#[derive(Debug, Clone)]
pub struct WelcomePlugin {
    manifest: PluginManifest,
    message: String,
}

impl WelcomePlugin {
    /// Create the plugin with the greeting its service will return.
    ///
    /// Fails only if the embedded manifest does not parse.
    pub fn new(message: impl Into<String>) -> Result<Self, PorticoError> {
        Ok(Self {
            manifest: welcome_manifest()?,
            message: message.into(),
        })
    }
}

#[async_trait]
impl Plugin for WelcomePlugin {
    fn manifest(&self) -> PluginManifest {
        self.manifest.clone()
    }

    fn register(&self, services: &mut ServiceTable) {
        services.insert(
            WELCOME_SERVICE,
            Arc::new(StaticWelcomeService::new(self.message.clone())),
        );
    }

    async fn bootstrap(&self) -> Result<(), PorticoError> {
        debug!(message_len = self.message.len(), "welcome plugin bootstrapped");
        Ok(())
    }
}

/// Instantiate every built-in plugin.
pub fn builtin_plugins(welcome_message: &str) -> Result<Vec<Box<dyn Plugin>>, PorticoError> {
    Ok(vec![Box::new(WelcomePlugin::new(welcome_message)?)])
}
