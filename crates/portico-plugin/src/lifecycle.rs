// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin lifecycle trait and the service table plugins register into.

use std::collections::HashMap;

use async_trait::async_trait;
use portico_core::{PorticoError, ServiceHandle};

use crate::manifest::PluginManifest;

/// Services contributed by a single plugin, keyed by service identifier.
#[derive(Default, Clone)]
pub struct ServiceTable {
    services: HashMap<String, ServiceHandle>,
}

impl ServiceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service, replacing any previous service with the same id.
    pub fn insert(&mut self, id: impl Into<String>, service: ServiceHandle) {
        self.services.insert(id.into(), service);
    }

    /// Look up a service by id.
    pub fn get(&self, id: &str) -> Option<&ServiceHandle> {
        self.services.get(id)
    }

    /// Registered service ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.services.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl std::fmt::Debug for ServiceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceTable")
            .field("services", &self.ids())
            .finish()
    }
}

/// A compiled-in plugin.
///
/// `register` runs once when the plugin is added to the registry. `bootstrap`
/// runs after every plugin has registered and before the gateway starts
/// serving; `destroy` runs after the gateway has drained.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// Manifest describing the plugin, its services and its routes.
    fn manifest(&self) -> PluginManifest;

    /// Register the plugin's services.
    fn register(&self, services: &mut ServiceTable);

    /// Called once before the gateway accepts requests.
    async fn bootstrap(&self) -> Result<(), PorticoError> {
        Ok(())
    }

    /// Called once during shutdown.
    async fn destroy(&self) -> Result<(), PorticoError> {
        Ok(())
    }
}
