// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Controllers and the table that binds them to route handler names.
//!
//! A controller action takes the per-request [`RequestContext`] and writes
//! the response body. Actions never touch the registry directly; they get
//! their service through a [`ServiceSource`].

use std::collections::HashMap;
use std::sync::Arc;

use portico_core::{
    RequestContext, ResolutionError, ServiceHandle, WELCOME_PLUGIN, WELCOME_SERVICE,
};
use portico_plugin::{PluginRegistry, PluginStatus};

/// Where a controller gets its welcome service from.
pub trait ServiceSource: Send + Sync + 'static {
    /// Produce the service, or explain why it cannot be found.
    fn welcome_service(&self) -> Result<ServiceHandle, ResolutionError>;
}

/// A directly injected service always resolves.
impl ServiceSource for ServiceHandle {
    fn welcome_service(&self) -> Result<ServiceHandle, ResolutionError> {
        Ok(Arc::clone(self))
    }
}

/// Resolves `(plugin, service)` against the registry on every call.
#[derive(Debug, Clone)]
pub struct RegistryBinding {
    registry: Arc<PluginRegistry>,
    plugin: String,
    service: String,
}

impl RegistryBinding {
    pub fn new(
        registry: Arc<PluginRegistry>,
        plugin: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            plugin: plugin.into(),
            service: service.into(),
        }
    }
}

impl ServiceSource for RegistryBinding {
    fn welcome_service(&self) -> Result<ServiceHandle, ResolutionError> {
        self.registry.resolve(&self.plugin, &self.service)
    }
}

/// Serves the welcome message produced by a [`WelcomeService`](portico_core::WelcomeService).
#[derive(Clone)]
pub struct WelcomeController {
    source: Arc<dyn ServiceSource>,
}

impl WelcomeController {
    /// Controller bound to an already constructed service.
    pub fn new(service: ServiceHandle) -> Self {
        Self::with_source(service)
    }

    /// Controller backed by any service source.
    pub fn with_source(source: impl ServiceSource) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Resolve the service once, now, and bind the controller to it.
    pub fn from_registry(
        registry: &PluginRegistry,
        plugin: &str,
        service: &str,
    ) -> Result<Self, ResolutionError> {
        registry.resolve(plugin, service).map(Self::new)
    }

    /// Resolve the service from the registry on every request.
    pub fn late_bound(
        registry: Arc<PluginRegistry>,
        plugin: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self::with_source(RegistryBinding::new(registry, plugin, service))
    }

    /// Write the welcome message to the response body.
    ///
    /// The message is copied verbatim. On a resolution failure the body is
    /// left untouched and the error is returned as-is.
    pub fn index(&self, ctx: &mut RequestContext) -> Result<(), ResolutionError> {
        let service = self.source.welcome_service()?;
        ctx.set_body(service.welcome_message());
        Ok(())
    }
}

impl std::fmt::Debug for WelcomeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WelcomeController").finish_non_exhaustive()
    }
}

/// A bound controller action.
pub type Action = Arc<dyn Fn(&mut RequestContext) -> Result<(), ResolutionError> + Send + Sync>;

/// Maps `(plugin, "controller.action")` to the action that serves it.
#[derive(Default, Clone)]
pub struct ControllerTable {
    actions: HashMap<String, HashMap<String, Action>>,
}

impl ControllerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controllers for the built-in plugins that are enabled in `registry`.
    ///
    /// Services are resolved here, once, so a misconfigured registry fails at
    /// startup rather than on the first request.
    pub fn builtin(registry: &PluginRegistry) -> Result<Self, ResolutionError> {
        let mut table = Self::new();
        let welcome_enabled = registry
            .get(WELCOME_PLUGIN)
            .is_some_and(|e| e.status == PluginStatus::Enabled);
        if welcome_enabled {
            let controller =
                WelcomeController::from_registry(registry, WELCOME_PLUGIN, WELCOME_SERVICE)?;
            table.insert_welcome(WELCOME_PLUGIN, controller);
        }
        Ok(table)
    }

    /// Bind `controller.index` of `plugin` to the welcome controller.
    pub fn insert_welcome(&mut self, plugin: &str, controller: WelcomeController) {
        self.insert(
            plugin,
            "controller.index",
            Arc::new(move |ctx: &mut RequestContext| controller.index(ctx)),
        );
    }

    /// Bind an action to a plugin handler name.
    pub fn insert(&mut self, plugin: &str, handler: &str, action: Action) {
        self.actions
            .entry(plugin.to_string())
            .or_default()
            .insert(handler.to_string(), action);
    }

    /// Look up the action for a plugin handler name.
    pub fn get(&self, plugin: &str, handler: &str) -> Option<Action> {
        self.actions.get(plugin)?.get(handler).cloned()
    }

    /// Number of bound actions across all plugins.
    pub fn len(&self) -> usize {
        self.actions.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ControllerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut bound: Vec<String> = self
            .actions
            .iter()
            .flat_map(|(plugin, handlers)| handlers.keys().map(move |h| format!("{plugin}:{h}")))
            .collect();
        bound.sort();
        f.debug_struct("ControllerTable").field("actions", &bound).finish()
    }
}
