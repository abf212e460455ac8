// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry for compiled-in plugins.
//!
//! The `PluginRegistry` stores `PluginEntry` records keyed by plugin name.
//! Each entry holds the plugin's manifest, its status, the plugin itself
//! (for lifecycle hooks) and the services it registered. Controllers reach
//! services through [`PluginRegistry::resolve`].

use std::collections::HashMap;

use portico_core::{PorticoError, ResolutionError, ServiceHandle};
use tracing::{debug, error, info, warn};

use crate::lifecycle::{Plugin, ServiceTable};
use crate::manifest::PluginManifest;

/// Status of a plugin in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginStatus {
    /// Plugin is active: its routes are mounted and its services resolve.
    Enabled,
    /// Plugin is explicitly disabled by configuration.
    Disabled,
}

impl std::fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginStatus::Enabled => write!(f, "enabled"),
            PluginStatus::Disabled => write!(f, "disabled"),
        }
    }
}

/// A single entry in the plugin registry.
pub struct PluginEntry {
    /// Plugin manifest with metadata.
    pub manifest: PluginManifest,
    /// Current status of the plugin.
    pub status: PluginStatus,
    /// Services registered by the plugin.
    pub services: ServiceTable,
    plugin: Box<dyn Plugin>,
    bootstrapped: bool,
}

impl PluginEntry {
    /// Whether `bootstrap` has completed for this plugin.
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("manifest", &self.manifest)
            .field("status", &self.status)
            .field("services", &self.services)
            .field("bootstrapped", &self.bootstrapped)
            .finish()
    }
}

/// Registry of compiled-in plugins.
///
/// Built and bootstrapped at startup, then shared read-only behind an `Arc`.
pub struct PluginRegistry {
    entries: HashMap<String, PluginEntry>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a plugin with default status `Enabled`.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        self.register_with_status(plugin, PluginStatus::Enabled);
    }

    /// Register a plugin with an explicit status.
    ///
    /// Runs the plugin's `register` hook to collect its services. A plugin
    /// registered under a name that is already taken replaces the old entry.
    pub fn register_with_status(&mut self, plugin: Box<dyn Plugin>, status: PluginStatus) {
        let manifest = plugin.manifest();
        let mut services = ServiceTable::new();
        plugin.register(&mut services);

        for declared in &manifest.services {
            if services.get(declared).is_none() {
                warn!(
                    plugin = %manifest.name,
                    service = %declared,
                    "manifest declares a service the plugin did not register"
                );
            }
        }

        debug!(
            plugin = %manifest.name,
            %status,
            services = services.len(),
            "plugin registered"
        );

        let name = manifest.name.clone();
        let previous = self.entries.insert(
            name.clone(),
            PluginEntry {
                manifest,
                status,
                services,
                plugin,
                bootstrapped: false,
            },
        );
        if previous.is_some() {
            warn!(plugin = %name, "plugin registered twice, replacing earlier entry");
        }
    }

    /// Resolve a service handle by plugin and service identifier.
    pub fn resolve(&self, plugin_id: &str, service_id: &str) -> Result<ServiceHandle, ResolutionError> {
        let entry = self
            .entries
            .get(plugin_id)
            .ok_or_else(|| ResolutionError::UnknownPlugin {
                plugin: plugin_id.to_string(),
            })?;

        if entry.status == PluginStatus::Disabled {
            return Err(ResolutionError::PluginDisabled {
                plugin: plugin_id.to_string(),
            });
        }

        entry
            .services
            .get(service_id)
            .cloned()
            .ok_or_else(|| ResolutionError::UnknownService {
                plugin: plugin_id.to_string(),
                service: service_id.to_string(),
            })
    }

    /// Get a plugin entry by name.
    pub fn get(&self, name: &str) -> Option<&PluginEntry> {
        self.entries.get(name)
    }

    /// All enabled plugins, sorted by name.
    pub fn enabled(&self) -> Vec<&PluginEntry> {
        self.list_all()
            .into_iter()
            .filter(|e| e.status == PluginStatus::Enabled)
            .collect()
    }

    /// List all plugin entries, sorted by name.
    pub fn list_all(&self) -> Vec<&PluginEntry> {
        let mut entries: Vec<&PluginEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.manifest.name.cmp(&b.manifest.name));
        entries
    }

    /// Toggle a plugin's enabled status.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), PorticoError> {
        let entry = self.entries.get_mut(name).ok_or_else(|| {
            PorticoError::from(ResolutionError::UnknownPlugin {
                plugin: name.to_string(),
            })
        })?;
        entry.status = if enabled {
            PluginStatus::Enabled
        } else {
            PluginStatus::Disabled
        };
        Ok(())
    }

    /// Reject plugins that require a newer host than `host_version`.
    ///
    /// Disabled plugins are skipped.
    pub fn check_compatibility(&self, host_version: &semver::Version) -> Result<(), PorticoError> {
        for entry in self.enabled() {
            let Some(min) = &entry.manifest.min_portico_version else {
                continue;
            };
            let min = semver::Version::parse(min).map_err(|e| {
                PorticoError::Config(format!(
                    "plugin {}: min_portico_version '{min}' is not valid semver: {e}",
                    entry.manifest.name
                ))
            })?;
            if min > *host_version {
                return Err(PorticoError::Plugin {
                    name: entry.manifest.name.clone(),
                    message: format!("requires portico >= {min}, running {host_version}"),
                });
            }
        }
        Ok(())
    }

    /// Run `bootstrap` on every enabled plugin, in name order.
    ///
    /// Stops at the first failure. Plugins bootstrapped before the failure
    /// stay marked so that [`PluginRegistry::destroy_all`] still tears them down.
    pub async fn bootstrap_all(&mut self) -> Result<(), PorticoError> {
        let mut names: Vec<String> = self
            .entries
            .values()
            .filter(|e| e.status == PluginStatus::Enabled && !e.bootstrapped)
            .map(|e| e.manifest.name.clone())
            .collect();
        names.sort();

        for name in names {
            let Some(entry) = self.entries.get_mut(&name) else {
                continue;
            };
            entry.plugin.bootstrap().await.map_err(|e| {
                error!(plugin = %name, error = %e, "plugin bootstrap failed");
                match e {
                    err @ PorticoError::Plugin { .. } => err,
                    other => PorticoError::Plugin {
                        name: name.clone(),
                        message: other.to_string(),
                    },
                }
            })?;
            entry.bootstrapped = true;
            info!(plugin = %name, "plugin bootstrapped");
        }
        Ok(())
    }

    /// Run `destroy` on every bootstrapped plugin, in reverse name order.
    ///
    /// Failures are logged and do not stop the remaining plugins from being
    /// torn down. Returns the number of plugins whose `destroy` failed.
    pub async fn destroy_all(&self) -> usize {
        let mut bootstrapped: Vec<&PluginEntry> =
            self.entries.values().filter(|e| e.bootstrapped).collect();
        bootstrapped.sort_by(|a, b| b.manifest.name.cmp(&a.manifest.name));

        let mut failures = 0;
        for entry in bootstrapped {
            match entry.plugin.destroy().await {
                Ok(()) => debug!(plugin = %entry.manifest.name, "plugin destroyed"),
                Err(e) => {
                    failures += 1;
                    error!(plugin = %entry.manifest.name, error = %e, "plugin destroy failed");
                }
            }
        }
        failures
    }

    /// Returns the number of registered plugins.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.list_all())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use portico_core::WelcomeService;
    use tracing_test::traced_test;

    use super::*;
    use crate::builtin::WelcomePlugin;

    struct Fixed(&'static str);

    impl WelcomeService for Fixed {
        fn welcome_message(&self) -> String {
            self.0.to_string()
        }
    }

    /// Test plugin with configurable services and lifecycle outcomes.
    struct TestPlugin {
        name: &'static str,
        services: Vec<&'static str>,
        min_version: Option<&'static str>,
        fail_bootstrap: bool,
        fail_destroy: bool,
        destroyed: Arc<AtomicUsize>,
    }

    impl TestPlugin {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                services: vec!["service"],
                min_version: None,
                fail_bootstrap: false,
                fail_destroy: false,
                destroyed: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Plugin for TestPlugin {
        fn manifest(&self) -> PluginManifest {
            PluginManifest {
                name: self.name.to_string(),
                version: "0.1.0".to_string(),
                description: format!("Test plugin {}", self.name),
                author: None,
                min_portico_version: self.min_version.map(str::to_string),
                services: self.services.iter().map(|s| s.to_string()).collect(),
                routes: vec![],
            }
        }

        fn register(&self, services: &mut ServiceTable) {
            for id in &self.services {
                services.insert(*id, Arc::new(Fixed(self.name)));
            }
        }

        async fn bootstrap(&self) -> Result<(), PorticoError> {
            if self.fail_bootstrap {
                return Err(PorticoError::Internal("bootstrap exploded".into()));
            }
            Ok(())
        }

        async fn destroy(&self) -> Result<(), PorticoError> {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
            if self.fail_destroy {
                return Err(PorticoError::Internal("destroy exploded".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn register_and_resolve_roundtrip() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(WelcomePlugin::new("Welcome!").unwrap()));

        let entry = registry.get("my-plugin").unwrap();
        assert_eq!(entry.status, PluginStatus::Enabled);

        let service = registry.resolve("my-plugin", "service").unwrap();
        assert_eq!(service.welcome_message(), "Welcome!");
    }

    #[test]
    fn resolve_unknown_plugin() {
        let registry = PluginRegistry::new();
        let err = registry.resolve("my-plugin", "service").err().unwrap();
        assert_eq!(
            err,
            ResolutionError::UnknownPlugin {
                plugin: "my-plugin".into()
            }
        );
    }

    #[test]
    fn resolve_unknown_service() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(WelcomePlugin::new("Welcome!").unwrap()));
        let err = registry.resolve("my-plugin", "nope").err().unwrap();
        assert_eq!(
            err,
            ResolutionError::UnknownService {
                plugin: "my-plugin".into(),
                service: "nope".into()
            }
        );
    }

    #[test]
    fn resolve_disabled_plugin() {
        let mut registry = PluginRegistry::new();
        registry.register_with_status(
            Box::new(WelcomePlugin::new("Welcome!").unwrap()),
            PluginStatus::Disabled,
        );
        let err = registry.resolve("my-plugin", "service").err().unwrap();
        assert!(matches!(err, ResolutionError::PluginDisabled { .. }));
    }

    #[test]
    fn set_enabled_toggles_status() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(TestPlugin::new("alpha")));

        registry.set_enabled("alpha", false).unwrap();
        assert_eq!(registry.get("alpha").unwrap().status, PluginStatus::Disabled);
        assert!(registry.resolve("alpha", "service").is_err());

        registry.set_enabled("alpha", true).unwrap();
        assert_eq!(registry.get("alpha").unwrap().status, PluginStatus::Enabled);
        assert!(registry.resolve("alpha", "service").is_ok());
    }

    #[test]
    fn set_enabled_returns_error_for_unknown_plugin() {
        let mut registry = PluginRegistry::new();
        let err = registry.set_enabled("nonexistent", true).unwrap_err();
        assert!(matches!(err, PorticoError::Resolution(_)));
    }

    #[test]
    fn list_all_and_enabled_are_sorted() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(TestPlugin::new("zebra")));
        registry.register(Box::new(TestPlugin::new("alpha")));
        registry.register_with_status(Box::new(TestPlugin::new("middle")), PluginStatus::Disabled);

        let all: Vec<&str> = registry.list_all().iter().map(|e| e.manifest.name.as_str()).collect();
        assert_eq!(all, vec!["alpha", "middle", "zebra"]);

        let enabled: Vec<&str> = registry.enabled().iter().map(|e| e.manifest.name.as_str()).collect();
        assert_eq!(enabled, vec!["alpha", "zebra"]);
    }

    #[test]
    fn len_and_is_empty() {
        let mut registry = PluginRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);

        registry.register(Box::new(TestPlugin::new("test")));
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    #[traced_test]
    fn register_warns_on_undeclared_service() {
        struct Liar;

        #[async_trait]
        impl Plugin for Liar {
            fn manifest(&self) -> PluginManifest {
                let mut manifest = crate::catalog::welcome_manifest().unwrap();
                manifest.name = "liar".into();
                manifest
            }
            fn register(&self, _services: &mut ServiceTable) {}
        }

        let mut registry = PluginRegistry::new();
        registry.register(Box::new(Liar));
        assert!(logs_contain("manifest declares a service the plugin did not register"));
    }

    #[test]
    fn check_compatibility_accepts_older_requirement() {
        let mut registry = PluginRegistry::new();
        let mut plugin = TestPlugin::new("alpha");
        plugin.min_version = Some("0.1.0");
        registry.register(Box::new(plugin));

        registry
            .check_compatibility(&semver::Version::new(0, 2, 0))
            .unwrap();
    }

    #[test]
    fn check_compatibility_rejects_newer_requirement() {
        let mut registry = PluginRegistry::new();
        let mut plugin = TestPlugin::new("alpha");
        plugin.min_version = Some("9.0.0");
        registry.register(Box::new(plugin));

        let err = registry
            .check_compatibility(&semver::Version::new(0, 1, 0))
            .unwrap_err();
        assert!(err.to_string().contains("requires portico >= 9.0.0"));
    }

    #[test]
    fn check_compatibility_skips_disabled_plugins() {
        let mut registry = PluginRegistry::new();
        let mut plugin = TestPlugin::new("alpha");
        plugin.min_version = Some("9.0.0");
        registry.register_with_status(Box::new(plugin), PluginStatus::Disabled);

        registry
            .check_compatibility(&semver::Version::new(0, 1, 0))
            .unwrap();
    }

    #[tokio::test]
    async fn bootstrap_and_destroy_enabled_plugins() {
        let mut registry = PluginRegistry::new();
        let alpha = TestPlugin::new("alpha");
        let alpha_destroyed = Arc::clone(&alpha.destroyed);
        let off = TestPlugin::new("off");
        let off_destroyed = Arc::clone(&off.destroyed);
        registry.register(Box::new(alpha));
        registry.register_with_status(Box::new(off), PluginStatus::Disabled);

        registry.bootstrap_all().await.unwrap();
        assert!(registry.get("alpha").unwrap().is_bootstrapped());
        assert!(!registry.get("off").unwrap().is_bootstrapped());

        assert_eq!(registry.destroy_all().await, 0);
        assert_eq!(alpha_destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(off_destroyed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bootstrap_failure_names_plugin() {
        let mut registry = PluginRegistry::new();
        let mut plugin = TestPlugin::new("broken");
        plugin.fail_bootstrap = true;
        registry.register(Box::new(plugin));

        let err = registry.bootstrap_all().await.unwrap_err();
        match err {
            PorticoError::Plugin { name, message } => {
                assert_eq!(name, "broken");
                assert!(message.contains("bootstrap exploded"));
            }
            other => panic!("expected Plugin error, got {other:?}"),
        }
        assert!(!registry.get("broken").unwrap().is_bootstrapped());
    }

    #[tokio::test]
    async fn destroy_continues_after_failure() {
        let mut registry = PluginRegistry::new();
        let mut first = TestPlugin::new("first");
        first.fail_destroy = true;
        let second = TestPlugin::new("second");
        let second_destroyed = Arc::clone(&second.destroyed);
        registry.register(Box::new(first));
        registry.register(Box::new(second));

        registry.bootstrap_all().await.unwrap();
        assert_eq!(registry.destroy_all().await, 1);
        assert_eq!(second_destroyed.load(Ordering::SeqCst), 1);
    }
}
