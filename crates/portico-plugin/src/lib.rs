// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry, manifest parser, lifecycle hooks, and built-in plugins.
//!
//! Plugins are compiled into the binary. Each one describes itself with a
//! [`PluginManifest`], registers its services into a [`ServiceTable`] when it
//! is added to the [`PluginRegistry`], and may hook into bootstrap and
//! shutdown. Controllers reach services by resolving a `(plugin, service)`
//! pair against the registry.

pub mod builtin;
pub mod catalog;
pub mod lifecycle;
pub mod manifest;
pub mod registry;

pub use builtin::{builtin_plugins, StaticWelcomeService, WelcomePlugin};
pub use catalog::{builtin_catalog, search_catalog};
pub use lifecycle::{Plugin, ServiceTable};
pub use manifest::{
    capture_name, parse_plugin_manifest, validate_plugin_name, validate_route_path, PluginManifest,
    RouteMethod, RouteSpec,
};
pub use registry::{PluginEntry, PluginRegistry, PluginStatus};
