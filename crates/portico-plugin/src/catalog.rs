// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in plugin catalog.
//!
//! Each plugin compiled into the Portico binary ships a `plugin.toml` that is
//! embedded at build time and parsed with [`parse_plugin_manifest`]. No
//! filesystem or network access is involved.

use portico_core::PorticoError;

use crate::manifest::{parse_plugin_manifest, PluginManifest};

/// `plugin.toml` of the built-in welcome plugin.
const WELCOME_MANIFEST: &str = include_str!("../manifests/my-plugin.toml");

/// Manifest of the built-in welcome plugin.
///
/// Registers the welcome service and mounts `GET /` (i.e. `/my-plugin/`)
/// on `controller.index`.
pub fn welcome_manifest() -> Result<PluginManifest, PorticoError> {
    parse_plugin_manifest(WELCOME_MANIFEST)
}

/// Returns manifests for all built-in plugins.
pub fn builtin_catalog() -> Result<Vec<PluginManifest>, PorticoError> {
    Ok(vec![welcome_manifest()?])
}

/// Search the built-in catalog by query string.
///
/// Filters entries whose name or description contains the query (case-insensitive).
/// If query is empty, returns all entries.
pub fn search_catalog(query: &str) -> Result<Vec<PluginManifest>, PorticoError> {
    let catalog = builtin_catalog()?;
    if query.is_empty() {
        return Ok(catalog);
    }
    let query_lower = query.to_lowercase();
    Ok(catalog
        .into_iter()
        .filter(|m| {
            m.name.to_lowercase().contains(&query_lower)
                || m.description.to_lowercase().contains(&query_lower)
        })
        .collect())
}
