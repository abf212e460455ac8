// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `portico plugins` command: list the built-in catalog.

use std::fmt::Write as _;

use portico_config::PorticoConfig;
use portico_core::PorticoError;
use portico_plugin::{search_catalog, PluginStatus};

/// Render the catalog, filtered by `search`, with each plugin's status and routes.
pub fn render_plugin_list(
    config: &PorticoConfig,
    search: Option<&str>,
) -> Result<String, PorticoError> {
    let manifests = search_catalog(search.unwrap_or(""))?;
    let mut out = String::new();

    if manifests.is_empty() {
        let _ = writeln!(out, "no plugins match `{}`", search.unwrap_or(""));
        return Ok(out);
    }

    for manifest in manifests {
        let status = if config.plugin_enabled(&manifest.name) {
            PluginStatus::Enabled
        } else {
            PluginStatus::Disabled
        };
        let _ = writeln!(
            out,
            "{:<16} {:<8} {:<9} {}",
            manifest.name, manifest.version, status, manifest.description
        );
        for route in &manifest.routes {
            let _ = writeln!(
                out,
                "    {} /{}{} -> {}",
                route.method,
                manifest.name,
                route.path,
                route.handler
            );
        }
    }
    Ok(out)
}
