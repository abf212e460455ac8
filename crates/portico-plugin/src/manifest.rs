// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifest parsing from `plugin.toml` files.
//!
//! A manifest names the plugin, lists the services it registers, and
//! declares the HTTP routes it contributes. Route paths are relative to the
//! plugin's mount point (`/{plugin-name}`).

use portico_core::PorticoError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

/// HTTP methods a plugin route may bind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// A single route declared by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// HTTP method to bind.
    pub method: RouteMethod,
    /// Path relative to the plugin mount point; always starts with `/`.
    pub path: String,
    /// Controller action in `controller.action` form (e.g., "controller.index").
    pub handler: String,
}

impl RouteSpec {
    /// Split the handler into its `(controller, action)` parts.
    pub fn handler_parts(&self) -> Option<(&str, &str)> {
        let (controller, action) = self.handler.split_once('.')?;
        if controller.is_empty() || action.is_empty() || action.contains('.') {
            return None;
        }
        Some((controller, action))
    }
}

/// Parsed plugin manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin name, also used as its route prefix (e.g., "my-plugin").
    pub name: String,
    /// Semantic version string.
    pub version: String,
    /// Human-readable description.
    pub description: String,
    /// Optional author identifier.
    pub author: Option<String>,
    /// Minimum Portico version required (e.g., "0.1.0").
    pub min_portico_version: Option<String>,
    /// Identifiers of the services the plugin registers.
    pub services: Vec<String>,
    /// Routes the plugin contributes.
    pub routes: Vec<RouteSpec>,
}

#[derive(Debug, Deserialize)]
struct PluginManifestFile {
    plugin: PluginSection,
}

#[derive(Debug, Deserialize)]
struct PluginSection {
    name: String,
    version: String,
    description: String,
    author: Option<String>,
    min_portico_version: Option<String>,
    #[serde(default)]
    services: Vec<String>,
    #[serde(default)]
    routes: Vec<RouteSection>,
}

#[derive(Debug, Deserialize)]
struct RouteSection {
    method: String,
    path: String,
    handler: String,
}

/// Check that a plugin name can serve as its literal route prefix.
pub fn validate_plugin_name(name: &str) -> Result<(), PorticoError> {
    let path_safe = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    let dots_only = name.chars().all(|c| c == '.');
    if dots_only || !path_safe {
        return Err(PorticoError::Config(format!(
            "plugin name '{name}' must use only ASCII letters, digits, '-', '_' or '.' and not be all dots"
        )));
    }
    Ok(())
}

/// Name of the capture in a `{name}` path segment, if the segment is one.
pub fn capture_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

/// Check a route path against the router's path syntax.
///
/// Paths start with `/`. A segment is either literal text or a whole-segment
/// `{name}` capture; `:name` and `*name` forms, partial captures and
/// catch-alls are rejected, as is a capture name used twice.
pub fn validate_route_path(path: &str) -> Result<(), PorticoError> {
    let invalid = |reason: String| {
        PorticoError::Config(format!("plugin manifest: route path '{path}' {reason}"))
    };

    let Some(rest) = path.strip_prefix('/') else {
        return Err(invalid("must start with '/'".to_string()));
    };

    let mut captures: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        if segment.starts_with(':') || segment.starts_with('*') {
            return Err(invalid(format!(
                "uses unsupported segment `{segment}`; write captures as `{{name}}`"
            )));
        }
        match capture_name(segment) {
            Some(name) => {
                let valid = !name.is_empty()
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                if !valid {
                    return Err(invalid(format!("has invalid capture `{segment}`")));
                }
                if captures.contains(&name) {
                    return Err(invalid(format!("captures `{name}` twice")));
                }
                captures.push(name);
            }
            None if segment.contains(['{', '}']) => {
                return Err(invalid(format!(
                    "has invalid capture `{segment}`; a capture must span the whole segment"
                )));
            }
            None => {}
        }
    }
    Ok(())
}

/// Parse a plugin manifest from TOML content.
///
/// Validates that name and version are non-empty, that versions are valid
/// semver, and that every route has a known method, an absolute path and a
/// `controller.action` handler.
pub fn parse_plugin_manifest(toml_content: &str) -> Result<PluginManifest, PorticoError> {
    let file: PluginManifestFile = toml::from_str(toml_content)
        .map_err(|e| PorticoError::Config(format!("invalid plugin manifest: {e}")))?;

    let section = file.plugin;

    if section.name.is_empty() {
        return Err(PorticoError::Config(
            "plugin manifest: name must not be empty".to_string(),
        ));
    }

    validate_plugin_name(&section.name)?;

    if section.version.is_empty() {
        return Err(PorticoError::Config(
            "plugin manifest: version must not be empty".to_string(),
        ));
    }

    semver::Version::parse(&section.version).map_err(|e| {
        PorticoError::Config(format!(
            "plugin manifest: version '{}' is not valid semver: {e}",
            section.version
        ))
    })?;

    if let Some(min) = &section.min_portico_version {
        semver::Version::parse(min).map_err(|e| {
            PorticoError::Config(format!(
                "plugin manifest: min_portico_version '{min}' is not valid semver: {e}"
            ))
        })?;
    }

    let mut routes = Vec::with_capacity(section.routes.len());
    for route in section.routes {
        let method = RouteMethod::from_str(&route.method).map_err(|_| {
            PorticoError::Config(format!(
                "plugin manifest: invalid route method '{}'. Expected one of: GET, POST, PUT, PATCH, DELETE",
                route.method
            ))
        })?;

        validate_route_path(&route.path)?;

        let spec = RouteSpec {
            method,
            path: route.path,
            handler: route.handler,
        };
        if spec.handler_parts().is_none() {
            return Err(PorticoError::Config(format!(
                "plugin manifest: route handler '{}' must have the form controller.action",
                spec.handler
            )));
        }
        routes.push(spec);
    }

    Ok(PluginManifest {
        name: section.name,
        version: section.version,
        description: section.description,
        author: section.author,
        min_portico_version: section.min_portico_version,
        services: section.services,
        routes,
    })
}
