// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./portico.toml` > `~/.config/portico/portico.toml` > `/etc/portico/portico.toml`
//! with environment variable overrides via `PORTICO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PorticoConfig;

/// System-wide config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/portico/portico.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/portico/portico.toml` (system-wide)
/// 3. `~/.config/portico/portico.toml` (user XDG config)
/// 4. `./portico.toml` (local directory)
/// 5. `PORTICO_*` environment variables
pub fn load_config() -> Result<PorticoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PorticoConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("portico/portico.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("portico.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PorticoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PorticoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PorticoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PorticoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment provider mapping `PORTICO_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys such as
/// `response_format` contain underscores: `PORTICO_WELCOME_RESPONSE_FORMAT`
/// must map to `welcome.response_format`.
///
/// Figment hands keys to the mapping in their original case and lowercases
/// them only afterwards, so the key is lowercased before matching sections.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("PORTICO_").map(|key| {
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("server_", "server.", 1)
            .replacen("welcome_", "welcome.", 1);
        mapped.into()
    })
}
