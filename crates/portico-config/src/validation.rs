// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use crate::diagnostic::ConfigError;
use crate::model::PorticoConfig;

/// Log levels accepted by `server.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PorticoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must be between 1 and 65535".to_string(),
        });
    }

    let level = config.server.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "server.log_level `{}` is not one of: {}",
                config.server.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    for name in config.plugins.keys() {
        if name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "plugins table contains an empty plugin name".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&PorticoConfig::default()).is_ok());
    }

    #[test]
    fn empty_host_rejected() {
        let mut config = PorticoConfig::default();
        config.server.host = "  ".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("server.host must not be empty"));
    }

    #[test]
    fn hostname_accepted() {
        let mut config = PorticoConfig::default();
        config.server.host = "gateway.local".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn garbage_host_rejected() {
        let mut config = PorticoConfig::default();
        config.server.host = "not a host!".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("not a valid IP address or hostname"));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = PorticoConfig::default();
        config.server.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = PorticoConfig::default();
        config.server.port = 0;
        config.server.log_level = "loud".into();
        config.plugins.insert(String::new(), true);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
