//! Configuration validation utilities.

use std::collections::HashMap;

use super::error::{ConfigError, ConfigResult};
use super::schema::{ControllerDefaults, LogOutput, LoggingConfig, TetherConfig};
use tether_core::Glyphs;
use tether_framework::ExpiryPolicy;

/// Validates the entire configuration.
pub fn validate_config(config: &TetherConfig) -> ConfigResult<()> {
    validate_logging(&config.logging)?;
    validate_glyphs(&config.settings.glyphs)?;
    validate_defaults(&config.defaults)?;
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File {
        match &logging.file_path {
            None => {
                return Err(ConfigError::validation(
                    "logging.output = \"file\" requires logging.file_path",
                ));
            }
            Some(path) if path.file_name().is_none() => {
                return Err(ConfigError::validation(format!(
                    "logging.file_path has no file name: {}",
                    path.display()
                )));
            }
            Some(_) => {}
        }
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "logging.filters has an empty module name: {module:?}"
        )));
    }

    Ok(())
}

/// Every glyph must be non-empty and distinct, or presses would be
/// ambiguous.
fn validate_glyphs(glyphs: &Glyphs) -> ConfigResult<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for (role, glyph) in glyphs.all() {
        if glyph.trim().is_empty() {
            return Err(ConfigError::validation(format!(
                "settings.glyphs.{role} must not be empty"
            )));
        }
        if let Some(first) = seen.insert(glyph, role) {
            return Err(ConfigError::DuplicateGlyph {
                glyph: glyph.to_string(),
                first: first.to_string(),
                second: role.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_defaults(defaults: &ControllerDefaults) -> ConfigResult<()> {
    if defaults.expiry == ExpiryPolicy::Fixed && defaults.timeout_secs == 0 {
        return Err(ConfigError::validation(
            "defaults.expiry = \"fixed\" requires defaults.timeout_secs > 0",
        ));
    }
    Ok(())
}
