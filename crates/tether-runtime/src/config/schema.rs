//! Configuration schema definitions.
//!
//! ```toml
//! [logging]
//! level = "info"          # none | error | warn | info | debug
//! format = "compact"      # compact | full | pretty | json
//! output = "stdout"       # stdout | stderr | file
//!
//! [logging.filters]
//! tether_core = "debug"
//!
//! [settings]
//! serialized = true
//! unmapped_interaction = "strip-controls"
//! missing_control = "ignore"
//!
//! [settings.glyphs]
//! next = "➡"
//!
//! [defaults]
//! timeout_secs = 120
//! expiry = "sliding"
//! style = "buttons"
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tether_core::Settings;
use tether_framework::{ControlStyle, ExpiryPolicy, InteractivityOptions};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TetherConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Engine settings shared by the router and every controller.
    #[serde(default)]
    pub settings: Settings,

    /// Defaults for [`InteractivityOptions`].
    #[serde(default)]
    pub defaults: ControllerDefaults,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Logging disabled.
    None,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// The `EnvFilter` directive for this level.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::None => "off",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Requires `file_path`.
    File,
}

/// When the log file rolls over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,

    /// Log file for [`LogOutput::File`].
    pub file_path: Option<PathBuf>,
    pub rotation: LogRotation,

    /// Per-module levels, e.g. `tether_core = "debug"`.
    pub filters: HashMap<String, LogLevel>,

    /// Log creation and close of routing spans.
    pub span_events: bool,
    pub thread_ids: bool,
    /// Include file and line of each event.
    pub file_location: bool,
}

// =============================================================================
// Controller defaults
// =============================================================================

/// Defaults applied by [`ControllerDefaults::to_options`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerDefaults {
    pub cancellable: bool,
    /// Idle timeout in seconds, 0 for none.
    pub timeout_secs: u64,
    pub expiry: ExpiryPolicy,
    pub style: ControlStyle,
}

impl Default for ControllerDefaults {
    fn default() -> Self {
        Self {
            cancellable: true,
            timeout_secs: 0,
            expiry: ExpiryPolicy::default(),
            style: ControlStyle::default(),
        }
    }
}

impl ControllerDefaults {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Options preset from these defaults.
    pub fn to_options(&self) -> InteractivityOptions {
        InteractivityOptions::new()
            .cancellable(self.cancellable)
            .timeout(self.timeout())
            .expiry(self.expiry)
            .style(self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_level_disables_logging() {
        assert_eq!(LogLevel::None.directive(), "off");
        assert_eq!(LogLevel::Debug.directive(), "debug");
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_defaults_to_options() {
        let defaults = ControllerDefaults {
            cancellable: false,
            timeout_secs: 30,
            expiry: ExpiryPolicy::Fixed,
            style: ControlStyle::Buttons,
        };
        let options = defaults.to_options();

        assert!(!options.is_cancellable());
        assert_eq!(options.timeout_duration(), Some(Duration::from_secs(30)));
        assert_eq!(options.expiry_policy(), ExpiryPolicy::Fixed);
        assert_eq!(options.control_style(), ControlStyle::Buttons);
    }
}
