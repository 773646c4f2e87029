//! Layered configuration for tether.
//!
//! Defaults, profile and main config files, `TETHER_*` environment
//! variables and programmatic overrides are merged by [`ConfigLoader`] into
//! one [`TetherConfig`], then checked by [`validate_config`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ControllerDefaults, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, TetherConfig,
};
pub use validation::validate_config;
