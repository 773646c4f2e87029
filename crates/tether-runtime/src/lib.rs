//! # Tether Runtime
//!
//! Configuration, logging and startup for tether.
//!
//! - [`config`]: layered [`TetherConfig`] loading (files, `TETHER_*`
//!   environment variables, overrides) and validation
//! - [`logging`]: `tracing-subscriber` setup driven by `[logging]`
//! - [`TetherRuntime`]: builds and activates the engine from a config
//!
//! ```rust,ignore
//! use tether_runtime::TetherRuntime;
//!
//! let runtime = TetherRuntime::builder(client).build()?;
//! runtime.dispatch(event);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, ControllerDefaults, LoggingConfig, Profile,
    TetherConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RuntimeBuilder, TetherRuntime};

// Re-export tracing for hosts that log alongside the engine
pub use tracing;
pub use tracing_subscriber;

/// Logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
