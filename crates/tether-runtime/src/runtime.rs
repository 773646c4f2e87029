//! Configured startup of the interactivity engine.
//!
//! [`TetherRuntime`] loads a [`TetherConfig`], installs logging, builds a
//! [`Tether`] handle with the configured settings and activates it so
//! controllers can attach through [`Tether::current`].
//!
//! ```rust,ignore
//! use tether_runtime::TetherRuntime;
//!
//! let runtime = TetherRuntime::builder(Arc::new(MyClient::new(http)))
//!     .config_file("config/tether.toml")
//!     .build()?;
//!
//! // in the host SDK's listeners
//! runtime.dispatch(event);
//!
//! // controllers pick up the configured defaults
//! runtime.paginator(pages).attach(message).await?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tether_core::{BoxedClient, InboundEvent, Page, RouteOutcome, Tether};
use tether_framework::{Buttonizer, Categorizer, InteractivityOptions, Paginator};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::{ConfigLoader, TetherConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// A configured, activated [`Tether`].
#[derive(Debug, Clone)]
pub struct TetherRuntime {
    config: TetherConfig,
    tether: Tether,
}

impl TetherRuntime {
    /// Starts building a runtime around the host `client`.
    pub fn builder(client: BoxedClient) -> RuntimeBuilder {
        RuntimeBuilder::new(client)
    }

    /// Builds and activates a runtime from an already loaded config.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not validate.
    pub fn from_config(client: BoxedClient, config: TetherConfig) -> RuntimeResult<Self> {
        RuntimeBuilder::new(client).config(config).build()
    }

    pub fn config(&self) -> &TetherConfig {
        &self.config
    }

    pub fn tether(&self) -> &Tether {
        &self.tether
    }

    /// Options preset from `[defaults]`.
    pub fn options(&self) -> InteractivityOptions {
        self.config.defaults.to_options()
    }

    pub fn paginator<I, P>(&self, pages: I) -> Paginator
    where
        I: IntoIterator<Item = P>,
        P: Into<Page>,
    {
        Paginator::new(pages).options(self.options())
    }

    pub fn categorizer(&self) -> Categorizer {
        Categorizer::new().options(self.options())
    }

    pub fn buttonizer(&self) -> Buttonizer {
        Buttonizer::new().options(self.options())
    }

    /// Routes `event` on its own task and returns immediately.
    pub fn dispatch(&self, event: InboundEvent) -> JoinHandle<RouteOutcome> {
        self.tether.router().spawn_route(event)
    }

    /// Routes `event` and waits for the callback to finish.
    pub async fn route(&self, event: InboundEvent) -> RouteOutcome {
        self.tether.route(event).await
    }

    /// Drops every interactive message of this runtime and deactivates it.
    pub fn shutdown(self) {
        self.tether.reset();
        let is_active = Tether::current()
            .is_ok_and(|active| Arc::ptr_eq(active.registry(), self.tether.registry()));
        if is_active {
            Tether::deactivate();
        }
        info!("Tether runtime shut down");
    }
}

/// Builder for [`TetherRuntime`].
pub struct RuntimeBuilder {
    client: BoxedClient,
    config: Option<TetherConfig>,
    config_file: Option<PathBuf>,
    profile: Option<String>,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    overrides: Option<TetherConfig>,
    isolated: bool,
    init_logging: bool,
    activate: bool,
}

impl RuntimeBuilder {
    fn new(client: BoxedClient) -> Self {
        Self {
            client,
            config: None,
            config_file: None,
            profile: None,
            search_paths: Vec::new(),
            load_env: true,
            overrides: None,
            isolated: false,
            init_logging: true,
            activate: true,
        }
    }

    /// Uses `config` as is instead of loading one.
    pub fn config(mut self, config: TetherConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Programmatic overrides applied on top of every loaded source.
    pub fn merge(mut self, overrides: TetherConfig) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Uses a registry and scheduler of its own instead of the process-wide
    /// ones.
    pub fn isolated(mut self) -> Self {
        self.isolated = true;
        self
    }

    /// Leaves subscriber setup to the host.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// Whether to install the handle as the process-wide one (default: true).
    pub fn activate(mut self, activate: bool) -> Self {
        self.activate = activate;
        self
    }

    fn load(&mut self) -> RuntimeResult<TetherConfig> {
        if let Some(config) = self.config.take() {
            return Ok(config);
        }

        let mut loader = ConfigLoader::new();
        if let Some(profile) = self.profile.take() {
            loader = loader.profile(profile);
        }
        for path in self.search_paths.drain(..) {
            loader = loader.search_path(path);
        }
        if let Some(path) = self.config_file.take() {
            loader = loader.file(path);
        }
        if !self.load_env {
            loader = loader.without_env();
        }
        if let Some(overrides) = self.overrides.take() {
            loader = loader.merge(overrides);
        }
        Ok(loader.load()?)
    }

    /// Loads and validates the configuration, then builds the runtime.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if loading or validation fails.
    pub fn build(mut self) -> RuntimeResult<TetherRuntime> {
        let config = self.load()?;
        validate_config(&config)?;

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let mut builder = Tether::builder(self.client).settings(config.settings.clone());
        if self.isolated {
            builder = builder.isolated();
        }
        let tether = builder.build();

        if self.activate {
            tether.activate();
        }

        info!(
            log_level = %config.logging.level,
            serialized = config.settings.serialized,
            isolated = self.isolated,
            "Tether runtime initialized"
        );
        debug!(defaults = ?config.defaults, "Controller defaults");

        Ok(TetherRuntime { config, tether })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, LogLevel};
    use crate::error::RuntimeError;
    use async_trait::async_trait;
    use std::time::Duration;
    use tether_core::{
        ApiResult, ButtonSpec, ChatClient, InteractionHandle, MessageRef, ReactionEvent, User,
        into_callback,
    };
    use tether_framework::{ControlStyle, ExpiryPolicy};

    struct NoopClient;

    #[async_trait]
    impl ChatClient for NoopClient {
        async fn add_reaction(&self, _: &MessageRef, _: &str) -> ApiResult<()> {
            Ok(())
        }

        async fn remove_reaction(&self, _: &MessageRef, _: &str, _: &str) -> ApiResult<()> {
            Ok(())
        }

        async fn clear_reactions(&self, _: &MessageRef) -> ApiResult<()> {
            Ok(())
        }

        async fn edit_message(&self, _: &MessageRef, _: &Page) -> ApiResult<()> {
            Ok(())
        }

        async fn set_buttons(&self, _: &MessageRef, _: &[ButtonSpec]) -> ApiResult<()> {
            Ok(())
        }

        async fn clear_buttons(&self, _: &MessageRef) -> ApiResult<()> {
            Ok(())
        }

        async fn fetch_user(&self, user_id: &str) -> ApiResult<User> {
            Ok(User::new(user_id, user_id))
        }

        async fn acknowledge(&self, _: &InteractionHandle) -> ApiResult<()> {
            Ok(())
        }
    }

    fn builder() -> RuntimeBuilder {
        TetherRuntime::builder(Arc::new(NoopClient))
            .without_logging()
            .without_env()
            .isolated()
    }

    #[test]
    fn test_build_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tether.toml");
        std::fs::write(
            &path,
            r#"
            [logging]
            level = "none"

            [settings]
            serialized = false

            [defaults]
            timeout_secs = 90
            expiry = "fixed"
            style = "buttons"
            "#,
        )
        .unwrap();

        let runtime = builder().config_file(&path).activate(false).build().unwrap();

        assert_eq!(runtime.config().logging.level, LogLevel::None);
        assert!(!runtime.tether().settings().serialized);

        let options = runtime.options();
        assert_eq!(options.timeout_duration(), Some(Duration::from_secs(90)));
        assert_eq!(options.expiry_policy(), ExpiryPolicy::Fixed);
        assert_eq!(options.control_style(), ControlStyle::Buttons);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = TetherConfig::default();
        config.settings.glyphs.cancel = config.settings.glyphs.next.clone();

        let err = builder().config(config).activate(false).build().unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Config(ConfigError::DuplicateGlyph { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let err = builder()
            .config_file("/nope/tether.toml")
            .activate(false)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Config(ConfigError::FileNotFound(_))
        ));
    }

    // The only test in this crate that touches the process-wide handle.
    #[tokio::test]
    async fn test_activation_dispatch_and_shutdown() {
        let runtime = builder()
            .config(TetherConfig::default())
            .build()
            .unwrap();
        let current = Tether::current().unwrap();
        assert!(Arc::ptr_eq(current.registry(), runtime.tether().registry()));

        let message = MessageRef::direct("c", "m");
        runtime
            .tether()
            .registry()
            .register(message.key(), into_callback(|_ctx| async { Ok(()) }));

        let outcome = runtime
            .dispatch(InboundEvent::ReactionAdded(ReactionEvent {
                message: message.clone(),
                user_id: "u".into(),
                glyph: "x".into(),
            }))
            .await
            .unwrap();
        assert_eq!(outcome, RouteOutcome::Invoked);

        let registry = Arc::clone(runtime.tether().registry());
        runtime.shutdown();
        assert!(!registry.has(&message.key()));
        assert!(Tether::current().is_err());
    }
}
