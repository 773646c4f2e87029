//! The [`Tether`] handle and process-wide activation.
//!
//! A `Tether` bundles everything a controller needs to attach to a message:
//! the registry, the expiry scheduler, the host [`ChatClient`] and the
//! engine [`Settings`]. It is cheap to clone.
//!
//! Controllers look up the active handle with [`Tether::current`], so a
//! bot activates one handle at startup:
//!
//! ```rust,ignore
//! let tether = Tether::builder(Arc::new(MyClient::new(http)))
//!     .settings(settings)
//!     .build();
//! tether.activate();
//!
//! // in the host SDK's listeners
//! Tether::current()?.router().spawn_route(event);
//! ```

use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::foundation::error::{TetherError, TetherResult};
use crate::foundation::event::InboundEvent;
use crate::foundation::settings::Settings;
use crate::framework::registry::EventRegistry;
use crate::framework::router::{InteractionRouter, RouteOutcome};
use crate::framework::scheduler::TaskScheduler;
use crate::integration::client::{BoxedClient, ChatClient};

static ACTIVE: LazyLock<RwLock<Option<Tether>>> = LazyLock::new(|| RwLock::new(None));

struct TetherInner {
    registry: Arc<EventRegistry>,
    scheduler: TaskScheduler,
    client: BoxedClient,
    settings: Arc<Settings>,
    router: InteractionRouter,
}

/// Shared handle to the interactivity engine.
#[derive(Clone)]
pub struct Tether {
    inner: Arc<TetherInner>,
}

impl Tether {
    /// Starts building a handle around `client`.
    ///
    /// By default the handle uses the process-wide registry and scheduler.
    pub fn builder(client: BoxedClient) -> TetherBuilder {
        TetherBuilder {
            client,
            settings: Settings::default(),
            registry: None,
            scheduler: None,
        }
    }

    pub fn registry(&self) -> &Arc<EventRegistry> {
        &self.inner.registry
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.inner.scheduler
    }

    pub fn client(&self) -> &dyn ChatClient {
        self.inner.client.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn router(&self) -> &InteractionRouter {
        &self.inner.router
    }

    /// Routes a host event through this handle's router.
    pub async fn route(&self, event: InboundEvent) -> RouteOutcome {
        self.inner.router.route(event).await
    }

    /// Installs this handle as the process-wide one, returning the previous.
    pub fn activate(&self) -> Option<Tether> {
        let previous = ACTIVE.write().replace(self.clone());
        if previous.is_some() {
            warn!("Replaced active tether handle");
        } else {
            info!("Tether activated");
        }
        previous
    }

    /// Returns the process-wide handle.
    ///
    /// # Errors
    ///
    /// Returns [`TetherError::NotActivated`] if no handle was activated.
    pub fn current() -> TetherResult<Tether> {
        ACTIVE.read().clone().ok_or(TetherError::NotActivated)
    }

    /// Removes the process-wide handle.
    pub fn deactivate() -> Option<Tether> {
        ACTIVE.write().take()
    }

    /// Drops every registration and pending expiry of this handle.
    ///
    /// Every interactive message driven by this handle stops responding.
    pub fn reset(&self) {
        self.inner.registry.clear();
        self.inner.scheduler.clear();
    }

    /// Drops every registration and pending expiry in the process.
    ///
    /// Clears the process-wide registry and scheduler and those of the
    /// active handle. Every interactive message stops responding.
    pub fn reset_all() {
        if let Some(active) = ACTIVE.read().as_ref() {
            active.reset();
        }
        EventRegistry::global().clear();
        TaskScheduler::global().clear();
        info!("Reset all interactivity");
    }
}

impl fmt::Debug for Tether {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tether")
            .field("registered", &self.inner.registry.len())
            .field("settings", &self.inner.settings)
            .finish()
    }
}

/// Builder for [`Tether`].
pub struct TetherBuilder {
    client: BoxedClient,
    settings: Settings,
    registry: Option<Arc<EventRegistry>>,
    scheduler: Option<TaskScheduler>,
}

impl TetherBuilder {
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Uses `registry` instead of the process-wide one.
    pub fn registry(mut self, registry: Arc<EventRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Uses `scheduler` instead of the process-wide one.
    pub fn scheduler(mut self, scheduler: TaskScheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Uses a fresh registry and scheduler owned by this handle alone.
    pub fn isolated(self) -> Self {
        self.registry(Arc::new(EventRegistry::new()))
            .scheduler(TaskScheduler::new())
    }

    pub fn build(self) -> Tether {
        let registry = self.registry.unwrap_or_else(EventRegistry::global);
        let scheduler = self.scheduler.unwrap_or_else(TaskScheduler::global);
        let settings = Arc::new(self.settings);
        let router = InteractionRouter::new(
            Arc::clone(&registry),
            scheduler.clone(),
            Arc::clone(&self.client),
            Arc::clone(&settings),
        );

        Tether {
            inner: Arc::new(TetherInner {
                registry,
                scheduler,
                client: self.client,
                settings,
                router,
            }),
        }
    }
}
