//! # Tether Core
//!
//! The engine behind tether's interactive messages.
//!
//! tether attaches pagination, menus and buttons to messages a bot already
//! sent. This crate holds the part that does not care which kind of
//! controller is attached: a process-wide registry of per-message callbacks,
//! the router feeding host events into it, and the idle-expiry scheduler.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! - **Keys**: per-message identity ([`Key`])
//! - **Events**: what the host reports ([`InboundEvent`], [`InteractionContext`])
//! - **Content**: what gets rendered ([`Page`], [`Embed`], [`ButtonSpec`])
//! - **Errors and settings**: [`TetherError`], [`ApiError`], [`Settings`]
//!
//! ### Framework Layer
//!
//! - **Registry**: key to callback map with locks and selections ([`EventRegistry`])
//! - **Scheduler**: one idle-expiry task per key ([`TaskScheduler`])
//! - **Router**: host event to callback ([`InteractionRouter`])
//! - **Handle**: process-wide activation ([`Tether`])
//!
//! ### Integration Layer
//!
//! - **Host capability**: the calls tether makes into the chat SDK ([`ChatClient`])
//!
//! ## Event Flow
//!
//! ```text
//! ┌──────────┐     ┌─────────────────┐     ┌───────────────┐     ┌────────────┐
//! │ Host SDK │────▶│ InteractionRouter│────▶│ EventRegistry │────▶│ Controller │
//! └──────────┘     └─────────────────┘     └───────────────┘     └────────────┘
//!                                                  ▲                    │
//!                                                  └── TaskScheduler ◀──┘
//!                                                      (idle expiry)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use tether_core::{EventRegistry, InboundEvent, Tether, into_callback};
//!
//! let tether = Tether::builder(client).build();
//! tether.activate();
//!
//! tether.registry().register(
//!     message.key(),
//!     into_callback(|ctx| async move {
//!         println!("{} pressed {:?}", ctx.user().name, ctx.glyph());
//!         Ok(())
//!     }),
//! );
//!
//! tether.route(event).await;
//! ```

// Architectural layers
pub mod foundation;
pub mod framework;
pub mod integration;

// Re-export foundation types
pub use foundation::{
    ApiError, ApiResult, BoxError, ButtonEvent, ButtonSpec, Embed, EmbedCluster, EmbedField,
    Glyphs, InboundEvent, InteractionContext, InteractionHandle, Key, MAX_EMBEDS, MessageRef,
    MissingControlPolicy, Page, ReactionEvent, SchedulerError, SchedulerResult, SelectionEvent,
    Settings, TetherError, TetherResult, Trigger, UnmappedPolicy, User,
};

// Re-export framework types
pub use framework::{
    ActionReference, BoxFuture, Callback, EventRegistry, ExpiryAction, InteractionRouter,
    KeyLock, RouteOutcome, ScheduledTask, TaskScheduler, Tether, TetherBuilder, into_callback,
};

// Re-export integration types
pub use integration::{BoxedClient, ChatClient};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::framework::{
        ActionReference, BoxFuture, EventRegistry, InteractionRouter, RouteOutcome, Tether,
        into_callback,
    };
    pub use super::integration::{BoxedClient, ChatClient};
}
