//! # Tether
//!
//! Interactive controls for messages a chat bot already sent.
//!
//! ## Overview
//!
//! tether turns a sent message into a small UI: a paginator flipping
//! through pages, a menu of categories, or a board of buttons running
//! actions. Presses arrive from the host SDK as [`core::InboundEvent`]s and
//! are routed to the controller attached to that message. Controllers
//! expire after an idle timeout and can be closed by their users.
//!
//! ```text
//! ┌──────────┐     ┌────────────────┐     ┌──────────────┐     ┌────────────┐
//! │ Host SDK │────▶│ TetherRuntime  │────▶│ Router +     │────▶│ Paginator  │
//! │ events   │     │ (config, logs) │     │ Registry     │     │ Categorizer│
//! └──────────┘     └────────────────┘     └──────────────┘     │ Buttonizer │
//!       ▲                                                      └─────┬──────┘
//!       └──────────────── ChatClient (edit, react, buttons) ◀────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tether::prelude::*;
//!
//! let runtime = TetherRuntime::builder(Arc::new(MyClient::new(http))).build()?;
//!
//! let handle = runtime
//!     .paginator(["one", "two", "three"])
//!     .options(runtime.options().timeout(Duration::from_secs(60)))
//!     .attach(message)
//!     .await?;
//!
//! // in the host SDK's listeners
//! runtime.dispatch(event);
//! ```
//!
//! ## Features
//!
//! - `toml-config`: `tether.toml` support (default)
//! - `yaml-config`: `tether.yaml` support
//! - `json-log`: JSON log lines

pub use tether_core as core;
pub use tether_framework as framework;
pub use tether_runtime as runtime;

/// Everything a bot needs to attach controllers and feed them events.
pub mod prelude {
    pub use tether_core::{
        ApiError, BoxError, ButtonEvent, ButtonSpec, ChatClient, Embed, InboundEvent,
        InteractionHandle, MessageRef, Page, ReactionEvent, SelectionEvent, Settings, Tether,
        TetherError, TetherResult, User,
    };
    pub use tether_framework::{
        ButtonPress, Buttonizer, Categorizer, ControlStyle, ExpiryPolicy, Handle,
        InteractivityOptions, Paginator,
    };
    pub use tether_runtime::{RuntimeError, TetherConfig, TetherRuntime};
}
