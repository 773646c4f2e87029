//! Framework layer: the interactivity engine.
//!
//! - [`EventRegistry`] maps message keys to callbacks
//! - [`TaskScheduler`] runs one idle-expiry task per key
//! - [`InteractionRouter`] delivers host events to callbacks
//! - [`Tether`] bundles the three with the host client

pub mod registry;
pub mod router;
pub mod scheduler;
pub mod tether;

pub use registry::{ActionReference, BoxFuture, Callback, EventRegistry, KeyLock, into_callback};
pub use router::{InteractionRouter, RouteOutcome};
pub use scheduler::{ExpiryAction, ScheduledTask, TaskScheduler};
pub use tether::{Tether, TetherBuilder};
