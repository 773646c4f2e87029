//! # Tether Framework
//!
//! Interactive controllers built on the tether engine.
//!
//! - [`Paginator`] - page-by-page navigation with clamped previous/next
//! - [`Categorizer`] - a menu mapping glyphs to pages
//! - [`Buttonizer`] - arbitrary async actions bound to controls
//!
//! Every controller embeds [`InteractivityOptions`] (cancel control, idle
//! timeout, user filter, on-close hook, control style) and returns a
//! [`Handle`] once attached.
//!
//! ```rust,ignore
//! use tether_framework::{InteractivityOptions, Paginator};
//!
//! let handle = Paginator::new(pages)
//!     .options(InteractivityOptions::new().timeout(Duration::from_secs(120)))
//!     .attach(message)
//!     .await?;
//!
//! // later
//! handle.close().await;
//! ```

pub mod buttonizer;
pub mod categorizer;
pub mod options;
pub mod paginator;
pub mod session;

#[cfg(test)]
mod testing;

pub use buttonizer::{ButtonAction, ButtonPress, Buttonizer, ButtonizerHandle};
pub use categorizer::{Categorizer, CategorizerHandle};
pub use options::{
    ControlStyle, ExpiryPolicy, InteractivityOptions, MAX_CONTROLS, OnClose, UserFilter,
};
pub use paginator::{Navigation, PageCursor, Paginator, PaginatorHandle};
pub use session::Handle;
