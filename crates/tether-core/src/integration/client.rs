//! The capability tether needs from the host chat SDK.
//!
//! tether never talks to the chat platform itself. An adapter wraps the host
//! SDK's HTTP client in a [`ChatClient`] and tether calls through it to
//! render pages and controls.
//!
//! # Example Implementation
//!
//! ```rust,ignore
//! struct SerenityClient(Arc<Http>);
//!
//! #[async_trait]
//! impl ChatClient for SerenityClient {
//!     async fn add_reaction(&self, message: &MessageRef, glyph: &str) -> ApiResult<()> {
//!         let (channel, id) = ids(message)?;
//!         self.0.create_reaction(channel, id, &parse(glyph)).await.map_err(map_err)
//!     }
//!     // ...
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::foundation::content::{ButtonSpec, Page};
use crate::foundation::error::ApiResult;
use crate::foundation::event::{InteractionHandle, MessageRef, User};

/// Calls into the host chat SDK.
///
/// Implementations must be cheap to share; tether holds one behind an `Arc`
/// and calls it concurrently from many tasks.
#[async_trait]
pub trait ChatClient: Send + Sync + 'static {
    /// Reacts to `message` with `glyph`.
    async fn add_reaction(&self, message: &MessageRef, glyph: &str) -> ApiResult<()>;

    /// Removes `user_id`'s `glyph` reaction from `message`.
    async fn remove_reaction(
        &self,
        message: &MessageRef,
        glyph: &str,
        user_id: &str,
    ) -> ApiResult<()>;

    /// Removes every reaction from `message`.
    async fn clear_reactions(&self, message: &MessageRef) -> ApiResult<()>;

    /// Replaces the content of `message` with `page`.
    async fn edit_message(&self, message: &MessageRef, page: &Page) -> ApiResult<()>;

    /// Replaces the buttons attached to `message`.
    async fn set_buttons(&self, message: &MessageRef, buttons: &[ButtonSpec]) -> ApiResult<()>;

    /// Removes every component from `message`.
    async fn clear_buttons(&self, message: &MessageRef) -> ApiResult<()>;

    /// Resolves a user from its id.
    async fn fetch_user(&self, user_id: &str) -> ApiResult<User>;

    /// Acknowledges (defers) an interaction so the platform stops waiting.
    async fn acknowledge(&self, interaction: &InteractionHandle) -> ApiResult<()>;
}

/// A shared [`ChatClient`] trait object.
pub type BoxedClient = Arc<dyn ChatClient>;
