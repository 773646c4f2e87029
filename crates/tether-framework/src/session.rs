//! Lifecycle shared by every controller.
//!
//! A [`Session`] is the attached half of a controller: it knows the message,
//! the controls shown on it, the registration in the registry and the
//! pending expiry. Controllers only supply the state machine that reacts to
//! presses.
//!
//! ```text
//! attach ──► register ──► render + controls ──► arm expiry
//!                                                   │
//!   press ──► accept? ──► consume reaction ──► touch expiry ──► controller
//!                                                   │
//!   cancel / expiry / close() ──► release ──► strip controls ──► on_close (once)
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tether_core::{
    ActionReference, BoxError, ButtonSpec, Callback, InteractionContext, Key, MessageRef,
    MissingControlPolicy, Page, ScheduledTask, Tether, TetherError, TetherResult, User,
};
use tracing::{debug, trace};

use crate::options::{ControlStyle, ExpiryPolicy, InteractivityOptions};

pub(crate) struct Session {
    tether: Tether,
    message: MessageRef,
    key: Key,
    options: InteractivityOptions,
    controls: Vec<ButtonSpec>,
    reference: OnceLock<ActionReference>,
    expiry: Mutex<Option<ScheduledTask>>,
    closed: AtomicBool,
}

impl Session {
    pub(crate) fn new(
        tether: Tether,
        message: MessageRef,
        options: InteractivityOptions,
        controls: Vec<ButtonSpec>,
    ) -> Arc<Self> {
        let key = message.key();
        Arc::new(Self {
            tether,
            message,
            key,
            options,
            controls,
            reference: OnceLock::new(),
            expiry: Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    pub(crate) fn message(&self) -> &MessageRef {
        &self.message
    }

    pub(crate) fn key(&self) -> &Key {
        &self.key
    }

    pub(crate) fn reference(&self) -> Option<&ActionReference> {
        self.reference.get()
    }

    pub(crate) fn is_active(&self) -> bool {
        !self.closed.load(Ordering::SeqCst) && self.reference().is_some_and(|r| r.is_valid())
    }

    /// Registers `callback`, renders `initial`, shows the controls and arms
    /// the expiry. On failure the registration is rolled back.
    pub(crate) async fn start(
        self: &Arc<Self>,
        callback: Callback,
        initial: Option<&Page>,
    ) -> TetherResult<()> {
        let reference = self.tether.registry().register(self.key.clone(), callback);
        let _ = self.reference.set(reference);

        if let Err(e) = self.show(initial).await {
            if let Some(reference) = self.reference() {
                self.tether.registry().release(reference);
            }
            self.closed.store(true, Ordering::SeqCst);
            return Err(e);
        }

        debug!(key = %self.key, controls = self.controls.len(), "Attached interactivity");
        Ok(())
    }

    async fn show(self: &Arc<Self>, initial: Option<&Page>) -> TetherResult<()> {
        if let Some(page) = initial {
            self.tether.client().edit_message(&self.message, page).await?;
        }
        self.apply_controls().await?;
        self.arm()
    }

    /// Puts the controls on the message.
    pub(crate) async fn apply_controls(&self) -> TetherResult<()> {
        let client = self.tether.client();

        match self.options.control_style() {
            ControlStyle::Reactions => {
                for control in &self.controls {
                    client.add_reaction(&self.message, &control.id).await?;
                }
            }
            ControlStyle::Buttons => client.set_buttons(&self.message, &self.controls).await?,
        }
        Ok(())
    }

    /// Schedules the expiry for the configured timeout.
    fn arm(self: &Arc<Self>) -> TetherResult<()> {
        let Some(timeout) = self.options.timeout_duration() else {
            return Ok(());
        };

        let session = Arc::clone(self);
        let task = self
            .tether
            .scheduler()
            .schedule(self.key.clone(), timeout, move || async move {
                // A newer controller may own the key by now.
                if session.reference().is_some_and(|r| r.is_valid()) {
                    debug!(key = %session.key, "Interactivity expired");
                    session.close().await;
                }
            })?;

        *self.expiry.lock() = task;
        Ok(())
    }

    /// Pushes the expiry back under the sliding policy.
    pub(crate) fn touch(self: &Arc<Self>) {
        if self.options.expiry_policy() != ExpiryPolicy::Sliding {
            return;
        }
        if let Err(e) = self.arm() {
            debug!(key = %self.key, error = %e, "Failed to reschedule expiry");
        }
    }

    /// Decides whether a callback invocation is a press this session should
    /// handle, and returns the pressed glyph if so.
    ///
    /// Accepted reaction presses in group channels have the user's reaction
    /// removed so the control can be pressed again.
    pub(crate) async fn accept<'a>(&self, ctx: &'a InteractionContext) -> Option<&'a str> {
        if self.closed.load(Ordering::SeqCst) {
            return None;
        }

        let glyph = ctx.glyph()?;
        if !self.options.permits(ctx.user()) {
            trace!(key = %self.key, user = %ctx.user().id, "Press rejected by filter");
            return None;
        }

        if ctx.is_reaction_add()
            && self.message.is_group()
            && self.tether.settings().remove_user_reactions
        {
            self.remove_reaction(glyph, ctx.user()).await;
        }

        Some(glyph)
    }

    async fn remove_reaction(&self, glyph: &str, user: &User) {
        if let Err(e) = self
            .tether
            .client()
            .remove_reaction(&self.message, glyph, &user.id)
            .await
        {
            debug!(key = %self.key, error = %e, "Failed to remove user reaction");
        }
    }

    /// Returns `true` if `glyph` is this session's cancel control.
    pub(crate) fn is_cancel(&self, glyph: &str) -> bool {
        self.options.is_cancellable() && glyph == self.tether.settings().glyphs.cancel
    }

    /// Applies the missing-control policy to a press of an unmapped glyph.
    pub(crate) fn unmapped(&self, glyph: &str) -> Result<(), BoxError> {
        match self.tether.settings().missing_control {
            MissingControlPolicy::Ignore => {
                trace!(key = %self.key, glyph, "No action for control");
                Ok(())
            }
            MissingControlPolicy::Error => Err(TetherError::MissingControl(glyph.to_string()).into()),
        }
    }

    /// Renders `page` onto the message.
    pub(crate) async fn render(&self, page: &Page) -> TetherResult<()> {
        trace!(key = %self.key, page = %page.summary(), "Rendering page");
        self.tether.client().edit_message(&self.message, page).await?;
        Ok(())
    }

    /// Terminal transition. Returns `false` if the session was already
    /// closed or no longer owns its registration.
    ///
    /// A session whose key was taken over by another controller, or whose
    /// message was deleted, only drops its own expiry: the controls on the
    /// message are not its own anymore.
    ///
    /// Stripping controls is best effort: the message may already be gone.
    pub(crate) async fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }

        let released = self
            .reference()
            .is_some_and(|reference| self.tether.registry().release(reference));
        if let Some(task) = self.expiry.lock().take() {
            task.cancel();
        }
        if !released {
            debug!(key = %self.key, "Registration already gone, skipping teardown");
            return false;
        }

        let client = self.tether.client();
        let stripped = match self.options.control_style() {
            ControlStyle::Reactions => client.clear_reactions(&self.message).await,
            ControlStyle::Buttons => client.clear_buttons(&self.message).await,
        };
        if let Err(e) = stripped {
            debug!(key = %self.key, error = %e, "Failed to strip controls");
        }

        if let Some(on_close) = self.options.close_hook() {
            on_close(&self.message);
        }

        debug!(key = %self.key, "Closed interactivity");
        true
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key)
            .field("message", &self.message)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Handle to an attached controller.
///
/// `S` is the controller's observable state: the page cursor for
/// pagination, the current category for menus.
pub struct Handle<S> {
    session: Arc<Session>,
    state: Arc<Mutex<S>>,
}

impl<S> Clone for Handle<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S> Handle<S> {
    pub(crate) fn new(session: Arc<Session>, state: Arc<Mutex<S>>) -> Self {
        Self { session, state }
    }

    pub(crate) fn state(&self) -> &Arc<Mutex<S>> {
        &self.state
    }

    /// The non-owning reference to this controller's registration.
    pub fn reference(&self) -> Option<&ActionReference> {
        self.session.reference()
    }

    pub fn message(&self) -> &MessageRef {
        self.session.message()
    }

    pub fn key(&self) -> &Key {
        self.session.key()
    }

    /// Returns `true` until the controller closes, expires, is replaced or
    /// its message is deleted.
    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// Closes the controller the same way the cancel control does.
    ///
    /// Returns `false` without touching the message if it was already
    /// closed, replaced by another controller or its message was deleted.
    pub async fn close(&self) -> bool {
        self.session.close().await
    }
}

impl<S: fmt::Debug> fmt::Debug for Handle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("session", &self.session)
            .field("state", &*self.state.lock())
            .finish()
    }
}
