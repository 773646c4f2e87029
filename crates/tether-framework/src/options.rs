//! Per-call configuration shared by every controller.
//!
//! Each controller embeds one [`InteractivityOptions`] by value. Options are
//! configured with chained by-value setters:
//!
//! ```rust,ignore
//! let options = InteractivityOptions::new()
//!     .timeout(Duration::from_secs(60))
//!     .expiry(ExpiryPolicy::Fixed)
//!     .filter(|user| user.id == author_id)
//!     .on_close(|message| tracing::info!(message = %message.message_id, "closed"));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tether_core::{MessageRef, TetherError, TetherResult, User};

/// The most controls the platform allows on one message.
pub const MAX_CONTROLS: usize = 25;

/// Decides which users may drive a controller.
pub type UserFilter = Arc<dyn Fn(&User) -> bool + Send + Sync>;

/// Called once when a controller closes.
pub type OnClose = Arc<dyn Fn(&MessageRef) + Send + Sync>;

/// When the idle-expiry deadline moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpiryPolicy {
    /// Every accepted press pushes the deadline back by the timeout.
    #[default]
    Sliding,
    /// The deadline is fixed at attach time.
    Fixed,
}

/// How controls are shown on the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlStyle {
    /// One reaction per control.
    #[default]
    Reactions,
    /// One button per control.
    Buttons,
}

/// Options every controller understands.
#[derive(Clone)]
pub struct InteractivityOptions {
    cancellable: bool,
    timeout: Option<Duration>,
    expiry: ExpiryPolicy,
    style: ControlStyle,
    filter: Option<UserFilter>,
    on_close: Option<OnClose>,
}

impl Default for InteractivityOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractivityOptions {
    /// Cancellable, no timeout, reaction controls, anyone may interact.
    pub fn new() -> Self {
        Self {
            cancellable: true,
            timeout: None,
            expiry: ExpiryPolicy::default(),
            style: ControlStyle::default(),
            filter: None,
            on_close: None,
        }
    }

    /// Whether a cancel control is appended.
    pub fn cancellable(mut self, cancellable: bool) -> Self {
        self.cancellable = cancellable;
        self
    }

    /// Idle timeout. A zero duration disables expiry.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn style(mut self, style: ControlStyle) -> Self {
        self.style = style;
        self
    }

    /// Restricts which users may interact. Presses by others are ignored.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&User) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Runs `on_close` once the controller closes, whether cancelled,
    /// expired or closed through its handle.
    pub fn on_close<F>(mut self, on_close: F) -> Self
    where
        F: Fn(&MessageRef) + Send + Sync + 'static,
    {
        self.on_close = Some(Arc::new(on_close));
        self
    }

    pub fn is_cancellable(&self) -> bool {
        self.cancellable
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        self.expiry
    }

    pub fn control_style(&self) -> ControlStyle {
        self.style
    }

    /// Returns `true` if `user` may interact.
    pub fn permits(&self, user: &User) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(user))
    }

    pub(crate) fn close_hook(&self) -> Option<&OnClose> {
        self.on_close.as_ref()
    }

    /// Checks option combinations and the number of controls.
    ///
    /// # Errors
    ///
    /// - [`TetherError::ConflictingOptions`] for a fixed deadline without a
    ///   timeout
    /// - [`TetherError::TooManyControls`] for more than [`MAX_CONTROLS`]
    pub fn validate(&self, controls: usize) -> TetherResult<()> {
        if self.expiry == ExpiryPolicy::Fixed && self.timeout.is_none() {
            return Err(TetherError::conflict(
                "a fixed expiry deadline requires a timeout",
            ));
        }

        if controls > MAX_CONTROLS {
            return Err(TetherError::TooManyControls {
                count: controls,
                max: MAX_CONTROLS,
            });
        }

        Ok(())
    }
}

impl fmt::Debug for InteractivityOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractivityOptions")
            .field("cancellable", &self.cancellable)
            .field("timeout", &self.timeout)
            .field("expiry", &self.expiry)
            .field("style", &self.style)
            .field("filter", &self.filter.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
