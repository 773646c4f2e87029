//! Arbitrary actions bound to controls.
//!
//! [`Buttonizer`] runs a caller-supplied async action for each pressed
//! control. Actions receive a [`ButtonPress`] with the user, the message and
//! the last-seen select menu values on that message.
//!
//! ```rust,ignore
//! Buttonizer::new()
//!     .button("👍", |press| async move {
//!         votes.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     })
//!     .reload(true)
//!     .attach(message)
//!     .await?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tether_core::{
    BoxError, BoxFuture, ButtonSpec, InteractionContext, MessageRef, Tether, TetherError,
    TetherResult, User, into_callback,
};

use crate::options::InteractivityOptions;
use crate::session::{Handle, Session};

/// What a button action receives.
#[derive(Debug, Clone)]
pub struct ButtonPress {
    pub user: User,
    pub message: MessageRef,
    pub glyph: String,
    /// Last-seen values of each select menu on the message.
    pub selections: HashMap<String, Vec<String>>,
}

/// An action bound to a control.
pub type ButtonAction =
    Arc<dyn Fn(ButtonPress) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Handle to an attached [`Buttonizer`].
pub type ButtonizerHandle = Handle<()>;

/// Button controller.
#[derive(Clone, Default)]
pub struct Buttonizer {
    buttons: Vec<(ButtonSpec, ButtonAction)>,
    options: InteractivityOptions,
    reload: bool,
}

impl Buttonizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `action` to `glyph`.
    pub fn button<F, Fut>(self, glyph: impl Into<String>, action: F) -> Self
    where
        F: Fn(ButtonPress) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.button_spec(ButtonSpec::new(glyph), action)
    }

    /// Binds `action` to a control described by `spec`, e.g. a labelled
    /// button. Binding the same id twice replaces the action.
    pub fn button_spec<F, Fut>(mut self, spec: ButtonSpec, action: F) -> Self
    where
        F: Fn(ButtonPress) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let action: ButtonAction = Arc::new(move |press| Box::pin(action(press)));
        match self.buttons.iter_mut().find(|(s, _)| s.id == spec.id) {
            Some(entry) => *entry = (spec, action),
            None => self.buttons.push((spec, action)),
        }
        self
    }

    pub fn options(mut self, options: InteractivityOptions) -> Self {
        self.options = options;
        self
    }

    /// Re-applies the controls after every action, for actions that edit
    /// the message in ways that drop them.
    pub fn reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }

    /// Attaches to `message` through the active [`Tether`].
    pub async fn attach(self, message: MessageRef) -> TetherResult<ButtonizerHandle> {
        let tether = Tether::current()?;
        self.attach_with(&tether, message).await
    }

    /// Attaches to `message` and adds one control per button.
    pub async fn attach_with(
        self,
        tether: &Tether,
        message: MessageRef,
    ) -> TetherResult<ButtonizerHandle> {
        if self.buttons.is_empty() {
            return Err(TetherError::conflict("at least one button is required"));
        }

        let cancel = &tether.settings().glyphs.cancel;
        if self.options.is_cancellable() && self.buttons.iter().any(|(s, _)| s.id == *cancel) {
            return Err(TetherError::conflict(format!(
                "button '{cancel}' is also the cancel control"
            )));
        }

        let mut controls: Vec<ButtonSpec> = self.buttons.iter().map(|(s, _)| s.clone()).collect();
        if self.options.is_cancellable() {
            controls.push(ButtonSpec::new(cancel.as_str()));
        }
        self.options.validate(controls.len())?;

        let session = Session::new(tether.clone(), message, self.options, controls);
        let board = Arc::new(Board {
            session: Arc::clone(&session),
            actions: self.buttons.into_iter().map(|(s, a)| (s.id, a)).collect(),
            reload: self.reload,
        });
        let callback = into_callback(move |ctx| {
            let board = Arc::clone(&board);
            async move { board.on_press(ctx).await }
        });

        session.start(callback, None).await?;
        Ok(Handle::new(session, Arc::new(Mutex::new(()))))
    }
}

impl fmt::Debug for Buttonizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.buttons.iter().map(|(s, _)| s.id.as_str()).collect();
        f.debug_struct("Buttonizer")
            .field("buttons", &ids)
            .field("options", &self.options)
            .field("reload", &self.reload)
            .finish()
    }
}

struct Board {
    session: Arc<Session>,
    actions: HashMap<String, ButtonAction>,
    reload: bool,
}

impl Board {
    async fn on_press(&self, ctx: InteractionContext) -> Result<(), BoxError> {
        let Some(glyph) = self.session.accept(&ctx).await else {
            return Ok(());
        };

        if self.session.is_cancel(glyph) {
            self.session.close().await;
            return Ok(());
        }

        let Some(action) = self.actions.get(glyph) else {
            return self.session.unmapped(glyph);
        };

        self.session.touch();

        let press = ButtonPress {
            user: ctx.user().clone(),
            message: ctx.message().clone(),
            glyph: glyph.to_string(),
            selections: ctx.selections().clone(),
        };
        action(press).await?;

        if self.reload {
            self.session.apply_controls().await?;
        }
        Ok(())
    }
}
