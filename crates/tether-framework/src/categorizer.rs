//! Category menus.
//!
//! [`Categorizer`] maps glyphs to pages. Pressing a glyph shows its page;
//! pressing the glyph of the category already shown does nothing. The
//! message content is left untouched until the first press.

use std::sync::Arc;

use parking_lot::Mutex;
use tether_core::{
    BoxError, ButtonSpec, InteractionContext, MessageRef, Page, Tether, TetherError, TetherResult,
    into_callback,
};
use tracing::trace;

use crate::options::InteractivityOptions;
use crate::session::{Handle, Session};

/// Handle to an attached [`Categorizer`]. The state is the glyph of the
/// category shown, `None` before the first press.
pub type CategorizerHandle = Handle<Option<String>>;

impl Handle<Option<String>> {
    pub fn current_category(&self) -> Option<String> {
        self.state().lock().clone()
    }
}

/// Menu controller.
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    categories: Vec<(String, Page)>,
    options: InteractivityOptions,
}

impl Categorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a category. Controls keep insertion order; adding a glyph twice
    /// replaces its page.
    pub fn category(mut self, glyph: impl Into<String>, page: impl Into<Page>) -> Self {
        let glyph = glyph.into();
        let page = page.into();
        match self.categories.iter_mut().find(|(g, _)| *g == glyph) {
            Some(entry) => entry.1 = page,
            None => self.categories.push((glyph, page)),
        }
        self
    }

    pub fn options(mut self, options: InteractivityOptions) -> Self {
        self.options = options;
        self
    }

    /// Attaches to `message` through the active [`Tether`].
    pub async fn attach(self, message: MessageRef) -> TetherResult<CategorizerHandle> {
        let tether = Tether::current()?;
        self.attach_with(&tether, message).await
    }

    /// Attaches to `message` and adds one control per category.
    ///
    /// # Errors
    ///
    /// [`TetherError::EmptyPages`] without categories,
    /// [`TetherError::ConflictingOptions`] if a category uses the cancel
    /// glyph of a cancellable menu, plus the errors of
    /// [`InteractivityOptions::validate`] and platform failures.
    pub async fn attach_with(
        self,
        tether: &Tether,
        message: MessageRef,
    ) -> TetherResult<CategorizerHandle> {
        if self.categories.is_empty() {
            return Err(TetherError::EmptyPages);
        }

        let cancel = &tether.settings().glyphs.cancel;
        if self.options.is_cancellable() && self.categories.iter().any(|(g, _)| g == cancel) {
            return Err(TetherError::conflict(format!(
                "category glyph '{cancel}' is also the cancel control"
            )));
        }

        let mut controls: Vec<ButtonSpec> = self
            .categories
            .iter()
            .map(|(glyph, _)| ButtonSpec::new(glyph.as_str()))
            .collect();
        if self.options.is_cancellable() {
            controls.push(ButtonSpec::new(cancel.as_str()));
        }
        self.options.validate(controls.len())?;

        let current = Arc::new(Mutex::new(None));
        let session = Session::new(tether.clone(), message, self.options, controls);

        let menu = Arc::new(Menu {
            session: Arc::clone(&session),
            current: Arc::clone(&current),
            categories: self.categories,
        });
        let callback = into_callback(move |ctx| {
            let menu = Arc::clone(&menu);
            async move { menu.on_press(ctx).await }
        });

        session.start(callback, None).await?;
        Ok(Handle::new(session, current))
    }
}

struct Menu {
    session: Arc<Session>,
    current: Arc<Mutex<Option<String>>>,
    categories: Vec<(String, Page)>,
}

impl Menu {
    async fn on_press(&self, ctx: InteractionContext) -> Result<(), BoxError> {
        let Some(glyph) = self.session.accept(&ctx).await else {
            return Ok(());
        };

        if self.session.is_cancel(glyph) {
            self.session.close().await;
            return Ok(());
        }

        let Some((_, page)) = self.categories.iter().find(|(g, _)| g == glyph) else {
            return self.session.unmapped(glyph);
        };

        self.session.touch();

        if self.current.lock().as_deref() == Some(glyph) {
            trace!(key = %self.session.key(), glyph, "Category already shown");
            return Ok(());
        }

        self.session.render(page).await?;
        *self.current.lock() = Some(glyph.to_string());
        Ok(())
    }
}
