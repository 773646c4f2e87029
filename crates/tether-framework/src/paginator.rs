//! Page-by-page navigation.
//!
//! [`Paginator`] shows one [`Page`] at a time with previous/next controls,
//! and optionally jump-to-end ([`fast_forward`](Paginator::fast_forward))
//! and skip-by-n ([`skip_amount`](Paginator::skip_amount)) controls. The
//! cursor is clamped to the page range: pressing next on the last page does
//! nothing.
//!
//! ```rust,ignore
//! let handle = Paginator::new(["one", "two", "three"])
//!     .options(InteractivityOptions::new().timeout(Duration::from_secs(60)))
//!     .fast_forward(true)
//!     .attach(message)
//!     .await?;
//!
//! assert_eq!(handle.current_page(), 0);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tether_core::{
    BoxError, ButtonSpec, Glyphs, InteractionContext, MessageRef, Page, Tether, TetherError,
    TetherResult, into_callback,
};

use crate::options::InteractivityOptions;
use crate::session::{Handle, Session};

/// A move of the page cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Previous,
    Next,
    First,
    Last,
    Backward(usize),
    Forward(usize),
}

/// Position within a fixed number of pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    index: usize,
    len: usize,
}

impl PageCursor {
    /// A cursor on the first of `len` pages. `len` must be at least one.
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Moves the cursor, clamped to the page range. Returns `true` if the
    /// index changed.
    pub fn apply(&mut self, navigation: Navigation) -> bool {
        let last = self.len.saturating_sub(1);
        let target = match navigation {
            Navigation::Previous => self.index.saturating_sub(1),
            Navigation::Next => (self.index + 1).min(last),
            Navigation::First => 0,
            Navigation::Last => last,
            Navigation::Backward(n) => self.index.saturating_sub(n),
            Navigation::Forward(n) => self.index.saturating_add(n).min(last),
        };

        let changed = target != self.index;
        self.index = target;
        changed
    }
}

/// Handle to an attached [`Paginator`].
pub type PaginatorHandle = Handle<PageCursor>;

impl Handle<PageCursor> {
    /// Index of the page currently shown.
    pub fn current_page(&self) -> usize {
        self.state().lock().index()
    }

    pub fn page_count(&self) -> usize {
        self.state().lock().len()
    }
}

/// Pagination controller.
#[derive(Debug, Clone)]
pub struct Paginator {
    pages: Vec<Page>,
    options: InteractivityOptions,
    fast_forward: bool,
    skip_amount: usize,
}

impl Paginator {
    pub fn new<I, P>(pages: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Page>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
            options: InteractivityOptions::new(),
            fast_forward: false,
            skip_amount: 0,
        }
    }

    pub fn options(mut self, options: InteractivityOptions) -> Self {
        self.options = options;
        self
    }

    /// Adds controls jumping to the first and last page.
    pub fn fast_forward(mut self, enabled: bool) -> Self {
        self.fast_forward = enabled;
        self
    }

    /// Adds controls moving `amount` pages at once. Zero disables them.
    pub fn skip_amount(mut self, amount: usize) -> Self {
        self.skip_amount = amount;
        self
    }

    fn controls(&self, glyphs: &Glyphs) -> Vec<ButtonSpec> {
        let mut controls = Vec::new();
        if self.fast_forward {
            controls.push(&glyphs.goto_first);
        }
        if self.skip_amount > 0 {
            controls.push(&glyphs.skip_backward);
        }
        controls.push(&glyphs.previous);
        if self.options.is_cancellable() {
            controls.push(&glyphs.cancel);
        }
        controls.push(&glyphs.next);
        if self.skip_amount > 0 {
            controls.push(&glyphs.skip_forward);
        }
        if self.fast_forward {
            controls.push(&glyphs.goto_last);
        }

        controls.into_iter().map(ButtonSpec::new).collect()
    }

    /// Attaches to `message` through the active [`Tether`].
    ///
    /// # Errors
    ///
    /// [`TetherError::NotActivated`] if no handle is active, otherwise as
    /// [`attach_with`](Self::attach_with).
    pub async fn attach(self, message: MessageRef) -> TetherResult<PaginatorHandle> {
        let tether = Tether::current()?;
        self.attach_with(&tether, message).await
    }

    /// Attaches to `message`, renders the first page and adds the controls.
    ///
    /// # Errors
    ///
    /// Configuration errors are returned before any call to the platform.
    /// Platform failures (e.g. the message is gone) are returned as
    /// [`TetherError::Api`] and leave nothing registered.
    pub async fn attach_with(
        self,
        tether: &Tether,
        message: MessageRef,
    ) -> TetherResult<PaginatorHandle> {
        if self.pages.is_empty() {
            return Err(TetherError::EmptyPages);
        }

        let glyphs = tether.settings().glyphs.clone();
        let controls = self.controls(&glyphs);
        self.options.validate(controls.len())?;

        let cursor = Arc::new(Mutex::new(PageCursor::new(self.pages.len())));
        let session = Session::new(tether.clone(), message, self.options, controls);

        let pager = Arc::new(Pager {
            session: Arc::clone(&session),
            cursor: Arc::clone(&cursor),
            pages: self.pages,
            glyphs,
            fast_forward: self.fast_forward,
            skip_amount: self.skip_amount,
        });

        let first = pager.pages.first().cloned();
        let callback = into_callback(move |ctx| {
            let pager = Arc::clone(&pager);
            async move { pager.on_press(ctx).await }
        });

        session.start(callback, first.as_ref()).await?;
        Ok(Handle::new(session, cursor))
    }
}

struct Pager {
    session: Arc<Session>,
    cursor: Arc<Mutex<PageCursor>>,
    pages: Vec<Page>,
    glyphs: Glyphs,
    fast_forward: bool,
    skip_amount: usize,
}

impl Pager {
    fn navigation(&self, glyph: &str) -> Option<Navigation> {
        let g = &self.glyphs;
        let skip = self.skip_amount > 0;

        if glyph == g.previous {
            Some(Navigation::Previous)
        } else if glyph == g.next {
            Some(Navigation::Next)
        } else if self.fast_forward && glyph == g.goto_first {
            Some(Navigation::First)
        } else if self.fast_forward && glyph == g.goto_last {
            Some(Navigation::Last)
        } else if skip && glyph == g.skip_backward {
            Some(Navigation::Backward(self.skip_amount))
        } else if skip && glyph == g.skip_forward {
            Some(Navigation::Forward(self.skip_amount))
        } else {
            None
        }
    }

    async fn on_press(&self, ctx: InteractionContext) -> Result<(), BoxError> {
        let Some(glyph) = self.session.accept(&ctx).await else {
            return Ok(());
        };

        if self.session.is_cancel(glyph) {
            self.session.close().await;
            return Ok(());
        }

        let Some(navigation) = self.navigation(glyph) else {
            return self.session.unmapped(glyph);
        };

        self.session.touch();

        let moved_to = {
            let mut cursor = self.cursor.lock();
            cursor.apply(navigation).then(|| cursor.index())
        };

        if let Some(page) = moved_to.and_then(|index| self.pages.get(index)) {
            self.session.render(page).await?;
        }
        Ok(())
    }
}
