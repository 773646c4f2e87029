//! Routing of inbound host events to registered callbacks.
//!
//! For every [`InboundEvent`] the [`InteractionRouter`]:
//!
//! 1. computes the [`Key`] of the target message
//! 2. applies the unmapped-interaction policy if nothing is registered
//! 3. resolves the invoking user (a host round-trip for reactions)
//! 4. drops events from bots and events for locked keys
//! 5. locks the key in serialized mode
//! 6. invokes the callback, catching errors and panics
//! 7. unlocks the key on every path
//!
//! Message deletions skip all of that and unregister the key immediately.
//!
//! ```text
//! host SDK ──► route(event) ──► registry.callback(key) ──► callback(ctx)
//!                  │                                          │
//!                  └── ack / strip controls (unmapped)        └── errors logged, never propagated
//! ```

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{Instrument, Level, debug, error, span, trace, warn};

use crate::foundation::event::{InboundEvent, InteractionContext, MessageRef, Trigger, User};
use crate::foundation::key::Key;
use crate::foundation::settings::{Settings, UnmappedPolicy};
use crate::framework::registry::EventRegistry;
use crate::framework::scheduler::TaskScheduler;
use crate::integration::client::BoxedClient;

/// What the router did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The callback ran and succeeded.
    Invoked,
    /// The callback ran and failed or panicked. The failure was logged.
    Failed,
    /// No callback is registered for the message.
    Unmapped,
    /// The event was dropped (bot user, locked key, unresolvable user, or a
    /// reaction removal in a group channel).
    Dropped,
    /// The message was deleted and its key unregistered.
    Deleted,
}

/// Demultiplexes inbound events onto the callbacks in an [`EventRegistry`].
#[derive(Clone)]
pub struct InteractionRouter {
    registry: Arc<EventRegistry>,
    scheduler: TaskScheduler,
    client: BoxedClient,
    settings: Arc<Settings>,
}

impl InteractionRouter {
    pub fn new(
        registry: Arc<EventRegistry>,
        scheduler: TaskScheduler,
        client: BoxedClient,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            registry,
            scheduler,
            client,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<EventRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Routes `event` and waits for the callback to finish.
    pub async fn route(&self, event: InboundEvent) -> RouteOutcome {
        let key = event.key();
        let span = span!(Level::DEBUG, "route", event = event.event_name(), key = %key);

        self.route_inner(key, event).instrument(span).await
    }

    /// Routes `event` on a new task.
    ///
    /// Host SDK listeners should use this so a slow callback never stalls
    /// the SDK's own event loop.
    pub fn spawn_route(&self, event: InboundEvent) -> JoinHandle<RouteOutcome> {
        let router = self.clone();
        tokio::spawn(async move { router.route(event).await })
    }

    async fn route_inner(&self, key: Key, event: InboundEvent) -> RouteOutcome {
        if let InboundEvent::MessageDeleted(_) = event {
            self.registry.unregister(&key);
            self.scheduler.cancel(&key);
            return RouteOutcome::Deleted;
        }

        if !self.registry.has(&key) {
            self.handle_unmapped(&event).await;
            return RouteOutcome::Unmapped;
        }

        if let Some(interaction) = event.interaction()
            && let Err(e) = self.client.acknowledge(interaction).await
        {
            warn!(error = %e, "Failed to acknowledge interaction");
        }

        let Some((message, user, trigger)) = self.resolve(event).await else {
            return RouteOutcome::Dropped;
        };

        if user.bot {
            trace!(user = %user.id, "Dropped event from bot");
            return RouteOutcome::Dropped;
        }

        if self.registry.is_locked(&key) {
            trace!("Dropped event for locked key");
            return RouteOutcome::Dropped;
        }

        if let Trigger::Selection {
            component_id,
            values,
        } = &trigger
        {
            self.registry
                .record_selection(&key, component_id, values.clone());
        }

        // Unlocks on drop, including when the callback panics.
        let _guard = if self.settings.serialized {
            match self.registry.try_lock(&key) {
                Some(guard) => Some(guard),
                None => {
                    trace!("Lost lock race, dropping event");
                    return RouteOutcome::Dropped;
                }
            }
        } else {
            None
        };

        let Some(callback) = self.registry.callback(&key) else {
            debug!("Callback unregistered while routing");
            return RouteOutcome::Dropped;
        };

        let selections = self.registry.selections(&key);
        let ctx = InteractionContext::new(key.clone(), message, user, trigger, selections);

        match AssertUnwindSafe(async move { callback(ctx).await })
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => RouteOutcome::Invoked,
            Ok(Err(e)) => {
                error!(key = %key, error = %e, "Callback failed");
                RouteOutcome::Failed
            }
            Err(panic) => {
                error!(key = %key, panic = panic_message(&*panic), "Callback panicked");
                RouteOutcome::Failed
            }
        }
    }

    async fn handle_unmapped(&self, event: &InboundEvent) {
        let Some(interaction) = event.interaction() else {
            trace!("No callback for reaction event");
            return;
        };

        if let Err(e) = self.client.acknowledge(interaction).await {
            warn!(error = %e, "Failed to acknowledge unmapped interaction");
        }

        if self.settings.unmapped_interaction == UnmappedPolicy::StripControls {
            debug!("Stripping controls from unmapped message");
            if let Err(e) = self.client.clear_buttons(event.message()).await {
                debug!(error = %e, "Failed to strip controls");
            }
        }
    }

    async fn resolve(&self, event: InboundEvent) -> Option<(MessageRef, User, Trigger)> {
        match event {
            InboundEvent::ReactionAdded(e) => {
                let user = self.fetch_user(&e.user_id).await?;
                let trigger = Trigger::Reaction {
                    glyph: e.glyph,
                    added: true,
                };
                Some((e.message, user, trigger))
            }
            InboundEvent::ReactionRemoved(e) => {
                // In group channels removals come from the bot stripping the
                // user's reaction after a press.
                if e.message.is_group() {
                    trace!("Ignored reaction removal in group channel");
                    return None;
                }
                let user = self.fetch_user(&e.user_id).await?;
                let trigger = Trigger::Reaction {
                    glyph: e.glyph,
                    added: false,
                };
                Some((e.message, user, trigger))
            }
            InboundEvent::ButtonPressed(e) => {
                let trigger = Trigger::Button {
                    component_id: e.component_id,
                };
                Some((e.message, e.user, trigger))
            }
            InboundEvent::SelectionChanged(e) => {
                let trigger = Trigger::Selection {
                    component_id: e.component_id,
                    values: e.values,
                };
                Some((e.message, e.user, trigger))
            }
            InboundEvent::MessageDeleted(_) => None,
        }
    }

    async fn fetch_user(&self, user_id: &str) -> Option<User> {
        match self.client.fetch_user(user_id).await {
            Ok(user) => Some(user),
            Err(e) => {
                debug!(user = user_id, error = %e, "Failed to resolve user");
                None
            }
        }
    }
}

impl fmt::Debug for InteractionRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionRouter")
            .field("registered", &self.registry.len())
            .field("serialized", &self.settings.serialized)
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::content::{ButtonSpec, Page};
    use crate::foundation::error::{ApiError, ApiResult, BoxError};
    use crate::foundation::event::{ButtonEvent, InteractionHandle, ReactionEvent, SelectionEvent};
    use crate::framework::registry::into_callback;
    use crate::integration::client::ChatClient;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct StubClient {
        acks: AtomicUsize,
        cleared: AtomicUsize,
    }

    #[async_trait]
    impl ChatClient for StubClient {
        async fn add_reaction(&self, _: &MessageRef, _: &str) -> ApiResult<()> {
            Ok(())
        }

        async fn remove_reaction(&self, _: &MessageRef, _: &str, _: &str) -> ApiResult<()> {
            Ok(())
        }

        async fn clear_reactions(&self, _: &MessageRef) -> ApiResult<()> {
            Ok(())
        }

        async fn edit_message(&self, _: &MessageRef, _: &Page) -> ApiResult<()> {
            Ok(())
        }

        async fn set_buttons(&self, _: &MessageRef, _: &[ButtonSpec]) -> ApiResult<()> {
            Ok(())
        }

        async fn clear_buttons(&self, _: &MessageRef) -> ApiResult<()> {
            self.cleared.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn fetch_user(&self, user_id: &str) -> ApiResult<User> {
            match user_id {
                "ghost" => Err(ApiError::other("no such user")),
                id if id.starts_with("bot") => Ok(User::bot(id, id)),
                id => Ok(User::new(id, id)),
            }
        }

        async fn acknowledge(&self, _: &InteractionHandle) -> ApiResult<()> {
            self.acks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn router_with(settings: Settings) -> (InteractionRouter, Arc<StubClient>) {
        let client = Arc::new(StubClient::default());
        let router = InteractionRouter::new(
            Arc::new(EventRegistry::new()),
            TaskScheduler::new(),
            client.clone(),
            Arc::new(settings),
        );
        (router, client)
    }

    fn message() -> MessageRef {
        MessageRef::group("guild", "channel", "message")
    }

    fn press(user: User) -> InboundEvent {
        InboundEvent::ButtonPressed(ButtonEvent {
            message: message(),
            user,
            component_id: "▶".into(),
            interaction: InteractionHandle {
                id: "i".into(),
                token: "t".into(),
            },
        })
    }

    fn reaction(message: MessageRef, user_id: &str, added: bool) -> InboundEvent {
        let e = ReactionEvent {
            message,
            user_id: user_id.into(),
            glyph: "▶".into(),
        };
        if added {
            InboundEvent::ReactionAdded(e)
        } else {
            InboundEvent::ReactionRemoved(e)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_serialized_callbacks_never_overlap() {
        let (router, _) = router_with(Settings::default());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let (current, max) = (Arc::clone(&in_flight), Arc::clone(&max_seen));
        router.registry().register(
            message().key(),
            into_callback(move |_ctx| {
                let (current, max) = (Arc::clone(&current), Arc::clone(&max));
                async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    max.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

        let (a, b) = tokio::join!(
            router.route(press(User::new("u1", "one"))),
            router.route(press(User::new("u2", "two"))),
        );

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(a, RouteOutcome::Invoked);
        assert_eq!(b, RouteOutcome::Dropped);
        assert!(!router.registry().is_locked(&message().key()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unserialized_callbacks_may_overlap() {
        let settings = Settings {
            serialized: false,
            ..Settings::default()
        };
        let (router, _) = router_with(settings);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let (current, max) = (Arc::clone(&in_flight), Arc::clone(&max_seen));
        router.registry().register(
            message().key(),
            into_callback(move |_ctx| {
                let (current, max) = (Arc::clone(&current), Arc::clone(&max));
                async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    max.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

        let (a, b) = tokio::join!(
            router.route(press(User::new("u1", "one"))),
            router.route(press(User::new("u2", "two"))),
        );

        assert_eq!(max_seen.load(Ordering::SeqCst), 2);
        assert_eq!((a, b), (RouteOutcome::Invoked, RouteOutcome::Invoked));
    }

    #[tokio::test]
    async fn test_callback_failure_is_isolated_and_unlocks() {
        let (router, _) = router_with(Settings::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&calls);
        router.registry().register(
            message().key(),
            into_callback(move |_ctx| {
                let n = c.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err::<(), BoxError>("boom".into())
                    } else {
                        Ok(())
                    }
                }
            }),
        );

        let user = User::new("u", "user");
        assert_eq!(router.route(press(user.clone())).await, RouteOutcome::Failed);
        assert!(!router.registry().is_locked(&message().key()));
        assert!(router.registry().has(&message().key()));

        assert_eq!(router.route(press(user)).await, RouteOutcome::Invoked);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_callback_panic_is_caught_and_unlocks() {
        let (router, _) = router_with(Settings::default());
        router.registry().register(
            message().key(),
            into_callback(|_ctx| async {
                let explode = true;
                if explode {
                    panic!("callback exploded");
                }
                Ok(())
            }),
        );

        let outcome = router.route(press(User::new("u", "user"))).await;
        assert_eq!(outcome, RouteOutcome::Failed);
        assert!(!router.registry().is_locked(&message().key()));
    }

    #[tokio::test]
    async fn test_bot_and_locked_events_are_dropped() {
        let (router, _) = router_with(Settings::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&calls);
        router.registry().register(
            message().key(),
            into_callback(move |_ctx| {
                c.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            }),
        );

        assert_eq!(
            router.route(press(User::bot("b", "bot"))).await,
            RouteOutcome::Dropped
        );

        router.registry().lock(&message().key());
        assert_eq!(
            router.route(press(User::new("u", "user"))).await,
            RouteOutcome::Dropped
        );
        router.registry().unlock(&message().key());

        assert_eq!(
            router.route(reaction(message(), "bot-7", true)).await,
            RouteOutcome::Dropped
        );
        assert_eq!(
            router.route(reaction(message(), "ghost", true)).await,
            RouteOutcome::Dropped
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reaction_removal_routed_only_outside_groups() {
        let (router, _) = router_with(Settings::default());
        let triggers = Arc::new(Mutex::new(Vec::new()));
        let direct = MessageRef::direct("dm", "message");

        for target in [message(), direct.clone()] {
            let t = Arc::clone(&triggers);
            router.registry().register(
                target.key(),
                into_callback(move |ctx| {
                    t.lock().push(ctx.trigger().clone());
                    async { Ok(()) }
                }),
            );
        }

        assert_eq!(
            router.route(reaction(message(), "u", false)).await,
            RouteOutcome::Dropped
        );
        assert_eq!(
            router.route(reaction(direct, "u", false)).await,
            RouteOutcome::Invoked
        );
        assert_eq!(
            *triggers.lock(),
            vec![Trigger::Reaction {
                glyph: "▶".into(),
                added: false
            }]
        );
    }

    #[tokio::test]
    async fn test_unmapped_interaction_policies() {
        let (router, client) = router_with(Settings::default());
        assert_eq!(
            router.route(press(User::new("u", "user"))).await,
            RouteOutcome::Unmapped
        );
        assert_eq!(client.acks.load(Ordering::SeqCst), 1);
        assert_eq!(client.cleared.load(Ordering::SeqCst), 1);

        let (router, client) = router_with(Settings {
            unmapped_interaction: UnmappedPolicy::Ignore,
            ..Settings::default()
        });
        router.route(press(User::new("u", "user"))).await;
        assert_eq!(client.acks.load(Ordering::SeqCst), 1);
        assert_eq!(client.cleared.load(Ordering::SeqCst), 0);

        // reactions need no acknowledgement
        router.route(reaction(message(), "u", true)).await;
        assert_eq!(client.acks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_selection_is_recorded_before_callback() {
        let (router, _) = router_with(Settings::default());
        let seen = Arc::new(Mutex::new(None));

        let s = Arc::clone(&seen);
        router.registry().register(
            message().key(),
            into_callback(move |ctx| {
                *s.lock() = ctx.selections().get("menu").cloned();
                async { Ok(()) }
            }),
        );

        let event = InboundEvent::SelectionChanged(SelectionEvent {
            message: message(),
            user: User::new("u", "user"),
            component_id: "menu".into(),
            values: vec!["red".into(), "blue".into()],
            interaction: InteractionHandle {
                id: "i".into(),
                token: "t".into(),
            },
        });

        assert_eq!(router.route(event).await, RouteOutcome::Invoked);
        assert_eq!(
            seen.lock().clone(),
            Some(vec!["red".to_string(), "blue".to_string()])
        );
    }

    #[tokio::test]
    async fn test_message_deletion_unregisters() {
        let (router, _) = router_with(Settings::default());
        router
            .registry()
            .register(message().key(), into_callback(|_ctx| async { Ok(()) }));

        let outcome = router
            .route(InboundEvent::MessageDeleted(message()))
            .await;
        assert_eq!(outcome, RouteOutcome::Deleted);
        assert!(!router.registry().has(&message().key()));

        // idempotent
        let outcome = router
            .route(InboundEvent::MessageDeleted(message()))
            .await;
        assert_eq!(outcome, RouteOutcome::Deleted);
    }
}
