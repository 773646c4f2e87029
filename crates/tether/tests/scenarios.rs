//! End-to-end runs of each controller through a configured runtime.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tether::core::RouteOutcome;
use tether::prelude::*;

use common::{Call, message, react, runtime};

#[tokio::test(start_paused = true)]
async fn pagination_walks_clamps_and_cancels() {
    let (runtime, client) = runtime();
    let message = message();
    let closed = Arc::new(Mutex::new(None));

    let c = Arc::clone(&closed);
    let handle = runtime
        .paginator(["one", "two", "three"])
        .options(
            runtime
                .options()
                .timeout(Duration::from_secs(60))
                .on_close(move |message| *c.lock() = Some(message.clone())),
        )
        .attach_with(runtime.tether(), message.clone())
        .await
        .unwrap();

    assert_eq!(client.last_edit(), Some(Page::text("one")));
    assert_eq!(handle.current_page(), 0);

    // a press pushes the 60s expiry back
    tokio::time::sleep(Duration::from_secs(50)).await;
    runtime.route(react(&message, "reader", "▶")).await;
    assert_eq!(client.last_edit(), Some(Page::text("two")));

    tokio::time::sleep(Duration::from_secs(50)).await;
    assert!(handle.is_active());

    runtime.route(react(&message, "reader", "▶")).await;
    runtime.route(react(&message, "reader", "▶")).await;
    assert_eq!(handle.current_page(), 2);
    assert_eq!(client.last_edit(), Some(Page::text("three")));
    assert_eq!(client.count(&Call::Edit(Page::text("three"))), 1);

    runtime.route(react(&message, "reader", "❎")).await;
    assert!(!handle.is_active());
    assert!(!runtime.tether().registry().has(&message.key()));
    assert_eq!(client.count(&Call::ClearReactions), 1);
    assert_eq!(closed.lock().clone(), Some(message));
}

#[tokio::test]
async fn menu_switches_categories() {
    let (runtime, client) = runtime();
    let message = message();

    let handle = runtime
        .categorizer()
        .category("A", "page A")
        .category("B", "page B")
        .attach_with(runtime.tether(), message.clone())
        .await
        .unwrap();

    runtime.route(react(&message, "u", "A")).await;
    assert_eq!(client.last_edit(), Some(Page::text("page A")));
    assert_eq!(handle.current_category().as_deref(), Some("A"));

    runtime.route(react(&message, "u", "A")).await;
    assert_eq!(client.count(&Call::Edit(Page::text("page A"))), 1);

    runtime.route(react(&message, "u", "B")).await;
    assert_eq!(client.last_edit(), Some(Page::text("page B")));
    assert_eq!(handle.current_category().as_deref(), Some("B"));

    runtime.route(react(&message, "u", "❎")).await;
    assert!(!runtime.tether().registry().has(&message.key()));
}

#[tokio::test]
async fn buttons_run_actions_and_ignore_unknown_glyphs() {
    let (runtime, _client) = runtime();
    let message = message();
    let counter = Arc::new(AtomicUsize::new(0));

    let c = Arc::clone(&counter);
    runtime
        .buttonizer()
        .button("X", move |_press| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .attach_with(runtime.tether(), message.clone())
        .await
        .unwrap();

    runtime.route(react(&message, "u", "X")).await;
    runtime.route(react(&message, "u", "X")).await;
    assert_eq!(counter.load(Ordering::SeqCst), 2);

    let outcome = runtime.route(react(&message, "u", "Z")).await;
    assert_eq!(outcome, RouteOutcome::Invoked);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn dispatch_runs_on_a_separate_task() {
    let (runtime, client) = runtime();
    let message = message();

    runtime
        .paginator(["one", "two"])
        .attach_with(runtime.tether(), message.clone())
        .await
        .unwrap();

    let outcome = runtime
        .dispatch(react(&message, "u", "▶"))
        .await
        .unwrap();
    assert_eq!(outcome, RouteOutcome::Invoked);
    assert_eq!(client.last_edit(), Some(Page::text("two")));
}
