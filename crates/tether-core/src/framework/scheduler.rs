//! Idle-expiry scheduling.
//!
//! [`TaskScheduler`] runs at most one pending task per [`Key`]. Scheduling a
//! task for a key that already has one replaces it: the old task is removed
//! before the new one is queued, inside the single worker that owns the
//! queue, so the two can never both fire.
//!
//! The worker is a tokio task spawned on first use and respawned if the
//! runtime hosting it went away. Expired actions are spawned onto the
//! runtime in expiry order; an action that already started cannot be
//! cancelled, so action bodies should check whether their registration is
//! still live (see [`ActionReference`](crate::ActionReference)).
//!
//! ```rust,ignore
//! let scheduler = TaskScheduler::global();
//! scheduler.schedule(key, Duration::from_secs(60), move || async move {
//!     registry.unregister(&stale_key);
//! })?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Weak};
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::time::{DelayQueue, delay_queue};
use tracing::{debug, trace};

use crate::foundation::error::{SchedulerError, SchedulerResult};
use crate::foundation::key::Key;
use crate::framework::registry::BoxFuture;

/// A deferred action run when a key expires.
pub type ExpiryAction = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

enum Command {
    Schedule {
        key: Key,
        id: u64,
        deadline: Instant,
        action: ExpiryAction,
    },
    Cancel {
        key: Key,
        id: Option<u64>,
    },
    Clear,
}

struct Pending {
    id: u64,
    slot: delay_queue::Key,
    action: ExpiryAction,
}

struct Inner {
    sender: Mutex<Option<mpsc::UnboundedSender<Command>>>,
    next_id: AtomicU64,
}

static GLOBAL_SCHEDULER: LazyLock<TaskScheduler> = LazyLock::new(TaskScheduler::new);

/// Single-worker delayed task manager keyed by message.
#[derive(Clone)]
pub struct TaskScheduler {
    inner: Arc<Inner>,
}

impl TaskScheduler {
    /// Creates a scheduler. The worker starts on the first scheduled task.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                sender: Mutex::new(None),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Returns the process-wide scheduler.
    pub fn global() -> Self {
        GLOBAL_SCHEDULER.clone()
    }

    /// Schedules `action` to run once `delay` has elapsed, replacing any
    /// task pending for `key`.
    ///
    /// A zero `delay` means "never expire": the pending task for `key`, if
    /// any, is cancelled and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NoRuntime`] when called outside a tokio
    /// runtime and no worker is running yet.
    pub fn schedule<F, Fut>(
        &self,
        key: Key,
        delay: Duration,
        action: F,
    ) -> SchedulerResult<Option<ScheduledTask>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if delay.is_zero() {
            self.cancel(&key);
            return Ok(None);
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + delay;
        let action: ExpiryAction = Box::new(move || Box::pin(action()));

        self.send(Command::Schedule {
            key: key.clone(),
            id,
            deadline,
            action,
        })?;

        trace!(key = %key, ?delay, "Scheduled expiry");

        Ok(Some(ScheduledTask {
            key,
            id,
            scheduler: Arc::downgrade(&self.inner),
        }))
    }

    /// Cancels whatever task is pending for `key`.
    pub fn cancel(&self, key: &Key) {
        self.send_if_running(Command::Cancel {
            key: key.clone(),
            id: None,
        });
    }

    /// Cancels every pending task.
    pub fn clear(&self) {
        self.send_if_running(Command::Clear);
    }

    fn send(&self, command: Command) -> SchedulerResult<()> {
        let mut sender = self.inner.sender.lock();

        if let Some(tx) = sender.as_ref().filter(|tx| !tx.is_closed()) {
            // A closed worker hands the command back; fall through and respawn.
            match tx.send(command) {
                Ok(()) => return Ok(()),
                Err(mpsc::error::SendError(command)) => {
                    return Self::spawn_worker(&mut sender)?
                        .send(command)
                        .map_err(|_| SchedulerError::NoRuntime);
                }
            }
        }

        Self::spawn_worker(&mut sender)?
            .send(command)
            .map_err(|_| SchedulerError::NoRuntime)
    }

    fn send_if_running(&self, command: Command) {
        if let Some(tx) = self.inner.sender.lock().as_ref() {
            // Nothing can be pending if the worker is gone.
            let _ = tx.send(command);
        }
    }

    fn spawn_worker(
        slot: &mut Option<mpsc::UnboundedSender<Command>>,
    ) -> SchedulerResult<mpsc::UnboundedSender<Command>> {
        let handle =
            tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run_worker(rx));
        debug!("Expiry scheduler worker started");

        *slot = Some(tx.clone());
        Ok(tx)
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let running = self
            .inner
            .sender
            .lock()
            .as_ref()
            .is_some_and(|tx| !tx.is_closed());
        f.debug_struct("TaskScheduler")
            .field("running", &running)
            .finish()
    }
}

async fn run_worker(mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut queue: DelayQueue<Key> = DelayQueue::new();
    let mut pending: HashMap<Key, Pending> = HashMap::new();

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Schedule { key, id, deadline, action }) => {
                    if let Some(old) = pending.remove(&key) {
                        queue.remove(&old.slot);
                        trace!(key = %key, "Replaced pending expiry");
                    }
                    let slot = queue.insert_at(key.clone(), deadline);
                    pending.insert(key, Pending { id, slot, action });
                }
                Some(Command::Cancel { key, id }) => {
                    let matches = pending
                        .get(&key)
                        .is_some_and(|p| id.is_none_or(|id| id == p.id));
                    if matches && let Some(old) = pending.remove(&key) {
                        queue.remove(&old.slot);
                        trace!(key = %key, "Cancelled expiry");
                    }
                }
                Some(Command::Clear) => {
                    queue.clear();
                    pending.clear();
                }
                None => break,
            },
            Some(expired) = queue.next(), if !queue.is_empty() => {
                let key = expired.into_inner();
                if let Some(task) = pending.remove(&key) {
                    debug!(key = %key, "Expiry fired");
                    tokio::spawn((task.action)());
                }
            }
        }
    }

    debug!("Expiry scheduler worker stopped");
}

// ============================================================================
// ScheduledTask
// ============================================================================

/// Handle to one scheduled expiry.
///
/// Cancelling through a handle only affects the task it was returned for; a
/// newer task for the same key is left alone.
#[derive(Clone)]
pub struct ScheduledTask {
    key: Key,
    id: u64,
    scheduler: Weak<Inner>,
}

impl ScheduledTask {
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Cancels this task if it has not fired or been replaced yet.
    pub fn cancel(&self) {
        if let Some(inner) = self.scheduler.upgrade()
            && let Some(tx) = inner.sender.lock().as_ref()
        {
            let _ = tx.send(Command::Cancel {
                key: self.key.clone(),
                id: Some(self.id),
            });
        }
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}
