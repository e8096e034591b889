//! Deferred event scheduler
//!
//! Producers enqueue `(execute_at, action)` pairs from any thread; the single
//! tick thread drains due entries once per frame. The lock guards only the
//! bookkeeping: actions always run outside it, so an action may enqueue its
//! own follow-up step (land -> break -> respawn chains).

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::Millis;

/// A deferred action run against the tick-owned context
pub type Action<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

struct ScheduledEvent<C> {
    execute_at: Millis,
    seq: u64,
    action: Action<C>,
}

pub struct EventScheduler<C> {
    pending: Mutex<Vec<ScheduledEvent<C>>>,
    next_seq: AtomicU64,
    /// Bumped by `clear()`; an in-flight drain stops once it changes
    epoch: AtomicU64,
}

impl<C> Default for EventScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for EventScheduler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventScheduler")
            .field("pending", &self.len())
            .field("epoch", &self.epoch.load(Ordering::Acquire))
            .finish()
    }
}

impl<C> EventScheduler<C> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            next_seq: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
        }
    }

    /// Queue `action` to run at `now + max(0, delay_ms)`
    pub fn enqueue<F>(&self, now: Millis, delay_ms: i64, action: F)
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        let execute_at = now.saturating_add(delay_ms.max(0) as Millis);
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.pending.lock().push(ScheduledEvent {
            execute_at,
            seq,
            action: Box::new(action),
        });
    }

    /// Run every action due at `now`, each exactly once.
    ///
    /// A panicking action is logged and skipped; the rest still run.
    /// Returns the number of actions executed.
    pub fn drain(&self, now: Millis, ctx: &mut C) -> usize {
        let epoch = self.epoch.load(Ordering::Acquire);
        let mut due = {
            let mut pending = self.pending.lock();
            let (due, keep): (Vec<_>, Vec<_>) =
                pending.drain(..).partition(|event| event.execute_at <= now);
            *pending = keep;
            due
        };
        if due.is_empty() {
            return 0;
        }
        due.sort_by_key(|event| (event.execute_at, event.seq));

        let mut executed = 0;
        for event in due {
            if self.epoch.load(Ordering::Acquire) != epoch {
                log::debug!("Scheduler cleared mid-drain, dropping remaining due actions");
                break;
            }
            executed += 1;
            let action = event.action;
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| action(ctx))) {
                log::error!(
                    "Scheduled action (due {}ms, seq {}) panicked: {}",
                    event.execute_at,
                    event.seq,
                    panic_message(payload.as_ref())
                );
            }
        }
        executed
    }

    /// Drop every pending action without running it. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        let mut pending = self.pending.lock();
        let dropped = pending.len();
        pending.clear();
        dropped
    }

    /// Push every pending action back by `delta_ms` (used after a pause)
    pub fn postpone(&self, delta_ms: Millis) {
        if delta_ms == 0 {
            return;
        }
        for event in self.pending.lock().iter_mut() {
            event.execute_at = event.execute_at.saturating_add(delta_ms);
        }
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Earliest pending deadline
    pub fn next_due(&self) -> Option<Millis> {
        self.pending.lock().iter().map(|event| event.execute_at).min()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic payload>"
    }
}
