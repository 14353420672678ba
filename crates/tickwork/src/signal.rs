//! Frame Signal
//!
//! One-slot rendezvous between the animation producer and the computation
//! consumer. The slot is a level flag: publishing twice before a consume
//! leaves a single pending frame, the earlier one is overwritten.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Upper bound on how long a waiter sleeps before re-checking its running flag
const WAIT_SLICE: Duration = Duration::from_millis(100);

/// Shared "frame ready" flag with broadcast wake
#[derive(Debug, Default)]
pub struct FrameSignal {
    /// Frame ready flag
    ready: Mutex<bool>,
    /// Condition variable for waiting consumers
    condvar: Condvar,
    /// Frames published
    published: AtomicU64,
    /// Frames consumed
    consumed: AtomicU64,
}

/// Publish/consume counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Total publishes
    pub published: u64,
    /// Total successful consumes
    pub consumed: u64,
    /// A frame is waiting in the slot
    pub pending: bool,
}

impl FrameStats {
    /// Frames overwritten before anyone consumed them
    pub fn dropped(&self) -> u64 {
        self.published
            .saturating_sub(self.consumed)
            .saturating_sub(u64::from(self.pending))
    }
}

impl FrameSignal {
    /// Create a signal with no pending frame
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        // A bool cannot be left half-written by a panicking holder
        self.ready.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark a frame ready and wake every waiter
    pub fn publish(&self) {
        let mut ready = self.lock();
        *ready = true;
        self.published.fetch_add(1, Ordering::Relaxed);
        self.condvar.notify_all();
    }

    /// Block until a frame is ready or `running` is cleared
    ///
    /// Returns `true` after consuming the pending frame, `false` when the wait
    /// was abandoned because `running` went false. The flag is re-checked at
    /// least every [`WAIT_SLICE`] even without a wake.
    pub fn wait_for_frame(&self, running: &AtomicBool) -> bool {
        let mut ready = self.lock();

        loop {
            if !running.load(Ordering::SeqCst) {
                return false;
            }

            if *ready {
                *ready = false;
                self.consumed.fetch_add(1, Ordering::Relaxed);
                return true;
            }

            let (guard, _) = self
                .condvar
                .wait_timeout(ready, WAIT_SLICE)
                .unwrap_or_else(PoisonError::into_inner);
            ready = guard;
        }
    }

    /// Consume a pending frame without blocking
    pub fn try_consume(&self) -> bool {
        let mut ready = self.lock();
        if *ready {
            *ready = false;
            self.consumed.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Wake every waiter so it re-checks its running flag
    ///
    /// Takes the lock first: a waiter between its flag check and its wait
    /// cannot miss the notification.
    pub fn wake_all(&self) {
        let _ready = self.lock();
        self.condvar.notify_all();
    }

    /// Whether a frame is pending
    pub fn is_ready(&self) -> bool {
        *self.lock()
    }

    /// Publish/consume counters
    pub fn stats(&self) -> FrameStats {
        // Counters only move under the lock, so this snapshot is consistent
        let ready = self.lock();
        FrameStats {
            published: self.published.load(Ordering::Relaxed),
            consumed: self.consumed.load(Ordering::Relaxed),
            pending: *ready,
        }
    }
}
