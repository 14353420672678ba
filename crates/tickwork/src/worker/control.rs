//! Cross-thread worker flags
//!
//! Written by the controlling thread, read by the worker thread.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU8, AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use super::priority::Priority;

/// Shortest allowed tick delay
pub const MIN_DELAY_MS: u64 = 1;

/// Flags shared between a worker handle and its execution
#[derive(Debug)]
pub(crate) struct Control {
    /// Execution should keep cycling
    pub(crate) running: AtomicBool,
    /// Ticks are skipped while set
    paused: AtomicBool,
    /// Delay between cycles (ms)
    delay_ms: AtomicU64,
    /// Last requested priority
    priority: AtomicU8,
    /// OS thread id of the live execution (0 when none)
    tid: AtomicI64,
    /// Executions currently alive
    live: AtomicUsize,
    /// Ticks executed since the last start
    ticks: AtomicU64,
    /// Executions launched
    starts: AtomicU64,
}

impl Control {
    pub(crate) fn new(delay_ms: u64) -> Self {
        Self {
            running: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            delay_ms: AtomicU64::new(delay_ms.max(MIN_DELAY_MS)),
            priority: AtomicU8::new(Priority::Normal as u8),
            tid: AtomicI64::new(0),
            live: AtomicUsize::new(0),
            ticks: AtomicU64::new(0),
            starts: AtomicU64::new(0),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Clear the running flag, returning its previous value
    pub(crate) fn request_stop(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    pub(crate) fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.load(Ordering::Relaxed))
    }

    /// Store a delay, clamping anything below [`MIN_DELAY_MS`]
    pub(crate) fn set_delay_ms(&self, delay_ms: i64) {
        let clamped = u64::try_from(delay_ms).unwrap_or(0).max(MIN_DELAY_MS);
        self.delay_ms.store(clamped, Ordering::Relaxed);
    }

    pub(crate) fn priority(&self) -> Priority {
        Priority::from_u8(self.priority.load(Ordering::SeqCst))
    }

    pub(crate) fn set_priority(&self, priority: Priority) {
        self.priority.store(priority as u8, Ordering::SeqCst);
    }

    pub(crate) fn tid(&self) -> i64 {
        self.tid.load(Ordering::SeqCst)
    }

    pub(crate) fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub(crate) fn starts(&self) -> u64 {
        self.starts.load(Ordering::Relaxed)
    }

    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Reset per-execution counters ahead of a launch
    pub(crate) fn prepare_launch(&self) {
        self.ticks.store(0, Ordering::Relaxed);
        self.starts.fetch_add(1, Ordering::Relaxed);
        self.priority.store(Priority::Normal as u8, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
    }

    pub(crate) fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Mark the calling thread as the live execution until the guard drops
    pub(crate) fn enter(&self, tid: i64) -> LiveGuard<'_> {
        self.live.fetch_add(1, Ordering::SeqCst);
        self.tid.store(tid, Ordering::SeqCst);
        LiveGuard { control: self }
    }

    /// Sleep for `delay`, returning early once `running` is cleared
    ///
    /// Relies on `Thread::unpark` from the stopping side for a prompt wake.
    pub(crate) fn sleep(&self, delay: Duration) {
        let deadline = Instant::now() + delay;
        while self.is_running() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }
    }
}

/// Live-execution marker, cleared even if a tick panics
pub(crate) struct LiveGuard<'a> {
    control: &'a Control,
}

impl Drop for LiveGuard<'_> {
    fn drop(&mut self) {
        self.control.tid.store(0, Ordering::SeqCst);
        self.control.running.store(false, Ordering::SeqCst);
        self.control.live.fetch_sub(1, Ordering::SeqCst);
    }
}
